pub mod check;
pub mod constants;
pub mod diagnostic;
pub mod expression;
pub mod hydration;
pub mod options;
pub mod span;

pub use check::*;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use expression::{
    dedent_text, enum_literal, verbatim_lines, zig_format_piece, zig_identifier,
    zig_string_literal,
};
pub use options::*;
pub use span::{LineIndex, Span};
