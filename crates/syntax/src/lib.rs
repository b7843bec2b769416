//! Concrete syntax for Zig sources with embedded templates
//!
//! The parser never fails. Host code is kept as `HostText` runs, every
//! `(<…>)` region becomes a `TemplateRoot`, and malformed constructs are
//! recorded as `Error` nodes in place so tooling can keep going.
//!
//! ```text
//! const page = (<div class="x">{name}</div>);
//! ```
//!
//! ```text
//! SourceFile
//!   HostText      "const page = "
//!   TemplateRoot
//!     Element
//!       StartTag
//!         TagName "div"
//!         StaticAttribute
//!           AttrName "class"
//!           StringValue "\"x\""
//!       ExpressionBlock
//!         HostExpr "name"
//!       EndTag
//!         TagName "div"
//!   HostText      ";"
//! ```

pub mod cst;
pub mod grammar;
pub mod kind;
pub mod scanner;

pub use cst::{SyntaxNode, SyntaxTree};
pub use grammar::parse;
pub use kind::SyntaxKind;
