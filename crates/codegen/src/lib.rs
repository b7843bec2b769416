//! Template lowering and Zig code generation
//!
//! Pipeline per file: CST ([`syntax`]) → [`lower`] (validated AST) →
//! [`resolve`] (allocator scopes, escaping modes, text normalization) →
//! [`transform`] (Zig source). Only lowering can fail; emission is total.
//!
//! ## Output Format
//!
//! ```zig
//! // Input
//! const page = (<p class="x">Hello {name}</p>);
//!
//! // Output
//! const page = __zx_blk0: {
//!     var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);
//!     break :__zx_blk0 __zx_b0.element(.p, .{
//!         .attributes = &.{
//!             __zx_b0.attr("class", "x"),
//!         },
//!         .children = &.{
//!             __zx_b0.text("Hello "),
//!             __zx_b0.expr(name),
//!         },
//!     });
//! };
//! ```

pub mod ast;
pub mod component;
pub mod control_flow;
pub mod element;
pub mod lower;
pub mod output;
pub mod resolve;
pub mod transform;

pub use ast::*;
pub use lower::lower_file;
pub use resolve::resolve_template;
pub use transform::{generate, Generated};
