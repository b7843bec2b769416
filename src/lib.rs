//! zigx template compiler
//!
//! Rewrites HTML-like templates embedded in Zig source into plain Zig that
//! builds the same tree through the zigx runtime builder.
//!
//! ## Usage
//!
//! ```rust
//! use zigx::{transform, TransformOptions};
//!
//! let source = "const page = (<p class=\"hello\">{name}</p>);";
//! let result = transform(source, None).unwrap();
//! assert!(result.code.contains("__zx_b0.element(.p, .{"));
//! ```

pub mod batch;
pub mod cache;

pub use batch::{transform_batch, SourceFile};
pub use cache::TransformCache;
pub use common::hydration;
pub use common::{Diagnostic, DiagnosticKind, TransformOptions};

#[cfg(feature = "napi")]
use napi_derive::napi;

use serde::Serialize;
use tracing::debug;

use common::LineIndex;

/// Generated code for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformOutput {
    pub code: String,
    /// Template roots that were rewritten
    pub templates: usize,
    /// Labeled blocks emitted, roots included
    pub blocks: usize,
}

/// Result of a transform operation
#[cfg(feature = "napi")]
#[napi(object)]
pub struct TransformResult {
    /// The transformed code, absent when compilation failed
    pub code: Option<String>,
    /// The first error as JSON (kind, message, file, start, end, line, column, help, labels)
    pub diagnostic: Option<String>,
    /// The first error rendered with a source excerpt
    pub report: Option<String>,
}

/// Transform options exposed to JavaScript
#[cfg(feature = "napi")]
#[napi(object)]
#[derive(Default)]
pub struct JsTransformOptions {
    /// Source filename
    /// @default "input.zx"
    pub filename: Option<String>,

    /// Namespace generated code calls the builder through
    /// @default "zigx"
    pub runtime: Option<String>,

    /// Module path for the injected import
    /// @default "zigx"
    pub runtime_module: Option<String>,

    /// Allocator used outside any `@allocator` scope
    /// @default "std.heap.page_allocator"
    pub default_allocator: Option<String>,

    /// Spaces per nesting level
    /// @default 4
    pub indent_width: Option<u32>,

    /// Whether to prepend the runtime import when missing
    /// @default true
    pub inject_import: Option<bool>,
}

/// Transform a `.zx` source file
#[cfg(feature = "napi")]
#[napi]
pub fn transform_zx(source: String, options: Option<JsTransformOptions>) -> TransformResult {
    let js_options = options.unwrap_or_default();
    let defaults = TransformOptions::zigx_defaults();

    let options = TransformOptions {
        filename: js_options.filename.as_deref().unwrap_or(defaults.filename),
        runtime: js_options.runtime.as_deref().unwrap_or(defaults.runtime),
        runtime_module: js_options
            .runtime_module
            .as_deref()
            .unwrap_or(defaults.runtime_module),
        default_allocator: js_options
            .default_allocator
            .as_deref()
            .unwrap_or(defaults.default_allocator),
        indent_width: js_options
            .indent_width
            .map_or(defaults.indent_width, |width| width as usize),
        inject_import: js_options.inject_import.unwrap_or(defaults.inject_import),
    };

    match transform_internal(&source, &options) {
        Ok(output) => TransformResult {
            code: Some(output.code),
            diagnostic: None,
            report: None,
        },
        Err(diagnostic) => TransformResult {
            code: None,
            diagnostic: serde_json::to_string(&diagnostic).ok(),
            report: Some(diagnostic.render(&source)),
        },
    }
}

/// Compile every template in `source`. Fails with the first diagnostic in
/// source order; no partial output is produced.
pub fn transform(
    source: &str,
    options: Option<TransformOptions>,
) -> Result<TransformOutput, Diagnostic> {
    let options = options.unwrap_or_else(TransformOptions::zigx_defaults);
    transform_internal(source, &options)
}

fn transform_internal(
    source: &str,
    options: &TransformOptions,
) -> Result<TransformOutput, Diagnostic> {
    let tree = syntax::parse(source);
    match codegen::generate(source, &tree, options) {
        Ok(generated) => {
            debug!(
                file = options.filename,
                templates = generated.templates,
                blocks = generated.blocks,
                bytes = generated.code.len(),
                "transformed"
            );
            Ok(TransformOutput {
                code: generated.code,
                templates: generated.templates,
                blocks: generated.blocks,
            })
        }
        Err(diagnostic) => {
            let diagnostic =
                diagnostic.located(options.filename, source, &LineIndex::new(source));
            debug!(file = options.filename, error = %diagnostic, "transform failed");
            Err(diagnostic)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_element() {
        let result = transform("const x = (<div class=\"hello\">world</div>);", None).unwrap();
        assert!(result.code.contains("__zx_b0.attr(\"class\", \"hello\")"));
        assert!(result.code.contains("__zx_b0.text(\"world\")"));
        assert_eq!(result.templates, 1);
    }

    #[test]
    fn test_component() {
        let result = transform("const x = (<Button label={l}>Click me</Button>);", None).unwrap();
        assert!(result.code.contains("__zx_b0.component(Button, .{}, .{"));
    }

    #[test]
    fn test_error_is_located() {
        let source = "const a = 1;\nconst b = (<div></span>);";
        let options = TransformOptions::zigx_defaults().with_filename("page.zx");
        let err = transform(source, Some(options)).unwrap_err();
        assert_eq!(err.kind, DiagnosticKind::Syntax);
        assert_eq!(err.file, "page.zx");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 17);
    }

    #[test]
    fn test_output_serializes() {
        let result = transform("(<br/>)", None).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["templates"], 1);
    }
}
