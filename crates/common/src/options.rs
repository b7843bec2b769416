//! Transform options for the zigx template compiler

/// Configuration options for a single file transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransformOptions<'a> {
    /// Logical file identity, used for diagnostics
    pub filename: &'a str,

    /// Namespace the generated code calls the builder through
    pub runtime: &'a str,

    /// Module path used when the runtime import is injected
    pub runtime_module: &'a str,

    /// Allocator expression used when no `@allocator` scope is active.
    /// Works anywhere, but a page allocator is slow for many small nodes.
    pub default_allocator: &'a str,

    /// Spaces per nesting level in generated code
    pub indent_width: usize,

    /// Prepend `const <runtime> = @import("<runtime_module>");` when missing
    pub inject_import: bool,
}

impl Default for TransformOptions<'_> {
    fn default() -> Self {
        Self::zigx_defaults()
    }
}

impl<'a> TransformOptions<'a> {
    pub fn zigx_defaults() -> Self {
        Self {
            filename: "input.zx",
            runtime: "zigx",
            runtime_module: "zigx",
            default_allocator: "std.heap.page_allocator",
            indent_width: 4,
            inject_import: true,
        }
    }

    pub fn with_filename(mut self, filename: &'a str) -> Self {
        self.filename = filename;
        self
    }

    /// Every option that can change generated code, in a stable textual form.
    pub fn fingerprint(&self) -> String {
        format!(
            "file={}\0runtime={}\0module={}\0alloc={}\0indent={}\0import={}",
            self.filename,
            self.runtime,
            self.runtime_module,
            self.default_allocator,
            self.indent_width,
            self.inject_import
        )
    }
}
