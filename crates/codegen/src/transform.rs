//! Main emission logic
//!
//! Every template root becomes a labeled block that owns a builder:
//!
//! ```zig
//! __zx_blk0: {
//!     var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);
//!     break :__zx_blk0 __zx_b0.selfClosing(.br, .{
//!         .attributes = &.{},
//!     });
//! }
//! ```
//!
//! Control flow needs statements, so wherever it sits in an expression
//! position (child slot, attribute or prop value) the emitter lifts it into a
//! fresh labeled block of the same shape, with a builder bound to the
//! allocator scope active at that position. Block ids come from a counter
//! owned by the emitter, so one file always yields the same names.

use tracing::trace;

use common::{
    enum_literal, verbatim_lines, zig_string_literal, Diagnostic, LineIndex, TransformOptions,
};
use syntax::scanner::Cursor;
use syntax::{SyntaxKind, SyntaxTree};

use crate::ast::{EscapingMode, Template, TemplateNode, TextRun};
use crate::component::emit_component;
use crate::control_flow::emit_statement;
use crate::element::emit_element;
use crate::lower::lower_file;
use crate::output::CodeWriter;
use crate::resolve::resolve_template;

/// Result of generating one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub code: String,
    /// Number of template roots rewritten
    pub templates: usize,
    /// Number of labeled blocks emitted, roots included
    pub blocks: usize,
}

/// Rewrite every template root of `source` into Zig builder calls.
pub fn generate(
    source: &str,
    tree: &SyntaxTree,
    options: &TransformOptions,
) -> Result<Generated, Diagnostic> {
    let mut templates = lower_file(source, tree)?;
    if templates.is_empty() {
        return Ok(Generated {
            code: source.to_string(),
            templates: 0,
            blocks: 0,
        });
    }
    for template in &mut templates {
        resolve_template(template, options.default_allocator);
    }

    let lines = LineIndex::new(source);
    let mut emitter = Emitter::new(*options);
    let mut code = String::with_capacity(source.len() * 2);

    if options.inject_import && !has_runtime_import(source, tree, options.runtime) {
        code.push_str(&format!(
            "const {} = @import({});\n",
            options.runtime,
            zig_string_literal(options.runtime_module)
        ));
    }

    let mut pending = templates.iter();
    for child in &tree.root.children {
        match child.kind {
            SyntaxKind::TemplateRoot => {
                if let Some(template) = pending.next() {
                    let base = lines.line_indent(source, template.span.start);
                    code.push_str(&emitter.emit_template(template, base));
                }
            }
            _ => code.push_str(child.text(source)),
        }
    }

    Ok(Generated {
        code,
        templates: templates.len(),
        blocks: emitter.blocks,
    })
}

/// Whether host code outside comments and strings already declares the runtime
fn has_runtime_import(source: &str, tree: &SyntaxTree, runtime: &str) -> bool {
    let needle = format!("const {runtime} = @import(");
    tree.root
        .children
        .iter()
        .filter(|child| child.kind == SyntaxKind::HostText)
        .any(|child| {
            let mut cursor = Cursor::new(child.text(source));
            while !cursor.eof() {
                match cursor.skip_trivia_token() {
                    Ok(true) => continue,
                    Ok(false) if cursor.at(&needle) => return true,
                    _ => cursor.bump(),
                }
            }
            false
        })
}

/// Where a statement-level node delivers its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sink {
    /// `break :label value;`
    Break(String),
    /// `list.append(value);`
    Append(String),
}

/// Per-file emission state
pub struct Emitter<'o> {
    options: TransformOptions<'o>,
    /// Next id for a block label, builder or list variable
    counter: usize,
    /// Builder variable of the innermost block
    builder: String,
    blocks: usize,
}

impl<'o> Emitter<'o> {
    pub fn new(options: TransformOptions<'o>) -> Self {
        Self {
            options,
            counter: 0,
            builder: String::new(),
            blocks: 0,
        }
    }

    pub fn emit_template(&mut self, template: &Template, base: &str) -> String {
        let mut w = CodeWriter::new(base, self.options.indent_width);
        self.lifted_block(&mut w, &template.allocator, |this, w, label| {
            this.emit_into(&template.node, &Sink::Break(label.to_string()), w);
        });
        w.finish()
    }

    fn next_id(&mut self) -> usize {
        let id = self.counter;
        self.counter += 1;
        id
    }

    /// `builder.method`
    pub fn call(&self, method: &str) -> String {
        format!("{}.{}", self.builder, method)
    }

    /// Fresh accumulator name for a loop in break position
    pub fn fresh_list(&mut self) -> String {
        format!("__zx_list{}", self.next_id())
    }

    /// Open a labeled block with its own builder, run `body` inside it, close it.
    /// `body` must end every path with `break :label`.
    pub fn lifted_block(
        &mut self,
        w: &mut CodeWriter,
        allocator: &str,
        body: impl FnOnce(&mut Self, &mut CodeWriter, &str),
    ) {
        let id = self.next_id();
        let label = format!("__zx_blk{id}");
        let builder = format!("__zx_b{id}");
        self.blocks += 1;
        trace!(label = %label, allocator, "lifted block");

        w.line(&format!("{label}: {{"));
        w.indent();
        w.line(&format!(
            "var {builder} = {}.Builder.init({allocator});",
            self.options.runtime
        ));
        let outer = std::mem::replace(&mut self.builder, builder);
        body(self, w, &label);
        self.builder = outer;
        w.dedent();
        w.write("}");
    }

    /// Deliver `node` to `sink` as one or more statements
    pub fn emit_into(&mut self, node: &TemplateNode, sink: &Sink, w: &mut CodeWriter) {
        if let TemplateNode::ControlFlow(flow) = node {
            emit_statement(self, flow, sink, w);
            return;
        }
        match sink {
            Sink::Break(label) => {
                w.write(&format!("break :{label} "));
                self.emit_expr(node, w);
                w.line(";");
            }
            Sink::Append(list) => {
                w.write(&format!("{list}.append("));
                self.emit_expr(node, w);
                w.line(");");
            }
        }
    }

    /// Write `node` as a single Zig expression, lifting control flow
    pub fn emit_expr(&mut self, node: &TemplateNode, w: &mut CodeWriter) {
        match node {
            TemplateNode::Element(element) if element.tag.is_component() => {
                emit_component(self, &element.tag, &element.children, w)
            }
            TemplateNode::Element(element) => {
                emit_element(self, &element.tag, Some(&element.children), w)
            }
            TemplateNode::SelfClosingElement(tag) if tag.is_component() => {
                emit_component(self, tag, &[], w)
            }
            TemplateNode::SelfClosingElement(tag) => emit_element(self, tag, None, w),
            TemplateNode::Fragment(fragment) => {
                w.write(&format!("{}(", self.call("fragment")));
                self.emit_node_list(&fragment.children, w);
                w.write(")");
            }
            TemplateNode::ExpressionBlock(block) => {
                let method = match block.escaping {
                    EscapingMode::Html => "expr",
                    EscapingMode::None => "exprRaw",
                };
                w.write(&format!("{}({})", self.call(method), block.expr));
            }
            TemplateNode::TextRun(text) => self.emit_text(text, w),
            TemplateNode::ControlFlow(flow) => {
                self.lifted_block(w, &flow.allocator, |this, w, label| {
                    emit_statement(this, flow, &Sink::Break(label.to_string()), w);
                });
            }
        }
    }

    /// `&.{ a, b, }` over the nodes that produce output
    pub fn emit_node_list<'n>(
        &mut self,
        nodes: impl IntoIterator<Item = &'n TemplateNode>,
        w: &mut CodeWriter,
    ) {
        let nodes: Vec<&TemplateNode> = nodes.into_iter().filter(|n| !n.is_dropped()).collect();
        if nodes.is_empty() {
            w.write("&.{}");
            return;
        }
        w.line("&.{");
        w.indent();
        for node in nodes {
            self.emit_expr(node, w);
            w.line(",");
        }
        w.dedent();
        w.write("}");
    }

    fn emit_text(&mut self, text: &TextRun, w: &mut CodeWriter) {
        let content = text.content.as_deref().unwrap_or_default();
        match text.escaping {
            EscapingMode::Html => {
                w.write(&format!("{}({})", self.call("text"), zig_string_literal(content)));
            }
            EscapingMode::None if !content.contains('\n') => {
                w.write(&format!("{}({})", self.call("raw"), zig_string_literal(content)));
            }
            EscapingMode::None => {
                w.line(&format!("{}(", self.call("raw")));
                w.indent();
                for line in verbatim_lines(content) {
                    w.line(&format!("\\\\{line}"));
                }
                w.dedent();
                w.write(")");
            }
        }
    }

    /// `.tag` symbol for an element name
    pub fn tag_symbol(&self, name: &str) -> String {
        enum_literal(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str, options: &TransformOptions) -> Generated {
        generate(source, &syntax::parse(source), options).unwrap()
    }

    #[test]
    fn file_without_templates_is_untouched() {
        let src = "const x = (1 + 2);\n// (<p/>) in a comment\n";
        let out = run(src, &TransformOptions::default());
        assert_eq!(out.code, src);
        assert_eq!(out.templates, 0);
    }

    #[test]
    fn host_text_is_copied_around_templates() {
        let src = "const a = (<br/>);\nconst b = 2;\n";
        let out = run(src, &TransformOptions::default());
        assert!(out.code.starts_with("const zigx = @import(\"zigx\");\nconst a = __zx_blk0: {\n"));
        assert!(out.code.ends_with("};\nconst b = 2;\n"));
    }

    #[test]
    fn existing_import_is_not_duplicated() {
        let src = "const zigx = @import(\"deps/zigx\");\nconst a = (<br/>);\n";
        let out = run(src, &TransformOptions::default());
        assert_eq!(out.code.matches("@import(").count(), 1);
    }

    #[test]
    fn import_mentioned_in_comment_or_string_is_still_injected() {
        let src = "// const zigx = @import(\"old\") was removed\nconst note = \"const zigx = @import(\";\nconst a = (<br/>);\n";
        let out = run(src, &TransformOptions::default());
        assert!(out.code.starts_with("const zigx = @import(\"zigx\");\n// const zigx"));
    }

    #[test]
    fn labels_count_up_across_roots() {
        let src = "const a = (<br/>);\nconst b = (<div>{if (x) (<p/>)}</div>);\n";
        let out = run(src, &TransformOptions::default());
        assert!(out.code.contains("const a = __zx_blk0: {"));
        assert!(out.code.contains("const b = __zx_blk1: {"));
        assert!(out.code.contains("__zx_blk2: {"));
        assert_eq!(out.templates, 2);
        assert_eq!(out.blocks, 3);
    }

    #[test]
    fn generated_lines_follow_host_indentation() {
        let src = "fn page() void {\n    return (<br/>);\n}\n";
        let options = TransformOptions {
            inject_import: false,
            ..TransformOptions::default()
        };
        let out = run(src, &options);
        assert_eq!(
            out.code,
            "fn page() void {\n    return __zx_blk0: {\n        var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);\n        break :__zx_blk0 __zx_b0.selfClosing(.br, .{\n            .attributes = &.{},\n        });\n    };\n}\n"
        );
    }

    #[test]
    fn verbatim_text_becomes_multiline_literal() {
        let src = "(<script @escaping=.none>\n  let a = 1;\n</script>)";
        let options = TransformOptions {
            inject_import: false,
            ..TransformOptions::default()
        };
        let out = run(src, &options);
        assert!(out.code.contains("__zx_b0.raw(\n"));
        assert!(out.code.contains("\\\\  let a = 1;\n"));
    }
}
