//! HTML element emission

use common::zig_string_literal;

use crate::ast::{AttrValue, Attribute, Builtin, EscapingMode, Tag, TemplateNode};
use crate::output::CodeWriter;
use crate::transform::Emitter;

/// `b.element(.tag, .{ … })`, or `b.selfClosing(.tag, .{ … })` when `children` is `None`
pub fn emit_element(
    e: &mut Emitter,
    tag: &Tag,
    children: Option<&[TemplateNode]>,
    w: &mut CodeWriter,
) {
    let method = if children.is_some() {
        "element"
    } else {
        "selfClosing"
    };
    w.line(&format!("{}({}, .{{", e.call(method), e.tag_symbol(&tag.name)));
    w.indent();

    if let Some(allocator) = tag.builtin(Builtin::Allocator) {
        w.line(&format!(".allocator = {allocator},"));
    }
    if tag.escaping == EscapingMode::None {
        w.line(".escaping = .none,");
    }

    w.write(".attributes = ");
    emit_attributes(e, tag, w);
    w.line(",");

    if let Some(children) = children {
        w.write(".children = ");
        e.emit_node_list(children, w);
        w.line(",");
    }

    w.dedent();
    w.write("})");
}

/// Attribute list in source order. A spread anywhere turns the list into a
/// `mergeAttrs` call so later entries override earlier ones at runtime.
fn emit_attributes(e: &mut Emitter, tag: &Tag, w: &mut CodeWriter) {
    let attributes: Vec<&Attribute> = tag
        .attributes
        .iter()
        .filter(|attr| {
            !matches!(
                attr,
                Attribute::Builtin { .. } | Attribute::BuiltinShorthand { .. }
            )
        })
        .collect();

    let merged = tag.has_spread();
    if merged {
        w.write(&format!("{}(", e.call("mergeAttrs")));
    }
    if attributes.is_empty() {
        w.write("&.{}");
    } else {
        w.line("&.{");
        w.indent();
        for attr in attributes {
            emit_attribute(e, attr, w);
            w.line(",");
        }
        w.dedent();
        w.write("}");
    }
    if merged {
        w.write(")");
    }
}

fn emit_attribute(e: &mut Emitter, attr: &Attribute, w: &mut CodeWriter) {
    match attr {
        Attribute::Static { name, value, .. } => {
            w.write(&format!("{}({}, ", e.call("attr"), zig_string_literal(name)));
            match value {
                AttrValue::Str(literal) => w.write(literal),
                AttrValue::Expr(expr) => w.write(expr),
                AttrValue::Flag => w.write("\"\""),
                AttrValue::Node(node) => e.emit_expr(node, w),
            }
            w.write(")");
        }
        Attribute::Shorthand { ident, .. } => {
            w.write(&format!(
                "{}({}, {ident})",
                e.call("attr"),
                zig_string_literal(ident)
            ));
        }
        Attribute::Formatted {
            name, format, args, ..
        } => {
            w.write(&format!(
                "{}({}, \"{format}\", {})",
                e.call("attrf"),
                zig_string_literal(name),
                format_args(e, args)
            ));
        }
        Attribute::Spread { expr, .. } => {
            w.write(&format!("{}({expr})", e.call("spread")));
        }
        Attribute::Builtin { .. } | Attribute::BuiltinShorthand { .. } => {}
    }
}

/// `.{ b.fmt(x), b.fmt(y) }`
pub(crate) fn format_args(e: &Emitter, args: &[String]) -> String {
    if args.is_empty() {
        return ".{}".to_string();
    }
    let wrapped: Vec<String> = args
        .iter()
        .map(|arg| format!("{}({})", e.call("fmt"), arg.trim()))
        .collect();
    format!(".{{ {} }}", wrapped.join(", "))
}

#[cfg(test)]
mod tests {
    use crate::transform::generate;
    use common::TransformOptions;

    fn emit(source: &str) -> String {
        let options = TransformOptions {
            inject_import: false,
            ..TransformOptions::zigx_defaults()
        };
        generate(source, &syntax::parse(source), &options)
            .unwrap()
            .code
    }

    #[test]
    fn self_closing_has_no_children_field() {
        let code = emit("(<br/>)");
        assert!(code.contains("__zx_b0.selfClosing(.br, .{"));
        assert!(code.contains(".attributes = &.{},"));
        assert!(!code.contains(".children"));
    }

    #[test]
    fn attribute_kinds() {
        let code = emit("(<a href=\"/\" title={t} {id} hidden class=`btn {kind}`/>)");
        assert!(code.contains("__zx_b0.attr(\"href\", \"/\"),"));
        assert!(code.contains("__zx_b0.attr(\"title\", t),"));
        assert!(code.contains("__zx_b0.attr(\"id\", id),"));
        assert!(code.contains("__zx_b0.attr(\"hidden\", \"\"),"));
        assert!(code.contains("__zx_b0.attrf(\"class\", \"btn {s}\", .{ __zx_b0.fmt(kind) }),"));
    }

    #[test]
    fn spread_switches_to_merged_list() {
        let code = emit("(<input {value} {..rest}/>)");
        assert!(code.contains(".attributes = __zx_b0.mergeAttrs(&.{"));
        let value = code.find("attr(\"value\", value)").unwrap();
        let spread = code.find("spread(rest)").unwrap();
        assert!(value < spread);
    }

    #[test]
    fn builtins_become_options() {
        let code = emit("(<pre @allocator={arena} @escaping=.none>x</pre>)");
        assert!(code.contains(".allocator = arena,"));
        assert!(code.contains(".escaping = .none,"));
        assert!(code.contains("__zx_b0.raw(\"x\")"));
        assert!(!code.contains("attr(\"allocator\""));
    }

    #[test]
    fn unusual_tag_names_are_quoted() {
        let code = emit("(<my-widget/>)");
        assert!(code.contains("selfClosing(.@\"my-widget\", .{"));
    }
}
