//! Component call emission
//!
//! `<Card title="x" {..base} open>body</Card>` becomes
//!
//! ```zig
//! b.component(Card, .{}, b.mergeProps(b.mergeProps(.{
//!     .title = "x",
//! }, base), .{
//!     .open = true,
//!     .children = &.{ … },
//! }))
//! ```
//!
//! Props are grouped into record literals split at each spread. Groups are
//! merged left to right, so a later key always wins.

use common::zig_identifier;

use crate::ast::{AttrValue, Attribute, Builtin, Tag, TemplateNode};
use crate::element::format_args;
use crate::output::CodeWriter;
use crate::transform::Emitter;

enum PropGroup<'a> {
    Record(Vec<Prop<'a>>),
    Spread(&'a str),
}

enum Prop<'a> {
    Attribute(&'a Attribute),
    Children(&'a [TemplateNode]),
}

pub fn emit_component(e: &mut Emitter, tag: &Tag, children: &[TemplateNode], w: &mut CodeWriter) {
    w.write(&format!(
        "{}({}, {}, ",
        e.call("component"),
        tag.name,
        component_options(tag)
    ));
    let groups = group_props(tag, children);
    emit_props(e, &groups, w);
    w.write(")");
}

/// `.{ .allocator = a, .rendering = r }` with only the builtins that are set
fn component_options(tag: &Tag) -> String {
    let fields: Vec<String> = [Builtin::Allocator, Builtin::Rendering]
        .into_iter()
        .filter_map(|builtin| {
            tag.builtin(builtin)
                .map(|value| format!(".{} = {value}", builtin.name()))
        })
        .collect();
    if fields.is_empty() {
        ".{}".to_string()
    } else {
        format!(".{{ {} }}", fields.join(", "))
    }
}

fn group_props<'a>(tag: &'a Tag, children: &'a [TemplateNode]) -> Vec<PropGroup<'a>> {
    let mut groups: Vec<PropGroup<'a>> = Vec::new();
    for attr in &tag.attributes {
        match attr {
            Attribute::Builtin { .. } | Attribute::BuiltinShorthand { .. } => {}
            Attribute::Spread { expr, .. } => groups.push(PropGroup::Spread(expr)),
            _ => match groups.last_mut() {
                Some(PropGroup::Record(props)) => props.push(Prop::Attribute(attr)),
                _ => groups.push(PropGroup::Record(vec![Prop::Attribute(attr)])),
            },
        }
    }

    if children.iter().any(|child| !child.is_dropped()) {
        match groups.last_mut() {
            Some(PropGroup::Record(props)) => props.push(Prop::Children(children)),
            _ => groups.push(PropGroup::Record(vec![Prop::Children(children)])),
        }
    }
    groups
}

fn emit_props(e: &mut Emitter, groups: &[PropGroup], w: &mut CodeWriter) {
    let Some((first, rest)) = groups.split_first() else {
        w.write(".{}");
        return;
    };
    for _ in rest {
        w.write(&format!("{}(", e.call("mergeProps")));
    }
    emit_group(e, first, w);
    for group in rest {
        w.write(", ");
        emit_group(e, group, w);
        w.write(")");
    }
}

fn emit_group(e: &mut Emitter, group: &PropGroup, w: &mut CodeWriter) {
    match group {
        PropGroup::Spread(expr) => w.write(expr),
        PropGroup::Record(props) => {
            w.line(".{");
            w.indent();
            for prop in props {
                emit_prop(e, prop, w);
            }
            w.dedent();
            w.write("}");
        }
    }
}

fn emit_prop(e: &mut Emitter, prop: &Prop, w: &mut CodeWriter) {
    match prop {
        Prop::Children(children) => {
            w.write(".children = ");
            e.emit_node_list(children.iter(), w);
        }
        Prop::Attribute(Attribute::Static { name, value, .. }) => {
            w.write(&format!(".{} = ", zig_identifier(name)));
            match value {
                AttrValue::Str(literal) => w.write(literal),
                AttrValue::Expr(expr) => w.write(expr),
                AttrValue::Flag => w.write("true"),
                AttrValue::Node(node) => e.emit_expr(node, w),
            }
        }
        Prop::Attribute(Attribute::Shorthand { ident, .. }) => {
            w.write(&format!(".{} = {ident}", zig_identifier(ident)));
        }
        Prop::Attribute(Attribute::Formatted {
            name, format, args, ..
        }) => {
            w.write(&format!(
                ".{} = {}(\"{format}\", {})",
                zig_identifier(name),
                e.call("format"),
                format_args(e, args)
            ));
        }
        Prop::Attribute(_) => return,
    }
    w.line(",");
}
