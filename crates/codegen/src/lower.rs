//! CST → AST lowering with structural validation
//!
//! Checks performed here (all fatal for the file):
//! - every `Error` node from the grammar becomes a syntax diagnostic
//! - start and end tag names match
//! - a template root holds exactly one element or fragment
//! - attribute names are unique; spreads are opaque and never conflict
//! - builtins are known, have values, and sit on tags that accept them

use rustc_hash::FxHashMap;

use common::{is_builtin_attribute, is_component, zig_format_piece, Diagnostic, Span};
use syntax::{SyntaxKind, SyntaxNode, SyntaxTree};

use crate::ast::{
    AttrValue, Attribute, Body, Branch, Builtin, ControlFlow, ControlFlowKind, Element,
    EscapingMode, ExpressionBlock, Fragment, Tag, TagKind, Template, TemplateNode, TextRun,
};

type LowerResult<T> = Result<T, Diagnostic>;

/// Lower every template root of a parsed file, in source order.
pub fn lower_file(source: &str, tree: &SyntaxTree) -> LowerResult<Vec<Template>> {
    if let Some(error) = tree.errors().first() {
        return Err(syntax_error(error));
    }
    let lowerer = Lowerer { source };
    tree.template_roots()
        .map(|root| lowerer.template(root))
        .collect()
}

fn syntax_error(node: &SyntaxNode) -> Diagnostic {
    Diagnostic::syntax(
        node.span,
        node.error.clone().unwrap_or_else(|| "invalid syntax".to_string()),
    )
}

struct Lowerer<'s> {
    source: &'s str,
}

impl<'s> Lowerer<'s> {
    fn text(&self, node: &SyntaxNode) -> &'s str {
        node.text(self.source)
    }

    fn template(&self, root: &SyntaxNode) -> LowerResult<Template> {
        Ok(Template {
            span: root.span,
            node: self.root_node(root)?,
            allocator: String::new(),
        })
    }

    fn root_node(&self, root: &SyntaxNode) -> LowerResult<TemplateNode> {
        let mut nodes = root.children.iter().filter(|n| n.kind != SyntaxKind::Comment);
        match (nodes.next(), nodes.next()) {
            (Some(node), None) => match self.node(node)? {
                Some(lowered) => Ok(lowered),
                None => Err(Diagnostic::validation(root.span, "template has no root element")),
            },
            (Some(first), Some(extra)) => Err(Diagnostic::validation(
                extra.span,
                "a template must have exactly one root element",
            )
            .with_label(first.span, "first root element")
            .with_help("wrap sibling elements in a fragment `<>…</>`")),
            (None, _) => Err(Diagnostic::validation(root.span, "template has no root element")),
        }
    }

    fn node(&self, node: &SyntaxNode) -> LowerResult<Option<TemplateNode>> {
        let lowered = match node.kind {
            SyntaxKind::Element => self.element(node)?,
            SyntaxKind::SelfClosingElement => {
                TemplateNode::SelfClosingElement(self.tag(node.span, &node.children)?)
            }
            SyntaxKind::Fragment => self.fragment(node)?,
            SyntaxKind::Text => TemplateNode::TextRun(TextRun {
                span: node.span,
                raw: self.text(node).to_string(),
                escaping: EscapingMode::Html,
                content: None,
            }),
            SyntaxKind::ExpressionBlock => return self.braced(node),
            SyntaxKind::Comment => return Ok(None),
            SyntaxKind::Error => return Err(syntax_error(node)),
            kind => {
                return Err(Diagnostic::syntax(
                    node.span,
                    format!("unexpected {kind:?} in template"),
                ))
            }
        };
        Ok(Some(lowered))
    }

    /// Content of a `{…}` block: expression, nested template or control flow
    fn braced(&self, node: &SyntaxNode) -> LowerResult<Option<TemplateNode>> {
        let Some(inner) = node.children.first() else {
            return Ok(None);
        };
        let lowered = match inner.kind {
            SyntaxKind::HostExpr => TemplateNode::ExpressionBlock(ExpressionBlock {
                span: node.span,
                expr: self.text(inner).to_string(),
                escaping: EscapingMode::Html,
            }),
            SyntaxKind::TemplateRoot => self.root_node(inner)?,
            kind if kind.is_control_flow() => TemplateNode::ControlFlow(self.control_flow(inner)?),
            SyntaxKind::Error => return Err(syntax_error(inner)),
            kind => {
                return Err(Diagnostic::syntax(
                    inner.span,
                    format!("unexpected {kind:?} in braces"),
                ))
            }
        };
        Ok(Some(lowered))
    }

    fn children(&self, nodes: &[SyntaxNode]) -> LowerResult<Vec<TemplateNode>> {
        let mut children = Vec::with_capacity(nodes.len());
        for node in nodes {
            if let Some(child) = self.node(node)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    fn element(&self, node: &SyntaxNode) -> LowerResult<TemplateNode> {
        let (Some(start_tag), Some(end_tag)) = (node.children.first(), node.children.last()) else {
            return Err(Diagnostic::syntax(node.span, "malformed element"));
        };
        let tag = self.tag(node.span, &start_tag.children)?;

        let open_name = start_tag.child(SyntaxKind::TagName);
        let close_name = end_tag.child(SyntaxKind::TagName).map(|n| self.text(n));
        if close_name != Some(tag.name.as_str()) {
            return Err(Diagnostic::syntax(
                end_tag.span,
                format!(
                    "closing tag `{}` does not match `<{}>`",
                    self.text(end_tag),
                    tag.name
                ),
            )
            .with_label(open_name.map_or(start_tag.span, |n| n.span), "opened here"));
        }

        let inner = &node.children[1..node.children.len() - 1];
        let children = self.children(inner)?;

        if tag.is_component() {
            check_children_prop(&tag, &children)?;
        }
        Ok(TemplateNode::Element(Element { tag, children }))
    }

    fn fragment(&self, node: &SyntaxNode) -> LowerResult<TemplateNode> {
        let Some((end_tag, inner)) = node.children.split_last() else {
            return Err(Diagnostic::syntax(node.span, "malformed fragment"));
        };
        if end_tag.child(SyntaxKind::TagName).is_some() {
            return Err(Diagnostic::syntax(
                end_tag.span,
                format!("closing tag `{}` does not match `<>`", self.text(end_tag)),
            )
            .with_label(Span::new(node.span.start, node.span.start + 2), "opened here"));
        }
        Ok(TemplateNode::Fragment(Fragment {
            span: node.span,
            children: self.children(inner)?,
        }))
    }

    /// Tag name plus attributes (`TagName` first, attribute nodes after)
    fn tag(&self, span: Span, parts: &[SyntaxNode]) -> LowerResult<Tag> {
        let Some((name_node, attribute_nodes)) = parts.split_first() else {
            return Err(Diagnostic::syntax(span, "missing tag name"));
        };
        let name = self.text(name_node).to_string();
        let kind = if is_component(&name) {
            TagKind::Component
        } else {
            TagKind::Element
        };

        let mut attributes = Vec::with_capacity(attribute_nodes.len());
        for node in attribute_nodes {
            attributes.push(self.attribute(node)?);
        }
        validate_attributes(kind, &attributes)?;

        Ok(Tag {
            span,
            name,
            kind,
            attributes,
            escaping: EscapingMode::Html,
            allocator: String::new(),
        })
    }

    fn attribute(&self, node: &SyntaxNode) -> LowerResult<Attribute> {
        let name_node = node.child(SyntaxKind::AttrName);
        let name = name_node.map(|n| self.text(n)).unwrap_or_default();
        let value = node.children.get(1);

        match node.kind {
            SyntaxKind::StaticAttribute => self.static_attribute(node.span, name, value),
            SyntaxKind::BuiltinAttribute => {
                let builtin = builtin_from_name(node.span, name)?;
                let Some(value) = value else {
                    return Err(Diagnostic::validation(
                        node.span,
                        format!("`@{name}` needs a value"),
                    ));
                };
                let value = self.builtin_value(builtin, value)?;
                Ok(Attribute::Builtin {
                    span: node.span,
                    builtin,
                    value,
                })
            }
            SyntaxKind::ShorthandAttribute => Ok(Attribute::Shorthand {
                span: node.span,
                ident: name.to_string(),
            }),
            SyntaxKind::BuiltinShorthandAttribute => {
                let builtin = builtin_from_name(node.span, name)?;
                if builtin == Builtin::Escaping {
                    return Err(Diagnostic::validation(
                        node.span,
                        "`@escaping` must be a literal mode, not a variable",
                    )
                    .with_help("write `@escaping=.none` or `@escaping=.html`"));
                }
                Ok(Attribute::BuiltinShorthand {
                    span: node.span,
                    builtin,
                })
            }
            SyntaxKind::SpreadAttribute => Ok(Attribute::Spread {
                span: node.span,
                expr: node
                    .child(SyntaxKind::HostExpr)
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default(),
            }),
            SyntaxKind::Error => Err(syntax_error(node)),
            kind => Err(Diagnostic::syntax(
                node.span,
                format!("unexpected {kind:?} in tag"),
            )),
        }
    }

    fn static_attribute(
        &self,
        span: Span,
        name: &str,
        value: Option<&SyntaxNode>,
    ) -> LowerResult<Attribute> {
        let Some(value) = value else {
            return Ok(Attribute::Static {
                span,
                name: name.to_string(),
                value: AttrValue::Flag,
            });
        };

        let value = match value.kind {
            SyntaxKind::StringValue => AttrValue::Str(self.text(value).to_string()),
            SyntaxKind::ExprValue => match self.braced(value)? {
                Some(TemplateNode::ExpressionBlock(block)) => AttrValue::Expr(block.expr),
                Some(node) => AttrValue::Node(Box::new(node)),
                None => {
                    return Err(Diagnostic::validation(
                        value.span,
                        format!("attribute `{name}` has an empty value"),
                    ))
                }
            },
            SyntaxKind::TemplateString => {
                let (format, args) = self.format_string(value);
                return Ok(Attribute::Formatted {
                    span,
                    name: name.to_string(),
                    format,
                    args,
                });
            }
            SyntaxKind::Error => return Err(syntax_error(value)),
            kind => {
                return Err(Diagnostic::syntax(
                    value.span,
                    format!("unexpected {kind:?} as attribute value"),
                ))
            }
        };
        Ok(Attribute::Static {
            span,
            name: name.to_string(),
            value,
        })
    }

    /// Builtins take a plain expression or string; `@escaping` must name a mode.
    fn builtin_value(&self, builtin: Builtin, value: &SyntaxNode) -> LowerResult<String> {
        let text = match (value.kind, value.children.first()) {
            (SyntaxKind::StringValue, _) => self.text(value),
            (SyntaxKind::ExprValue, Some(expr)) if expr.kind == SyntaxKind::HostExpr => {
                self.text(expr)
            }
            (SyntaxKind::Error, _) => return Err(syntax_error(value)),
            _ => {
                return Err(Diagnostic::validation(
                    value.span,
                    format!("`@{}` takes a plain expression", builtin.name()),
                ))
            }
        };

        if builtin == Builtin::Escaping && EscapingMode::parse(text).is_none() {
            return Err(Diagnostic::validation(
                value.span,
                format!("unknown escaping mode `{text}`"),
            )
            .with_help("use `.html` (default) or `.none`"));
        }
        Ok(text.to_string())
    }

    /// Zig format string and argument list for a backtick template
    fn format_string(&self, node: &SyntaxNode) -> (String, Vec<String>) {
        let mut format = String::new();
        let mut args = Vec::new();
        for part in &node.children {
            match part.kind {
                SyntaxKind::TemplateText => format.push_str(&zig_format_piece(self.text(part))),
                SyntaxKind::HostExpr => {
                    format.push_str("{s}");
                    args.push(self.text(part).to_string());
                }
                _ => {}
            }
        }
        (format, args)
    }

    fn control_flow(&self, node: &SyntaxNode) -> LowerResult<ControlFlow> {
        let kind = match node.kind {
            SyntaxKind::IfBlock => ControlFlowKind::If,
            SyntaxKind::ForBlock => ControlFlowKind::For,
            SyntaxKind::WhileBlock => ControlFlowKind::While,
            _ => ControlFlowKind::Switch,
        };
        let subject = match kind {
            ControlFlowKind::Switch => node
                .child(SyntaxKind::Header)
                .map(|n| self.text(n).to_string()),
            _ => None,
        };

        let mut branches = Vec::new();
        for branch in node.children_of(SyntaxKind::Branch) {
            let head = branch
                .child(SyntaxKind::Header)
                .or_else(|| branch.child(SyntaxKind::Pattern))
                .map(|n| self.text(n).to_string());
            let capture = branch
                .child(SyntaxKind::Capture)
                .map(|n| self.text(n).to_string());
            let Some(body) = branch.child(SyntaxKind::Body) else {
                return Err(Diagnostic::syntax(branch.span, "missing body"));
            };
            branches.push(Branch {
                span: branch.span,
                head,
                capture,
                body: self.body(body)?,
            });
        }

        Ok(ControlFlow {
            span: node.span,
            kind,
            subject,
            branches,
            allocator: String::new(),
        })
    }

    fn body(&self, node: &SyntaxNode) -> LowerResult<Body> {
        match node.children.as_slice() {
            [root] if root.kind == SyntaxKind::TemplateRoot => {
                Ok(Body::Node(Box::new(self.root_node(root)?)))
            }
            nodes => Ok(Body::List(self.children(nodes)?)),
        }
    }
}

fn builtin_from_name(span: Span, name: &str) -> LowerResult<Builtin> {
    if !is_builtin_attribute(name) {
        return Err(
            Diagnostic::validation(span, format!("unknown builtin attribute `@{name}`"))
                .with_help("known builtins are `@allocator`, `@escaping` and `@rendering`"),
        );
    }
    Builtin::from_name(name).ok_or_else(|| {
        Diagnostic::validation(span, format!("unknown builtin attribute `@{name}`"))
    })
}

/// Duplicate names and misplaced builtins
fn validate_attributes(kind: TagKind, attributes: &[Attribute]) -> LowerResult<()> {
    let mut names: FxHashMap<&str, Span> = FxHashMap::default();
    let mut builtins: FxHashMap<Builtin, Span> = FxHashMap::default();

    for attr in attributes {
        if let Some(name) = attr.name() {
            if let Some(first) = names.insert(name, attr.span()) {
                return Err(Diagnostic::validation(
                    attr.span(),
                    format!("duplicate attribute `{name}`"),
                )
                .with_label(first, "first set here"));
            }
        }

        let builtin = match attr {
            Attribute::Builtin { builtin, .. } | Attribute::BuiltinShorthand { builtin, .. } => {
                *builtin
            }
            _ => continue,
        };
        if let Some(first) = builtins.insert(builtin, attr.span()) {
            return Err(Diagnostic::validation(
                attr.span(),
                format!("duplicate builtin `@{}`", builtin.name()),
            )
            .with_label(first, "first set here"));
        }
        if builtin == Builtin::Rendering && kind != TagKind::Component {
            return Err(Diagnostic::validation(
                attr.span(),
                "`@rendering` is only allowed on components",
            ));
        }
    }
    Ok(())
}

/// A component cannot get `children` both as an attribute and as content.
fn check_children_prop(tag: &Tag, children: &[TemplateNode]) -> LowerResult<()> {
    let Some(attr) = tag
        .attributes
        .iter()
        .find(|attr| attr.name() == Some("children"))
    else {
        return Ok(());
    };
    let content = children.iter().find(|child| match child {
        TemplateNode::TextRun(text) => !text.raw.trim().is_empty(),
        _ => true,
    });
    match content {
        Some(child) => Err(Diagnostic::validation(
            child.span(),
            "duplicate attribute `children`: nested content also sets it",
        )
        .with_label(attr.span(), "`children` attribute here")),
        None => Ok(()),
    }
}
