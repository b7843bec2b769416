//! Allocator scopes, escaping modes and text normalization
//!
//! One top-down pass per template:
//! - `@allocator` on a tag pushes a scope for the tag and its whole subtree.
//!   Without one, the nearest enclosing scope applies; at the top the
//!   configured default does.
//! - `@escaping` sets the mode for the tag's own text/expression children.
//!   Nested tags start over at `Html`. Fragments and control-flow bodies are
//!   transparent and keep the mode of the enclosing tag.
//! - Text under `Html` is dedented; under `None` it is kept byte for byte.

use common::dedent_text;

use crate::ast::{AttrValue, Attribute, Builtin, EscapingMode, Tag, Template, TemplateNode};

pub fn resolve_template(template: &mut Template, default_allocator: &str) {
    let mut resolver = Resolver {
        default_allocator,
        scopes: Vec::new(),
    };
    resolver.node(&mut template.node, EscapingMode::Html);

    template.allocator = match &template.node {
        TemplateNode::Element(element) => element.tag.allocator.clone(),
        TemplateNode::SelfClosingElement(tag) => tag.allocator.clone(),
        _ => default_allocator.to_string(),
    };
}

struct Resolver<'a> {
    default_allocator: &'a str,
    /// Active `@allocator` expressions, innermost last
    scopes: Vec<String>,
}

impl Resolver<'_> {
    fn current_allocator(&self) -> String {
        self.scopes
            .last()
            .map_or_else(|| self.default_allocator.to_string(), Clone::clone)
    }

    fn node(&mut self, node: &mut TemplateNode, mode: EscapingMode) {
        match node {
            TemplateNode::Element(element) => {
                let pushed = self.enter_tag(&mut element.tag);
                let own_mode = element.tag.escaping;
                for child in &mut element.children {
                    self.node(child, own_mode);
                }
                self.exit_tag(pushed);
            }
            TemplateNode::SelfClosingElement(tag) => {
                let pushed = self.enter_tag(tag);
                self.exit_tag(pushed);
            }
            TemplateNode::Fragment(fragment) => {
                for child in &mut fragment.children {
                    self.node(child, mode);
                }
            }
            TemplateNode::ExpressionBlock(block) => block.escaping = mode,
            TemplateNode::TextRun(text) => {
                text.escaping = mode;
                text.content = match mode {
                    EscapingMode::Html => dedent_text(&text.raw),
                    EscapingMode::None => (!text.raw.is_empty()).then(|| text.raw.clone()),
                };
            }
            TemplateNode::ControlFlow(flow) => {
                flow.allocator = self.current_allocator();
                for branch in &mut flow.branches {
                    for child in branch.body.nodes_mut() {
                        self.node(child, mode);
                        // `{ <A/> }`: padding inside the braces is layout
                        if let TemplateNode::TextRun(text) = child {
                            if text.raw.trim().is_empty() {
                                text.content = None;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Returns whether a scope was pushed
    fn enter_tag(&mut self, tag: &mut Tag) -> bool {
        let explicit = tag.builtin(Builtin::Allocator).map(str::to_string);
        let pushed = explicit.is_some();
        if let Some(allocator) = explicit {
            self.scopes.push(allocator);
        }
        tag.allocator = self.current_allocator();
        tag.escaping = tag
            .builtin(Builtin::Escaping)
            .and_then(EscapingMode::parse)
            .unwrap_or_default();

        for attr in &mut tag.attributes {
            if let Attribute::Static {
                value: AttrValue::Node(node),
                ..
            } = attr
            {
                self.node(node, EscapingMode::Html);
            }
        }
        pushed
    }

    fn exit_tag(&mut self, pushed: bool) {
        if pushed {
            self.scopes.pop();
        }
    }
}
