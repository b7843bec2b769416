//! Semantic template tree
//!
//! Produced by [`crate::lower`], annotated in place by [`crate::resolve`] and
//! consumed by the emitter. Host expressions are kept as verbatim text.

use common::Span;

/// One `(<…>)` region of a source file
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub span: Span,
    pub node: TemplateNode,
    /// Allocator the root builder is created with (resolved)
    pub allocator: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Element(Element),
    SelfClosingElement(Tag),
    Fragment(Fragment),
    ExpressionBlock(ExpressionBlock),
    TextRun(TextRun),
    ControlFlow(ControlFlow),
}

impl TemplateNode {
    pub fn span(&self) -> Span {
        match self {
            TemplateNode::Element(element) => element.tag.span,
            TemplateNode::SelfClosingElement(tag) => tag.span,
            TemplateNode::Fragment(fragment) => fragment.span,
            TemplateNode::ExpressionBlock(block) => block.span,
            TemplateNode::TextRun(text) => text.span,
            TemplateNode::ControlFlow(flow) => flow.span,
        }
    }

    /// Whether this node produces nothing after text normalization
    pub fn is_dropped(&self) -> bool {
        matches!(self, TemplateNode::TextRun(text) if text.content.is_none())
    }
}

/// Element vs component, decided from the tag name alone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    Element,
    Component,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EscapingMode {
    #[default]
    Html,
    None,
}

impl EscapingMode {
    /// Accepts `.html`/`.none` and `"html"`/`"none"`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            ".html" | "\"html\"" => Some(EscapingMode::Html),
            ".none" | "\"none\"" => Some(EscapingMode::None),
            _ => None,
        }
    }
}

/// Start tag data shared by elements with children and self-closing ones
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub span: Span,
    pub name: String,
    pub kind: TagKind,
    pub attributes: Vec<Attribute>,
    /// Mode for this element's own text/expression children (resolved)
    pub escaping: EscapingMode,
    /// Allocator scope active for this element's subtree (resolved)
    pub allocator: String,
}

impl Tag {
    pub fn is_component(&self) -> bool {
        self.kind == TagKind::Component
    }

    pub fn builtin(&self, builtin: Builtin) -> Option<&str> {
        self.attributes.iter().find_map(|attr| match attr {
            Attribute::Builtin { builtin: b, value, .. } if *b == builtin => Some(value.as_str()),
            Attribute::BuiltinShorthand { builtin: b, .. } if *b == builtin => Some(b.name()),
            _ => None,
        })
    }

    pub fn has_spread(&self) -> bool {
        self.attributes
            .iter()
            .any(|attr| matches!(attr, Attribute::Spread { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub span: Span,
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionBlock {
    pub span: Span,
    pub expr: String,
    pub escaping: EscapingMode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub span: Span,
    pub raw: String,
    pub escaping: EscapingMode,
    /// Text to emit, `None` when the run is layout-only (resolved)
    pub content: Option<String>,
}

/// Reserved attribute names written with the `@` marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Allocator,
    Escaping,
    Rendering,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "allocator" => Some(Builtin::Allocator),
            "escaping" => Some(Builtin::Escaping),
            "rendering" => Some(Builtin::Rendering),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Allocator => "allocator",
            Builtin::Escaping => "escaping",
            Builtin::Rendering => "rendering",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A Zig string literal, quotes included
    Str(String),
    Expr(String),
    /// Nested template or control flow in value position
    Node(Box<TemplateNode>),
    /// Bare attribute name
    Flag,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Static {
        span: Span,
        name: String,
        value: AttrValue,
    },
    /// `@name=value`
    Builtin {
        span: Span,
        builtin: Builtin,
        value: String,
    },
    /// `{ident}`, same as `ident={ident}`
    Shorthand { span: Span, ident: String },
    /// `{@name}`, same as `@name={name}`
    BuiltinShorthand { span: Span, builtin: Builtin },
    Spread { span: Span, expr: String },
    /// `` name=`a {x} b` ``
    Formatted {
        span: Span,
        name: String,
        /// Zig format string body, without quotes
        format: String,
        args: Vec<String>,
    },
}

impl Attribute {
    pub fn span(&self) -> Span {
        match self {
            Attribute::Static { span, .. }
            | Attribute::Builtin { span, .. }
            | Attribute::Shorthand { span, .. }
            | Attribute::BuiltinShorthand { span, .. }
            | Attribute::Spread { span, .. }
            | Attribute::Formatted { span, .. } => *span,
        }
    }

    /// Name this attribute binds, if it binds exactly one
    pub fn name(&self) -> Option<&str> {
        match self {
            Attribute::Static { name, .. } | Attribute::Formatted { name, .. } => Some(name),
            Attribute::Shorthand { ident, .. } => Some(ident),
            Attribute::Builtin { .. }
            | Attribute::BuiltinShorthand { .. }
            | Attribute::Spread { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlowKind {
    If,
    For,
    While,
    Switch,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlFlow {
    pub span: Span,
    pub kind: ControlFlowKind,
    /// `(subject)` of a switch
    pub subject: Option<String>,
    pub branches: Vec<Branch>,
    /// Allocator for a builder created around this wrapper (resolved)
    pub allocator: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub span: Span,
    /// `(cond) |x|` for if/else-if and loops, the pattern for a switch prong,
    /// `None` for a final `else`
    pub head: Option<String>,
    /// `|x|` on an `else` or a switch prong
    pub capture: Option<String>,
    pub body: Body,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    /// `(<node/>)`
    Node(Box<TemplateNode>),
    /// `{ children }`
    List(Vec<TemplateNode>),
}

impl Body {
    pub fn nodes(&self) -> Vec<&TemplateNode> {
        match self {
            Body::Node(node) => vec![node.as_ref()],
            Body::List(nodes) => nodes.iter().filter(|n| !n.is_dropped()).collect(),
        }
    }

    pub fn nodes_mut(&mut self) -> Vec<&mut TemplateNode> {
        match self {
            Body::Node(node) => vec![node.as_mut()],
            Body::List(nodes) => nodes.iter_mut().collect(),
        }
    }
}
