use std::fmt::Write;

use common::Span;

use crate::kind::SyntaxKind;

/// A node of the concrete syntax tree. Children are stored in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub children: Vec<SyntaxNode>,
    /// Message for `Error` nodes
    pub error: Option<String>,
}

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self {
            kind,
            span,
            children,
            error: None,
        }
    }

    pub fn leaf(kind: SyntaxKind, span: Span) -> Self {
        Self::new(kind, span, Vec::new())
    }

    pub fn error(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: SyntaxKind::Error,
            span,
            children: Vec::new(),
            error: Some(message.into()),
        }
    }

    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        self.span.source_text(source)
    }

    pub fn child(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| c.kind == kind)
    }

    pub fn children_of(&self, kind: SyntaxKind) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Pre-order walk over this node and all descendants
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// Indented outline of the subtree, used by tests and debugging
    pub fn debug_tree(&self, source: &str) -> String {
        let mut out = String::new();
        self.write_tree(source, 0, &mut out);
        out
    }

    fn write_tree(&self, source: &str, depth: usize, out: &mut String) {
        let _ = write!(out, "{}{:?}@{}..{}", "  ".repeat(depth), self.kind, self.span.start, self.span.end);
        if let Some(message) = &self.error {
            let _ = write!(out, " {message:?}");
        } else if self.children.is_empty() {
            let _ = write!(out, " {:?}", self.text(source));
        }
        out.push('\n');
        for child in &self.children {
            child.write_tree(source, depth + 1, out);
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a SyntaxNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// Result of parsing one source file
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
}

impl SyntaxTree {
    /// All `Error` nodes in source order
    pub fn errors(&self) -> Vec<&SyntaxNode> {
        let mut errors: Vec<&SyntaxNode> = self
            .root
            .descendants()
            .filter(|n| n.kind == SyntaxKind::Error)
            .collect();
        errors.sort_by_key(|n| n.span.start);
        errors
    }

    pub fn has_errors(&self) -> bool {
        self.root.descendants().any(|n| n.kind == SyntaxKind::Error)
    }

    /// Top-level template roots in source order
    pub fn template_roots(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.root.children_of(SyntaxKind::TemplateRoot)
    }
}
