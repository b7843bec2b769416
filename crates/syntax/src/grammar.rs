//! Recursive-descent grammar for template roots.
//!
//! Inner productions return `ScanResult` and bail with `?`. Errors are turned
//! into `Error` nodes at three boundaries: a template root, a single attribute
//! and a `{…}` block. Each boundary then skips ahead so parsing can continue.

use common::constants::CONTROL_KEYWORDS;
use common::{is_ident_start, is_void_element, Span};

use crate::cst::{SyntaxNode, SyntaxTree};
use crate::kind::SyntaxKind;
use crate::scanner::{Cursor, ScanError, ScanResult};

/// Parse a Zig source file with embedded templates. Never fails; problems are
/// reported as `Error` nodes (see [`SyntaxTree::errors`]).
pub fn parse(source: &str) -> SyntaxTree {
    let mut parser = Parser {
        cursor: Cursor::new(source),
    };
    SyntaxTree {
        root: parser.source_file(),
    }
}

/// What ends a child list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Terminator {
    /// `</…>` of the enclosing element or fragment
    EndTag,
    /// `}` of a control-flow body
    Brace,
}

struct Parser<'s> {
    cursor: Cursor<'s>,
}

impl<'s> Parser<'s> {
    fn source(&self) -> &'s str {
        self.cursor.source()
    }

    fn source_file(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        let mut host_start = 0;
        loop {
            let found = self.cursor.next_template_root();
            let here = self.cursor.pos();
            if here > host_start {
                children.push(SyntaxNode::leaf(
                    SyntaxKind::HostText,
                    Span::from_range(host_start..here),
                ));
            }
            if !found {
                break;
            }
            children.push(self.template_root_recovering());
            host_start = self.cursor.pos();
        }
        SyntaxNode::new(
            SyntaxKind::SourceFile,
            Span::from_range(0..self.source().len()),
            children,
        )
    }

    fn template_root_recovering(&mut self) -> SyntaxNode {
        let start = self.cursor.pos();
        match self.template_root() {
            Ok(root) => root,
            Err(err) => {
                let resume = (err.span.end as usize).max(start + 1);
                self.cursor.set_pos(resume);
                SyntaxNode::new(
                    SyntaxKind::TemplateRoot,
                    self.cursor.span_from(start),
                    vec![SyntaxNode::error(err.span, err.message)],
                )
            }
        }
    }

    /// `( <node> )`
    fn template_root(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.expect("(", "`(`")?;
        let mut children = Vec::new();
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat(")") {
                break;
            }
            if self.cursor.eof() {
                return Err(ScanError::new(
                    Span::from_range(start..start + 1),
                    "unclosed template root",
                ));
            }
            if self.cursor.peek() == Some(b'<') {
                children.push(self.tag_node()?);
                continue;
            }
            return Err(ScanError::new(
                Span::empty(self.cursor.offset()),
                "expected `)` after the template's root element",
            ));
        }
        Ok(SyntaxNode::new(
            SyntaxKind::TemplateRoot,
            self.cursor.span_from(start),
            children,
        ))
    }

    /// Element, self-closing element, fragment or comment at `<`
    fn tag_node(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        if self.cursor.at("<!--") {
            return self.comment();
        }
        if self.cursor.at("</") {
            let end_tag = self.end_tag()?;
            return Err(ScanError::new(
                end_tag.span,
                format!("unexpected closing tag `{}`", end_tag.text(self.source())),
            ));
        }
        self.cursor.bump();

        if self.cursor.eat(">") {
            let open = self.cursor.span_from(start);
            let mut children = self.children(Terminator::EndTag, open, "<>")?;
            children.push(self.end_tag()?);
            return Ok(SyntaxNode::new(
                SyntaxKind::Fragment,
                self.cursor.span_from(start),
                children,
            ));
        }

        let Some(name_span) = self.cursor.name() else {
            return Err(self.cursor.error_here("expected a tag name after `<`"));
        };
        let name = name_span.source_text(self.source());
        let mut parts = vec![SyntaxNode::leaf(SyntaxKind::TagName, name_span)];

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat("/>") {
                return Ok(SyntaxNode::new(
                    SyntaxKind::SelfClosingElement,
                    self.cursor.span_from(start),
                    parts,
                ));
            }
            if self.cursor.eat(">") {
                break;
            }
            if self.cursor.eof() {
                return Err(ScanError::new(
                    Span::new(start as u32, name_span.end),
                    format!("unterminated start tag `<{name}`"),
                ));
            }
            parts.push(self.attribute_recovering());
        }

        if is_void_element(name) {
            return Ok(SyntaxNode::new(
                SyntaxKind::SelfClosingElement,
                self.cursor.span_from(start),
                parts,
            ));
        }

        let start_tag = SyntaxNode::new(SyntaxKind::StartTag, self.cursor.span_from(start), parts);
        let mut children = vec![start_tag];
        let open = Span::new(start as u32, name_span.end);
        children.extend(self.children(Terminator::EndTag, open, &format!("<{name}>"))?);
        children.push(self.end_tag()?);
        Ok(SyntaxNode::new(
            SyntaxKind::Element,
            self.cursor.span_from(start),
            children,
        ))
    }

    /// `</name>` or `</>`
    fn end_tag(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.expect("</", "a closing tag")?;
        self.cursor.skip_whitespace();
        let mut children = Vec::new();
        if let Some(name) = self.cursor.name() {
            children.push(SyntaxNode::leaf(SyntaxKind::TagName, name));
        }
        self.cursor.skip_whitespace();
        self.cursor.expect(">", "`>` to finish the closing tag")?;
        Ok(SyntaxNode::new(
            SyntaxKind::EndTag,
            self.cursor.span_from(start),
            children,
        ))
    }

    fn comment(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        let rest = &self.source()[start + 4..];
        match rest.find("-->") {
            Some(end) => {
                self.cursor.set_pos(start + 4 + end + 3);
                Ok(SyntaxNode::leaf(SyntaxKind::Comment, self.cursor.span_from(start)))
            }
            None => Err(ScanError::new(
                Span::from_range(start..start + 4),
                "unterminated comment",
            )),
        }
    }

    fn children(
        &mut self,
        terminator: Terminator,
        open: Span,
        opener: &str,
    ) -> ScanResult<Vec<SyntaxNode>> {
        let mut children = Vec::new();
        loop {
            match self.cursor.peek() {
                None => return Err(ScanError::new(open, format!("unclosed `{opener}`"))),
                Some(b'<') if self.cursor.at("</") => {
                    if terminator == Terminator::EndTag {
                        return Ok(children);
                    }
                    let end_tag = self.end_tag()?;
                    return Err(ScanError::new(
                        end_tag.span,
                        format!("unexpected closing tag `{}`", end_tag.text(self.source())),
                    ));
                }
                Some(b'<') => children.push(self.tag_node()?),
                Some(b'{') => children.push(self.block(SyntaxKind::ExpressionBlock)),
                Some(b'}') => {
                    if terminator == Terminator::Brace {
                        return Ok(children);
                    }
                    let at = self.cursor.offset();
                    children.push(SyntaxNode::error(
                        Span::new(at, at + 1),
                        "unexpected `}` in text; write `{\"}\"}` for a literal brace",
                    ));
                    self.cursor.bump();
                }
                Some(_) => children.push(self.text()),
            }
        }
    }

    fn text(&mut self) -> SyntaxNode {
        let start = self.cursor.pos();
        while let Some(b) = self.cursor.peek() {
            if matches!(b, b'<' | b'{' | b'}') {
                break;
            }
            self.cursor.bump();
        }
        SyntaxNode::leaf(SyntaxKind::Text, self.cursor.span_from(start))
    }

    fn attribute_recovering(&mut self) -> SyntaxNode {
        let start = self.cursor.pos();
        match self.attribute() {
            Ok(attr) => attr,
            Err(err) => {
                let resume = (err.span.end as usize).max(start + 1).max(self.cursor.pos());
                self.cursor.set_pos(resume);
                self.skip_attribute_rest();
                SyntaxNode::error(err.span, err.message)
            }
        }
    }

    fn skip_attribute_rest(&mut self) {
        while let Some(b) = self.cursor.peek() {
            if b.is_ascii_whitespace() || b == b'>' || self.cursor.at("/>") {
                break;
            }
            if b == b'{' {
                let from = self.cursor.pos();
                if self.cursor.skip_balanced().is_err() {
                    self.cursor.set_pos(from + 1);
                }
            } else {
                self.cursor.bump();
            }
        }
    }

    fn attribute(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        match self.cursor.peek() {
            Some(b'@') => {
                self.cursor.bump();
                let Some(name) = self.cursor.ident() else {
                    return Err(self.cursor.error_here("expected a builtin name after `@`"));
                };
                let mut children = vec![SyntaxNode::leaf(SyntaxKind::AttrName, name)];
                children.extend(self.attribute_value()?);
                Ok(SyntaxNode::new(
                    SyntaxKind::BuiltinAttribute,
                    self.cursor.span_from(start),
                    children,
                ))
            }
            Some(b'{') => self.braced_attribute(),
            Some(b) if is_ident_start(b) => {
                let name = self.cursor.name().unwrap_or(Span::empty(self.cursor.offset()));
                let mut children = vec![SyntaxNode::leaf(SyntaxKind::AttrName, name)];
                children.extend(self.attribute_value()?);
                Ok(SyntaxNode::new(
                    SyntaxKind::StaticAttribute,
                    self.cursor.span_from(start),
                    children,
                ))
            }
            Some(_) => {
                let c = self.source()[start..].chars().next().unwrap_or('?');
                Err(ScanError::new(
                    Span::from_range(start..start + c.len_utf8()),
                    format!("unexpected `{c}` in tag"),
                ))
            }
            None => Err(self.cursor.error_here("unexpected end of input in tag")),
        }
    }

    /// Optional `= value` after an attribute name
    fn attribute_value(&mut self) -> ScanResult<Option<SyntaxNode>> {
        let before = self.cursor.pos();
        self.cursor.skip_whitespace();
        if !self.cursor.eat("=") {
            self.cursor.set_pos(before);
            return Ok(None);
        }
        self.cursor.skip_whitespace();
        let start = self.cursor.pos();
        match self.cursor.peek() {
            Some(b'"') => {
                self.cursor.skip_string()?;
                Ok(Some(SyntaxNode::leaf(
                    SyntaxKind::StringValue,
                    self.cursor.span_from(start),
                )))
            }
            Some(b'{') => Ok(Some(self.block(SyntaxKind::ExprValue))),
            Some(b'`') => self.template_string().map(Some),
            // Bare enum literal such as `.none`
            Some(b'.') if self.cursor.peek_at(1).is_some_and(is_ident_start) => {
                self.cursor.bump();
                self.cursor.ident();
                let span = self.cursor.span_from(start);
                Ok(Some(SyntaxNode::new(
                    SyntaxKind::ExprValue,
                    span,
                    vec![SyntaxNode::leaf(SyntaxKind::HostExpr, span)],
                )))
            }
            _ => Err(self
                .cursor
                .error_here("expected a string, `{expression}` or `` `template` `` after `=`")),
        }
    }

    /// `{ident}`, `{@ident}` or `{..expr}`
    fn braced_attribute(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.bump();
        self.cursor.skip_whitespace();

        if self.cursor.eat("..") {
            self.cursor.set_pos(start);
            self.cursor.skip_balanced()?;
            let inner = self.trimmed(start + 1, self.cursor.pos() - 1);
            let inner = self.trimmed(inner.start as usize + 2, inner.end as usize);
            if inner.is_empty() {
                return Err(ScanError::new(
                    self.cursor.span_from(start),
                    "spread attribute needs an expression",
                ));
            }
            return Ok(SyntaxNode::new(
                SyntaxKind::SpreadAttribute,
                self.cursor.span_from(start),
                vec![SyntaxNode::leaf(SyntaxKind::HostExpr, inner)],
            ));
        }

        let builtin = self.cursor.eat("@");
        let Some(name) = self.cursor.ident() else {
            return Err(self
                .cursor
                .error_here("expected `identifier`, `@identifier` or `..expression` in braces"));
        };
        self.cursor.skip_whitespace();
        self.cursor.expect("}", "`}` after the shorthand name")?;
        let kind = if builtin {
            SyntaxKind::BuiltinShorthandAttribute
        } else {
            SyntaxKind::ShorthandAttribute
        };
        Ok(SyntaxNode::new(
            kind,
            self.cursor.span_from(start),
            vec![SyntaxNode::leaf(SyntaxKind::AttrName, name)],
        ))
    }

    /// `` `text {expr} text` ``
    fn template_string(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.bump();
        let mut children = Vec::new();
        let mut empty_interpolation = None;
        let mut text_start = self.cursor.pos();
        loop {
            match self.cursor.peek() {
                None => {
                    return Err(ScanError::new(
                        Span::from_range(start..start + 1),
                        "unterminated template string",
                    ))
                }
                Some(b'`') => {
                    self.push_template_text(&mut children, text_start);
                    self.cursor.bump();
                    break;
                }
                Some(b'{') => {
                    self.push_template_text(&mut children, text_start);
                    let open = self.cursor.pos();
                    self.cursor.skip_balanced()?;
                    let inner = self.trimmed(open + 1, self.cursor.pos() - 1);
                    if inner.is_empty() {
                        empty_interpolation.get_or_insert_with(|| {
                            ScanError::new(
                                self.cursor.span_from(open),
                                "empty interpolation `{}` in template string",
                            )
                        });
                    }
                    children.push(SyntaxNode::leaf(SyntaxKind::HostExpr, inner));
                    text_start = self.cursor.pos();
                }
                Some(_) => self.cursor.bump(),
            }
        }
        if let Some(err) = empty_interpolation {
            return Err(err);
        }
        Ok(SyntaxNode::new(
            SyntaxKind::TemplateString,
            self.cursor.span_from(start),
            children,
        ))
    }

    fn push_template_text(&self, children: &mut Vec<SyntaxNode>, text_start: usize) {
        if self.cursor.pos() > text_start {
            children.push(SyntaxNode::leaf(
                SyntaxKind::TemplateText,
                Span::from_range(text_start..self.cursor.pos()),
            ));
        }
    }

    /// `{…}` as a child (`ExpressionBlock`) or attribute value (`ExprValue`)
    fn block(&mut self, kind: SyntaxKind) -> SyntaxNode {
        let start = self.cursor.pos();
        match self.block_inner(kind) {
            Ok(node) => node,
            Err(err) => {
                self.cursor.set_pos(start);
                if self.cursor.skip_balanced().is_err() {
                    self.cursor.set_pos((err.span.end as usize).max(start + 1));
                }
                SyntaxNode::error(err.span, err.message)
            }
        }
    }

    fn block_inner(&mut self, kind: SyntaxKind) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.bump();
        self.cursor.skip_whitespace();

        if self.cursor.eat("}") {
            return Ok(SyntaxNode::leaf(kind, self.cursor.span_from(start)));
        }

        let inner = if self.cursor.at_template_root() {
            let root = self.template_root()?;
            self.cursor.skip_whitespace();
            self.cursor
                .expect("}", "`}` after the nested template")?;
            root
        } else if let Some(keyword) = self.control_keyword() {
            let flow = self.control_flow(keyword)?;
            self.cursor.skip_whitespace();
            self.cursor
                .expect("}", "`}` after the control-flow body")?;
            flow
        } else {
            self.cursor.set_pos(start);
            self.cursor.skip_balanced()?;
            let expr = self.trimmed(start + 1, self.cursor.pos() - 1);
            SyntaxNode::leaf(SyntaxKind::HostExpr, expr)
        };

        Ok(SyntaxNode::new(kind, self.cursor.span_from(start), vec![inner]))
    }

    /// Keyword at the cursor that opens a template-producing control-flow wrapper.
    /// A Zig `if`/`switch` expression whose bodies are plain values stays opaque.
    fn control_keyword(&self) -> Option<&'static str> {
        let keyword = CONTROL_KEYWORDS
            .iter()
            .copied()
            .find(|kw| self.cursor.at_keyword(kw))?;

        let mut probe = self.cursor.clone();
        probe.advance(keyword.len());
        probe.skip_whitespace();
        if probe.peek() != Some(b'(') || probe.skip_balanced().is_err() {
            return None;
        }
        probe.skip_whitespace();
        if keyword == "switch" {
            if !probe.eat("{") {
                return None;
            }
            probe.skip_whitespace();
            if probe.peek() == Some(b'}') {
                return Some(keyword);
            }
            probe.scan_until_top_level("=>").ok()?;
            probe.advance(2);
            probe.skip_whitespace();
        }
        if probe.capture().ok()?.is_some() {
            probe.skip_whitespace();
        }
        if keyword == "while" && probe.eat(":") {
            probe.skip_whitespace();
            if probe.peek() != Some(b'(') || probe.skip_balanced().is_err() {
                return None;
            }
            probe.skip_whitespace();
        }
        (probe.at_template_root() || probe.peek() == Some(b'{')).then_some(keyword)
    }

    fn control_flow(&mut self, keyword: &str) -> ScanResult<SyntaxNode> {
        match keyword {
            "if" => self.if_block(),
            "switch" => self.switch_block(),
            _ => {
                let start = self.cursor.pos();
                self.cursor.advance(keyword.len());
                self.cursor.skip_whitespace();
                let header = self.header(keyword == "while")?;
                self.cursor.skip_whitespace();
                let body = self.body()?;
                let branch = SyntaxNode::new(
                    SyntaxKind::Branch,
                    self.cursor.span_from(start),
                    vec![header, body],
                );
                let kind = if keyword == "for" {
                    SyntaxKind::ForBlock
                } else {
                    SyntaxKind::WhileBlock
                };
                Ok(SyntaxNode::new(kind, self.cursor.span_from(start), vec![branch]))
            }
        }
    }

    fn if_block(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.advance("if".len());
        self.cursor.skip_whitespace();
        let header = self.header(false)?;
        self.cursor.skip_whitespace();
        let body = self.body()?;
        let mut branches = vec![SyntaxNode::new(
            SyntaxKind::Branch,
            self.cursor.span_from(start),
            vec![header, body],
        )];

        loop {
            let before = self.cursor.pos();
            self.cursor.skip_whitespace();
            if !self.cursor.at_keyword("else") {
                self.cursor.set_pos(before);
                break;
            }
            let branch_start = self.cursor.pos();
            self.cursor.advance("else".len());
            self.cursor.skip_whitespace();

            if self.cursor.at_keyword("if") {
                self.cursor.advance("if".len());
                self.cursor.skip_whitespace();
                let header = self.header(false)?;
                self.cursor.skip_whitespace();
                let body = self.body()?;
                branches.push(SyntaxNode::new(
                    SyntaxKind::Branch,
                    self.cursor.span_from(branch_start),
                    vec![header, body],
                ));
                continue;
            }

            let mut parts = Vec::new();
            if let Some(capture) = self.capture()? {
                parts.push(capture);
                self.cursor.skip_whitespace();
            }
            parts.push(self.body()?);
            branches.push(SyntaxNode::new(
                SyntaxKind::Branch,
                self.cursor.span_from(branch_start),
                parts,
            ));
            break;
        }

        Ok(SyntaxNode::new(
            SyntaxKind::IfBlock,
            self.cursor.span_from(start),
            branches,
        ))
    }

    fn switch_block(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        self.cursor.advance("switch".len());
        self.cursor.skip_whitespace();
        let subject_start = self.cursor.pos();
        if self.cursor.peek() != Some(b'(') {
            return Err(self.cursor.error_here("expected `(` after `switch`"));
        }
        self.cursor.skip_balanced()?;
        let mut children = vec![SyntaxNode::leaf(
            SyntaxKind::Header,
            self.cursor.span_from(subject_start),
        )];
        self.cursor.skip_whitespace();
        self.cursor.expect("{", "`{` to open the switch prongs")?;

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.eat("}") {
                break;
            }
            if self.cursor.eof() {
                return Err(ScanError::new(
                    Span::from_range(start..start + "switch".len()),
                    "unclosed switch",
                ));
            }
            let prong_start = self.cursor.pos();
            self.cursor.scan_until_top_level("=>")?;
            let pattern = self.trimmed(prong_start, self.cursor.pos());
            if pattern.is_empty() {
                return Err(self.cursor.error_here("expected a prong pattern before `=>`"));
            }
            self.cursor.advance(2);
            self.cursor.skip_whitespace();

            let mut parts = vec![SyntaxNode::leaf(SyntaxKind::Pattern, pattern)];
            if let Some(capture) = self.capture()? {
                parts.push(capture);
                self.cursor.skip_whitespace();
            }
            parts.push(self.body()?);
            children.push(SyntaxNode::new(
                SyntaxKind::Branch,
                self.cursor.span_from(prong_start),
                parts,
            ));

            self.cursor.skip_whitespace();
            self.cursor.eat(",");
        }

        if children.len() == 1 {
            return Err(ScanError::new(
                Span::from_range(start..start + "switch".len()),
                "switch needs at least one prong",
            ));
        }
        Ok(SyntaxNode::new(
            SyntaxKind::SwitchBlock,
            self.cursor.span_from(start),
            children,
        ))
    }

    /// `(cond) |captures|`, plus `: (continue)` for `while`
    fn header(&mut self, with_continue: bool) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        if self.cursor.peek() != Some(b'(') {
            return Err(self.cursor.error_here("expected `(` to open the condition"));
        }
        self.cursor.skip_balanced()?;
        let mut end = self.cursor.pos();

        self.cursor.skip_whitespace();
        if self.capture()?.is_some() {
            end = self.cursor.pos();
        }
        if with_continue {
            self.cursor.skip_whitespace();
            if self.cursor.eat(":") {
                self.cursor.skip_whitespace();
                if self.cursor.peek() != Some(b'(') {
                    return Err(self.cursor.error_here("expected `(` after `:`"));
                }
                self.cursor.skip_balanced()?;
                end = self.cursor.pos();
            }
        }
        self.cursor.set_pos(end);
        Ok(SyntaxNode::leaf(
            SyntaxKind::Header,
            Span::from_range(start..end),
        ))
    }

    fn capture(&mut self) -> ScanResult<Option<SyntaxNode>> {
        Ok(self
            .cursor
            .capture()?
            .map(|span| SyntaxNode::leaf(SyntaxKind::Capture, span)))
    }

    /// `(<node/>)` holding one node, or `{ children }` holding a list
    fn body(&mut self) -> ScanResult<SyntaxNode> {
        let start = self.cursor.pos();
        if self.cursor.at_template_root() {
            let root = self.template_root()?;
            return Ok(SyntaxNode::new(
                SyntaxKind::Body,
                self.cursor.span_from(start),
                vec![root],
            ));
        }
        if self.cursor.peek() == Some(b'{') {
            self.cursor.bump();
            let open = Span::from_range(start..start + 1);
            let children = self.children(Terminator::Brace, open, "{")?;
            self.cursor.expect("}", "`}`")?;
            return Ok(SyntaxNode::new(
                SyntaxKind::Body,
                self.cursor.span_from(start),
                children,
            ));
        }
        Err(self
            .cursor
            .error_here("expected `(<…>)` or `{ … }` as the body"))
    }

    /// `start..end` with surrounding whitespace removed
    fn trimmed(&self, start: usize, end: usize) -> Span {
        let text = &self.source()[start..end];
        let leading = text.len() - text.trim_start().len();
        let trailing = text.len() - text.trim_end().len();
        if leading == text.len() {
            return Span::empty(start as u32);
        }
        Span::from_range(start + leading..end - trailing)
    }
}
