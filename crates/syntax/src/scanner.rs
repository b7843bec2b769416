//! Byte-level cursor shared by the host scanner and the template grammar.
//!
//! Zig token rules that matter here: `//` comments run to the end of the line,
//! `"…"` strings and `'…'` character literals never span lines, and a line whose
//! first token is `\\` is one line of a multiline string.

use common::{is_ident_char, is_ident_start, is_name_char, Span};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    pub span: Span,
    pub message: String,
}

impl ScanError {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

pub type ScanResult<T> = Result<T, ScanError>;

#[derive(Debug, Clone)]
pub struct Cursor<'s> {
    source: &'s str,
    bytes: &'s [u8],
    pos: usize,
}

impl<'s> Cursor<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.bytes.len());
    }

    pub fn offset(&self) -> u32 {
        self.pos as u32
    }

    pub fn eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    pub fn peek_at(&self, n: usize) -> Option<u8> {
        self.bytes.get(self.pos + n).copied()
    }

    pub fn at(&self, text: &str) -> bool {
        self.bytes[self.pos..].starts_with(text.as_bytes())
    }

    pub fn bump(&mut self) {
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    pub fn advance(&mut self, n: usize) {
        self.set_pos(self.pos + n);
    }

    pub fn eat(&mut self, text: &str) -> bool {
        if self.at(text) {
            self.pos += text.len();
            true
        } else {
            false
        }
    }

    /// Consume `text` or fail with a zero-width error at the current offset
    pub fn expect(&mut self, text: &str, what: &str) -> ScanResult<()> {
        if self.eat(text) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    pub fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    pub fn error_here(&self, message: impl Into<String>) -> ScanError {
        ScanError::new(Span::empty(self.offset()), message)
    }

    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// `true` when the next word is exactly `word` (not a prefix of a longer identifier)
    pub fn at_keyword(&self, word: &str) -> bool {
        self.at(word) && !self.peek_at(word.len()).is_some_and(is_ident_char)
    }

    /// Consume an identifier and return its span
    pub fn ident(&mut self) -> Option<Span> {
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        Some(self.span_from(start))
    }

    /// Consume a tag or attribute name (`my-el`, `ui.Card`, `xlink:href`)
    pub fn name(&mut self) -> Option<Span> {
        let start = self.pos;
        if !self.peek().is_some_and(is_ident_start) {
            return None;
        }
        while self.peek().is_some_and(is_name_char) {
            self.pos += 1;
        }
        Some(self.span_from(start))
    }

    pub fn skip_to_line_end(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    /// Skip a `"…"` string starting at the current quote
    pub fn skip_string(&mut self) -> ScanResult<()> {
        let start = self.pos;
        self.bump();
        while let Some(b) = self.peek() {
            match b {
                b'\\' => self.advance(2),
                b'"' => {
                    self.bump();
                    return Ok(());
                }
                b'\n' => break,
                _ => self.bump(),
            }
        }
        Err(ScanError::new(self.span_from(start), "unterminated string literal"))
    }

    /// Skip a `'…'` character literal. A quote with no closing quote on the same
    /// line is consumed as a single byte.
    pub fn skip_char_literal(&mut self) {
        let start = self.pos;
        self.bump();
        while let Some(b) = self.peek() {
            match b {
                b'\\' => self.advance(2),
                b'\'' => {
                    self.bump();
                    return;
                }
                b'\n' => break,
                _ => self.bump(),
            }
        }
        self.pos = start + 1;
    }

    /// Skip a comment, string, char literal or multiline-string line if one starts
    /// here. Returns `Ok(true)` when something was skipped.
    pub fn skip_trivia_token(&mut self) -> ScanResult<bool> {
        match self.peek() {
            Some(b'/') if self.peek_at(1) == Some(b'/') => {
                self.skip_to_line_end();
                Ok(true)
            }
            Some(b'\\') if self.peek_at(1) == Some(b'\\') => {
                self.skip_to_line_end();
                Ok(true)
            }
            Some(b'"') => {
                self.skip_string()?;
                Ok(true)
            }
            Some(b'\'') => {
                self.skip_char_literal();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Skip a bracketed group starting at the current `(`, `[` or `{`, honoring
    /// nesting, strings, character literals and comments. The cursor ends after
    /// the matching closer.
    pub fn skip_balanced(&mut self) -> ScanResult<()> {
        let start = self.pos;
        let mut stack: Vec<u8> = Vec::new();
        loop {
            if self.skip_trivia_token()? {
                continue;
            }
            let Some(b) = self.peek() else {
                let open = self.bytes.get(start).copied().unwrap_or(b'(') as char;
                return Err(ScanError::new(
                    Span::new(start as u32, start as u32 + 1),
                    format!("unclosed `{open}`"),
                ));
            };
            match b {
                b'(' => stack.push(b')'),
                b'[' => stack.push(b']'),
                b'{' => stack.push(b'}'),
                b')' | b']' | b'}' => {
                    if stack.pop() != Some(b) {
                        return Err(ScanError::new(
                            Span::new(self.offset(), self.offset() + 1),
                            format!("unexpected `{}`", b as char),
                        ));
                    }
                    if stack.is_empty() {
                        self.bump();
                        return Ok(());
                    }
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Scan forward to `needle` at bracket depth zero, skipping strings and
    /// comments. The cursor stops at the needle. Fails on an unmatched closer.
    pub fn scan_until_top_level(&mut self, needle: &str) -> ScanResult<()> {
        loop {
            if self.at(needle) {
                return Ok(());
            }
            if self.skip_trivia_token()? {
                continue;
            }
            match self.peek() {
                None => return Err(self.error_here(format!("expected `{needle}`"))),
                Some(b'(' | b'[' | b'{') => self.skip_balanced()?,
                Some(b')' | b']' | b'}') => {
                    return Err(self.error_here(format!("expected `{needle}`")));
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Consume a `|a, b|` capture list if one starts here
    pub fn capture(&mut self) -> ScanResult<Option<Span>> {
        if self.peek() != Some(b'|') {
            return Ok(None);
        }
        let start = self.pos;
        self.bump();
        loop {
            match self.peek() {
                Some(b'|') => {
                    self.bump();
                    return Ok(Some(self.span_from(start)));
                }
                None | Some(b'\n') => {
                    return Err(ScanError::new(
                        Span::from_range(start..start + 1),
                        "unterminated capture",
                    ))
                }
                Some(_) => self.bump(),
            }
        }
    }

    /// Whether a template root starts at the current `(`:
    /// `(`, optional whitespace, `<`, then an identifier start or `>`.
    pub fn at_template_root(&self) -> bool {
        if self.peek() != Some(b'(') {
            return false;
        }
        let mut i = self.pos + 1;
        while self.bytes.get(i).is_some_and(|b| b.is_ascii_whitespace()) {
            i += 1;
        }
        self.bytes.get(i) == Some(&b'<')
            && self
                .bytes
                .get(i + 1)
                .is_some_and(|b| *b == b'>' || is_ident_start(*b))
    }

    /// Advance through host code to the next template root. Returns `true` with
    /// the cursor on its `(`, or `false` at end of input.
    pub fn next_template_root(&mut self) -> bool {
        while !self.eof() {
            match self.skip_trivia_token() {
                Ok(true) => continue,
                Ok(false) => {}
                // An unterminated host string is the Zig compiler's problem
                Err(_) => continue,
            }
            if self.at_template_root() {
                return true;
            }
            self.bump();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_roots_outside_strings_and_comments() {
        let src = "const a = \"(<p>\"; // (<b/>)\n\\\\ (<i/>)\nconst b = ( <div/>);";
        let mut cursor = Cursor::new(src);
        assert!(cursor.next_template_root());
        assert_eq!(&src[cursor.pos()..], "( <div/>);");
        cursor.bump();
        assert!(!cursor.next_template_root());
    }

    #[test]
    fn comparison_is_not_a_root() {
        let mut cursor = Cursor::new("if (a < b) {} else (< 3)");
        assert!(!cursor.next_template_root());
    }

    #[test]
    fn fragment_root_is_detected() {
        let cursor = Cursor::new("(<>)");
        assert!(cursor.at_template_root());
    }

    #[test]
    fn balanced_skips_nested_strings() {
        let src = "{ foo(\"}\", '}') // }\n }rest";
        let mut cursor = Cursor::new(src);
        cursor.skip_balanced().unwrap();
        assert_eq!(&src[cursor.pos()..], "rest");
    }

    #[test]
    fn balanced_reports_unclosed() {
        let mut cursor = Cursor::new("(a, b");
        let err = cursor.skip_balanced().unwrap_err();
        assert_eq!(err.message, "unclosed `(`");
    }

    #[test]
    fn scan_until_stops_at_depth_zero() {
        let src = "f(a => b) => |x|";
        let mut cursor = Cursor::new(src);
        cursor.scan_until_top_level("=>").unwrap();
        assert_eq!(cursor.pos(), 10);
    }

    #[test]
    fn stray_quote_is_single_byte() {
        let src = "don't (<p/>)";
        let mut cursor = Cursor::new(src);
        assert!(cursor.next_template_root());
        assert_eq!(cursor.pos(), 6);
    }
}
