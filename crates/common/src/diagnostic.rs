//! Diagnostics reported by the template compiler

use std::fmt;
use std::ops::Range;

use ariadne::{Config, Label, Report, ReportKind, Source};
use serde::Serialize;

use crate::span::{LineIndex, Span};

/// Error class of a diagnostic. Both are fatal for the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// Grammar-level: unterminated tag, mismatched tag names, malformed attribute
    Syntax,
    /// Tree-level: duplicate attribute, unknown builtin, misplaced builtin
    Validation,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::Syntax => f.write_str("syntax"),
            DiagnosticKind::Validation => f.write_str("validation"),
        }
    }
}

/// A located compile error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[error("{file}:{line}:{column}: {kind} error: {message}")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Primary message
    pub message: String,
    /// Logical file identity the source was compiled under
    pub file: String,
    /// Start byte offset of the primary span
    pub start: u32,
    /// End byte offset of the primary span
    pub end: u32,
    /// 1-based line of `start`
    pub line: u32,
    /// 1-based column (in characters) of `start`
    pub column: u32,
    /// Optional help text
    pub help: Option<String>,
    /// Secondary locations
    pub labels: Vec<(u32, u32, String)>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            file: String::new(),
            start: span.start,
            end: span.end,
            line: 0,
            column: 0,
            help: None,
            labels: Vec::new(),
        }
    }

    pub fn syntax(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Syntax, span, message)
    }

    pub fn validation(span: Span, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Validation, span, message)
    }

    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_label(mut self, span: Span, message: impl Into<String>) -> Self {
        self.labels.push((span.start, span.end, message.into()));
        self
    }

    /// Attach the file identity and resolve line/column against `source`.
    pub fn located(mut self, file: &str, source: &str, lines: &LineIndex) -> Self {
        let (line, column) = lines.line_col(source, self.start);
        self.file = file.to_string();
        self.line = line;
        self.column = column;
        self
    }

    /// Render a plain-text report with a source excerpt.
    pub fn render(&self, source: &str) -> String {
        let file = self.file.as_str();
        let primary = widen(self.span(), source);

        let mut report = Report::build(ReportKind::Error, (file, primary.clone()))
            .with_config(Config::default().with_color(false))
            .with_message(format!("{} error: {}", self.kind, self.message))
            .with_label(Label::new((file, primary)).with_message(&self.message));
        for (start, end, message) in &self.labels {
            let range = widen(Span::new(*start, *end), source);
            report = report.with_label(Label::new((file, range)).with_message(message));
        }
        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        let mut bytes = Vec::new();
        if report
            .finish()
            .write((file, Source::from(source)), &mut bytes)
            .is_err()
        {
            return self.to_string();
        }
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Zero-width spans get one character so the excerpt has something to point at.
fn widen(span: Span, source: &str) -> Range<usize> {
    let len = source.len();
    let start = (span.start as usize).min(len);
    let mut end = (span.end as usize).clamp(start, len);
    if start == end && end < len {
        end = source[end..]
            .char_indices()
            .nth(1)
            .map(|(i, _)| end + i)
            .unwrap_or(len);
    }
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_location() {
        let src = "const a = 1;\nconst b = (<div></span>);";
        let lines = LineIndex::new(src);
        let offset = src.find("</span>").unwrap_or(0) as u32;
        let diag = Diagnostic::syntax(Span::new(offset, offset + 7), "mismatched closing tag")
            .located("page.zx", src, &lines);
        assert_eq!(diag.line, 2);
        assert_eq!(
            diag.to_string(),
            format!("page.zx:2:{}: syntax error: mismatched closing tag", diag.column)
        );
    }

    #[test]
    fn render_mentions_message_and_help() {
        let src = "(<div @bogus={1}></div>)";
        let lines = LineIndex::new(src);
        let diag = Diagnostic::validation(Span::new(6, 12), "unknown builtin attribute `@bogus`")
            .with_help("known builtins are @allocator, @escaping and @rendering")
            .located("x.zx", src, &lines);
        let rendered = diag.render(src);
        assert!(rendered.contains("unknown builtin attribute"));
        assert!(rendered.contains("known builtins"));
    }

    #[test]
    fn serializes_kind_lowercase() {
        let diag = Diagnostic::validation(Span::new(0, 1), "duplicate attribute `id`");
        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["kind"], "validation");
    }
}
