//! Byte spans into a source file and offset → line/column mapping

use std::ops::Range;

use serde::Serialize;

/// Half-open byte range `[start, end)` into the original source text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn from_range(range: Range<usize>) -> Self {
        Self::new(range.start as u32, range.end as u32)
    }

    /// Zero-width span at `offset`
    pub const fn empty(offset: u32) -> Self {
        Self::new(offset, offset)
    }

    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start as usize..self.end as usize
    }

    pub fn source_text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.range()]
    }
}

/// Precomputed line starts for a source file.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0];
        for (i, b) in source.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push(i as u32 + 1);
            }
        }
        Self { line_starts }
    }

    /// 1-based line and column (in characters) for a byte offset.
    pub fn line_col(&self, source: &str, offset: u32) -> (u32, u32) {
        let offset = offset.min(source.len() as u32);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line] as usize;
        let column = source
            .get(line_start..offset as usize)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);
        (line as u32 + 1, column as u32 + 1)
    }

    /// Leading whitespace of the line that contains `offset`.
    pub fn line_indent<'a>(&self, source: &'a str, offset: u32) -> &'a str {
        let (line, _) = self.line_col(source, offset);
        let start = self.line_starts[line as usize - 1] as usize;
        let rest = &source[start..];
        let width = rest
            .bytes()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        &rest[..width]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_col_is_one_based() {
        let src = "ab\ncd\n  ef";
        let index = LineIndex::new(src);
        assert_eq!(index.line_col(src, 0), (1, 1));
        assert_eq!(index.line_col(src, 4), (2, 2));
        assert_eq!(index.line_col(src, 8), (3, 3));
    }

    #[test]
    fn line_col_counts_characters() {
        let src = "é<";
        let index = LineIndex::new(src);
        assert_eq!(index.line_col(src, 2), (1, 2));
    }

    #[test]
    fn line_indent_returns_leading_whitespace() {
        let src = "fn x() {\n    return (<p/>);\n}";
        let index = LineIndex::new(src);
        let offset = src.find("(<").unwrap_or(0) as u32;
        assert_eq!(index.line_indent(src, offset), "    ");
        assert_eq!(index.line_indent(src, 0), "");
    }
}
