//! Helpers for writing Zig literals and normalizing template text

use std::fmt::Write;

use crate::check::is_plain_identifier;

/// Quote `text` as a Zig string literal
pub fn zig_string_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    push_escaped(&mut out, text, false);
    out.push('"');
    out
}

/// Escape a literal piece of a `std.fmt` format string (no surrounding quotes).
/// Braces are doubled so they are not read as placeholders.
pub fn zig_format_piece(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    push_escaped(&mut out, text, true);
    out
}

fn push_escaped(out: &mut String, text: &str, double_braces: bool) {
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '{' if double_braces => out.push_str("{{"),
            '}' if double_braces => out.push_str("}}"),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
}

/// `name` as a Zig identifier, using `@"..."` when it is not a plain one
pub fn zig_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("@{}", zig_string_literal(name))
    }
}

/// `name` as a Zig enum literal (`.div`, `.@"my-el"`)
pub fn enum_literal(name: &str) -> String {
    format!(".{}", zig_identifier(name))
}

/// Normalize a text run for escaped emission.
///
/// Every line loses the indentation shared by all non-blank lines, the first one
/// included. Blank leading and trailing lines are dropped. Returns `None` when
/// nothing but layout whitespace remains.
pub fn dedent_text(raw: &str) -> Option<String> {
    if !raw.contains('\n') {
        return if raw.is_empty() {
            None
        } else {
            Some(raw.to_string())
        };
    }

    let segments: Vec<&str> = raw
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let indent = segments
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| leading_whitespace(line))
        .min()
        .unwrap_or(0);

    let mut lines: Vec<&str> = segments
        .iter()
        .map(|line| {
            if line.trim().is_empty() {
                ""
            } else {
                strip_chars(line, indent)
            }
        })
        .collect();

    while lines.first().is_some_and(|l| l.is_empty()) {
        lines.remove(0);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Split a verbatim text run into lines for a `\\` multi-line literal.
pub fn verbatim_lines(raw: &str) -> Vec<&str> {
    raw.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

fn leading_whitespace(line: &str) -> usize {
    line.chars().take_while(|c| *c == ' ' || *c == '\t').count()
}

fn strip_chars(line: &str, count: usize) -> &str {
    match line.char_indices().nth(count) {
        Some((i, _)) => &line[i..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_literal_escapes() {
        assert_eq!(zig_string_literal("a\"b\\c\nd"), r#""a\"b\\c\nd""#);
        assert_eq!(zig_string_literal("tab\there"), r#""tab\there""#);
        assert_eq!(zig_string_literal("\u{1}"), r#""\x01""#);
        assert_eq!(zig_string_literal("héllo"), "\"héllo\"");
    }

    #[test]
    fn format_piece_doubles_braces() {
        assert_eq!(zig_format_piece("a {b} \""), "a {{b}} \\\"");
    }

    #[test]
    fn identifiers_and_enum_literals() {
        assert_eq!(zig_identifier("title"), "title");
        assert_eq!(zig_identifier("data-id"), "@\"data-id\"");
        assert_eq!(enum_literal("div"), ".div");
        assert_eq!(enum_literal("var"), ".@\"var\"");
        assert_eq!(enum_literal("my-el"), ".@\"my-el\"");
    }

    #[test]
    fn dedent_single_line_is_verbatim() {
        assert_eq!(dedent_text("Hello "), Some("Hello ".to_string()));
        assert_eq!(dedent_text(" "), Some(" ".to_string()));
        assert_eq!(dedent_text(""), None);
    }

    #[test]
    fn dedent_drops_layout_only_runs() {
        assert_eq!(dedent_text("\n    \n  "), None);
    }

    #[test]
    fn dedent_strips_common_indentation() {
        let raw = "\n        Hello\n          world\n        again\n    ";
        assert_eq!(
            dedent_text(raw),
            Some("Hello\n  world\nagain".to_string())
        );
    }

    #[test]
    fn dedent_counts_the_first_line() {
        let raw = "Total:\n        items ";
        assert_eq!(dedent_text(raw), Some("Total:\n        items ".to_string()));
        assert_eq!(dedent_text("Hello\n    world"), Some("Hello\n    world".to_string()));
    }

    #[test]
    fn dedent_strips_indented_first_line() {
        assert_eq!(dedent_text("  Hello\n  world"), Some("Hello\nworld".to_string()));
        assert_eq!(dedent_text("    a\n      b\n    "), Some("a\n  b".to_string()));
    }

    #[test]
    fn dedent_keeps_interior_blank_lines() {
        let raw = "\n    a\n\n    b\n";
        assert_eq!(dedent_text(raw), Some("a\n\nb".to_string()));
    }

    #[test]
    fn verbatim_lines_keep_layout() {
        assert_eq!(verbatim_lines("\n  a {\n  }\n"), vec!["", "  a {", "  }", ""]);
    }
}
