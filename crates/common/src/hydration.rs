//! Hydration marker protocol shared by the server renderer and the client loader.
//!
//! Server output wraps each island as
//! `<!--$id name {json props}-->…markup…<!--/$id-->`.

use std::ops::Range;

use serde::Serialize;
use serde_json::Value;

const OPEN_PREFIX: &str = "<!--$";
const CLOSE_PREFIX: &str = "<!--/$";
const COMMENT_END: &str = "-->";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HydrationMarker {
    /// Unique per component instance
    pub id: String,
    /// Client module to load
    pub name: String,
    pub props: Value,
}

/// An island found in rendered HTML
#[derive(Debug, Clone, PartialEq)]
pub struct Island {
    pub marker: HydrationMarker,
    /// Byte range of the server markup between the two markers
    pub content: Range<usize>,
}

impl HydrationMarker {
    pub fn new(id: impl Into<String>, name: impl Into<String>, props: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            props,
        }
    }

    pub fn open(&self) -> String {
        format!("{OPEN_PREFIX}{} {} {}{COMMENT_END}", self.id, self.name, comment_safe_json(&self.props))
    }

    pub fn close(&self) -> String {
        format!("{CLOSE_PREFIX}{}{COMMENT_END}", self.id)
    }

    /// Surround `markup` with the opening and closing markers
    pub fn wrap(&self, markup: &str) -> String {
        format!("{}{}{}", self.open(), markup, self.close())
    }
}

/// `>` only occurs inside JSON strings, where `>` is an equivalent spelling.
fn comment_safe_json(props: &Value) -> String {
    props.to_string().replace("-->", "--\\u003e")
}

/// Find every island whose opening marker has a matching end marker.
/// Openings without an end marker, or with unparsable props, are skipped.
pub fn discover(html: &str) -> Vec<Island> {
    let mut islands = Vec::new();
    let mut cursor = 0;

    while let Some(found) = html[cursor..].find(OPEN_PREFIX) {
        let header_start = cursor + found + OPEN_PREFIX.len();
        let Some(header_len) = html[header_start..].find(COMMENT_END) else {
            break;
        };
        let header = &html[header_start..header_start + header_len];
        let content_start = header_start + header_len + COMMENT_END.len();
        cursor = content_start;

        let Some(marker) = parse_header(header) else {
            continue;
        };
        let close = format!("{CLOSE_PREFIX}{}{COMMENT_END}", marker.id);
        if let Some(offset) = html[content_start..].find(&close) {
            islands.push(Island {
                marker,
                content: content_start..content_start + offset,
            });
        }
    }

    islands
}

fn parse_header(header: &str) -> Option<HydrationMarker> {
    let (id, rest) = header.split_once(' ')?;
    let (name, json) = rest.split_once(' ')?;
    if id.is_empty() || name.is_empty() {
        return None;
    }
    let props = serde_json::from_str(json.trim()).ok()?;
    Some(HydrationMarker::new(id, name, props))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn markers_have_expected_shape() {
        let marker = HydrationMarker::new("c1", "Counter", json!({ "start": 3 }));
        assert_eq!(marker.open(), r#"<!--$c1 Counter {"start":3}-->"#);
        assert_eq!(marker.close(), "<!--/$c1-->");
    }

    #[test]
    fn props_cannot_terminate_the_comment() {
        let marker = HydrationMarker::new("c2", "Note", json!({ "text": "a --> b" }));
        let open = marker.open();
        assert_eq!(open.matches("-->").count(), 1);

        let html = marker.wrap("<p>x</p>");
        let islands = discover(&html);
        assert_eq!(islands.len(), 1);
        assert_eq!(islands[0].marker.props["text"], "a --> b");
    }

    #[test]
    fn discover_returns_content_range() {
        let marker = HydrationMarker::new("7", "Counter", json!({}));
        let html = format!("<body>{}</body>", marker.wrap("<button>0</button>"));
        let islands = discover(&html);
        assert_eq!(islands.len(), 1);
        assert_eq!(&html[islands[0].content.clone()], "<button>0</button>");
        assert_eq!(islands[0].marker, marker);
    }

    #[test]
    fn unmatched_opening_is_ignored() {
        let lone = HydrationMarker::new("a", "Lost", json!({}));
        let paired = HydrationMarker::new("b", "Found", json!({ "n": 1 }));
        let html = format!("{}<i></i>{}", lone.open(), paired.wrap("<b></b>"));
        let islands = discover(&html);
        assert_eq!(islands.len(), 1);
        assert_eq!(islands[0].marker.name, "Found");
    }

    #[test]
    fn nested_islands_are_both_found() {
        let outer = HydrationMarker::new("o", "Outer", json!({}));
        let inner = HydrationMarker::new("i", "Inner", json!({}));
        let html = outer.wrap(&inner.wrap("x"));
        let names: Vec<_> = discover(&html).into_iter().map(|i| i.marker.name).collect();
        assert_eq!(names, vec!["Outer", "Inner"]);
    }
}
