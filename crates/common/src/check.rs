//! Classification helpers for tag names, attribute names and identifiers

use crate::constants::{BUILTIN_ATTRIBUTES, VOID_ELEMENTS, ZIG_KEYWORDS};

/// Check if a tag name represents a component (starts with uppercase).
/// Only the first character is consulted.
pub fn is_component(tag: &str) -> bool {
    tag.chars().next().is_some_and(|c| c.is_ascii_uppercase())
}

/// Check if this is an HTML void element (`<br>`, `<img>`, ...)
pub fn is_void_element(tag: &str) -> bool {
    !is_component(tag) && VOID_ELEMENTS.contains(tag)
}

/// Check if `name` (without the `@` marker) is a known builtin attribute
pub fn is_builtin_attribute(name: &str) -> bool {
    BUILTIN_ATTRIBUTES.contains(name)
}

pub fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

pub fn is_ident_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'_'
}

/// Tag and attribute names additionally allow `-`, `.` and `:`
pub fn is_name_char(c: u8) -> bool {
    is_ident_char(c) || matches!(c, b'-' | b'.' | b':')
}

/// Check if `name` can be written as a bare Zig identifier
pub fn is_plain_identifier(name: &str) -> bool {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(first) if is_ident_start(*first) => {}
        _ => return false,
    }
    bytes.iter().all(|b| is_ident_char(*b)) && !ZIG_KEYWORDS.contains(name)
}
