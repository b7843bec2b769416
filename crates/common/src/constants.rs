//! Static lookup tables

use phf::{phf_set, Set};

/// HTML elements that never have children or a closing tag
pub static VOID_ELEMENTS: Set<&'static str> = phf_set! {
    "area",
    "base",
    "br",
    "col",
    "embed",
    "hr",
    "img",
    "input",
    "keygen",
    "link",
    "meta",
    "param",
    "source",
    "track",
    "wbr",
};

/// Attribute names accepted after the `@` builtin marker
pub static BUILTIN_ATTRIBUTES: Set<&'static str> = phf_set! {
    "allocator",
    "escaping",
    "rendering",
};

/// Keywords that turn an expression block into a control-flow wrapper
pub static CONTROL_KEYWORDS: Set<&'static str> = phf_set! {
    "if",
    "for",
    "while",
    "switch",
};

/// Zig keywords and primitive names that cannot be used as bare identifiers
pub static ZIG_KEYWORDS: Set<&'static str> = phf_set! {
    "addrspace",
    "align",
    "allowzero",
    "and",
    "anyframe",
    "anytype",
    "asm",
    "async",
    "await",
    "break",
    "callconv",
    "catch",
    "comptime",
    "const",
    "continue",
    "defer",
    "else",
    "enum",
    "errdefer",
    "error",
    "export",
    "extern",
    "false",
    "fn",
    "for",
    "if",
    "inline",
    "linksection",
    "noalias",
    "noinline",
    "nosuspend",
    "null",
    "opaque",
    "or",
    "orelse",
    "packed",
    "pub",
    "resume",
    "return",
    "struct",
    "suspend",
    "switch",
    "test",
    "threadlocal",
    "true",
    "try",
    "type",
    "undefined",
    "union",
    "unreachable",
    "usingnamespace",
    "var",
    "volatile",
    "while",
};
