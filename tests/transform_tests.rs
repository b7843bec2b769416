//! End-to-end transform tests
//!
//! These tests check the generated Zig against the builder calls the zigx
//! runtime expects.

use zigx::{transform, DiagnosticKind, TransformOptions};

/// Helper to normalize whitespace for comparison
fn normalize(s: &str) -> String {
    s.lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn options() -> TransformOptions<'static> {
    TransformOptions {
        inject_import: false,
        ..TransformOptions::zigx_defaults()
    }
}

/// Transform without import injection and return the raw code
fn compile(source: &str) -> String {
    transform(source, Some(options())).unwrap().code
}

/// Transform and return normalized code
fn compile_normalized(source: &str) -> String {
    normalize(&compile(source))
}

// ============================================================================
// Basic Elements
// ============================================================================

#[test]
fn test_self_closing_root() {
    let result = transform("(<br/>)", None).unwrap();
    insta::assert_snapshot!(result.code, @r#"
    const zigx = @import("zigx");
    __zx_blk0: {
        var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);
        break :__zx_blk0 __zx_b0.selfClosing(.br, .{
            .attributes = &.{},
        });
    }
    "#);
}

#[test]
fn test_void_element_without_slash() {
    let code = compile_normalized("(<div><img src=\"a.png\"><hr></div>)");
    assert!(code.contains("__zx_b0.selfClosing(.img, .{"));
    assert!(code.contains("__zx_b0.attr(\"src\", \"a.png\"),"));
    assert!(code.contains("__zx_b0.selfClosing(.hr, .{"));
}

#[test]
fn test_nested_elements_and_text() {
    let code = compile_normalized("(<div><span>hello</span><p>world</p></div>)");
    assert_eq!(
        code,
        normalize(
            r#"
__zx_blk0: {
var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);
break :__zx_blk0 __zx_b0.element(.div, .{
.attributes = &.{},
.children = &.{
__zx_b0.element(.span, .{
.attributes = &.{},
.children = &.{
__zx_b0.text("hello"),
},
}),
__zx_b0.element(.p, .{
.attributes = &.{},
.children = &.{
__zx_b0.text("world"),
},
}),
},
});
}"#
        )
    );
}

#[test]
fn test_fragment_root() {
    let code = compile_normalized("(<><a/><b/></>)");
    assert!(code.contains("break :__zx_blk0 __zx_b0.fragment(&.{"));
    assert!(code.contains("__zx_b0.selfClosing(.a, .{"));
}

#[test]
fn test_layout_whitespace_is_dropped() {
    let code = compile("(<ul>\n    <li/>\n    <li/>\n</ul>)");
    assert_eq!(code.matches("__zx_b0.selfClosing(.li").count(), 2);
    assert!(!code.contains(".text("));
}

#[test]
fn test_multiline_text_is_dedented() {
    let code = compile("const x = (<p>\n    Hello\n      world\n</p>);");
    assert!(code.contains("__zx_b0.text(\"Hello\\n  world\"),"));
}

#[test]
fn test_dedent_includes_inline_first_line() {
    let code = compile("(<p>  Hello\n  world</p>)");
    assert!(code.contains("__zx_b0.text(\"Hello\\nworld\"),"));

    let code = compile("(<p>Hello\n    world</p>)");
    assert!(code.contains("__zx_b0.text(\"Hello\\n    world\"),"));
}

#[test]
fn test_comments_are_dropped() {
    let code = compile("(<div><!-- note --><b/></div>)");
    assert!(!code.contains("note"));
    assert!(code.contains("selfClosing(.b"));
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn test_attribute_order_with_spread() {
    let code = compile_normalized("(<input {value} {..rest}/>)");
    assert!(code.contains(
        ".attributes = __zx_b0.mergeAttrs(&.{\n__zx_b0.attr(\"value\", value),\n__zx_b0.spread(rest),\n}),"
    ));
}

#[test]
fn test_spread_then_literal_keeps_source_order() {
    let code = compile_normalized("(<a {..base} href=\"/home\"/>)");
    let spread = code.find("__zx_b0.spread(base)").unwrap();
    let href = code.find("__zx_b0.attr(\"href\", \"/home\")").unwrap();
    assert!(spread < href);
}

#[test]
fn test_formatted_attribute() {
    let code = compile("(<div class=`card {size} {tone}`/>)");
    assert!(code.contains(
        "__zx_b0.attrf(\"class\", \"card {s} {s}\", .{ __zx_b0.fmt(size), __zx_b0.fmt(tone) }),"
    ));
}

#[test]
fn test_template_as_attribute_value() {
    let code = compile_normalized("(<Layout header={(<h1>Title</h1>)}/>)");
    assert!(code.contains(".header = __zx_b0.element(.h1, .{"));
}

#[test]
fn test_control_flow_as_prop_is_lifted() {
    let code = compile_normalized("(<Card footer={if (wide) (<b/>) else (<i/>)}/>)");
    assert!(code.contains(".footer = __zx_blk1: {"));
    assert!(code.contains("var __zx_b1 = zigx.Builder.init(std.heap.page_allocator);"));
    assert!(code.contains("break :__zx_blk1 __zx_b1.selfClosing(.b, .{"));
    assert!(code.contains("break :__zx_blk1 __zx_b1.selfClosing(.i, .{"));
}

// ============================================================================
// Control Flow
// ============================================================================

#[test]
fn test_conditional_child_is_lifted() {
    let code = compile("const v = (<div>{if (ok) (<p>yes</p>)}</div>);");
    assert_eq!(
        code,
        r#"const v = __zx_blk0: {
    var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);
    break :__zx_blk0 __zx_b0.element(.div, .{
        .attributes = &.{},
        .children = &.{
            __zx_blk1: {
                var __zx_b1 = zigx.Builder.init(std.heap.page_allocator);
                if (ok) {
                    break :__zx_blk1 __zx_b1.element(.p, .{
                        .attributes = &.{},
                        .children = &.{
                            __zx_b1.text("yes"),
                        },
                    });
                }
                break :__zx_blk1 __zx_b1.empty();
            },
        },
    });
};"#
    );
}

#[test]
fn test_if_else_with_list_bodies() {
    let code = compile_normalized("(<div>{if (cond) { <A/> } else { <B/> }}</div>)");
    assert!(code.contains(
        ".children = &.{\n__zx_blk1: {\nvar __zx_b1 = zigx.Builder.init(std.heap.page_allocator);\nif (cond) {\nbreak :__zx_blk1 __zx_b1.component(A, .{}, .{});\n} else {\nbreak :__zx_blk1 __zx_b1.component(B, .{}, .{});\n}\n},"
    ));
    assert!(!code.contains("empty()"));
}

#[test]
fn test_for_loop_child() {
    let code = compile_normalized("(<ul>{for (items, 0..) |item, i| (<li>{i}: {item}</li>)}</ul>)");
    assert!(code.contains("var __zx_list2 = __zx_b1.list();"));
    assert!(code.contains("for (items, 0..) |item, i| {"));
    assert!(code.contains("__zx_list2.append(__zx_b1.element(.li, .{"));
    assert!(code.contains("__zx_b1.expr(i),\n__zx_b1.text(\": \"),\n__zx_b1.expr(item),"));
    assert!(code.contains("break :__zx_blk1 __zx_b1.fragment(__zx_list2.items());"));
}

#[test]
fn test_switch_child() {
    let code = compile_normalized(
        "(<div>{switch (state) { .loading => (<Spinner/>), .ready => |data| (<View {data}/>), }}</div>)",
    );
    assert!(code.contains("switch (state) {"));
    assert!(code.contains(".loading => {"));
    assert!(code.contains(".ready => |data| {"));
    assert!(code.contains("__zx_b1.component(View, .{}, .{\n.data = data,\n})"));
}

#[test]
fn test_value_if_stays_host_expression() {
    let code = compile("(<p>{if (a) \"yes\" else \"no\"}</p>)");
    assert!(code.contains("__zx_b0.expr(if (a) \"yes\" else \"no\"),"));
    assert!(!code.contains("__zx_blk1"));
}

// ============================================================================
// Allocators
// ============================================================================

#[test]
fn test_allocator_inheritance() {
    let code = compile("(<main @allocator={arena}><div>{if (a) (<p/>)}</div></main>)");
    assert!(code.contains("var __zx_b0 = zigx.Builder.init(arena);"));
    assert!(code.contains("var __zx_b1 = zigx.Builder.init(arena);"));
    assert_eq!(code.matches(".allocator = arena,").count(), 1);
    assert!(!code.contains("page_allocator"));
}

#[test]
fn test_sibling_scopes_do_not_leak() {
    let code = compile(
        "(<main><section @allocator={a1}>{if (x) (<p/>)}</section><aside>{if (y) (<p/>)}</aside></main>)",
    );
    assert!(code.contains("var __zx_b0 = zigx.Builder.init(std.heap.page_allocator);"));
    assert!(code.contains("var __zx_b1 = zigx.Builder.init(a1);"));
    assert!(code.contains("var __zx_b2 = zigx.Builder.init(std.heap.page_allocator);"));
}

#[test]
fn test_custom_default_allocator() {
    let options = TransformOptions {
        default_allocator: "gpa.allocator()",
        ..options()
    };
    let code = transform("(<br/>)", Some(options)).unwrap().code;
    assert!(code.contains("zigx.Builder.init(gpa.allocator());"));
}

// ============================================================================
// Escaping
// ============================================================================

#[test]
fn test_expressions_escape_by_default() {
    let code = compile("(<div>{user_input}</div>)");
    assert!(code.contains("__zx_b0.expr(user_input)"));
    assert!(!code.contains("exprRaw"));
}

#[test]
fn test_escaping_none_does_not_cascade() {
    let code = compile("(<div @escaping=.none>{trusted}<span>{other}</span></div>)");
    assert!(code.contains(".escaping = .none,"));
    assert!(code.contains("__zx_b0.exprRaw(trusted)"));
    assert!(code.contains("__zx_b0.expr(other)"));
}

#[test]
fn test_escaping_passes_through_control_flow() {
    let code = compile("(<div @escaping=.none>{if (a) {{html}}}</div>)");
    assert!(code.contains("break :__zx_blk1 __zx_b1.exprRaw(html);"));
}

#[test]
fn test_verbatim_script_body() {
    let code = compile("(<script @escaping=.none>\n  const a = 1;\n    go(a);\n</script>)");
    assert!(code.contains("__zx_b0.raw(\n"));
    assert!(code.contains("\\\\  const a = 1;\n"));
    assert!(code.contains("\\\\    go(a);\n"));
}

#[test]
fn test_text_is_zig_escaped() {
    let code = compile("(<p>say \"hi\" \\ bye</p>)");
    assert!(code.contains("__zx_b0.text(\"say \\\"hi\\\" \\\\ bye\")"));
}

// ============================================================================
// Host File Handling
// ============================================================================

#[test]
fn test_file_without_templates_is_unchanged() {
    let source = "const std = @import(\"std\");\npub fn add(a: u32, b: u32) u32 {\n    return (a + b);\n}\n";
    let result = transform(source, None).unwrap();
    assert_eq!(result.code, source);
    assert_eq!(result.templates, 0);
}

#[test]
fn test_templates_in_strings_and_comments_are_ignored() {
    let source = "const s = \"(<p/>)\";\n// (<p/>)\nconst m =\n    \\\\(<p/>)\n;\n";
    assert_eq!(transform(source, None).unwrap().code, source);
}

#[test]
fn test_import_injection_uses_configured_runtime() {
    let options = TransformOptions {
        runtime: "ui",
        runtime_module: "deps/ui.zig",
        ..TransformOptions::zigx_defaults()
    };
    let code = transform("const a = (<br/>);", Some(options)).unwrap().code;
    assert!(code.starts_with("const ui = @import(\"deps/ui.zig\");\nconst a = __zx_blk0: {"));
    assert!(code.contains("var __zx_b0 = ui.Builder.init("));
}

#[test]
fn test_indent_width_option() {
    let options = TransformOptions {
        indent_width: 2,
        ..options()
    };
    let code = transform("(<br/>)", Some(options)).unwrap().code;
    assert!(code.contains("\n  var __zx_b0"));
    assert!(code.contains("\n    .attributes = &.{},"));
}

#[test]
fn test_output_is_deterministic() {
    let source = "const a = (<ul>{for (xs) |x| (<li>{x}</li>)}</ul>);\nconst b = (<div>{if (c) (<p/>)}</div>);";
    let first = compile(source);
    for _ in 0..5 {
        assert_eq!(compile(source), first);
    }
    assert!(first.contains("const b = __zx_blk3: {"));
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_mismatched_tag_produces_no_output() {
    let source = "const ok = (<br/>);\nconst bad = (<div></span>);";
    let err = transform(source, None).unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::Syntax);
    assert_eq!(err.line, 2);
    assert!(err.message.contains("does not match"));
}

#[test]
fn test_duplicate_attribute() {
    let err = transform("(<a id=\"x\" id=\"y\"/>)", None).unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::Validation);
    assert!(err.message.contains("duplicate attribute `id`"));
}

#[test]
fn test_unknown_builtin_renders_report() {
    let source = "(<div @bogus={1}></div>)";
    let options = TransformOptions::zigx_defaults().with_filename("page.zx");
    let err = transform(source, Some(options)).unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::Validation);
    let report = err.render(source);
    assert!(report.contains("page.zx"));
    assert!(report.contains("@bogus"));
}

#[test]
fn test_unclosed_root() {
    let err = transform("const x = (<div>", None).unwrap_err();
    assert_eq!(err.kind, DiagnosticKind::Syntax);
}
