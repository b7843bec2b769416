//! `if` / `for` / `while` / `switch` wrappers as Zig statements
//!
//! A wrapper always runs inside some block: either a lifted block whose value
//! it must produce (`Sink::Break`) or a loop body that collects into a list
//! (`Sink::Append`). Headers, captures and prong patterns are copied verbatim.

use crate::ast::{Body, Branch, ControlFlow, ControlFlowKind};
use crate::output::CodeWriter;
use crate::transform::{Emitter, Sink};

pub fn emit_statement(e: &mut Emitter, flow: &ControlFlow, sink: &Sink, w: &mut CodeWriter) {
    match flow.kind {
        ControlFlowKind::If => emit_if(e, flow, sink, w),
        ControlFlowKind::For | ControlFlowKind::While => emit_loop(e, flow, sink, w),
        ControlFlowKind::Switch => emit_switch(e, flow, sink, w),
    }
}

/// `if (a) {…} else if (b) |v| {…} else |err| {…}`
fn emit_if(e: &mut Emitter, flow: &ControlFlow, sink: &Sink, w: &mut CodeWriter) {
    let mut has_else = false;
    for (i, branch) in flow.branches.iter().enumerate() {
        match (&branch.head, i) {
            (Some(head), 0) => w.write(&format!("if {head} ")),
            (Some(head), _) => w.write(&format!(" else if {head} ")),
            (None, _) => {
                has_else = true;
                w.write(" else ");
                if let Some(capture) = &branch.capture {
                    w.write(&format!("{capture} "));
                }
            }
        }
        emit_body(e, &branch.body, sink, w);
    }
    w.newline();

    if let (Sink::Break(label), false) = (sink, has_else) {
        w.line(&format!("break :{label} {}();", e.call("empty")));
    }
}

/// Loops always collect. In value position they fill a fresh list and break
/// with a fragment over it.
fn emit_loop(e: &mut Emitter, flow: &ControlFlow, sink: &Sink, w: &mut CodeWriter) {
    match sink {
        Sink::Append(_) => write_loop(e, flow, sink, w),
        Sink::Break(label) => {
            let list = e.fresh_list();
            w.line(&format!("var {list} = {}();", e.call("list")));
            write_loop(e, flow, &Sink::Append(list.clone()), w);
            w.line(&format!(
                "break :{label} {}({list}.items());",
                e.call("fragment")
            ));
        }
    }
}

fn write_loop(e: &mut Emitter, flow: &ControlFlow, sink: &Sink, w: &mut CodeWriter) {
    let keyword = match flow.kind {
        ControlFlowKind::While => "while",
        _ => "for",
    };
    if let Some(branch) = flow.branches.first() {
        w.write(&format!("{keyword} {} ", branch.head.as_deref().unwrap_or_default()));
        emit_body(e, &branch.body, sink, w);
    }
    w.newline();
}

fn emit_switch(e: &mut Emitter, flow: &ControlFlow, sink: &Sink, w: &mut CodeWriter) {
    w.line(&format!(
        "switch {} {{",
        flow.subject.as_deref().unwrap_or_default()
    ));
    w.indent();
    for branch in &flow.branches {
        w.write(&format!("{} => ", branch.head.as_deref().unwrap_or("else")));
        write_capture(branch, w);
        emit_body(e, &branch.body, sink, w);
        w.line(",");
    }
    w.dedent();
    w.line("}");
}

fn write_capture(branch: &Branch, w: &mut CodeWriter) {
    if let Some(capture) = &branch.capture {
        w.write(&format!("{capture} "));
    }
}

/// `{ … }` delivering the body's nodes to `sink`
fn emit_body(e: &mut Emitter, body: &Body, sink: &Sink, w: &mut CodeWriter) {
    let nodes = body.nodes();
    if let (Sink::Append(_), []) = (sink, nodes.as_slice()) {
        w.write("{}");
        return;
    }

    w.line("{");
    w.indent();
    match sink {
        Sink::Append(_) => {
            for node in &nodes {
                e.emit_into(node, sink, w);
            }
        }
        Sink::Break(label) => match nodes.as_slice() {
            [] => w.line(&format!("break :{label} {}();", e.call("empty"))),
            [node] => e.emit_into(node, sink, w),
            _ => {
                w.write(&format!("break :{label} {}(", e.call("fragment")));
                e.emit_node_list(nodes.iter().copied(), w);
                w.line(");");
            }
        },
    }
    w.dedent();
    w.write("}");
}
