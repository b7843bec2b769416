/// Node kinds of the concrete syntax tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    SourceFile,
    /// Ordinary Zig code between template roots
    HostText,
    /// `( <…> )`, the unit that gets rewritten
    TemplateRoot,

    Element,
    SelfClosingElement,
    Fragment,
    StartTag,
    EndTag,
    TagName,
    /// `<!-- … -->`
    Comment,

    StaticAttribute,
    BuiltinAttribute,
    ShorthandAttribute,
    BuiltinShorthandAttribute,
    SpreadAttribute,
    AttrName,
    /// A quoted Zig string literal, quotes included
    StringValue,
    /// `{…}` or a bare enum literal (`.none`) in attribute value position
    ExprValue,
    /// `` `text {expr}` ``
    TemplateString,
    TemplateText,

    /// Opaque Zig expression tokens
    HostExpr,
    /// `{…}` in child position
    ExpressionBlock,
    Text,

    IfBlock,
    ForBlock,
    WhileBlock,
    SwitchBlock,
    /// One `if`/`else` arm, the loop body, or a switch prong
    Branch,
    /// Verbatim condition, captures and continue expression
    Header,
    /// Switch prong pattern (left of `=>`)
    Pattern,
    /// `|a, b|`
    Capture,
    /// `(<node/>)` or `{ children }`
    Body,

    Error,
}

impl SyntaxKind {
    pub fn is_control_flow(self) -> bool {
        matches!(
            self,
            SyntaxKind::IfBlock | SyntaxKind::ForBlock | SyntaxKind::WhileBlock | SyntaxKind::SwitchBlock
        )
    }
}
