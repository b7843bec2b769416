/// Line-oriented writer for generated Zig.
///
/// Output starts mid-line (it replaces a `(`…`)` region in place), so the first
/// line gets no prefix. Every later line starts with the host line's
/// indentation followed by `depth` indent units.
pub struct CodeWriter {
    out: String,
    base: String,
    unit: String,
    depth: usize,
    at_line_start: bool,
}

impl CodeWriter {
    pub fn new(base: &str, indent_width: usize) -> Self {
        Self {
            out: String::new(),
            base: base.to_string(),
            unit: " ".repeat(indent_width),
            depth: 0,
            at_line_start: false,
        }
    }

    pub fn write(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.at_line_start {
            self.out.push_str(&self.base);
            for _ in 0..self.depth {
                self.out.push_str(&self.unit);
            }
            self.at_line_start = false;
        }
        self.out.push_str(text);
    }

    pub fn newline(&mut self) {
        self.out.push('\n');
        self.at_line_start = true;
    }

    pub fn line(&mut self, text: &str) {
        self.write(text);
        self.newline();
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.out
    }
}
