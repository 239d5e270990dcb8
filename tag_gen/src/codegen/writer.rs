/* Line-oriented builder for emitted Rust source. */

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct CodeWriter {
    buf: String,
    indent: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Standard preamble of every emitted file.
    pub fn with_header(runtime_crate: &str, uses_definitions: bool) -> Self {
        let mut w = Self::new();
        w.line("// Generated by tag-gen. Do not edit; change the schema and regenerate.");
        w.blank();
        w.line(format!("use {runtime_crate}::prelude::*;"));
        if uses_definitions {
            w.line("use super::definitions::*;");
        }
        w
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
            return;
        }
        for _ in 0..self.indent {
            self.buf.push_str(INDENT);
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write `text` and indent what follows; `text` normally ends with `{`.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent += 1;
    }

    /// Dedent and write `text`, normally `}`.
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
    }

    /// Dedent, write `text` and indent again, as for `} else {`.
    pub fn reopen(&mut self, text: impl AsRef<str>) {
        self.indent = self.indent.saturating_sub(1);
        self.line(text);
        self.indent += 1;
    }

    pub fn blank(&mut self) {
        if !self.buf.is_empty() && !self.buf.ends_with("\n\n") {
            self.buf.push('\n');
        }
    }

    /// `///` lines for an optional description.
    pub fn doc(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            for line in text.lines() {
                self.line(format!("/// {}", line.trim()));
            }
        }
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
