//! Source emitter - builds target source text with tracked indentation
//!
//! One emitter is created per `generate` call; nothing in it is shared between calls.

use std::fmt::Write;

/// Where an opening brace goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceStyle {
    /// `header {` (Rust)
    SameLine,
    /// `header` then `{` on its own line (C#)
    NextLine,
}

/// A buffer for building source code with proper indentation
#[derive(Debug)]
pub struct SourceEmitter {
    buffer: String,
    indent_level: usize,
    indent_str: String,
    brace_style: BraceStyle,
}

impl SourceEmitter {
    pub fn new(indent_width: usize, brace_style: BraceStyle) -> Self {
        Self {
            buffer: String::new(),
            indent_level: 0,
            indent_str: " ".repeat(indent_width),
            brace_style,
        }
    }

    /// Get the generated code
    pub fn finish(mut self) -> String {
        self.trim_blank_tail();
        self.buffer
    }

    /// Get current buffer as string slice
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    /// Indentation string for the current level.
    pub fn current_indent(&self) -> String {
        self.indent_str.repeat(self.indent_level)
    }

    /// Indentation string `extra` levels deeper than the current one.
    pub fn indent_at(&self, extra: usize) -> String {
        self.indent_str.repeat(self.indent_level + extra)
    }

    /// Write a line with current indentation
    pub fn line(&mut self, s: &str) {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
    }

    /// Write text without newline
    pub fn write(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    /// Write formatted text
    pub fn writef(&mut self, args: std::fmt::Arguments<'_>) {
        let _ = self.buffer.write_fmt(args);
    }

    /// Write a blank line
    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Write a blank line unless the buffer is empty or already ends in one.
    pub fn separator(&mut self) {
        if !self.buffer.is_empty() && !self.buffer.ends_with("{\n") && !self.buffer.ends_with("\n\n") {
            self.buffer.push('\n');
        }
    }

    /// Drop separators that nothing followed (e.g. the last member of a block was skipped).
    fn trim_blank_tail(&mut self) {
        while self.buffer.ends_with("\n\n") {
            self.buffer.pop();
        }
    }

    /// Write indentation only
    pub fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(&self.indent_str);
        }
    }

    /// Increase indent level
    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indent level
    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Write a block header plus opening brace and indent.
    pub fn open_block(&mut self, header: &str) {
        match self.brace_style {
            BraceStyle::SameLine => self.line(&format!("{} {{", header)),
            BraceStyle::NextLine => {
                self.line(header);
                self.line("{");
            }
        }
        self.indent();
    }

    /// Dedent and write the closing brace.
    pub fn close_block(&mut self) {
        self.close_block_with("");
    }

    /// Dedent and write the closing brace followed by `suffix` (`;`, `,`, `)()`).
    pub fn close_block_with(&mut self, suffix: &str) {
        self.trim_blank_tail();
        self.dedent();
        self.line(&format!("}}{}", suffix));
    }

    /// Write a block with braces
    pub fn block<F>(&mut self, header: &str, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.open_block(header);
        f(self);
        self.close_block();
    }

    /// Write every line of `text` at the current indentation, preserving its relative indentation.
    pub fn verbatim(&mut self, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.blank_line();
            } else {
                self.line(line);
            }
        }
    }

    /// Write a comment
    pub fn comment(&mut self, text: &str) {
        self.line(&format!("// {}", text));
    }

    /// Swap in an empty buffer and return the previous contents.
    ///
    /// Pair with [`SourceEmitter::end_capture`] to render a fragment at the current indentation.
    pub fn begin_capture(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    /// Restore the buffer saved by [`SourceEmitter::begin_capture`] and return what was written in between.
    pub fn end_capture(&mut self, saved: String) -> String {
        std::mem::replace(&mut self.buffer, saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_line_block() {
        let mut e = SourceEmitter::new(4, BraceStyle::SameLine);
        e.block("fn main()", |e| e.line("println!(\"hi\");"));
        assert_eq!(e.finish(), "fn main() {\n    println!(\"hi\");\n}\n");
    }

    #[test]
    fn test_next_line_block() {
        let mut e = SourceEmitter::new(2, BraceStyle::NextLine);
        e.block("class A", |e| e.line("int x;"));
        assert_eq!(e.finish(), "class A\n{\n  int x;\n}\n");
    }

    #[test]
    fn test_capture_keeps_outer_buffer() {
        let mut e = SourceEmitter::new(4, BraceStyle::SameLine);
        e.line("outer");
        e.indent();
        let saved = e.begin_capture();
        e.line("inner");
        let captured = e.end_capture(saved);
        assert_eq!(captured, "    inner\n");
        assert_eq!(e.as_str(), "outer\n");
        assert_eq!(e.current_indent(), "    ");
    }

    #[test]
    fn test_verbatim_preserves_relative_indent() {
        let mut e = SourceEmitter::new(4, BraceStyle::SameLine);
        e.indent();
        e.verbatim("a\n  b");
        assert_eq!(e.finish(), "    a\n      b\n");
    }

    #[test]
    fn test_dangling_separator_is_dropped() {
        let mut e = SourceEmitter::new(4, BraceStyle::SameLine);
        e.open_block("mod a");
        e.line("fn f() {}");
        e.separator();
        e.close_block();
        e.separator();
        assert_eq!(e.finish(), "mod a {\n    fn f() {}\n}\n");
    }
}
