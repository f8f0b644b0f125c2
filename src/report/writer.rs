//! Indent-aware string builder for terminal reports.
//!
//! Reports use 2-space indentation.

pub struct ReportWriter {
    buf: String,
    indent_level: usize,
}

impl ReportWriter {
    pub fn new() -> Self {
        Self {
            buf: String::with_capacity(1024),
            indent_level: 0,
        }
    }

    /// Write a complete line at the current indent.
    pub fn line(&mut self, text: &str) {
        for _ in 0..self.indent_level {
            self.buf.push_str("  ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
    }

    /// Write an empty line (no indent, no trailing spaces).
    pub fn blank(&mut self) {
        self.buf.push('\n');
    }

    /// Write `- text` at the current indent.
    pub fn bullet(&mut self, text: &str) {
        self.line(&format!("- {}", text));
    }

    /// Write `N. text` lines, numbered from 1.
    pub fn numbered<S: AsRef<str>>(&mut self, items: &[S]) {
        for (i, item) in items.iter().enumerate() {
            self.line(&format!("{}. {}", i + 1, item.as_ref()));
        }
    }

    /// Write a header line and indent what follows.
    pub fn section(&mut self, header: &str) {
        self.line(header);
        self.indent();
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Consume the writer and return the report.
    pub fn finish(self) -> String {
        self.buf
    }
}

impl Default for ReportWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_line() {
        let mut w = ReportWriter::new();
        w.line("Overall Status: PASSED");
        assert_eq!(w.finish(), "Overall Status: PASSED\n");
    }

    #[test]
    fn section_indents_bullets() {
        let mut w = ReportWriter::new();
        w.section("Phase Results:");
        w.bullet("discovery: PASSED");
        w.dedent();
        w.line("done");
        assert_eq!(w.finish(), "Phase Results:\n  - discovery: PASSED\ndone\n");
    }

    #[test]
    fn numbered_starts_at_one() {
        let mut w = ReportWriter::new();
        w.numbered(&["first", "second"]);
        assert_eq!(w.finish(), "1. first\n2. second\n");
    }

    #[test]
    fn blank_line_has_no_indent() {
        let mut w = ReportWriter::new();
        w.indent();
        w.line("a");
        w.blank();
        w.line("b");
        assert_eq!(w.finish(), "  a\n\n  b\n");
    }

    #[test]
    fn dedent_saturates_at_zero() {
        let mut w = ReportWriter::new();
        w.dedent();
        w.line("x");
        assert_eq!(w.finish(), "x\n");
    }
}
