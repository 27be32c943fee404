//! Line-oriented C/C++ source accumulation.

use std::fmt;

use logemm_ir::{Range, loop_variable};

const INDENT: &str = "  ";

/// Emitted source lines with block indentation.
#[derive(Debug, Clone, Default)]
pub struct CodeSink {
    lines: Vec<String>,
    indent: usize,
}

impl CodeSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("{}{}", INDENT.repeat(self.indent), text.as_ref()));
    }

    /// Preprocessor directives ignore the block indentation.
    pub fn directive(&mut self, text: impl AsRef<str>) {
        self.lines.push(text.as_ref().to_string());
    }

    pub fn include(&mut self, header: &str) {
        self.directive(format!("#include \"{header}\""));
    }

    pub fn include_sys(&mut self, header: &str) {
        self.directive(format!("#include <{header}>"));
    }

    pub fn open_block(&mut self, header: impl AsRef<str>) {
        self.line(format!("{} {{", header.as_ref()));
        self.indent += 1;
    }

    pub fn close_block(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    /// Open `for (int _i = start; _i < stop; ++_i) {`.
    pub fn open_for(&mut self, index: char, range: Range) {
        let var = loop_variable(index);
        self.open_block(format!("for (int {var} = {}; {var} < {}; ++{var})", range.start, range.stop));
    }

    /// Zero `count` elements of type `typename` starting at `target`.
    pub fn memset(&mut self, target: &str, count: usize, typename: &str) {
        self.line(format!("memset({target}, 0, {count} * sizeof({typename}));"));
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.indent
    }
}

impl fmt::Display for CodeSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
