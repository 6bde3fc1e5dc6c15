//! Diagnostic rendering (§4.5). Every diagnostic is captured with enough
//! owned context at the point it is raised — stage, message, line text,
//! caret position and width — that rendering it later needs no further
//! access to the source buffer.

use crate::source::{SourceView, Span};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Parser,
    TypeChecker,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Parser => write!(f, "Parser"),
            Stage::TypeChecker => write!(f, "TypeChecker"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    pub line_row: u32,
    pub line_col: u32,
    line_text: String,
    caret_col: usize,
    caret_len: usize,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>, span: Span, source: &SourceView) -> Self {
        let (line_text, line_start) = source.line_of(span.index);
        let caret_col = span.index.saturating_sub(line_start);
        Self {
            stage,
            message: message.into(),
            line_row: span.line_row,
            line_col: span.line_col,
            line_text: line_text.to_string(),
            caret_col,
            caret_len: span.size.max(1),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let underline_len = self
            .caret_len
            .min(self.line_text.len().saturating_sub(self.caret_col).max(1));
        writeln!(
            f,
            "[{}] {} at Ln {}, Col {}",
            self.stage, self.message, self.line_row, self.line_col
        )?;
        writeln!(f, "{}", self.line_text)?;
        write!(
            f,
            "{}{}",
            " ".repeat(self.caret_col),
            "^".repeat(underline_len)
        )
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_message_line_and_caret() {
        let source = SourceView::new("    push i99, 1\n");
        let span = Span::new(9, 3, 1, 10);
        let diag = Diagnostic::new(Stage::TypeChecker, "unknown type 'i99'", span, &source);
        let rendered = diag.to_string();
        assert!(rendered.contains("[TypeChecker] unknown type 'i99' at Ln 1, Col 10"));
        assert!(rendered.contains("    push i99, 1"));
        let caret_line = rendered.lines().last().unwrap();
        assert_eq!(caret_line, &" ".repeat(9) + "^^^");
    }
}
