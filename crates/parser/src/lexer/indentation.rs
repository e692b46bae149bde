//! Indentation tracking for indentation-based syntax.

use super::token::{Token, TokenKind};
use crate::error::{Error, ErrorKind};
use text_size::{TextRange, TextSize};

/// Width of a tab stop when measuring indentation.
const TAB_WIDTH: usize = 8;

/// Leading whitespace of a logical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentAnalysis {
    /// Indentation column after tab expansion
    pub level: usize,
    /// Number of bytes of leading whitespace
    pub width: usize,
    /// Whether both tabs and spaces appear in the indentation
    pub mixed: bool,
}

/// Tracks indentation levels for indentation-based syntax.
pub struct IndentationTracker {
    /// Stack of indentation levels (in columns)
    indent_stack: Vec<usize>,
}

impl IndentationTracker {
    /// Create a new indentation tracker starting at level 0.
    pub fn new() -> Self {
        IndentationTracker {
            indent_stack: vec![0],
        }
    }

    /// Measure the leading whitespace of a line.
    pub fn analyze_indent_level(line: &str) -> IndentAnalysis {
        let mut level = 0;
        let mut width = 0;
        let mut seen_tab = false;
        let mut seen_space = false;

        for ch in line.chars() {
            match ch {
                ' ' => {
                    level += 1;
                    seen_space = true;
                }
                '\t' => {
                    level = (level / TAB_WIDTH + 1) * TAB_WIDTH;
                    seen_tab = true;
                }
                '\x0c' => level = 0,
                _ => break,
            }
            width += 1;
        }

        IndentAnalysis {
            level,
            width,
            mixed: seen_tab && seen_space,
        }
    }

    /// Process indentation change and generate INDENT/DEDENT tokens.
    ///
    /// Returns a vector of tokens and any indentation errors encountered.
    pub fn process_indentation(
        &mut self,
        indent_level: usize,
        position: TextSize,
    ) -> (Vec<Token>, Vec<Error>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();
        let current_indent = self.indent_stack.last().copied().unwrap_or(0);

        if indent_level > current_indent {
            self.indent_stack.push(indent_level);
            tokens.push(Token::new(
                TokenKind::Indent,
                TextRange::new(position, position),
            ));
        } else if indent_level < current_indent {
            // Decreased indentation - may need multiple DEDENTs
            while let Some(&level) = self.indent_stack.last() {
                if level <= indent_level {
                    break;
                }
                self.indent_stack.pop();
                tokens.push(Token::new(
                    TokenKind::Dedent,
                    TextRange::new(position, position),
                ));
            }

            if self.indent_stack.last() != Some(&indent_level) {
                errors.push(Error::new(
                    ErrorKind::UnindentMismatch,
                    TextRange::new(position, position),
                ));
            }
        }

        (tokens, errors)
    }

    /// Emit remaining DEDENT tokens at end of file.
    pub fn finalize(&mut self, eof_position: TextSize) -> Vec<Token> {
        let mut tokens = Vec::new();

        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            tokens.push(Token::new(
                TokenKind::Dedent,
                TextRange::new(eof_position, eof_position),
            ));
        }

        tokens
    }
}

impl Default for IndentationTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_expands_to_next_stop() {
        assert_eq!(IndentationTracker::analyze_indent_level("\tx").level, 8);
        assert_eq!(IndentationTracker::analyze_indent_level("  \tx").level, 8);
        assert_eq!(IndentationTracker::analyze_indent_level("    x").level, 4);
    }

    #[test]
    fn test_mixed_indentation_detected() {
        let analysis = IndentationTracker::analyze_indent_level(" \tx");
        assert!(analysis.mixed);
        assert_eq!(analysis.width, 2);
    }

    #[test]
    fn test_dedent_to_unknown_level_is_error() {
        let mut tracker = IndentationTracker::new();
        let pos = TextSize::from(0);
        let (tokens, errors) = tracker.process_indentation(4, pos);
        assert_eq!(tokens.len(), 1);
        assert!(errors.is_empty());

        let (tokens, errors) = tracker.process_indentation(2, pos);
        assert_eq!(tokens[0].kind, TokenKind::Dedent);
        assert_eq!(errors.len(), 1);
    }
}
