//! Main lexer implementation for source code.

use super::cursor::LineCursor;
use super::indentation::IndentationTracker;
use super::token::{Token, TokenKind};
use crate::error::{Error, ErrorKind};
use text_size::{TextRange, TextSize};

/// Lexer that tokenizes source code with indentation tracking.
///
/// This lexer implements implicit line joining rules:
/// - When inside (), [], or {}, newlines are ignored and INDENT/DEDENT are not generated
/// - Triple-quoted strings spanning several lines are folded into one logical line
/// - A backslash at the very end of a line joins it with the next one
///
/// Folding replaces each joined line break by a single space, so every token
/// span still indexes the original text.
pub struct Lexer {
    input: String,
    indentation: IndentationTracker,
    bracket_depth: usize,
}

impl Lexer {
    /// Create a new lexer for the given source.
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.replace("\r\n", "\n"),
            indentation: IndentationTracker::new(),
            bracket_depth: 0,
        }
    }

    /// Get the source text.
    pub fn source(&self) -> &str {
        &self.input
    }

    /// Count triple-quote occurrences in a string (""" or ''')
    fn count_triple_quotes(text: &str, quote_char: char) -> usize {
        let triple = match quote_char {
            '"' => r#"""""#,
            '\'' => "'''",
            _ => return 0,
        };
        text.matches(triple).count()
    }

    /// Merge lines belonging to an open triple-quoted string into single
    /// logical lines. Each entry keeps the number of physical lines it spans.
    fn preprocess_multiline_strings(lines: &[&str]) -> Vec<(String, usize)> {
        let mut result = Vec::new();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i];
            let mut in_double_triple = Self::count_triple_quotes(line, '"') % 2 == 1;
            let mut in_single_triple = Self::count_triple_quotes(line, '\'') % 2 == 1;

            let mut accumulated = line.to_string();
            let mut spanned = 1;
            i += 1;

            while i < lines.len() && (in_double_triple || in_single_triple) {
                accumulated.push(' ');
                accumulated.push_str(lines[i]);

                if in_double_triple && Self::count_triple_quotes(lines[i], '"') % 2 == 1 {
                    in_double_triple = false;
                }
                if in_single_triple && Self::count_triple_quotes(lines[i], '\'') % 2 == 1 {
                    in_single_triple = false;
                }

                spanned += 1;
                i += 1;
            }

            result.push((accumulated, spanned));
        }

        result
    }

    /// Tokenize the entire input with indentation handling.
    /// Returns tokens and the lexical errors encountered.
    pub fn tokenize(&mut self) -> (Vec<Token>, Vec<Error>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        let raw_lines: Vec<&str> = self.input.split('\n').collect();
        let lines = Self::preprocess_multiline_strings(&raw_lines);
        let mut line_start_pos = 0;
        let mut line_idx = 0;

        while line_idx < lines.len() {
            let (first, _) = &lines[line_idx];
            let mut line = first.clone();
            let mut consumed = vec![line_idx];

            while line.ends_with('\\') && line_idx + 1 < lines.len() {
                line.pop();
                line.push(' ');
                line_idx += 1;
                consumed.push(line_idx);
                line.push(' ');
                line.push_str(&lines[line_idx].0);
            }

            let is_last = line_idx + 1 == lines.len();
            let line_len = line.len();
            let content = line.trim_start();
            let is_blank = content.is_empty() || content.starts_with('#');

            if !is_blank && self.bracket_depth == 0 {
                let analysis = IndentationTracker::analyze_indent_level(&line);
                let indent_pos = TextSize::from(line_start_pos as u32);

                if analysis.mixed {
                    errors.push(Error::new(
                        ErrorKind::MixedIndentation,
                        TextRange::new(
                            indent_pos,
                            indent_pos + TextSize::from(analysis.width as u32),
                        ),
                    ));
                }

                let (indent_tokens, indent_errors) = self
                    .indentation
                    .process_indentation(analysis.level, indent_pos);
                tokens.extend(indent_tokens);
                errors.extend(indent_errors);
            }

            if !is_blank {
                let cursor = LineCursor::new(line_start_pos);
                let (line_tokens, line_errors) = cursor.tokenize_line(&line);
                errors.extend(line_errors);

                let depth = line_tokens
                    .iter()
                    .fold(self.bracket_depth as i64, |depth, token| depth + token.kind.bracket_delta());
                self.bracket_depth = depth.max(0) as usize;
                tokens.extend(line_tokens);
            }

            if !is_last && self.bracket_depth == 0 {
                let newline_pos = TextSize::from((line_start_pos + line_len) as u32);
                tokens.push(Token::new(
                    TokenKind::Newline,
                    TextRange::new(newline_pos, newline_pos),
                ));
            }

            for idx in consumed {
                line_start_pos += lines[idx].0.len() + 1;
            }
            line_idx += 1;
        }

        let eof_pos = TextSize::from(self.input.len() as u32);
        if self.bracket_depth == 0
            && tokens
                .last()
                .is_some_and(|t| !matches!(t.kind, TokenKind::Newline))
        {
            tokens.push(Token::new(TokenKind::Newline, TextRange::new(eof_pos, eof_pos)));
        }
        tokens.extend(self.indentation.finalize(eof_pos));

        tokens.push(Token::new(TokenKind::Eof, TextRange::new(eof_pos, eof_pos)));
        (tokens, errors)
    }
}
