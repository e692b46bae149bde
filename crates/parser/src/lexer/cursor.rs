//! Tokenizing of one logical line; indentation is handled by the caller.

use super::token::{LogosToken, Token, TokenKind};
use crate::error::{Error, ErrorKind};
use logos::Logos;
use text_size::{TextRange, TextSize};

/// Lexes one line whose first byte sits at `line_start_offset` in the
/// source, so spans point into the whole program.
pub struct LineCursor {
    line_start_offset: usize,
}

impl LineCursor {
    pub fn new(line_start_offset: usize) -> Self {
        LineCursor { line_start_offset }
    }

    fn span(&self, range: std::ops::Range<usize>) -> TextRange {
        let at = |offset: usize| TextSize::from((self.line_start_offset + offset) as u32);
        TextRange::new(at(range.start), at(range.end))
    }

    /// Tokens of `line` without comments or newlines, and every lexical
    /// error on it. A quote that starts no valid literal is reported as an
    /// unterminated string, since string literals cannot span lines.
    pub fn tokenize_line(&self, line: &str) -> (Vec<Token>, Vec<Error>) {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for (lexed, range) in LogosToken::lexer(line).spanned() {
            let span = self.span(range.clone());
            match lexed.map(TokenKind::from) {
                Ok(TokenKind::Newline | TokenKind::Comment) => {}
                Ok(kind) => tokens.push(Token::new(kind, span)),
                Err(()) => {
                    let kind = if line[range.start..].starts_with(['"', '\'']) {
                        ErrorKind::UnterminatedString
                    } else {
                        ErrorKind::InvalidCharacter
                    };
                    errors.push(Error::new(kind, span));
                }
            }
        }

        (tokens, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_are_offset_into_the_source() {
        let (tokens, errors) = LineCursor::new(10).tokenize_line("x = 1  # note");
        assert!(errors.is_empty());
        let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![TokenKind::Ident, TokenKind::Equal, TokenKind::Number]);
        assert_eq!(tokens[2].span, TextRange::new(14.into(), 15.into()));
    }

    #[test]
    fn unterminated_string() {
        let (_, errors) = LineCursor::new(0).tokenize_line("print(\"hello)");
        assert!(!errors.is_empty());
        assert!(matches!(errors[0].kind, ErrorKind::UnterminatedString));
    }

    #[test]
    fn invalid_character() {
        let (tokens, errors) = LineCursor::new(0).tokenize_line("a = $");
        assert_eq!(tokens.len(), 2);
        assert!(matches!(errors[0].kind, ErrorKind::InvalidCharacter));
    }
}
