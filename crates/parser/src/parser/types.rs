use crate::Arena;
use crate::ast::*;
use crate::error::{Error, ErrorKind, ParseResult, error};
use crate::lexer::{Token, TokenKind};
use smallvec::SmallVec;
use text_size::TextRange;

/// Context tracking for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(super) struct ParserContext {
    /// Are we inside a loop (for/while)?
    pub(super) in_loop: bool,
    /// Are we inside a function?
    pub(super) in_function: bool,
    /// Are we inside an async function?
    pub(super) in_async_function: bool,
}

impl ParserContext {
    pub(super) fn enter_loop(mut self) -> Self {
        self.in_loop = true;
        self
    }

    /// A function body starts a fresh loop scope.
    pub(super) fn enter_function(mut self, is_async: bool) -> Self {
        self.in_loop = false;
        self.in_function = true;
        self.in_async_function = is_async;
        self
    }
}

/// Delimiter tracking for better error messages
#[derive(Debug, Clone, Copy)]
pub(super) struct DelimiterInfo {
    pub(super) kind: char,
    pub(super) span: TextRange,
}

/// Recursive-descent parser over the token stream of one source text.
///
/// Parsing stops at the first error; lexical errors are reported before
/// any syntax error.
pub struct Parser<'a> {
    pub(super) tokens: Vec<Token>,
    pub(super) current: usize,
    pub(super) arena: &'a Arena,
    pub(super) source: &'a str,
    pub(super) context: ParserContext,
    pub(super) delimiter_stack: Vec<DelimiterInfo>,
    pub(super) lexical_errors: Vec<Error>,
}

impl<'a> Parser<'a> {
    pub fn new(mut lexer: crate::Lexer, arena: &'a Arena) -> Self {
        let source = arena.alloc_str(lexer.source());
        let (tokens, lexical_errors) = lexer.tokenize();

        Parser {
            tokens,
            current: 0,
            arena,
            source,
            context: ParserContext::default(),
            delimiter_stack: Vec::new(),
            lexical_errors,
        }
    }

    /// Normalized source text the spans refer to.
    pub fn source(&self) -> &'a str {
        self.source
    }

    pub fn parse_module(&mut self) -> ParseResult<&'a Module<'a>> {
        if let Some(first) = self.lexical_errors.first() {
            return Err(Box::new(first.clone()));
        }

        let mut body = Vec::new();
        while !self.is_at_end() {
            if self.match_token(TokenKind::Newline) {
                continue;
            }
            if self.peek().kind == TokenKind::Indent {
                return Err(error(
                    ErrorKind::InvalidSyntax {
                        message: "unexpected indent".to_string(),
                    },
                    self.peek().span,
                ));
            }
            body.push(self.parse_stmt()?);
        }

        if let Some(error) = self.check_unclosed_delimiters() {
            return Err(error);
        }

        let span = match (body.first(), body.last()) {
            (Some(first), Some(last)) => TextRange::new(first.span().start(), last.span().end()),
            _ => TextRange::default(),
        };

        let body = self.arena.alloc_slice_vec(body);
        Ok(self.arena.alloc(Module { body, span }))
    }

    pub(super) fn peek(&self) -> Token {
        if self.current < self.tokens.len() {
            self.tokens[self.current]
        } else {
            let end = self
                .tokens
                .last()
                .map(|t| t.span.end())
                .unwrap_or_default();
            Token::new(TokenKind::Eof, TextRange::empty(end))
        }
    }

    pub(super) fn peek_nth(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.current + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Eof)
    }

    pub(super) fn prev(&self) -> Token {
        if self.current == 0 {
            return self.peek();
        }
        self.tokens[self.current - 1]
    }

    pub(super) fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.prev()
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.current >= self.tokens.len() || self.peek().kind == TokenKind::Eof
    }

    pub(super) fn match_token(&mut self, kind: TokenKind) -> bool {
        if self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn unexpected(&self, expected: Option<&str>) -> Box<Error> {
        let token = self.peek();
        let kind = if token.kind == TokenKind::Eof {
            ErrorKind::UnexpectedEof
        } else {
            ErrorKind::UnexpectedToken {
                expected: expected.map(str::to_string),
                found: format!("{:?}", token.kind),
            }
        };
        error(kind, token.span)
    }

    pub(super) fn consume(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.peek().kind == kind {
            return Ok(self.advance());
        }

        let current_token = self.peek();
        if let Some(delimiter) = closing_char(current_token.kind)
            && self.delimiter_stack.is_empty()
        {
            return Err(error(
                ErrorKind::UnmatchedClosing { delimiter },
                current_token.span,
            ));
        }

        if current_token.kind == TokenKind::Eof
            && let Some(delimiter_error) = self.check_unclosed_delimiters()
        {
            return Err(delimiter_error);
        }

        Err(self.unexpected(Some(&format!("{:?}", kind))))
    }

    pub(super) fn consume_ident(&mut self) -> ParseResult<&'a str> {
        if self.peek().kind == TokenKind::Ident {
            let span = self.advance().span;
            Ok(&self.source[span])
        } else {
            Err(self.unexpected(Some("identifier")))
        }
    }

    /// Source text of a token.
    pub(super) fn text(&self, token: Token) -> &'a str {
        &self.source[token.span]
    }

    /// End a simple statement: optional `;`, then the line break.
    pub(super) fn end_simple_stmt(&mut self) -> ParseResult<()> {
        if self.match_token(TokenKind::Semicolon) && self.peek().kind != TokenKind::Newline {
            return Ok(());
        }
        match self.peek().kind {
            TokenKind::Newline => {
                while self.match_token(TokenKind::Newline) {}
                Ok(())
            }
            TokenKind::Eof | TokenKind::Dedent => Ok(()),
            kind => {
                if let Some(delimiter) = closing_char(kind)
                    && self.delimiter_stack.is_empty()
                {
                    return Err(error(
                        ErrorKind::UnmatchedClosing { delimiter },
                        self.peek().span,
                    ));
                }
                Err(self.unexpected(Some("end of statement")))
            }
        }
    }

    /// Parse `: suite` after a compound statement header.
    pub(super) fn parse_suite(&mut self, header: &str) -> ParseResult<&'a [Stmt<'a>]> {
        if self.peek().kind != TokenKind::Colon {
            return Err(error(
                ErrorKind::MissingColon {
                    context: header.to_string(),
                },
                self.peek().span,
            ));
        }
        self.advance();

        let stmts = if self.match_token(TokenKind::Newline) {
            while self.match_token(TokenKind::Newline) {}
            self.parse_block()?
        } else {
            // `if x: a = 1; b = 2` keeps the suite on the header line
            let mut stmts = vec![self.parse_stmt()?];
            while !matches!(
                self.prev().kind,
                TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof
            ) && !matches!(self.peek().kind, TokenKind::Eof | TokenKind::Dedent)
            {
                stmts.push(self.parse_stmt()?);
            }
            stmts
        };
        Ok(self.arena.alloc_slice_vec(stmts))
    }

    pub(super) fn parse_block(&mut self) -> ParseResult<Vec<Stmt<'a>>> {
        if self.peek().kind != TokenKind::Indent {
            return Err(error(ErrorKind::ExpectedIndent, self.peek().span));
        }
        self.advance();

        let mut stmts = Vec::new();
        while self.peek().kind != TokenKind::Dedent && !self.is_at_end() {
            if self.match_token(TokenKind::Newline) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        self.match_token(TokenKind::Dedent);

        Ok(stmts)
    }

    pub(super) fn parse_arguments(&mut self) -> ParseResult<Arguments<'a>> {
        let mut posonlyargs: SmallVec<[Arg<'a>; 8]> = SmallVec::new();
        let mut args: SmallVec<[Arg<'a>; 8]> = SmallVec::new();
        let mut kwonlyargs: SmallVec<[Arg<'a>; 8]> = SmallVec::new();
        let mut defaults: SmallVec<[Expr<'a>; 4]> = SmallVec::new();
        let mut kw_defaults: SmallVec<[Option<Expr<'a>>; 4]> = SmallVec::new();
        let mut vararg = None;
        let mut kwarg = None;
        let mut seen_star = false;

        while self.peek().kind != TokenKind::RightParen && !self.is_at_end() {
            if self.peek().kind == TokenKind::Slash {
                self.advance();
                posonlyargs.append(&mut args);
            } else if self.peek().kind == TokenKind::Star {
                if seen_star {
                    return Err(error(ErrorKind::InvalidParameterOrder, self.peek().span));
                }
                self.advance();
                seen_star = true;
                if self.peek().kind == TokenKind::Ident {
                    let arg = self.parse_param()?;
                    vararg = Some(&*self.arena.alloc(arg));
                }
            } else if self.peek().kind == TokenKind::DoubleStar {
                self.advance();
                let arg = self.parse_param()?;
                kwarg = Some(&*self.arena.alloc(arg));
                self.match_token(TokenKind::Comma);
                if self.peek().kind != TokenKind::RightParen {
                    return Err(error(ErrorKind::InvalidParameterOrder, self.peek().span));
                }
                break;
            } else {
                let arg = self.parse_param()?;
                let default = if self.match_token(TokenKind::Equal) {
                    Some(self.parse_expression()?)
                } else {
                    None
                };

                if seen_star {
                    kw_defaults.push(default);
                    kwonlyargs.push(arg);
                } else {
                    match default {
                        Some(default) => defaults.push(default),
                        None if !defaults.is_empty() => {
                            return Err(error(ErrorKind::InvalidParameterOrder, arg.span));
                        }
                        None => {}
                    }
                    args.push(arg);
                }
            }

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let mut seen_names = std::collections::HashSet::new();
        for arg in posonlyargs
            .iter()
            .chain(args.iter())
            .chain(kwonlyargs.iter())
            .chain(vararg.iter().copied())
            .chain(kwarg.iter().copied())
        {
            if !seen_names.insert(arg.arg) {
                return Err(error(
                    ErrorKind::DuplicateParameter {
                        name: arg.arg.to_string(),
                    },
                    arg.span,
                ));
            }
        }

        Ok(Arguments {
            posonlyargs: self.arena.alloc_slice_iter(posonlyargs),
            args: self.arena.alloc_slice_iter(args),
            vararg,
            kwonlyargs: self.arena.alloc_slice_iter(kwonlyargs),
            kw_defaults: self.arena.alloc_slice_iter(kw_defaults),
            kwarg,
            defaults: self.arena.alloc_slice_iter(defaults),
        })
    }

    fn parse_param(&mut self) -> ParseResult<Arg<'a>> {
        let span = self.peek().span;
        let name = self.consume_ident()?;
        let annotation = if self.match_token(TokenKind::Colon) {
            Some(&*self.arena.alloc(self.parse_expression()?))
        } else {
            None
        };
        Ok(Arg {
            arg: name,
            annotation,
            span,
        })
    }

    // ===== Delimiter tracking =====

    /// Push an opening delimiter onto the stack
    pub(super) fn push_delimiter(&mut self, kind: char, span: TextRange) {
        self.delimiter_stack.push(DelimiterInfo { kind, span });
    }

    /// Consume a closing delimiter and verify it matches the innermost opening one
    pub(super) fn close_delimiter(&mut self, closing: TokenKind) -> ParseResult<Token> {
        let token = self.consume(closing)?;
        let expected_closing = closing_char(closing).unwrap_or(')');
        match self.delimiter_stack.pop() {
            Some(opening) if matching_close(opening.kind) == expected_closing => Ok(token),
            Some(opening) => Err(error(
                ErrorKind::UnclosedDelimiter {
                    expected: matching_close(opening.kind),
                    opening_span: opening.span,
                },
                token.span,
            )),
            None => Err(error(
                ErrorKind::UnmatchedClosing {
                    delimiter: expected_closing,
                },
                token.span,
            )),
        }
    }

    /// Check for unclosed delimiters at end of file
    pub(super) fn check_unclosed_delimiters(&self) -> Option<Box<Error>> {
        self.delimiter_stack.last().map(|opening| {
            error(
                ErrorKind::UnclosedDelimiter {
                    expected: matching_close(opening.kind),
                    opening_span: opening.span,
                },
                opening.span,
            )
        })
    }
}

fn closing_char(kind: TokenKind) -> Option<char> {
    match kind {
        TokenKind::RightParen => Some(')'),
        TokenKind::RightBracket => Some(']'),
        TokenKind::RightBrace => Some('}'),
        _ => None,
    }
}

fn matching_close(opening: char) -> char {
    match opening {
        '(' => ')',
        '[' => ']',
        '{' => '}',
        other => other,
    }
}
