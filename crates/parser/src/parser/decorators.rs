use super::types::Parser;
use crate::ast::*;
use crate::error::ParseResult;
use crate::lexer::TokenKind;
use smallvec::SmallVec;

impl<'a> Parser<'a> {
    pub(super) fn parse_decorated(&mut self) -> ParseResult<Stmt<'a>> {
        let decorators = self.parse_decorators()?;

        let is_async = self.match_token(TokenKind::Async);

        match self.peek().kind {
            TokenKind::Def => self.parse_func_def(decorators, is_async),
            TokenKind::Class if !is_async => self.parse_class_def(decorators),
            _ => Err(self.unexpected(Some("function or class definition"))),
        }
    }

    /// `@expr NEWLINE` lines preceding a definition.
    pub(super) fn parse_decorators(&mut self) -> ParseResult<&'a [Expr<'a>]> {
        // Most functions carry 0-2 decorators
        let mut decorators: SmallVec<[Expr<'a>; 2]> = SmallVec::new();

        while self.match_token(TokenKind::At) {
            decorators.push(self.parse_expression()?);
            self.consume(TokenKind::Newline)?;
            while self.match_token(TokenKind::Newline) {}
        }

        Ok(self.arena.alloc_slice_iter(decorators))
    }
}
