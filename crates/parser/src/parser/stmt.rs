use super::types::{Parser, ParserContext};
use crate::ast::*;
use crate::error::{ErrorKind, ParseResult, error};
use crate::lexer::TokenKind;
use text_size::TextRange;

impl<'a> Parser<'a> {
    pub(super) fn parse_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        match self.peek().kind {
            TokenKind::At => self.parse_decorated(),
            TokenKind::Async => self.parse_async_stmt(),
            TokenKind::Def => self.parse_func_def(&[], false),
            TokenKind::Class => self.parse_class_def(&[]),
            TokenKind::If => self.parse_if_stmt(),
            TokenKind::While => self.parse_while_stmt(),
            TokenKind::For => self.parse_for_stmt(false),
            TokenKind::Try => self.parse_try_stmt(),
            TokenKind::With => self.parse_with_stmt(false),
            _ => self.parse_simple_stmt(),
        }
    }

    pub(super) fn parse_simple_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.peek().span.start();
        let stmt = match self.peek().kind {
            TokenKind::Return => self.parse_return_stmt()?,
            TokenKind::Import => self.parse_import_stmt()?,
            TokenKind::From => self.parse_from_stmt()?,
            TokenKind::Raise => self.parse_raise_stmt()?,
            TokenKind::Assert => self.parse_assert_stmt()?,
            TokenKind::Del => self.parse_delete_stmt()?,
            TokenKind::Global => {
                let names = self.parse_name_list(TokenKind::Global)?;
                let span = TextRange::new(start, self.prev().span.end());
                Stmt::Global(GlobalStmt { names, span })
            }
            TokenKind::Nonlocal => {
                let names = self.parse_name_list(TokenKind::Nonlocal)?;
                let span = TextRange::new(start, self.prev().span.end());
                Stmt::Nonlocal(NonlocalStmt { names, span })
            }
            TokenKind::Pass => Stmt::Pass(self.advance().span),
            TokenKind::Break => {
                let span = self.advance().span;
                if !self.context.in_loop {
                    return Err(error(ErrorKind::BreakOutsideLoop, span));
                }
                Stmt::Break(span)
            }
            TokenKind::Continue => {
                let span = self.advance().span;
                if !self.context.in_loop {
                    return Err(error(ErrorKind::ContinueOutsideLoop, span));
                }
                Stmt::Continue(span)
            }
            _ => self.parse_expr_or_assign()?,
        };
        self.end_simple_stmt()?;
        Ok(stmt)
    }

    /// Expression list as written on either side of `=`: a bare comma
    /// sequence becomes a tuple.
    fn parse_expr_list(&mut self) -> ParseResult<Expr<'a>> {
        let first = self.parse_star_or_expression()?;
        if self.peek().kind != TokenKind::Comma {
            return Ok(first);
        }

        let start = first.span().start();
        let mut elts = vec![first];
        while self.match_token(TokenKind::Comma) {
            if matches!(
                self.peek().kind,
                TokenKind::Equal | TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
            ) {
                break;
            }
            elts.push(self.parse_star_or_expression()?);
        }
        let end = self.prev().span.end();
        Ok(Expr::Tuple(TupleExpr {
            elts: self.arena.alloc_slice_vec(elts),
            span: TextRange::new(start, end),
        }))
    }

    pub(super) fn parse_star_or_expression(&mut self) -> ParseResult<Expr<'a>> {
        if self.peek().kind == TokenKind::Star {
            let start = self.advance().span.start();
            let value = self.arena.alloc(self.parse_bitwise_or()?);
            let span = TextRange::new(start, value.span().end());
            Ok(Expr::Starred(StarredExpr { value, span }))
        } else {
            self.parse_expression()
        }
    }

    fn parse_expr_or_assign(&mut self) -> ParseResult<Stmt<'a>> {
        let expr = self.parse_expr_list()?;
        let start = expr.span().start();

        if let Some(op) = self.peek().kind.aug_assign_op() {
            check_target(&expr, false)?;
            self.advance();
            let value = self.parse_expr_list()?;
            let span = TextRange::new(start, value.span().end());
            return Ok(Stmt::AugAssign(AugAssignStmt {
                target: expr,
                op,
                value,
                span,
            }));
        }

        match self.peek().kind {
            TokenKind::Colon => {
                check_target(&expr, false)?;
                self.advance();
                let annotation = self.parse_expression()?;
                let value = if self.match_token(TokenKind::Equal) {
                    Some(self.parse_expr_list()?)
                } else {
                    None
                };
                let end = value
                    .as_ref()
                    .map(|v| v.span().end())
                    .unwrap_or(annotation.span().end());
                Ok(Stmt::AnnAssign(AnnAssignStmt {
                    target: expr,
                    annotation,
                    value,
                    span: TextRange::new(start, end),
                }))
            }
            TokenKind::Equal => {
                let mut targets = vec![expr];
                while self.match_token(TokenKind::Equal) {
                    targets.push(self.parse_expr_list()?);
                }
                let value = match targets.pop() {
                    Some(value) => value,
                    None => return Err(self.unexpected(None)),
                };
                for target in &targets {
                    check_target(target, true)?;
                }
                let span = TextRange::new(start, value.span().end());
                Ok(Stmt::Assign(AssignStmt {
                    targets: self.arena.alloc_slice_vec(targets),
                    value,
                    span,
                }))
            }
            _ => Ok(Stmt::Expr(ExprStmt {
                span: expr.span(),
                value: expr,
            })),
        }
    }

    fn parse_return_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let return_token = self.consume(TokenKind::Return)?.span;
        if !self.context.in_function {
            return Err(error(ErrorKind::ReturnOutsideFunction, return_token));
        }

        let value = if self.at_stmt_end() {
            None
        } else {
            Some(self.parse_expr_list()?)
        };

        let end = value
            .as_ref()
            .map(|e| e.span().end())
            .unwrap_or(return_token.end());
        Ok(Stmt::Return(ReturnStmt {
            value,
            span: TextRange::new(return_token.start(), end),
        }))
    }

    pub(super) fn at_stmt_end(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Newline
                | TokenKind::Semicolon
                | TokenKind::Dedent
                | TokenKind::Eof
                | TokenKind::RightParen
                | TokenKind::RightBracket
                | TokenKind::RightBrace
        )
    }

    pub(super) fn parse_if_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::If)?.span.start();
        self.parse_if_rest(start, "if statement")
    }

    /// Parse the test and suites of an `if` or `elif`; further `elif`
    /// clauses nest as an `If` inside `orelse`.
    fn parse_if_rest(&mut self, start: text_size::TextSize, header: &str) -> ParseResult<Stmt<'a>> {
        let test = self.parse_expression()?;
        let body = self.parse_suite(header)?;

        let orelse: &'a [Stmt<'a>] = if self.peek().kind == TokenKind::Elif {
            let elif_start = self.advance().span.start();
            let nested = self.parse_if_rest(elif_start, "elif clause")?;
            self.arena.alloc_slice_vec(vec![nested])
        } else if self.match_token(TokenKind::Else) {
            self.parse_suite("else clause")?
        } else {
            &[]
        };

        let end = orelse
            .last()
            .or(body.last())
            .map(|s| s.span().end())
            .unwrap_or(start);
        Ok(Stmt::If(IfStmt {
            test,
            body,
            orelse,
            span: TextRange::new(start, end),
        }))
    }

    pub(super) fn parse_func_def(
        &mut self,
        decorators: &'a [Expr<'a>],
        is_async: bool,
    ) -> ParseResult<Stmt<'a>> {
        let start = match decorators.first() {
            Some(decorator) => decorator.span().start(),
            None => self.peek().span.start(),
        };
        self.consume(TokenKind::Def)?;
        let name = self.consume_ident()?;

        let opening = self.consume(TokenKind::LeftParen)?;
        self.push_delimiter('(', opening.span);
        let args = self.parse_arguments()?;
        self.close_delimiter(TokenKind::RightParen)?;

        let returns = if self.match_token(TokenKind::Arrow) {
            Some(&*self.arena.alloc(self.parse_expression()?))
        } else {
            None
        };

        let saved_context = self.context;
        self.context = self.context.enter_function(is_async);
        let body = self.parse_suite("function definition");
        self.context = saved_context;
        let body = body?;

        let end = body.last().map(|s| s.span().end()).unwrap_or(start);
        Ok(Stmt::FuncDef(FuncDefStmt {
            name,
            args,
            body,
            decorators,
            returns,
            is_async,
            span: TextRange::new(start, end),
        }))
    }

    pub(super) fn parse_while_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::While)?.span.start();
        let test = self.parse_expression()?;

        let saved_context = self.context;
        self.context = self.context.enter_loop();
        let body = self.parse_suite("while statement");
        self.context = saved_context;
        let body = body?;

        let orelse = self.parse_loop_else()?;
        let end = orelse
            .last()
            .or(body.last())
            .map(|s| s.span().end())
            .unwrap_or(start);

        Ok(Stmt::While(WhileStmt {
            test,
            body,
            orelse,
            span: TextRange::new(start, end),
        }))
    }

    fn parse_loop_else(&mut self) -> ParseResult<&'a [Stmt<'a>]> {
        if self.match_token(TokenKind::Else) {
            self.parse_suite("else clause")
        } else {
            Ok(&[])
        }
    }

    pub(super) fn parse_for_stmt(&mut self, is_async: bool) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::For)?.span.start();
        let target = self.parse_for_target()?;
        self.consume(TokenKind::In)?;
        let iter = self.parse_expression()?;

        let saved_context = self.context;
        self.context = self.context.enter_loop();
        let body = self.parse_suite("for statement");
        self.context = saved_context;
        let body = body?;

        let orelse = self.parse_loop_else()?;
        let end = orelse
            .last()
            .or(body.last())
            .map(|s| s.span().end())
            .unwrap_or(start);

        Ok(Stmt::For(ForStmt {
            target,
            iter,
            body,
            orelse,
            is_async,
            span: TextRange::new(start, end),
        }))
    }

    /// Parse the target of a for loop, which can be a tuple or a single expression
    pub(super) fn parse_for_target(&mut self) -> ParseResult<Expr<'a>> {
        let first = self.parse_bitwise_or()?;
        if self.peek().kind != TokenKind::Comma {
            return Ok(first);
        }

        let start = first.span().start();
        let mut elts = vec![first];
        while self.match_token(TokenKind::Comma) {
            if self.peek().kind == TokenKind::In {
                break;
            }
            elts.push(self.parse_bitwise_or()?);
        }
        let end = self.prev().span.end();
        Ok(Expr::Tuple(TupleExpr {
            elts: self.arena.alloc_slice_vec(elts),
            span: TextRange::new(start, end),
        }))
    }

    pub(super) fn parse_class_def(&mut self, decorators: &'a [Expr<'a>]) -> ParseResult<Stmt<'a>> {
        let start = match decorators.first() {
            Some(decorator) => decorator.span().start(),
            None => self.peek().span.start(),
        };
        self.consume(TokenKind::Class)?;
        let name = self.consume_ident()?;

        let (bases, keywords) = if self.peek().kind == TokenKind::LeftParen {
            let opening = self.advance();
            self.push_delimiter('(', opening.span);
            let (bases, keywords) = self.parse_call_arguments()?;
            self.close_delimiter(TokenKind::RightParen)?;
            (
                self.arena.alloc_slice_iter(bases),
                self.arena.alloc_slice_iter(keywords),
            )
        } else {
            (&[][..], &[][..])
        };

        let saved_context = self.context;
        self.context = ParserContext::default();
        let body = self.parse_suite("class definition");
        self.context = saved_context;
        let body = body?;

        let end = body.last().map(|s| s.span().end()).unwrap_or(start);
        Ok(Stmt::ClassDef(ClassDefStmt {
            name,
            bases,
            keywords,
            body,
            decorators,
            span: TextRange::new(start, end),
        }))
    }

    /// Parse a dotted name (e.g., "os.path")
    fn parse_dotted_name(&mut self) -> ParseResult<&'a str> {
        let start = self.peek().span.start();
        self.consume_ident()?;
        while self.peek().kind == TokenKind::Dot {
            self.advance();
            self.consume_ident()?;
        }
        let end = self.prev().span.end();
        Ok(&self.source[TextRange::new(start, end)])
    }

    fn parse_import_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::Import)?.span.start();

        let mut names = Vec::new();
        loop {
            let name = self.parse_dotted_name()?;
            let alias = if self.match_token(TokenKind::As) {
                Some(self.consume_ident()?)
            } else {
                None
            };
            names.push((name, alias));

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let end = self.prev().span.end();
        Ok(Stmt::Import(ImportStmt {
            names: self.arena.alloc_slice_vec(names),
            span: TextRange::new(start, end),
        }))
    }

    fn parse_from_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::From)?.span.start();

        let mut level = 0;
        loop {
            match self.peek().kind {
                TokenKind::Dot => level += 1,
                TokenKind::Ellipsis => level += 3,
                _ => break,
            }
            self.advance();
        }

        let module = if self.peek().kind == TokenKind::Ident {
            Some(self.parse_dotted_name()?)
        } else {
            None
        };

        self.consume(TokenKind::Import)?;

        let mut names = Vec::new();
        if self.match_token(TokenKind::Star) {
            names.push(("*", None));
        } else {
            let has_parens = self.peek().kind == TokenKind::LeftParen;
            if has_parens {
                let opening = self.advance();
                self.push_delimiter('(', opening.span);
            }
            loop {
                if has_parens && self.peek().kind == TokenKind::RightParen {
                    break;
                }
                let name = self.consume_ident()?;
                let alias = if self.match_token(TokenKind::As) {
                    Some(self.consume_ident()?)
                } else {
                    None
                };
                names.push((name, alias));

                if !self.match_token(TokenKind::Comma) {
                    break;
                }
            }
            if has_parens {
                self.close_delimiter(TokenKind::RightParen)?;
            }
        }

        let end = self.prev().span.end();
        Ok(Stmt::From(FromStmt {
            level,
            module,
            names: self.arena.alloc_slice_vec(names),
            span: TextRange::new(start, end),
        }))
    }

    pub(super) fn parse_try_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::Try)?.span.start();
        let body = self.parse_suite("try statement")?;

        let mut handlers = Vec::new();
        while self.peek().kind == TokenKind::Except {
            let handler_start = self.advance().span.start();

            let (typ, name) = if self.peek().kind == TokenKind::Colon {
                (None, None)
            } else {
                let typ = Some(self.parse_expression()?);
                let name = if self.match_token(TokenKind::As) {
                    Some(self.consume_ident()?)
                } else {
                    None
                };
                (typ, name)
            };

            let handler_body = self.parse_suite("except clause")?;
            let handler_end = handler_body
                .last()
                .map(|s| s.span().end())
                .unwrap_or(handler_start);
            handlers.push(ExceptHandler {
                typ,
                name,
                body: handler_body,
                span: TextRange::new(handler_start, handler_end),
            });
        }

        let orelse = if self.match_token(TokenKind::Else) {
            self.parse_suite("else clause")?
        } else {
            &[]
        };
        let finalbody = if self.match_token(TokenKind::Finally) {
            self.parse_suite("finally clause")?
        } else {
            &[]
        };

        if handlers.is_empty() && finalbody.is_empty() {
            return Err(self.unexpected(Some("'except' or 'finally'")));
        }

        let end = finalbody
            .last()
            .or(orelse.last())
            .or(handlers.last().and_then(|h| h.body.last()))
            .or(body.last())
            .map(|s| s.span().end())
            .unwrap_or(start);

        Ok(Stmt::Try(TryStmt {
            body,
            handlers: self.arena.alloc_slice_vec(handlers),
            orelse,
            finalbody,
            span: TextRange::new(start, end),
        }))
    }

    pub(super) fn parse_with_stmt(&mut self, is_async: bool) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::With)?.span.start();

        let mut items = Vec::new();
        loop {
            let context_expr = self.parse_expression()?;
            let optional_vars = if self.match_token(TokenKind::As) {
                Some(self.parse_for_target()?)
            } else {
                None
            };
            items.push(WithItem {
                context_expr,
                optional_vars,
            });

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        let body = self.parse_suite("with statement")?;
        let end = body.last().map(|s| s.span().end()).unwrap_or(start);

        Ok(Stmt::With(WithStmt {
            items: self.arena.alloc_slice_vec(items),
            body,
            is_async,
            span: TextRange::new(start, end),
        }))
    }

    fn parse_raise_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::Raise)?.span.start();

        let exc = if self.at_stmt_end() {
            None
        } else {
            Some(self.parse_expression()?)
        };
        let cause = if exc.is_some() && self.match_token(TokenKind::From) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end = self.prev().span.end();
        Ok(Stmt::Raise(RaiseStmt {
            exc,
            cause,
            span: TextRange::new(start, end),
        }))
    }

    fn parse_assert_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::Assert)?.span.start();

        let test = self.parse_expression()?;
        let msg = if self.match_token(TokenKind::Comma) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        let end = self.prev().span.end();
        Ok(Stmt::Assert(AssertStmt {
            test,
            msg,
            span: TextRange::new(start, end),
        }))
    }

    fn parse_delete_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        let start = self.consume(TokenKind::Del)?.span.start();

        let mut targets = Vec::new();
        loop {
            let target = self.parse_bitwise_or()?;
            check_target(&target, false)?;
            targets.push(target);
            if !self.match_token(TokenKind::Comma) || self.at_stmt_end() {
                break;
            }
        }

        let end = self.prev().span.end();
        Ok(Stmt::Delete(DeleteStmt {
            targets: self.arena.alloc_slice_vec(targets),
            span: TextRange::new(start, end),
        }))
    }

    fn parse_name_list(&mut self, keyword: TokenKind) -> ParseResult<&'a [&'a str]> {
        self.consume(keyword)?;
        let mut names = Vec::new();
        loop {
            names.push(self.consume_ident()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        Ok(self.arena.alloc_slice_vec(names))
    }

    pub(super) fn parse_async_stmt(&mut self) -> ParseResult<Stmt<'a>> {
        self.consume(TokenKind::Async)?;

        match self.peek().kind {
            TokenKind::Def => self.parse_func_def(&[], true),
            TokenKind::For => self.parse_for_stmt(true),
            TokenKind::With => self.parse_with_stmt(true),
            _ => Err(self.unexpected(Some("'def', 'for' or 'with'"))),
        }
    }
}

/// Reject assignment to expressions that cannot be stored into.
fn check_target(target: &Expr<'_>, allow_unpack: bool) -> ParseResult<()> {
    match target {
        Expr::Name(_) | Expr::Attribute(_) | Expr::Subscript(_) => Ok(()),
        Expr::Tuple(tuple) if allow_unpack => tuple
            .elts
            .iter()
            .try_for_each(|elt| check_target(elt, true)),
        Expr::List(list) if allow_unpack => list
            .elts
            .iter()
            .try_for_each(|elt| check_target(elt, true)),
        Expr::Starred(starred) if allow_unpack => check_target(starred.value, false),
        other => Err(error(ErrorKind::InvalidAssignmentTarget, other.span())),
    }
}
