use super::operators::*;
use super::types::Parser;
use crate::ast::*;
use crate::error::{ErrorKind, ParseResult, error};
use crate::lexer::{Token, TokenKind};
use smallvec::SmallVec;
use text_size::{TextRange, TextSize};
use thin_vec::ThinVec;

impl<'a> Parser<'a> {
    pub(super) fn parse_expression(&mut self) -> ParseResult<Expr<'a>> {
        if self.peek().kind == TokenKind::Lambda {
            self.parse_lambda()
        } else {
            self.parse_ternary()
        }
    }

    fn parse_lambda(&mut self) -> ParseResult<Expr<'a>> {
        let start = self.consume(TokenKind::Lambda)?.span.start();

        let mut args: SmallVec<[Arg<'a>; 4]> = SmallVec::new();
        let mut defaults: SmallVec<[Expr<'a>; 2]> = SmallVec::new();
        let mut vararg = None;
        let mut kwarg = None;
        while self.peek().kind != TokenKind::Colon && !self.is_at_end() {
            let star = if self.match_token(TokenKind::Star) {
                1
            } else if self.match_token(TokenKind::DoubleStar) {
                2
            } else {
                0
            };
            let span = self.peek().span;
            let arg = Arg {
                arg: self.consume_ident()?,
                annotation: None,
                span,
            };
            match star {
                1 => vararg = Some(&*self.arena.alloc(arg)),
                2 => kwarg = Some(&*self.arena.alloc(arg)),
                _ => {
                    if self.match_token(TokenKind::Equal) {
                        defaults.push(self.parse_ternary()?);
                    } else if !defaults.is_empty() {
                        return Err(error(ErrorKind::InvalidParameterOrder, span));
                    }
                    args.push(arg);
                }
            }
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.consume(TokenKind::Colon)?;

        let body = self.arena.alloc(self.parse_expression()?);
        let args = Arguments {
            args: self.arena.alloc_slice_iter(args),
            vararg,
            kwarg,
            defaults: self.arena.alloc_slice_iter(defaults),
            ..Arguments::empty()
        };

        Ok(Expr::Lambda(LambdaExpr {
            args,
            body,
            span: TextRange::new(start, body.span().end()),
        }))
    }

    pub(super) fn parse_comprehensions(&mut self) -> ParseResult<&'a [Comprehension<'a>]> {
        let mut generators: SmallVec<[Comprehension<'a>; 2]> = SmallVec::new();

        while matches!(self.peek().kind, TokenKind::For | TokenKind::Async) {
            let is_async = self.match_token(TokenKind::Async);
            self.consume(TokenKind::For)?;

            let target = self.parse_for_target()?;
            self.consume(TokenKind::In)?;
            let iter = self.parse_or()?;

            let mut ifs: SmallVec<[Expr<'a>; 2]> = SmallVec::new();
            while self.match_token(TokenKind::If) {
                ifs.push(self.parse_or()?);
            }

            generators.push(Comprehension {
                target,
                iter,
                ifs: self.arena.alloc_slice_iter(ifs),
                is_async,
            });
        }

        Ok(self.arena.alloc_slice_iter(generators))
    }

    fn parse_ternary(&mut self) -> ParseResult<Expr<'a>> {
        let expr = self.parse_or()?;

        if self.match_token(TokenKind::If) {
            let test = self.parse_or()?;
            self.consume(TokenKind::Else)?;
            let orelse = self.parse_expression()?;
            let span = TextRange::new(expr.span().start(), orelse.span().end());

            return Ok(Expr::IfExp(IfExpExpr {
                test: self.arena.alloc(test),
                body: self.arena.alloc(expr),
                orelse: self.arena.alloc(orelse),
                span,
            }));
        }

        Ok(expr)
    }

    pub(super) fn parse_or(&mut self) -> ParseResult<Expr<'a>> {
        self.parse_bool_chain(TokenKind::Or, OP_OR, Self::parse_and)
    }

    fn parse_and(&mut self) -> ParseResult<Expr<'a>> {
        self.parse_bool_chain(TokenKind::And, OP_AND, Self::parse_not)
    }

    /// `a or b or c` is one `BoolOp` with three values.
    fn parse_bool_chain(
        &mut self,
        token: TokenKind,
        op: &'static str,
        operand: fn(&mut Self) -> ParseResult<Expr<'a>>,
    ) -> ParseResult<Expr<'a>> {
        let first = operand(self)?;
        if self.peek().kind != token {
            return Ok(first);
        }

        let mut values: SmallVec<[Expr<'a>; 2]> = SmallVec::new();
        values.push(first);
        while self.match_token(token) {
            values.push(operand(self)?);
        }

        let start = values[0].span().start();
        let end = self.prev().span.end();
        Ok(Expr::BoolOp(BoolOpExpr {
            op,
            values: self.arena.alloc_slice_iter(values),
            span: TextRange::new(start, end),
        }))
    }

    fn parse_not(&mut self) -> ParseResult<Expr<'a>> {
        if self.peek().kind == TokenKind::Not {
            let start = self.advance().span.start();
            let expr = self.parse_not()?;
            let span = TextRange::new(start, expr.span().end());
            Ok(Expr::UnaryOp(UnaryOpExpr {
                op: OP_NOT,
                operand: self.arena.alloc(expr),
                span,
            }))
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> ParseResult<Expr<'a>> {
        let left = self.parse_bitwise_or()?;
        let mut ops: SmallVec<[&'a str; 2]> = SmallVec::new();
        let mut comparators: SmallVec<[Expr<'a>; 2]> = SmallVec::new();

        loop {
            let kind = self.peek().kind;
            let op = match (kind, self.peek_nth(1)) {
                (TokenKind::Is, TokenKind::Not) => {
                    self.advance();
                    OP_IS_NOT
                }
                (TokenKind::Not, TokenKind::In) => {
                    self.advance();
                    OP_NOT_IN
                }
                _ => match comparison_op(kind) {
                    Some(op) => op,
                    None => break,
                },
            };
            self.advance();

            ops.push(op);
            comparators.push(self.parse_bitwise_or()?);
        }

        if ops.is_empty() {
            return Ok(left);
        }

        let span = TextRange::new(left.span().start(), self.prev().span.end());
        Ok(Expr::Compare(CompareExpr {
            left: self.arena.alloc(left),
            ops: self.arena.alloc_slice_iter(ops),
            comparators: self.arena.alloc_slice_iter(comparators),
            span,
        }))
    }

    pub(super) fn parse_bitwise_or(&mut self) -> ParseResult<Expr<'a>> {
        self.parse_binary_level(0)
    }

    /// Left-associative operators of `BINARY_LEVELS[level]`, with tighter
    /// levels as operands.
    fn parse_binary_level(&mut self, level: usize) -> ParseResult<Expr<'a>> {
        let operand = |parser: &mut Self| {
            if level + 1 < BINARY_LEVELS.len() {
                parser.parse_binary_level(level + 1)
            } else {
                parser.parse_unary()
            }
        };
        let mut left = operand(self)?;

        while let Some(op) = binary_op(level, self.peek().kind) {
            self.advance();
            let right = operand(self)?;
            let span = TextRange::new(left.span().start(), right.span().end());

            left = Expr::BinOp(BinOpExpr {
                left: self.arena.alloc(left),
                op,
                right: self.arena.alloc(right),
                span,
            });
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expr<'a>> {
        let Some(op) = unary_op(self.peek().kind) else {
            return self.parse_power();
        };
        let start = self.advance().span.start();
        let expr = self.parse_unary()?;
        let span = TextRange::new(start, expr.span().end());
        Ok(Expr::UnaryOp(UnaryOpExpr {
            op,
            operand: self.arena.alloc(expr),
            span,
        }))
    }

    fn parse_power(&mut self) -> ParseResult<Expr<'a>> {
        let left = self.parse_await()?;

        if self.match_token(TokenKind::DoubleStar) {
            // right-associative, and binds tighter than a unary minus on its left
            let right = self.parse_unary()?;
            let span = TextRange::new(left.span().start(), right.span().end());

            return Ok(Expr::BinOp(BinOpExpr {
                left: self.arena.alloc(left),
                op: OP_POW,
                right: self.arena.alloc(right),
                span,
            }));
        }

        Ok(left)
    }

    fn parse_await(&mut self) -> ParseResult<Expr<'a>> {
        if self.peek().kind != TokenKind::Await {
            return self.parse_postfix();
        }

        let await_token = self.advance().span;
        if !self.context.in_async_function {
            return Err(error(ErrorKind::AwaitOutsideAsync, await_token));
        }
        let expr = self.parse_postfix()?;
        let span = TextRange::new(await_token.start(), expr.span().end());
        Ok(Expr::Await(AwaitExpr {
            value: self.arena.alloc(expr),
            span,
        }))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expr<'a>> {
        let mut expr = self.parse_primary()?;
        let start = expr.span().start();

        loop {
            match self.peek().kind {
                TokenKind::LeftParen => {
                    let opening = self.advance();
                    self.push_delimiter('(', opening.span);
                    let (args, keywords) = self.parse_call_arguments()?;
                    let closing = self.close_delimiter(TokenKind::RightParen)?;

                    expr = Expr::Call(CallExpr {
                        func: self.arena.alloc(expr),
                        args: self.arena.alloc_slice_iter(args),
                        keywords: self.arena.alloc_slice_iter(keywords),
                        span: TextRange::new(start, closing.span.end()),
                    });
                }
                TokenKind::LeftBracket => {
                    let opening = self.advance();
                    self.push_delimiter('[', opening.span);

                    let first = self.parse_slice_element()?;
                    let slice = if self.peek().kind == TokenKind::Comma {
                        let slice_start = first.span().start();
                        let mut elts = vec![first];
                        while self.match_token(TokenKind::Comma) {
                            if self.peek().kind == TokenKind::RightBracket {
                                break;
                            }
                            elts.push(self.parse_slice_element()?);
                        }
                        Expr::Tuple(TupleExpr {
                            elts: self.arena.alloc_slice_vec(elts),
                            span: TextRange::new(slice_start, self.prev().span.end()),
                        })
                    } else {
                        first
                    };
                    let closing = self.close_delimiter(TokenKind::RightBracket)?;

                    expr = Expr::Subscript(SubscriptExpr {
                        value: self.arena.alloc(expr),
                        slice: self.arena.alloc(slice),
                        span: TextRange::new(start, closing.span.end()),
                    });
                }
                TokenKind::Dot => {
                    self.advance();
                    let attr = self.consume_ident()?;
                    expr = Expr::Attribute(AttributeExpr {
                        value: self.arena.alloc(expr),
                        attr,
                        span: TextRange::new(start, self.prev().span.end()),
                    });
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_primary(&mut self) -> ParseResult<Expr<'a>> {
        match self.peek().kind {
            TokenKind::Number => {
                let token = self.advance();
                let value = self.text(token);
                Ok(Expr::Constant(ConstantExpr {
                    value,
                    kind: number_kind(value),
                    span: token.span,
                }))
            }
            TokenKind::String | TokenKind::RawString | TokenKind::FString => {
                self.parse_string_literals()
            }
            TokenKind::Ident => {
                let span = self.peek().span;
                let id = self.consume_ident()?;
                Ok(Expr::Name(NameExpr { id, span }))
            }
            TokenKind::True => Ok(self.keyword_constant(CONST_TRUE, ConstantKind::True)),
            TokenKind::False => Ok(self.keyword_constant(CONST_FALSE, ConstantKind::False)),
            TokenKind::None => Ok(self.keyword_constant(CONST_NONE, ConstantKind::None)),
            TokenKind::Ellipsis => Ok(self.keyword_constant(CONST_ELLIPSIS, ConstantKind::Ellipsis)),
            TokenKind::LeftParen => self.parse_paren(),
            TokenKind::LeftBracket => self.parse_list_display(),
            TokenKind::LeftBrace => self.parse_brace_display(),
            TokenKind::Yield => self.parse_yield_expr(),
            TokenKind::RightParen | TokenKind::RightBracket | TokenKind::RightBrace
                if self.delimiter_stack.is_empty() =>
            {
                let delimiter = match self.peek().kind {
                    TokenKind::RightParen => ')',
                    TokenKind::RightBracket => ']',
                    _ => '}',
                };
                Err(error(
                    ErrorKind::UnmatchedClosing { delimiter },
                    self.peek().span,
                ))
            }
            _ => Err(self.unexpected(Some("expression"))),
        }
    }

    fn keyword_constant(&mut self, value: &'static str, kind: ConstantKind) -> Expr<'a> {
        let token = self.advance();
        Expr::Constant(ConstantExpr {
            value,
            kind,
            span: token.span,
        })
    }

    /// Adjacent literals join into one constant, so `"""doc"""` lexed as
    /// three literals reads back as `doc`. Any f-string part makes the whole
    /// run a `JoinedStr`.
    fn parse_string_literals(&mut self) -> ParseResult<Expr<'a>> {
        let mut tokens: SmallVec<[Token; 3]> = SmallVec::new();
        while matches!(
            self.peek().kind,
            TokenKind::String | TokenKind::RawString | TokenKind::FString
        ) {
            tokens.push(self.advance());
        }

        let start = tokens[0].span.start();
        let end = self.prev().span.end();
        let span = TextRange::new(start, end);

        if tokens.iter().any(|t| t.kind == TokenKind::FString) {
            return Ok(Expr::JoinedStr(JoinedStrExpr {
                raw: &self.source[span],
                span,
            }));
        }

        let mut value = String::new();
        for token in &tokens {
            let text = self.text(*token);
            if token.kind == TokenKind::RawString {
                value.push_str(&text[2..text.len() - 1]);
            } else {
                decode_escapes(&text[1..text.len() - 1], &mut value);
            }
        }

        Ok(Expr::Constant(ConstantExpr {
            value: self.arena.alloc_str(&value),
            kind: ConstantKind::Str,
            span,
        }))
    }

    fn parse_paren(&mut self) -> ParseResult<Expr<'a>> {
        let opening = self.advance();
        let start = opening.span.start();
        self.push_delimiter('(', opening.span);

        if self.peek().kind == TokenKind::RightParen {
            let closing = self.close_delimiter(TokenKind::RightParen)?;
            return Ok(Expr::Tuple(TupleExpr {
                elts: &[],
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        let first = self.parse_star_or_expression()?;

        if matches!(self.peek().kind, TokenKind::For | TokenKind::Async) {
            let generators = self.parse_comprehensions()?;
            let closing = self.close_delimiter(TokenKind::RightParen)?;
            return Ok(Expr::GeneratorExp(GeneratorExpExpr {
                elt: self.arena.alloc(first),
                generators,
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        if !self.match_token(TokenKind::Comma) {
            self.close_delimiter(TokenKind::RightParen)?;
            return Ok(first);
        }

        let mut elts = vec![first];
        while self.peek().kind != TokenKind::RightParen && !self.is_at_end() {
            elts.push(self.parse_star_or_expression()?);
            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }
        let closing = self.close_delimiter(TokenKind::RightParen)?;
        Ok(Expr::Tuple(TupleExpr {
            elts: self.arena.alloc_slice_vec(elts),
            span: TextRange::new(start, closing.span.end()),
        }))
    }

    fn parse_list_display(&mut self) -> ParseResult<Expr<'a>> {
        let opening = self.advance();
        let start = opening.span.start();
        self.push_delimiter('[', opening.span);

        if self.peek().kind == TokenKind::RightBracket {
            let closing = self.close_delimiter(TokenKind::RightBracket)?;
            return Ok(Expr::List(ListExpr {
                elts: &[],
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        let first = self.parse_star_or_expression()?;

        if matches!(self.peek().kind, TokenKind::For | TokenKind::Async) {
            let generators = self.parse_comprehensions()?;
            let closing = self.close_delimiter(TokenKind::RightBracket)?;
            return Ok(Expr::ListComp(ListCompExpr {
                elt: self.arena.alloc(first),
                generators,
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        let mut elts = vec![first];
        while self.match_token(TokenKind::Comma) {
            if self.peek().kind == TokenKind::RightBracket {
                break;
            }
            elts.push(self.parse_star_or_expression()?);
        }
        let closing = self.close_delimiter(TokenKind::RightBracket)?;
        Ok(Expr::List(ListExpr {
            elts: self.arena.alloc_slice_vec(elts),
            span: TextRange::new(start, closing.span.end()),
        }))
    }

    fn parse_brace_display(&mut self) -> ParseResult<Expr<'a>> {
        let opening = self.advance();
        let start = opening.span.start();
        self.push_delimiter('{', opening.span);

        if self.peek().kind == TokenKind::RightBrace {
            let closing = self.close_delimiter(TokenKind::RightBrace)?;
            return Ok(Expr::Dict(DictExpr {
                keys: &[],
                values: &[],
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        let first_key = if self.match_token(TokenKind::DoubleStar) {
            None
        } else {
            Some(self.parse_star_or_expression()?)
        };

        let is_dict = first_key.is_none() || self.peek().kind == TokenKind::Colon;
        if !is_dict {
            let first = first_key.ok_or_else(|| self.unexpected(None))?;
            return self.finish_set_display(start, first);
        }

        let first_value = if first_key.is_some() {
            self.consume(TokenKind::Colon)?;
            self.parse_expression()?
        } else {
            self.parse_bitwise_or()?
        };

        if let Some(key) = &first_key
            && matches!(self.peek().kind, TokenKind::For | TokenKind::Async)
        {
            let generators = self.parse_comprehensions()?;
            let closing = self.close_delimiter(TokenKind::RightBrace)?;
            return Ok(Expr::DictComp(DictCompExpr {
                key: self.arena.alloc(key.clone()),
                value: self.arena.alloc(first_value),
                generators,
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        let mut keys: ThinVec<Option<Expr<'a>>> = ThinVec::new();
        let mut values: ThinVec<Expr<'a>> = ThinVec::new();
        keys.push(first_key);
        values.push(first_value);

        while self.match_token(TokenKind::Comma) {
            if self.peek().kind == TokenKind::RightBrace {
                break;
            }
            if self.match_token(TokenKind::DoubleStar) {
                keys.push(None);
                values.push(self.parse_bitwise_or()?);
            } else {
                keys.push(Some(self.parse_expression()?));
                self.consume(TokenKind::Colon)?;
                values.push(self.parse_expression()?);
            }
        }

        let closing = self.close_delimiter(TokenKind::RightBrace)?;
        Ok(Expr::Dict(DictExpr {
            keys: self.arena.alloc_slice_iter(keys),
            values: self.arena.alloc_slice_iter(values),
            span: TextRange::new(start, closing.span.end()),
        }))
    }

    fn finish_set_display(&mut self, start: TextSize, first: Expr<'a>) -> ParseResult<Expr<'a>> {
        if matches!(self.peek().kind, TokenKind::For | TokenKind::Async) {
            let generators = self.parse_comprehensions()?;
            let closing = self.close_delimiter(TokenKind::RightBrace)?;
            return Ok(Expr::SetComp(SetCompExpr {
                elt: self.arena.alloc(first),
                generators,
                span: TextRange::new(start, closing.span.end()),
            }));
        }

        let mut elts = vec![first];
        while self.match_token(TokenKind::Comma) {
            if self.peek().kind == TokenKind::RightBrace {
                break;
            }
            elts.push(self.parse_star_or_expression()?);
        }
        let closing = self.close_delimiter(TokenKind::RightBrace)?;
        Ok(Expr::Set(SetExpr {
            elts: self.arena.alloc_slice_vec(elts),
            span: TextRange::new(start, closing.span.end()),
        }))
    }

    pub(super) fn parse_call_arguments(
        &mut self,
    ) -> ParseResult<(ThinVec<Expr<'a>>, ThinVec<Keyword<'a>>)> {
        let mut args = ThinVec::new();
        let mut keywords: ThinVec<Keyword<'a>> = ThinVec::new();
        let mut seen_keyword = false;

        while self.peek().kind != TokenKind::RightParen && !self.is_at_end() {
            let start = self.peek().span.start();

            if self.match_token(TokenKind::DoubleStar) {
                let value = self.parse_expression()?;
                seen_keyword = true;
                keywords.push(Keyword {
                    arg: None,
                    span: TextRange::new(start, value.span().end()),
                    value,
                });
            } else if self.peek().kind == TokenKind::Ident && self.peek_nth(1) == TokenKind::Equal {
                let name = self.consume_ident()?;
                self.advance();
                if keywords.iter().any(|k| k.arg == Some(name)) {
                    return Err(error(
                        ErrorKind::DuplicateArgument {
                            name: name.to_string(),
                        },
                        TextRange::new(start, self.prev().span.end()),
                    ));
                }
                let value = self.parse_expression()?;
                seen_keyword = true;
                keywords.push(Keyword {
                    arg: Some(name),
                    span: TextRange::new(start, value.span().end()),
                    value,
                });
            } else {
                if seen_keyword && self.peek().kind != TokenKind::Star {
                    return Err(error(ErrorKind::PositionalAfterKeyword, self.peek().span));
                }
                let arg = self.parse_star_or_expression()?;
                if args.is_empty()
                    && keywords.is_empty()
                    && matches!(self.peek().kind, TokenKind::For | TokenKind::Async)
                {
                    let generators = self.parse_comprehensions()?;
                    let span = TextRange::new(start, self.prev().span.end());
                    args.push(Expr::GeneratorExp(GeneratorExpExpr {
                        elt: self.arena.alloc(arg),
                        generators,
                        span,
                    }));
                } else {
                    args.push(arg);
                }
            }

            if !self.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok((args, keywords))
    }

    /// Parse a slice element which can be either an index expression or a slice notation.
    /// Examples: `1`, `1:5`, `:5`, `1:`, `::2`, `1:5:2`
    fn parse_slice_element(&mut self) -> ParseResult<Expr<'a>> {
        let start = self.peek().span.start();
        let lower = if self.peek().kind == TokenKind::Colon {
            None
        } else {
            let expr = self.parse_expression()?;
            if self.peek().kind != TokenKind::Colon {
                return Ok(expr);
            }
            Some(&*self.arena.alloc(expr))
        };
        self.consume(TokenKind::Colon)?;

        let slice_bound_ends = |kind: TokenKind| {
            matches!(
                kind,
                TokenKind::Colon | TokenKind::RightBracket | TokenKind::Comma
            )
        };

        let upper = if slice_bound_ends(self.peek().kind) {
            None
        } else {
            Some(&*self.arena.alloc(self.parse_expression()?))
        };
        let step = if self.match_token(TokenKind::Colon) && !slice_bound_ends(self.peek().kind) {
            Some(&*self.arena.alloc(self.parse_expression()?))
        } else {
            None
        };

        Ok(Expr::Slice(SliceExpr {
            lower,
            upper,
            step,
            span: TextRange::new(start, self.prev().span.end()),
        }))
    }

    fn parse_yield_expr(&mut self) -> ParseResult<Expr<'a>> {
        let yield_token = self.consume(TokenKind::Yield)?.span;
        if !self.context.in_function {
            return Err(error(ErrorKind::YieldOutsideFunction, yield_token));
        }

        if self.match_token(TokenKind::From) {
            let value = self.parse_expression()?;
            let span = TextRange::new(yield_token.start(), value.span().end());
            return Ok(Expr::YieldFrom(YieldFromExpr {
                value: self.arena.alloc(value),
                span,
            }));
        }

        let value = if self.at_stmt_end() {
            None
        } else {
            Some(&*self.arena.alloc(self.parse_expression()?))
        };
        let end = value
            .map(|e| e.span().end())
            .unwrap_or(yield_token.end());

        Ok(Expr::Yield(YieldExpr {
            value,
            span: TextRange::new(yield_token.start(), end),
        }))
    }
}

/// Integer or float, judged from the literal's spelling.
fn number_kind(text: &str) -> ConstantKind {
    let lower = text.to_ascii_lowercase();
    if lower.starts_with("0x") || lower.starts_with("0o") || lower.starts_with("0b") {
        ConstantKind::Int
    } else if lower.contains(['.', 'e']) {
        ConstantKind::Float
    } else {
        ConstantKind::Int
    }
}

/// Append the value of a quoted string body, resolving backslash escapes.
/// Unknown escapes are kept as written.
fn decode_escapes(body: &str, out: &mut String) {
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some('\'') => out.push('\''),
            Some('"') => out.push('"'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
}
