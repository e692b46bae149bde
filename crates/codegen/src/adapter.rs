//! Uniform queries over the parser's tree.
//!
//! The compiler never inspects raw spans or literal spellings itself; it asks
//! this module for a node's tag, its location, its dotted name or its
//! compile-time integer value.

use crate::error::{CompileError, Location};
use aspy_parser::SourceMap;
use aspy_parser::ast::{ConstantKind, Expr, Stmt};
use text_size::TextRange;

/// Converts spans into locations relative to the user's source.
///
/// The preamble is parsed in front of the user's text; its lines are
/// subtracted so that reported positions match what the user wrote.
#[derive(Debug, Clone)]
pub struct Locator {
    map: SourceMap,
    skipped_lines: u32,
}

impl Locator {
    pub fn new(text: &str, skipped_lines: u32) -> Self {
        Locator {
            map: SourceMap::new(text),
            skipped_lines,
        }
    }

    pub fn location(&self, span: TextRange) -> Location {
        let mut position = self.map.line_col(span.start());
        position.line = position.line.saturating_sub(self.skipped_lines).max(1);
        position
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.map
    }

    pub fn unsupported_stmt(&self, stmt: &Stmt<'_>) -> CompileError {
        CompileError::unsupported(stmt.kind_name(), self.location(stmt.span()))
    }

    pub fn unsupported_expr(&self, expr: &Expr<'_>) -> CompileError {
        CompileError::unsupported(expr.kind_name(), self.location(expr.span()))
    }
}

/// `a`, `a.b` or `a.b.c` for names and attribute chains over names.
pub fn dotted_name(expr: &Expr<'_>) -> Option<String> {
    match expr {
        Expr::Name(name) => Some(name.id.to_string()),
        Expr::Attribute(attr) => {
            let mut base = dotted_name(attr.value)?;
            base.push('.');
            base.push_str(attr.attr);
            Some(base)
        }
        _ => None,
    }
}

/// Value of an integer literal spelling, with `_` separators and radix
/// prefixes.
pub fn parse_int(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|&c| c != '_').collect();
    let lower = digits.to_ascii_lowercase();
    if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16).ok()
    } else if let Some(oct) = lower.strip_prefix("0o") {
        i64::from_str_radix(oct, 8).ok()
    } else if let Some(bin) = lower.strip_prefix("0b") {
        i64::from_str_radix(bin, 2).ok()
    } else {
        lower.parse().ok()
    }
}

/// Compile-time integer value of a literal, a Boolean literal, or a signed
/// literal.
pub fn int_constant(expr: &Expr<'_>) -> Option<i64> {
    match expr {
        Expr::Constant(constant) => match constant.kind {
            ConstantKind::Int => parse_int(constant.value),
            ConstantKind::True => Some(1),
            ConstantKind::False => Some(0),
            _ => None,
        },
        Expr::UnaryOp(unary) if unary.op == "-" => int_constant(unary.operand).map(|v| -v),
        Expr::UnaryOp(unary) if unary.op == "+" => int_constant(unary.operand),
        _ => None,
    }
}

pub fn string_constant<'a>(expr: &Expr<'a>) -> Option<&'a str> {
    match expr {
        Expr::Constant(constant) if constant.kind == ConstantKind::Str => Some(constant.value),
        _ => None,
    }
}

/// Expression statements that do nothing: docstrings, `...` and bare
/// literals.
pub fn is_inert(expr: &Expr<'_>) -> bool {
    matches!(
        expr,
        Expr::Constant(c) if matches!(
            c.kind,
            ConstantKind::Str | ConstantKind::Ellipsis | ConstantKind::None | ConstantKind::Int
        )
    )
}

/// Array size of `[0] * N` or `N * [0]` with a constant `N`, as used for
/// array parameter defaults.
pub fn repeated_list<'e, 'a>(expr: &'e Expr<'a>) -> Option<(&'e [Expr<'a>], i64)> {
    let Expr::BinOp(binop) = expr else {
        return None;
    };
    if binop.op != "*" {
        return None;
    }
    match (binop.left, binop.right) {
        (Expr::List(list), count) | (count, Expr::List(list)) => {
            int_constant(count).map(|n| (list.elts, n))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspy_parser::{Arena, parse};

    fn first_expr<'a>(source: &str, arena: &'a Arena) -> &'a Expr<'a> {
        let module = parse(source, arena).unwrap();
        match &module.body[0] {
            Stmt::Expr(stmt) => &stmt.value,
            Stmt::Assign(stmt) => &stmt.value,
            other => panic!("unexpected statement {}", other.kind_name()),
        }
    }

    #[test]
    fn integer_spellings() {
        assert_eq!(parse_int("1_000"), Some(1000));
        assert_eq!(parse_int("0x1F"), Some(31));
        assert_eq!(parse_int("0b101"), Some(5));
        assert_eq!(parse_int("0o17"), Some(15));
    }

    #[test]
    fn signed_constants_fold() {
        let arena = Arena::new();
        assert_eq!(int_constant(first_expr("-5", &arena)), Some(-5));
        assert_eq!(int_constant(first_expr("True", &arena)), Some(1));
        assert_eq!(int_constant(first_expr("x", &arena)), None);
    }

    #[test]
    fn attribute_chains_are_dotted() {
        let arena = Arena::new();
        assert_eq!(dotted_name(first_expr("clock.seconds", &arena)).as_deref(), Some("clock.seconds"));
        assert_eq!(dotted_name(first_expr("a[1]", &arena)), None);
    }

    #[test]
    fn repeated_list_size() {
        let arena = Arena::new();
        let (elts, count) = repeated_list(first_expr("a = [0] * 4", &arena)).unwrap();
        assert_eq!(elts.len(), 1);
        assert_eq!(count, 4);
    }

    #[test]
    fn locations_skip_preamble_lines() {
        let locator = Locator::new("from thymio import *\nx = 1\n", 1);
        let span = TextRange::new(21.into(), 22.into());
        assert_eq!(locator.location(span), Location { line: 1, column: 1 });
    }
}
