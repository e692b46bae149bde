//! Operator spellings and precedence of the Python subset.
//!
//! The AST stores operators as their Python spelling, borrowed from these
//! tables so no operator string is ever allocated. Every operator keeps its
//! Python precedence even when the Aseba target reorders it; the code
//! generator parenthesizes from the tree, not from the source.

use crate::lexer::TokenKind;

/// Binary operator levels between comparisons and unary operators, loosest
/// first. All are left-associative. `/` and `@` are parsed so that they can
/// be refused with a hint; Aseba has neither.
pub const BINARY_LEVELS: &[&[(TokenKind, &str)]] = &[
    &[(TokenKind::Pipe, "|")],
    &[(TokenKind::Caret, "^")],
    &[(TokenKind::Ampersand, "&")],
    &[(TokenKind::LeftShift, "<<"), (TokenKind::RightShift, ">>")],
    &[(TokenKind::Plus, "+"), (TokenKind::Minus, "-")],
    &[
        (TokenKind::Star, "*"),
        (TokenKind::Slash, "/"),
        (TokenKind::DoubleSlash, "//"),
        (TokenKind::Percent, "%"),
        (TokenKind::At, "@"),
    ],
];

/// Spelling of the binary operator `kind` at `level`, if it belongs there.
pub fn binary_op(level: usize, kind: TokenKind) -> Option<&'static str> {
    BINARY_LEVELS[level]
        .iter()
        .find(|(token, _)| *token == kind)
        .map(|(_, op)| *op)
}

/// Spelling of a single-token comparison. `not in` and `is not` take two
/// tokens and are matched by the parser.
pub fn comparison_op(kind: TokenKind) -> Option<&'static str> {
    let op = match kind {
        TokenKind::Less => "<",
        TokenKind::LessEqual => "<=",
        TokenKind::Greater => ">",
        TokenKind::GreaterEqual => ">=",
        TokenKind::EqualEqual => "==",
        TokenKind::NotEqual => "!=",
        TokenKind::In => "in",
        TokenKind::Is => "is",
        _ => return None,
    };
    Some(op)
}

pub fn unary_op(kind: TokenKind) -> Option<&'static str> {
    match kind {
        TokenKind::Minus => Some("-"),
        TokenKind::Plus => Some("+"),
        TokenKind::Tilde => Some("~"),
        _ => None,
    }
}

pub const OP_AND: &str = "and";
pub const OP_OR: &str = "or";
pub const OP_NOT: &str = "not";
/// Right-associative and tighter than unary minus on its left.
pub const OP_POW: &str = "**";
pub const OP_NOT_IN: &str = "not in";
pub const OP_IS_NOT: &str = "is not";

// Keyword constants, kept under their source spelling
pub const CONST_TRUE: &str = "True";
pub const CONST_FALSE: &str = "False";
pub const CONST_NONE: &str = "None";
pub const CONST_ELLIPSIS: &str = "...";
