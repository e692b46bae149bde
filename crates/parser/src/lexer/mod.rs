mod core;
mod cursor;
mod indentation;
mod token;

pub use core::Lexer;
pub use indentation::{IndentAnalysis, IndentationTracker};
pub use token::{LogosToken, Token, TokenKind};
