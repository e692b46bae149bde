//! Parser for the Python subset accepted by the Aseba transpiler.
//!
//! The crate turns source text into an immutable, arena-allocated AST:
//! - Logos-based lexer with indentation tracking and implicit line joining
//! - Recursive-descent parser that stops at the first error
//! - Line/column diagnostics through [`SourceMap`]
//! - A [`Visitor`] trait for read-only passes over the tree
//!
//! ```
//! use aspy_parser::{Arena, Stmt, parse};
//!
//! let arena = Arena::new();
//! let module = parse("a = 1\nwhile a < 10:\n    a += 1\n", &arena).unwrap();
//! assert_eq!(module.body.len(), 2);
//! assert!(matches!(module.body[1], Stmt::While(_)));
//! ```

pub mod arena;
pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod visitor;

pub use arena::Arena;
pub use ast::{Expr, Module, Stmt};
pub use error::{
    Diagnostic, DiagnosticCollector, ErrorCode, LineCol, ParseError, ParseResult, SourceMap,
};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use visitor::Visitor;

/// Parse a whole module into `arena`.
///
/// Spans in the returned tree index the source with `\r\n` folded to `\n`.
pub fn parse<'a>(source: &str, arena: &'a Arena) -> ParseResult<&'a Module<'a>> {
    let mut parser = Parser::new(Lexer::new(source), arena);
    parser.parse_module()
}
