//! Recursive-descent parser producing the arena AST.

mod decorators;
mod expr;
mod operators;
mod stmt;
mod types;

pub use types::Parser;
