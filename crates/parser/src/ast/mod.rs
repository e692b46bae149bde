//! Abstract Syntax Tree (AST) definition.

pub mod expr;
pub mod nodes;
pub mod ops;

pub use expr::*;
pub use nodes::*;
pub use ops::{BinaryOp, BoolOp, ComparisonOp, UnaryOp};
