//! # Aspy Code Generation
//!
//! This crate translates a Python subset into Aseba, the event-driven
//! language of the Thymio II robot. Aseba only knows 16-bit words and fixed
//! arrays of words, declared up front, with no call stack and no Booleans in
//! arithmetic.
//!
//! ## Architecture
//!
//! The translation pipeline:
//! 1. **Input**: AST from `aspy_parser`, read through [`adapter`]
//! 2. **Split**: imports, plain functions, `@onevent` handlers and
//!    initialization code ([`transpiler`])
//! 3. **Statements**: assignments, control flow and returns, with jumps
//!    turned into guard flags ([`compiler::StmtCompiler`])
//! 4. **Expressions**: Aseba text plus the statements that must precede it,
//!    spilling into the `_tmp` scratch array ([`compiler::ExprCompiler`])
//! 5. **Calls**: user functions are inlined; natives come from the
//!    [`modules`] registry
//! 6. **Output**: declarations, initialization code, `onevent` blocks and
//!    [`Metadata`] for the host
//!
//! ## Usage
//!
//! ```rust
//! use aspy_codegen::simple_transpile;
//!
//! let aseba = simple_transpile("x = 1\ny = (x < 5) * 10\n").unwrap();
//! assert!(aseba.contains("var _tmp[1]"));
//! assert!(aseba.contains("y = _tmp[0] * 10"));
//! ```

pub mod adapter;
pub mod block;
pub mod compiler;
pub mod error;
pub mod metadata;
pub mod modules;
pub mod names;
pub mod priority;
pub mod shape;
pub mod transpiler;

pub use error::{CompileError, CompileResult, Location};
pub use metadata::{Metadata, PrintFormat};
pub use modules::{Module, ModuleRegistry};
pub use shape::Shape;
pub use transpiler::{Transpiler, TranspilerConfig, missing_globals, simple_transpile};
