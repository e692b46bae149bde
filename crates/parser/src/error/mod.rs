//! Centralized error handling for the aspy front end.
//!
//! Lexical and syntax errors share one `Error` type keyed by `ErrorKind`.
//! Errors and warnings both convert to a `Diagnostic` carrying a code, a
//! message and 1-based source coordinates computed through a `SourceMap`.

pub mod codes;
pub mod diagnostic;
pub mod kinds;
pub mod source_map;
pub mod types;
pub mod warnings;

pub use codes::{ErrorCode, Severity};
pub use diagnostic::{Diagnostic, DiagnosticCollector};
pub use kinds::ErrorKind;
pub use source_map::{LineCol, SourceMap};
pub use types::{Error, error};
pub use warnings::{Warning, WarningCategory, WarningCollector, WarningKind};

/// Alias kept for callers that name the parser's error explicitly.
pub type ParseError = Error;

/// Result of any parsing operation. Errors are boxed to keep `Ok` paths small.
pub type ParseResult<T> = Result<T, Box<Error>>;
