//! Error codes and severities shared by the parser and the transpiler core.

use std::fmt;

/// Error severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational message
    Info,
    /// Warning that doesn't prevent compilation
    Warning,
    /// Error that prevents successful compilation
    Error,
    /// Fatal error that stops processing immediately
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        };
        f.write_str(text)
    }
}

/// Stable diagnostic codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // ===== Lexical Errors (E1xxx) =====
    E1001, // Invalid character
    E1002, // Unterminated string literal
    E1003, // Invalid number literal
    E1005, // Mixed tabs and spaces

    // ===== Syntax Errors (E2xxx) =====
    E2001, // Unexpected token
    E2003, // Unexpected EOF
    E2004, // Invalid syntax
    E2005, // Indentation error
    E2006, // Unclosed delimiter
    E2007, // Unmatched closing delimiter
    E2008, // Missing colon
    E2010, // Invalid assignment target
    E2011, // Break outside loop
    E2012, // Continue outside loop
    E2013, // Return outside function
    E2014, // Yield outside function
    E2015, // Await outside async function
    E2016, // Duplicate parameter
    E2017, // Duplicate keyword argument
    E2018, // Positional argument after keyword argument
    E2019, // Invalid parameter order

    // ===== Translation Errors (E5xxx) =====
    E5001, // Unsupported construct
    E5002, // Unknown name
    E5003, // Incompatible size
    E5004, // Bad decorator
    E5005, // Recursion
    E5006, // Bad event
    E5099, // Internal error

    // ===== Warnings (W3xxx) =====
    W3001, // Local shadows a robot variable
    W3002, // Local shadows a top-level variable
    W3003, // Function never called
}

impl ErrorCode {
    /// Severity implied by the code family.
    pub fn severity(self) -> Severity {
        match self {
            ErrorCode::W3001 | ErrorCode::W3002 | ErrorCode::W3003 => Severity::Warning,
            ErrorCode::E5099 => Severity::Fatal,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
