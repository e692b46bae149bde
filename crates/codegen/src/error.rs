//! Translation error types

use aspy_parser::error::{Diagnostic, ErrorCode, LineCol, ParseError};
use thiserror::Error;

/// 1-based line and column of the offending node.
pub type Location = LineCol;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("{location}: syntax error: {error}")]
    Syntax {
        error: Box<ParseError>,
        location: Location,
    },

    #[error("{location}: unsupported construct: {kind}")]
    UnsupportedConstruct { kind: String, location: Location },

    #[error("{location}: unknown name '{name}'")]
    UnknownName { name: String, location: Location },

    #[error("{location}: incompatible size for '{name}': expected {expected}, got {got}")]
    IncompatibleSize {
        name: String,
        expected: usize,
        got: usize,
        location: Location,
    },

    #[error("{location}: bad decorator: {message}")]
    BadDecorator { message: String, location: Location },

    #[error("{location}: recursive call chain {}", path.join(" -> "))]
    Recursion {
        path: Vec<String>,
        location: Location,
    },

    #[error("{location}: bad event '{name}': {message}")]
    BadEvent {
        name: String,
        message: String,
        location: Location,
    },

    #[error("{location}: internal error: {message}")]
    Internal { message: String, location: Location },
}

impl CompileError {
    pub fn location(&self) -> Location {
        match self {
            CompileError::Syntax { location, .. }
            | CompileError::UnsupportedConstruct { location, .. }
            | CompileError::UnknownName { location, .. }
            | CompileError::IncompatibleSize { location, .. }
            | CompileError::BadDecorator { location, .. }
            | CompileError::Recursion { location, .. }
            | CompileError::BadEvent { location, .. }
            | CompileError::Internal { location, .. } => *location,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CompileError::Syntax { error, .. } => error.kind.code(),
            CompileError::UnsupportedConstruct { .. } => ErrorCode::E5001,
            CompileError::UnknownName { .. } => ErrorCode::E5002,
            CompileError::IncompatibleSize { .. } => ErrorCode::E5003,
            CompileError::BadDecorator { .. } => ErrorCode::E5004,
            CompileError::Recursion { .. } => ErrorCode::E5005,
            CompileError::BadEvent { .. } => ErrorCode::E5006,
            CompileError::Internal { .. } => ErrorCode::E5099,
        }
    }

    /// Message without the location prefix.
    pub fn message(&self) -> String {
        let full = self.to_string();
        let prefix = format!("{}: ", self.location());
        match full.strip_prefix(&prefix) {
            Some(rest) => rest.to_string(),
            None => full,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let code = self.code();
        Diagnostic::new(code.severity(), self.message())
            .with_code(code)
            .at(self.location())
    }

    pub fn unsupported(kind: impl Into<String>, location: Location) -> Self {
        CompileError::UnsupportedConstruct {
            kind: kind.into(),
            location,
        }
    }

    pub fn unknown(name: impl Into<String>, location: Location) -> Self {
        CompileError::UnknownName {
            name: name.into(),
            location,
        }
    }

    pub fn size(name: impl Into<String>, expected: usize, got: usize, location: Location) -> Self {
        CompileError::IncompatibleSize {
            name: name.into(),
            expected,
            got,
            location,
        }
    }

    pub fn bad_event(name: impl Into<String>, message: impl Into<String>, location: Location) -> Self {
        CompileError::BadEvent {
            name: name.into(),
            message: message.into(),
            location,
        }
    }

    pub fn internal(message: impl Into<String>, location: Location) -> Self {
        CompileError::Internal {
            message: message.into(),
            location,
        }
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_drops_location_prefix() {
        let error = CompileError::size("a", 3, 1, Location { line: 2, column: 1 });
        assert_eq!(error.to_string(), "2:1: incompatible size for 'a': expected 3, got 1");
        assert_eq!(error.message(), "incompatible size for 'a': expected 3, got 1");
    }

    #[test]
    fn diagnostic_carries_code_and_position() {
        let error = CompileError::Recursion {
            path: vec!["f".into(), "g".into(), "f".into()],
            location: Location { line: 4, column: 5 },
        };
        let diagnostic = error.to_diagnostic();
        assert_eq!(diagnostic.code, Some(ErrorCode::E5005));
        assert!(diagnostic.message.contains("f -> g -> f"));
    }
}
