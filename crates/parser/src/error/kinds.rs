//! Lexical and syntax error kinds.

use super::codes::ErrorCode;
use text_size::TextRange;

/// Error kinds produced while tokenizing and parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid character in source code
    InvalidCharacter,

    /// String literal is not properly terminated
    UnterminatedString,

    /// Number literal has invalid format
    InvalidNumber,

    /// Tabs and spaces mixed in one indentation prefix
    MixedIndentation,

    /// Unexpected token encountered during parsing
    UnexpectedToken {
        expected: Option<String>,
        found: String,
    },

    /// File ended unexpectedly while parsing
    UnexpectedEof,

    /// Invalid syntax structure
    InvalidSyntax { message: String },

    /// Dedent does not match any outer indentation level
    UnindentMismatch,

    /// A block was expected after ':'
    ExpectedIndent,

    /// Opening delimiter has no matching closing delimiter
    UnclosedDelimiter {
        expected: char,
        opening_span: TextRange,
    },

    /// Closing delimiter has no matching opening delimiter
    UnmatchedClosing { delimiter: char },

    /// Expected ':' after context
    MissingColon { context: String },

    /// Invalid assignment target
    InvalidAssignmentTarget,

    /// 'break' can only be used inside loops
    BreakOutsideLoop,

    /// 'continue' can only be used inside loops
    ContinueOutsideLoop,

    /// 'return' can only be used inside functions
    ReturnOutsideFunction,

    /// 'yield' can only be used inside functions
    YieldOutsideFunction,

    /// 'await' can only be used inside async functions
    AwaitOutsideAsync,

    /// Parameter name repeated in a function signature
    DuplicateParameter { name: String },

    /// Keyword argument repeated in a call
    DuplicateArgument { name: String },

    /// Positional argument follows a keyword argument
    PositionalAfterKeyword,

    /// Non-default parameter follows a default one
    InvalidParameterOrder,
}

impl ErrorKind {
    /// Stable code of this error kind.
    pub fn code(&self) -> ErrorCode {
        match self {
            ErrorKind::InvalidCharacter => ErrorCode::E1001,
            ErrorKind::UnterminatedString => ErrorCode::E1002,
            ErrorKind::InvalidNumber => ErrorCode::E1003,
            ErrorKind::MixedIndentation => ErrorCode::E1005,
            ErrorKind::UnexpectedToken { .. } => ErrorCode::E2001,
            ErrorKind::UnexpectedEof => ErrorCode::E2003,
            ErrorKind::InvalidSyntax { .. } => ErrorCode::E2004,
            ErrorKind::UnindentMismatch | ErrorKind::ExpectedIndent => ErrorCode::E2005,
            ErrorKind::UnclosedDelimiter { .. } => ErrorCode::E2006,
            ErrorKind::UnmatchedClosing { .. } => ErrorCode::E2007,
            ErrorKind::MissingColon { .. } => ErrorCode::E2008,
            ErrorKind::InvalidAssignmentTarget => ErrorCode::E2010,
            ErrorKind::BreakOutsideLoop => ErrorCode::E2011,
            ErrorKind::ContinueOutsideLoop => ErrorCode::E2012,
            ErrorKind::ReturnOutsideFunction => ErrorCode::E2013,
            ErrorKind::YieldOutsideFunction => ErrorCode::E2014,
            ErrorKind::AwaitOutsideAsync => ErrorCode::E2015,
            ErrorKind::DuplicateParameter { .. } => ErrorCode::E2016,
            ErrorKind::DuplicateArgument { .. } => ErrorCode::E2017,
            ErrorKind::PositionalAfterKeyword => ErrorCode::E2018,
            ErrorKind::InvalidParameterOrder => ErrorCode::E2019,
        }
    }

    /// Human-readable message.
    pub fn format_message(&self) -> String {
        match self {
            ErrorKind::InvalidCharacter => "invalid character in source".to_string(),
            ErrorKind::UnterminatedString => "unterminated string literal".to_string(),
            ErrorKind::InvalidNumber => "invalid number literal".to_string(),
            ErrorKind::MixedIndentation => {
                "indentation mixes tabs and spaces".to_string()
            }
            ErrorKind::UnexpectedToken { expected, found } => match expected {
                Some(expected) => format!("expected {}, found {}", expected, found),
                None => format!("unexpected token {}", found),
            },
            ErrorKind::UnexpectedEof => "unexpected end of file".to_string(),
            ErrorKind::InvalidSyntax { message } => message.clone(),
            ErrorKind::UnindentMismatch => {
                "unindent does not match any outer indentation level".to_string()
            }
            ErrorKind::ExpectedIndent => "expected an indented block".to_string(),
            ErrorKind::UnclosedDelimiter { expected, .. } => {
                format!("unclosed delimiter, expected '{}'", expected)
            }
            ErrorKind::UnmatchedClosing { delimiter } => {
                format!("unmatched closing delimiter '{}'", delimiter)
            }
            ErrorKind::MissingColon { context } => format!("expected ':' after {}", context),
            ErrorKind::InvalidAssignmentTarget => "cannot assign to expression".to_string(),
            ErrorKind::BreakOutsideLoop => "'break' outside loop".to_string(),
            ErrorKind::ContinueOutsideLoop => "'continue' not properly in loop".to_string(),
            ErrorKind::ReturnOutsideFunction => "'return' outside function".to_string(),
            ErrorKind::YieldOutsideFunction => "'yield' outside function".to_string(),
            ErrorKind::AwaitOutsideAsync => "'await' outside async function".to_string(),
            ErrorKind::DuplicateParameter { name } => {
                format!("duplicate parameter '{}' in function definition", name)
            }
            ErrorKind::DuplicateArgument { name } => {
                format!("keyword argument '{}' repeated", name)
            }
            ErrorKind::PositionalAfterKeyword => {
                "positional argument follows keyword argument".to_string()
            }
            ErrorKind::InvalidParameterOrder => {
                "non-default parameter follows default parameter".to_string()
            }
        }
    }
}
