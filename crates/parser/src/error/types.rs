//! Error type for lexical and syntax errors.

use super::diagnostic::Diagnostic;
use super::kinds::ErrorKind;
use super::source_map::SourceMap;
use text_size::TextRange;
use thin_vec::ThinVec;

/// A located lexical or syntax error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub span: TextRange,
    pub notes: ThinVec<String>,
}

impl Error {
    /// Create a new error with the given kind and span.
    pub fn new(kind: ErrorKind, span: TextRange) -> Self {
        Self {
            kind,
            span,
            notes: ThinVec::new(),
        }
    }

    /// Add a note to the error.
    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    /// Convert this error to a diagnostic for display.
    pub fn to_diagnostic(&self, source: &str) -> Diagnostic {
        let position = SourceMap::new(source).line_col(self.span.start());
        let mut diagnostic = Diagnostic::new(self.kind.code().severity(), self.kind.format_message())
            .with_code(self.kind.code())
            .at(position);
        for note in &self.notes {
            diagnostic = diagnostic.with_note(note.clone());
        }
        diagnostic
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.kind.format_message())
    }
}

impl std::error::Error for Error {}

/// Creates a new error with the given kind and span.
/// Returns a boxed error to keep Result types small.
#[inline]
pub fn error(kind: ErrorKind, span: TextRange) -> Box<Error> {
    Box::new(Error::new(kind, span))
}
