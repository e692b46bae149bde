//! Warning system for non-fatal issues detected during translation.
//!
//! Warnings never stop compilation. They are collected next to the output
//! and converted to diagnostics by whoever presents them.

use super::codes::{ErrorCode, Severity};
use super::diagnostic::Diagnostic;
use super::source_map::SourceMap;
use text_size::TextRange;

/// Warning categories for organizing different types of warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningCategory {
    /// Unused code warnings
    UnusedCode,
    /// Shadowing warnings
    Shadowing,
}

/// Warning kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// A function local hides a robot variable of the same name
    ShadowsRobotVariable { function: String, name: String },

    /// A function local hides a variable assigned at top level
    ShadowsGlobal { function: String, name: String },

    /// Function defined but never called, so never emitted
    UnusedFunction { name: String },
}

impl WarningKind {
    pub fn category(&self) -> WarningCategory {
        match self {
            WarningKind::ShadowsRobotVariable { .. } | WarningKind::ShadowsGlobal { .. } => {
                WarningCategory::Shadowing
            }
            WarningKind::UnusedFunction { .. } => WarningCategory::UnusedCode,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            WarningKind::ShadowsRobotVariable { .. } => ErrorCode::W3001,
            WarningKind::ShadowsGlobal { .. } => ErrorCode::W3002,
            WarningKind::UnusedFunction { .. } => ErrorCode::W3003,
        }
    }

    pub fn format_message(&self) -> String {
        match self {
            WarningKind::ShadowsRobotVariable { function, name } => format!(
                "local variable '{}' in function '{}' shadows a robot variable; add 'global {}' to write the robot variable",
                name, function, name
            ),
            WarningKind::ShadowsGlobal { function, name } => format!(
                "local variable '{}' in function '{}' shadows a top-level variable; add 'global {}' to write it",
                name, function, name
            ),
            WarningKind::UnusedFunction { name } => {
                format!("function '{}' is never called", name)
            }
        }
    }
}

/// A located warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub kind: WarningKind,
    pub span: TextRange,
}

impl Warning {
    pub fn new(kind: WarningKind, span: TextRange) -> Self {
        Warning { kind, span }
    }

    pub fn category(&self) -> WarningCategory {
        self.kind.category()
    }

    pub fn to_diagnostic(&self, source_map: &SourceMap) -> Diagnostic {
        Diagnostic::new(Severity::Warning, self.kind.format_message())
            .with_code(self.kind.code())
            .at(source_map.line_col(self.span.start()))
    }
}

/// Collects warnings in the order they are found.
#[derive(Debug, Default, Clone)]
pub struct WarningCollector {
    warnings: Vec<Warning>,
}

impl WarningCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, kind: WarningKind, span: TextRange) {
        self.warnings.push(Warning::new(kind, span));
    }

    pub fn by_category(&self, category: WarningCategory) -> impl Iterator<Item = &Warning> {
        self.warnings.iter().filter(move |w| w.category() == category)
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.warnings
    }
}
