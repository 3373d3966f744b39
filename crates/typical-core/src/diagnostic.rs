//! Diagnostics produced by analysis
//!
//! Every failure the analysis can encounter in user input ends up here as a
//! [`Diagnostic`] attached to a source [`Range`]; none of them are Rust errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ast::Range;

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory, does not make the document invalid
    Warning,
    /// The document violates a schema invariant
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Machine-readable category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticCode {
    /// The document could not be parsed
    Syntax,
    /// Import path lacks the schema file suffix
    InvalidImportPath,
    /// Import path does not name a known document
    MissingImport,
    DuplicateImport,
    DuplicateImportAlias,
    UnusedImport,
    DuplicateDeclaration,
    DuplicateIndex,
    /// A live field uses a deleted index
    DeletedField,
    /// A deleted index is still used by a live field
    DeletedIndexInUse,
    /// Bare type name not declared in the document
    UndefinedType,
    /// Qualified type name missing from the imported document, or the
    /// import did not resolve
    UndefinedImportedType,
    /// Qualifier does not match any import
    UnknownModule,
}

impl DiagnosticCode {
    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticCode::Syntax => "syntax",
            DiagnosticCode::InvalidImportPath => "invalid-import-path",
            DiagnosticCode::MissingImport => "missing-import",
            DiagnosticCode::DuplicateImport => "duplicate-import",
            DiagnosticCode::DuplicateImportAlias => "duplicate-import-alias",
            DiagnosticCode::UnusedImport => "unused-import",
            DiagnosticCode::DuplicateDeclaration => "duplicate-declaration",
            DiagnosticCode::DuplicateIndex => "duplicate-index",
            DiagnosticCode::DeletedField => "deleted-field",
            DiagnosticCode::DeletedIndexInUse => "deleted-index-in-use",
            DiagnosticCode::UndefinedType => "undefined-type",
            DiagnosticCode::UndefinedImportedType => "undefined-imported-type",
            DiagnosticCode::UnknownModule => "unknown-module",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single finding attached to a source range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub range: Range,
    pub message: String,
}

impl Diagnostic {
    pub fn new(
        severity: Severity,
        code: DiagnosticCode,
        range: Range,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            code,
            range,
            message: message.into(),
        }
    }

    pub fn error(code: DiagnosticCode, range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, range, message)
    }

    pub fn warning(code: DiagnosticCode, range: Range, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, range, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.range, self.message)
    }
}

/// Structural failure reported by the parsing layer.
///
/// A document carrying one of these never gets past the `Parsed` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxError {
    pub message: String,
    pub range: Range,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: Range) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(DiagnosticCode::Syntax, self.range, self.message.clone())
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.range, self.message)
    }
}
