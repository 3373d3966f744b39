//! Cross-file type resolution and validation for Typical schemas
//!
//! The crate never reads or parses source text. It receives parsed [`Schema`]s
//! keyed by [`DocumentId`] and drives each document through the analysis
//! states in [`workspace`], producing [`Diagnostic`]s on demand.

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod exports;
pub mod graph;
pub mod link;
pub mod resolve;
pub mod validate;
pub mod workspace;

pub use ast::{
    Declaration, DeclarationKind, Deleted, Field, FieldRule, Import, Position, Primitive, Range,
    Schema, Spanned, Type,
};
pub use config::AnalysisConfig;
pub use diagnostic::{Diagnostic, DiagnosticCode, Severity, SyntaxError};
pub use document::DocumentId;
pub use error::CoreError;
pub use exports::ExportTable;
pub use workspace::{DocumentState, Workspace};
