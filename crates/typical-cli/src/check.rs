//! Batch checking of schema files on disk

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};
use typical_core::{AnalysisConfig, Diagnostic, DocumentId, Severity, Workspace};
use walkdir::WalkDir;

/// Diagnostics of every checked document
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub documents: BTreeMap<DocumentId, Vec<Diagnostic>>,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckReport {
    pub fn from_diagnostics(documents: BTreeMap<DocumentId, Vec<Diagnostic>>) -> Self {
        let count = |severity: Severity| {
            documents
                .values()
                .flatten()
                .filter(|d| d.severity == severity)
                .count()
        };
        let errors = count(Severity::Error);
        let warnings = count(Severity::Warning);

        Self {
            documents,
            errors,
            warnings,
        }
    }

    /// Whether the run should exit unsuccessfully
    pub fn failed(&self, deny_warnings: bool) -> bool {
        self.errors > 0 || (deny_warnings && self.warnings > 0)
    }
}

/// Collect schema files under `paths`.
///
/// Directories are walked recursively for files ending in `suffix`; files
/// named explicitly are taken regardless of their suffix.
pub fn discover(paths: &[PathBuf], suffix: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path).sort_by_file_name() {
                let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
                if entry.file_type().is_file()
                    && entry.file_name().to_string_lossy().ends_with(suffix)
                {
                    files.push(entry.into_path());
                }
            }
        } else {
            anyhow::bail!("Path {} does not exist", path.display());
        }
    }

    files.sort();
    files.dedup();
    debug!(count = files.len(), "discovered schema files");
    Ok(files)
}

/// Identifier a file is registered under
pub fn document_id(path: &Path) -> DocumentId {
    DocumentId::new(path.to_string_lossy())
}

/// Parse `source` and register it with the workspace
pub fn load_source(workspace: &mut Workspace, id: DocumentId, source: &str) {
    let parsed = typical_parser::parse_document(source);
    if let Err(err) = &parsed {
        debug!(document = %id, error = %err.message, "parse failed");
    }
    workspace.on_document_added(id, parsed);
}

/// Read and register every file
pub fn load_files(workspace: &mut Workspace, files: &[PathBuf]) -> Result<()> {
    for file in files {
        let source = fs::read_to_string(file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let id = document_id(file);
        if workspace.contains(&id) {
            warn!(document = %id, "file listed twice under different spellings");
        }
        load_source(workspace, id, &source);
    }
    Ok(())
}

pub fn run_check(paths: &[PathBuf], config: AnalysisConfig) -> Result<CheckReport> {
    let files = discover(paths, &config.schema_suffix)?;
    let mut workspace = Workspace::with_config(config);
    load_files(&mut workspace, &files)?;

    let report = CheckReport::from_diagnostics(workspace.analyze_all());
    for cycle in workspace.import_cycles() {
        let members: Vec<&str> = cycle.iter().map(DocumentId::as_str).collect();
        debug!(cycle = ?members, "import cycle");
    }
    info!(
        documents = report.documents.len(),
        errors = report.errors,
        warnings = report.warnings,
        "check finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use typical_core::{DiagnosticCode, Range};

    #[test]
    fn test_counts_by_severity() {
        let mut documents = BTreeMap::new();
        documents.insert(
            DocumentId::new("a.t"),
            vec![
                Diagnostic::error(DiagnosticCode::DuplicateIndex, Range::default(), "x"),
                Diagnostic::warning(DiagnosticCode::UnusedImport, Range::default(), "y"),
            ],
        );
        documents.insert(DocumentId::new("b.t"), Vec::new());

        let report = CheckReport::from_diagnostics(documents);
        assert_eq!(report.errors, 1);
        assert_eq!(report.warnings, 1);
        assert!(report.failed(false));
    }

    #[test]
    fn test_warnings_fail_only_when_denied() {
        let mut documents = BTreeMap::new();
        documents.insert(
            DocumentId::new("a.t"),
            vec![Diagnostic::warning(
                DiagnosticCode::UnusedImport,
                Range::default(),
                "Import not used.",
            )],
        );

        let report = CheckReport::from_diagnostics(documents);
        assert!(!report.failed(false));
        assert!(report.failed(true));
    }
}
