//! Import resolution
//!
//! Maps each `import` of a document to a target [`DocumentId`] and the module
//! name its types are qualified with. Failures are recorded, never raised; the
//! validator turns them into diagnostics.

use tracing::trace;

use crate::ast::{Import, Schema};
use crate::document::DocumentId;

/// Outcome of resolving one import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// Target document exists in the store
    Resolved,
    /// Path does not carry the schema suffix
    InvalidSuffix,
    /// No document with the resolved identifier exists
    Missing,
}

/// Resolution of a single import statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportResolution {
    /// Effective module name: alias, else file base name
    pub module_name: String,
    /// Identifier the path resolves to, relative to the importing document
    pub target: DocumentId,
    pub status: ImportStatus,
}

impl ImportResolution {
    pub fn is_resolved(&self) -> bool {
        self.status == ImportStatus::Resolved
    }

    /// Resolved target, if the import resolved
    pub fn resolved_target(&self) -> Option<&DocumentId> {
        self.is_resolved().then_some(&self.target)
    }
}

/// Resolve `import` as written in `importer`.
///
/// `exists` answers whether a document is present in the store.
pub fn resolve_import(
    importer: &DocumentId,
    import: &Import,
    suffix: &str,
    exists: impl Fn(&DocumentId) -> bool,
) -> ImportResolution {
    let module_name = import.module_name(suffix);
    let target = importer.join(&import.path.value);

    let status = if !import.path.value.ends_with(suffix) {
        ImportStatus::InvalidSuffix
    } else if exists(&target) {
        ImportStatus::Resolved
    } else {
        ImportStatus::Missing
    };

    trace!(
        importer = %importer,
        path = %import.path.value,
        module = %module_name,
        target = %target,
        ?status,
        "resolved import"
    );

    ImportResolution {
        module_name,
        target,
        status,
    }
}

/// Visible module scope of one document.
///
/// Holds one [`ImportResolution`] per import, aligned with
/// `Schema::imports`. Imported export tables are looked up by target at link
/// time, so a scope stays valid while its targets' contents change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    imports: Vec<ImportResolution>,
}

impl Scope {
    pub fn resolve(
        importer: &DocumentId,
        schema: &Schema,
        suffix: &str,
        exists: impl Fn(&DocumentId) -> bool,
    ) -> Self {
        let imports = schema
            .imports
            .iter()
            .map(|import| resolve_import(importer, import, suffix, &exists))
            .collect();

        Self { imports }
    }

    pub fn imports(&self) -> &[ImportResolution] {
        &self.imports
    }

    /// First import whose effective module name is `module`
    pub fn module(&self, module: &str) -> Option<(usize, &ImportResolution)> {
        self.imports
            .iter()
            .enumerate()
            .find(|(_, resolution)| resolution.module_name == module)
    }

    /// Every identifier this document depends on, resolved or not.
    ///
    /// Paths with an invalid suffix are excluded since no document can ever
    /// satisfy them.
    pub fn dependencies(&self) -> impl Iterator<Item = &DocumentId> {
        self.imports
            .iter()
            .filter(|resolution| resolution.status != ImportStatus::InvalidSuffix)
            .map(|resolution| &resolution.target)
    }

    /// Targets of imports that resolved
    pub fn resolved_targets(&self) -> impl Iterator<Item = &DocumentId> {
        self.imports
            .iter()
            .filter_map(ImportResolution::resolved_target)
    }
}
