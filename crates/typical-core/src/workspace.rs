//! Incremental orchestration of document analysis
//!
//! Each document moves through [`DocumentState`]s in order. Work is pulled:
//! asking for a document's diagnostics runs exactly the stages it is missing,
//! and scoping a document computes the exports of the documents it imports on
//! demand. Because exports depend on syntax alone, import cycles need no
//! special handling.
//!
//! Edits never patch derived data. They reset the affected documents to an
//! earlier state and the next request recomputes from there:
//!
//! - change of `d`: `d` back to `Parsed`, everything importing `d`
//!   (transitively) back to at most `ScopesComputed`
//! - addition or removal of `d`: direct importers back to at most
//!   `ExportsComputed` so their imports resolve again, transitive importers
//!   back to at most `ScopesComputed`

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::ast::Schema;
use crate::config::AnalysisConfig;
use crate::diagnostic::{Diagnostic, SyntaxError};
use crate::document::DocumentId;
use crate::error::CoreError;
use crate::exports::ExportTable;
use crate::graph::DependencyGraph;
use crate::link::{LinkContext, LinkResults};
use crate::resolve::Scope;
use crate::validate::Validator;

/// Analysis progress of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentState {
    Parsed,
    ExportsComputed,
    ScopesComputed,
    Linked,
    Validated,
}

impl fmt::Display for DocumentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentState::Parsed => "parsed",
            DocumentState::ExportsComputed => "exports-computed",
            DocumentState::ScopesComputed => "scopes-computed",
            DocumentState::Linked => "linked",
            DocumentState::Validated => "validated",
        };
        f.write_str(name)
    }
}

/// A document and the derived data of each completed stage
#[derive(Debug)]
struct Document {
    state: DocumentState,
    syntax: Result<Schema, SyntaxError>,
    exports: Option<Arc<ExportTable>>,
    scope: Option<Scope>,
    links: Option<LinkResults>,
    diagnostics: Option<Vec<Diagnostic>>,
}

impl Document {
    fn new(syntax: Result<Schema, SyntaxError>) -> Self {
        Self {
            state: DocumentState::Parsed,
            syntax,
            exports: None,
            scope: None,
            links: None,
            diagnostics: None,
        }
    }

    /// Move back to `floor` if the document got further, dropping stale data
    fn reset_to(&mut self, floor: DocumentState) -> bool {
        if self.state <= floor {
            return false;
        }

        self.state = floor;
        if floor < DocumentState::Validated {
            self.diagnostics = None;
        }
        if floor < DocumentState::Linked {
            self.links = None;
        }
        if floor < DocumentState::ScopesComputed {
            self.scope = None;
        }
        if floor < DocumentState::ExportsComputed {
            self.exports = None;
        }
        true
    }
}

/// The document store together with the analysis pipeline.
///
/// All mutation goes through `&mut self`, so a reader can never observe a
/// document halfway through a state change.
#[derive(Debug, Default)]
pub struct Workspace {
    documents: HashMap<DocumentId, Document>,
    graph: DependencyGraph,
    config: AnalysisConfig,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Register a newly observed document.
    ///
    /// Adding an identifier that is already present replaces its content, as
    /// [`Workspace::on_document_changed`] does.
    pub fn on_document_added(&mut self, id: DocumentId, syntax: Result<Schema, SyntaxError>) {
        if self.documents.contains_key(&id) {
            debug!(document = %id, "document added twice, treating as change");
            self.replace(&id, syntax);
            return;
        }

        debug!(document = %id, parsed = syntax.is_ok(), "document added");
        self.documents.insert(id.clone(), Document::new(syntax));
        // Importers that were waiting on this identifier can now resolve it
        self.invalidate_importers(&id, DocumentState::ExportsComputed);
    }

    /// Replace the content of a known document
    pub fn on_document_changed(
        &mut self,
        id: &DocumentId,
        syntax: Result<Schema, SyntaxError>,
    ) -> Result<(), CoreError> {
        if !self.documents.contains_key(id) {
            return Err(CoreError::DocumentNotFound(id.clone()));
        }

        debug!(document = %id, parsed = syntax.is_ok(), "document changed");
        self.replace(id, syntax);
        Ok(())
    }

    /// Forget a document; its importers will report the import as missing
    pub fn on_document_removed(&mut self, id: &DocumentId) -> Result<(), CoreError> {
        if self.documents.remove(id).is_none() {
            return Err(CoreError::DocumentNotFound(id.clone()));
        }

        debug!(document = %id, "document removed");
        self.graph.clear_imports(id);
        self.invalidate_importers(id, DocumentState::ExportsComputed);
        let documents = &self.documents;
        self.graph.prune(|doc| documents.contains_key(doc));
        Ok(())
    }

    fn replace(&mut self, id: &DocumentId, syntax: Result<Schema, SyntaxError>) {
        if let Some(document) = self.documents.get_mut(id) {
            *document = Document::new(syntax);
        }
        self.invalidate_importers(id, DocumentState::ScopesComputed);
    }

    fn invalidate_importers(&mut self, id: &DocumentId, direct_floor: DocumentState) {
        let direct = self.graph.importers_of(id);

        for importer in self.graph.transitive_importers(id) {
            let floor = if direct.contains(&importer) {
                direct_floor
            } else {
                DocumentState::ScopesComputed
            };

            if importer == *id {
                // `id` sits on a cycle and was reset already
                continue;
            }

            if let Some(document) = self.documents.get_mut(&importer) {
                let previous = document.state;
                if document.reset_to(floor) {
                    debug!(
                        document = %importer,
                        cause = %id,
                        from = %previous,
                        to = %floor,
                        "invalidated"
                    );
                }
            }
        }
    }

    pub fn contains(&self, id: &DocumentId) -> bool {
        self.documents.contains_key(id)
    }

    /// Identifiers of every document, sorted
    pub fn document_ids(&self) -> Vec<DocumentId> {
        let mut ids: Vec<DocumentId> = self.documents.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn state(&self, id: &DocumentId) -> Option<DocumentState> {
        self.documents.get(id).map(|document| document.state)
    }

    pub fn schema(&self, id: &DocumentId) -> Option<&Schema> {
        self.documents
            .get(id)
            .and_then(|document| document.syntax.as_ref().ok())
    }

    /// Documents `id` imports, as of its last scope computation
    pub fn imports_of(&self, id: &DocumentId) -> Vec<DocumentId> {
        self.graph.imports_of(id)
    }

    /// Documents importing `id`, as of their last scope computation
    pub fn importers_of(&self, id: &DocumentId) -> Vec<DocumentId> {
        self.graph.importers_of(id)
    }

    /// Import cycles among the documents scoped so far
    pub fn import_cycles(&self) -> Vec<Vec<DocumentId>> {
        self.graph.cycles()
    }

    /// Export table of `id`, computing it if needed.
    ///
    /// Unknown documents and documents that failed to parse export nothing.
    pub fn exports(&mut self, id: &DocumentId) -> Arc<ExportTable> {
        let Some(document) = self.documents.get_mut(id) else {
            return Arc::new(ExportTable::empty());
        };

        if let Some(exports) = &document.exports {
            return Arc::clone(exports);
        }

        let Ok(schema) = &document.syntax else {
            // Stays at `Parsed`
            return Arc::new(ExportTable::empty());
        };

        let exports = Arc::new(ExportTable::collect(schema));
        trace!(document = %id, count = exports.len(), "exports computed");
        document.exports = Some(Arc::clone(&exports));
        document.state = DocumentState::ExportsComputed;
        exports
    }

    fn ensure_scope(&mut self, id: &DocumentId) {
        self.exports(id);

        let scope = {
            let Some(document) = self.documents.get(id) else {
                return;
            };
            if document.state >= DocumentState::ScopesComputed {
                return;
            }
            let Ok(schema) = &document.syntax else {
                return;
            };
            let documents = &self.documents;
            Scope::resolve(id, schema, &self.config.schema_suffix, |target| {
                documents.contains_key(target)
            })
        };

        self.graph.set_imports(id, scope.dependencies());
        let targets: Vec<DocumentId> = scope.resolved_targets().cloned().collect();
        for target in &targets {
            self.exports(target);
        }

        if let Some(document) = self.documents.get_mut(id) {
            document.scope = Some(scope);
            document.state = DocumentState::ScopesComputed;
        }
        debug!(document = %id, imports = targets.len(), "scope computed");

        let cycles = self.graph.cycles();
        if cycles.iter().any(|cycle| cycle.contains(id)) {
            debug!(document = %id, ?cycles, "document is part of an import cycle");
        }
    }

    fn ensure_linked(&mut self, id: &DocumentId) {
        self.ensure_scope(id);

        let targets: Vec<DocumentId> = match self.documents.get(id) {
            Some(document) if document.state == DocumentState::ScopesComputed => document
                .scope
                .as_ref()
                .map(|scope| scope.resolved_targets().cloned().collect())
                .unwrap_or_default(),
            _ => return,
        };

        let imported: HashMap<DocumentId, Arc<ExportTable>> = targets
            .into_iter()
            .map(|target| {
                let exports = self.exports(&target);
                (target, exports)
            })
            .collect();

        let Some(document) = self.documents.get_mut(id) else {
            return;
        };
        let (Ok(schema), Some(scope), Some(own_exports)) =
            (&document.syntax, &document.scope, &document.exports)
        else {
            warn!(document = %id, "document reached scoping without its inputs");
            return;
        };

        let links = LinkContext {
            document: id,
            schema,
            own_exports,
            scope,
            imported: &imported,
        }
        .link();
        debug!(
            document = %id,
            links = links.len(),
            unresolved = links.unresolved().count(),
            "linked"
        );
        document.links = Some(links);
        document.state = DocumentState::Linked;
    }

    fn ensure_validated(&mut self, id: &DocumentId) {
        self.ensure_linked(id);

        let Some(document) = self.documents.get_mut(id) else {
            return;
        };
        if document.state != DocumentState::Linked {
            return;
        }
        let (Ok(schema), Some(scope), Some(links)) =
            (&document.syntax, &document.scope, &document.links)
        else {
            return;
        };

        let diagnostics = Validator::new(&self.config).validate(schema, scope, links);
        debug!(document = %id, count = diagnostics.len(), "validated");
        document.diagnostics = Some(diagnostics);
        document.state = DocumentState::Validated;
    }

    /// Diagnostics of `id`, running whatever analysis is outstanding
    pub fn diagnostics(&mut self, id: &DocumentId) -> Result<Vec<Diagnostic>, CoreError> {
        let Some(document) = self.documents.get(id) else {
            return Err(CoreError::DocumentNotFound(id.clone()));
        };
        if let Err(err) = &document.syntax {
            return Ok(vec![err.to_diagnostic()]);
        }

        self.ensure_validated(id);
        Ok(self
            .documents
            .get(id)
            .and_then(|document| document.diagnostics.clone())
            .unwrap_or_default())
    }

    /// Link results of `id`, running analysis up to linking
    pub fn links(&mut self, id: &DocumentId) -> Option<&LinkResults> {
        self.ensure_linked(id);
        self.documents
            .get(id)
            .and_then(|document| document.links.as_ref())
    }

    /// Analyze every document and collect diagnostics keyed by identifier
    pub fn analyze_all(&mut self) -> BTreeMap<DocumentId, Vec<Diagnostic>> {
        let mut results = BTreeMap::new();
        for id in self.document_ids() {
            if let Ok(diagnostics) = self.diagnostics(&id) {
                results.insert(id, diagnostics);
            }
        }
        results
    }
}
