//! Consistency checks over a linked document
//!
//! ## Checks
//!
//! 1. Import validity: schema suffix, then target existence
//! 2. Import uniqueness: later duplicates of a path or module name
//! 3. Import usage: imports no field type references
//! 4. Declaration name uniqueness
//! 5. Field index uniqueness and deletion safety
//! 6. Unresolved type references reported by the linker
//!
//! Imports failing check 1 take no part in check 3 nor in the module-name half
//! of check 2, since their module name is not usable. Repeated literal paths
//! are reported whatever their status.

use std::collections::{HashMap, HashSet};

use crate::ast::{Declaration, Import, Schema, Type};
use crate::config::AnalysisConfig;
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::link::LinkResults;
use crate::resolve::{ImportResolution, ImportStatus, Scope};

pub struct Validator<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> Validator<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Run every check and return the diagnostics ordered by position
    pub fn validate(&self, schema: &Schema, scope: &Scope, links: &LinkResults) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        let valid_imports = self.check_import_validity(schema, scope, &mut diagnostics);
        self.check_import_uniqueness(schema, scope, &mut diagnostics);
        self.check_import_usage(schema, &valid_imports, &mut diagnostics);
        self.check_declaration_names(schema, &mut diagnostics);
        for decl in &schema.declarations {
            self.check_field_indexes(decl, &mut diagnostics);
            self.check_deleted_indexes(decl, &mut diagnostics);
        }
        diagnostics.extend(links.unresolved().filter_map(|link| link.to_diagnostic()));

        // Stable: checks that hit the same position keep their order
        diagnostics.sort_by_key(|d| d.range.start);
        diagnostics
    }

    fn check_import_validity<'s>(
        &self,
        schema: &'s Schema,
        scope: &'s Scope,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> Vec<(&'s Import, &'s ImportResolution)> {
        let mut valid = Vec::new();

        for (import, resolution) in schema.imports.iter().zip(scope.imports()) {
            match resolution.status {
                ImportStatus::Resolved => valid.push((import, resolution)),
                ImportStatus::InvalidSuffix => diagnostics.push(Diagnostic::error(
                    DiagnosticCode::InvalidImportPath,
                    import.path.range,
                    format!("Import path must end with {}", self.config.schema_suffix),
                )),
                ImportStatus::Missing => diagnostics.push(Diagnostic::error(
                    DiagnosticCode::MissingImport,
                    import.path.range,
                    format!("File '{}' does not exist.", import.path.value),
                )),
            }
        }

        valid
    }

    /// Literal paths are compared across every import; module names only
    /// across imports that passed the validity check
    fn check_import_uniqueness(
        &self,
        schema: &Schema,
        scope: &Scope,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let imports: Vec<(&Import, &ImportResolution)> =
            schema.imports.iter().zip(scope.imports()).collect();

        for (position, (import, resolution)) in imports.iter().enumerate() {
            let earlier = &imports[..position];

            if earlier
                .iter()
                .any(|(other, _)| other.path.value == import.path.value)
            {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateImport,
                    import.range,
                    format!("Duplicate import of '{}'.", import.path.value),
                ));
            } else if resolution.is_resolved()
                && earlier.iter().any(|(_, other)| {
                    other.is_resolved() && other.module_name == resolution.module_name
                })
            {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateImportAlias,
                    import.range,
                    format!("Duplicate import alias of {}.", resolution.module_name),
                ));
            }
        }
    }

    fn check_import_usage(
        &self,
        schema: &Schema,
        imports: &[(&Import, &ImportResolution)],
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let used: HashSet<&str> = schema
            .fields()
            .filter_map(|field| match field.ty.element_type() {
                Type::Imported { module, .. } => Some(module.value.as_str()),
                _ => None,
            })
            .collect();

        for (import, resolution) in imports {
            if !used.contains(resolution.module_name.as_str()) {
                diagnostics.push(Diagnostic::new(
                    self.config.unused_import,
                    DiagnosticCode::UnusedImport,
                    import.name_range(),
                    "Import not used.",
                ));
            }
        }
    }

    fn check_declaration_names(&self, schema: &Schema, diagnostics: &mut Vec<Diagnostic>) {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for decl in &schema.declarations {
            *counts.entry(decl.name.value.as_str()).or_insert(0) += 1;
        }

        for decl in &schema.declarations {
            if counts.get(decl.name.value.as_str()).copied().unwrap_or(0) > 1 {
                diagnostics.push(Diagnostic::error(
                    DiagnosticCode::DuplicateDeclaration,
                    decl.name.range,
                    format!("Duplicate declaration of {}.", decl.name.value),
                ));
            }
        }
    }

    fn check_field_indexes(&self, decl: &Declaration, diagnostics: &mut Vec<Diagnostic>) {
        let deleted: HashSet<u64> = decl.deleted_indexes().collect();

        for (position, field) in decl.fields.iter().enumerate() {
            for (other_position, other) in decl.fields.iter().enumerate() {
                if position != other_position && other.index.value == field.index.value {
                    diagnostics.push(Diagnostic::error(
                        DiagnosticCode::DuplicateIndex,
                        field.index.range,
                        format!(
                            "Index {} is already used by {}.",
                            field.index.value, other.name.value
                        ),
                    ));
                }
            }

            if deleted.contains(&field.index.value) {
                diagnostics.push(Diagnostic::new(
                    self.config.deleted_field,
                    DiagnosticCode::DeletedField,
                    field.range,
                    format!("Index {} should be deleted.", field.index.value),
                ));
            }
        }
    }

    fn check_deleted_indexes(&self, decl: &Declaration, diagnostics: &mut Vec<Diagnostic>) {
        for block in &decl.deleted {
            for field in &decl.fields {
                let Some(index) = block
                    .indexes
                    .iter()
                    .find(|index| index.value == field.index.value)
                else {
                    continue;
                };

                diagnostics.push(Diagnostic::new(
                    self.config.deleted_index_in_use,
                    DiagnosticCode::DeletedIndexInUse,
                    index.range,
                    format!(
                        "Index {} is still being referenced by {}.",
                        field.index.value, field.name.value
                    ),
                ));
            }
        }
    }
}
