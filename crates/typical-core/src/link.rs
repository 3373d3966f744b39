//! Reference linking
//!
//! Resolves every reference-typed field of a document to a declaration,
//! either in the document itself or in an imported document's export table.
//! Linking is a pure function of the document, its [`Scope`] and the export
//! tables of its resolved imports; imported documents need not be validated.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::trace;

use crate::ast::{Range, Schema, Type};
use crate::diagnostic::{Diagnostic, DiagnosticCode};
use crate::document::DocumentId;
use crate::exports::ExportTable;
use crate::resolve::Scope;

/// Declaration a reference points at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub document: DocumentId,
    /// Position in the target schema's `declarations`
    pub declaration: usize,
}

/// Why a reference could not be linked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Bare name missing from the document
    Undefined { name: String },
    /// The import's document does not declare the name, or the import did
    /// not resolve
    UndefinedInSchema { name: String, path: String },
    /// No import carries the module name
    UnknownModule { module: String },
}

impl LinkError {
    pub fn message(&self) -> String {
        match self {
            LinkError::Undefined { name } => format!("Type '{}' is not defined.", name),
            LinkError::UndefinedInSchema { name, path } => format!(
                "Type '{}' is not defined in imported schema '{}'.",
                name, path
            ),
            LinkError::UnknownModule { module } => {
                format!("Import for module '{}' not found.", module)
            }
        }
    }

    pub fn code(&self) -> DiagnosticCode {
        match self {
            LinkError::Undefined { .. } => DiagnosticCode::UndefinedType,
            LinkError::UndefinedInSchema { .. } => DiagnosticCode::UndefinedImportedType,
            LinkError::UnknownModule { .. } => DiagnosticCode::UnknownModule,
        }
    }
}

/// Outcome of linking one reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(Target),
    Unresolved(LinkError),
}

/// Link result for one reference-typed field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLink {
    pub declaration: usize,
    pub field: usize,
    /// Token a failure is reported on
    pub range: Range,
    pub resolution: Resolution,
}

impl FieldLink {
    pub fn error(&self) -> Option<&LinkError> {
        match &self.resolution {
            Resolution::Unresolved(err) => Some(err),
            Resolution::Resolved(_) => None,
        }
    }

    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        self.error()
            .map(|err| Diagnostic::error(err.code(), self.range, err.message()))
    }
}

/// All link results of one document, in field order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkResults {
    links: Vec<FieldLink>,
}

impl LinkResults {
    pub fn iter(&self) -> impl Iterator<Item = &FieldLink> {
        self.links.iter()
    }

    pub fn unresolved(&self) -> impl Iterator<Item = &FieldLink> {
        self.links.iter().filter(|link| link.error().is_some())
    }

    /// Link of a given field, if its type is a reference
    pub fn field(&self, declaration: usize, field: usize) -> Option<&FieldLink> {
        self.links
            .iter()
            .find(|link| link.declaration == declaration && link.field == field)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

/// Inputs the linker reads for one document
pub struct LinkContext<'a> {
    pub document: &'a DocumentId,
    pub schema: &'a Schema,
    pub own_exports: &'a ExportTable,
    pub scope: &'a Scope,
    /// Export tables of every resolved import target
    pub imported: &'a HashMap<DocumentId, Arc<ExportTable>>,
}

impl LinkContext<'_> {
    pub fn link(&self) -> LinkResults {
        let mut links = Vec::new();

        for (decl_index, decl) in self.schema.declarations.iter().enumerate() {
            for (field_index, field) in decl.fields.iter().enumerate() {
                let Some((range, resolution)) = self.resolve_type(field.ty.element_type())
                else {
                    continue;
                };

                links.push(FieldLink {
                    declaration: decl_index,
                    field: field_index,
                    range,
                    resolution,
                });
            }
        }

        LinkResults { links }
    }

    fn resolve_type(&self, ty: &Type) -> Option<(Range, Resolution)> {
        match ty {
            Type::Primitive { .. } | Type::Array { .. } => None,
            Type::Local { name } => Some((name.range, self.resolve_local(&name.value))),
            Type::Imported { module, name } => {
                let resolution = self.resolve_imported(&module.value, &name.value);
                let range = match &resolution {
                    Resolution::Unresolved(LinkError::UnknownModule { .. }) => module.range,
                    _ => name.range,
                };
                Some((range, resolution))
            }
        }
    }

    fn resolve_local(&self, name: &str) -> Resolution {
        match self.own_exports.get(name) {
            Some(export) => Resolution::Resolved(Target {
                document: self.document.clone(),
                declaration: export.declaration,
            }),
            None => {
                trace!(document = %self.document, name, "local type not defined");
                Resolution::Unresolved(LinkError::Undefined {
                    name: name.to_string(),
                })
            }
        }
    }

    fn resolve_imported(&self, module: &str, name: &str) -> Resolution {
        let Some((position, import)) = self.scope.module(module) else {
            trace!(document = %self.document, module, "no import for module");
            return Resolution::Unresolved(LinkError::UnknownModule {
                module: module.to_string(),
            });
        };

        // An import that did not resolve exports nothing
        let export = import
            .resolved_target()
            .and_then(|target| self.imported.get(target))
            .and_then(|table| table.get(name));

        match export {
            Some(export) => Resolution::Resolved(Target {
                document: import.target.clone(),
                declaration: export.declaration,
            }),
            None => {
                let path = self
                    .schema
                    .imports
                    .get(position)
                    .map(|import| import.path.value.clone())
                    .unwrap_or_else(|| import.target.to_string());
                trace!(
                    document = %self.document,
                    module,
                    name,
                    %path,
                    resolved = import.is_resolved(),
                    "imported type not defined"
                );
                Resolution::Unresolved(LinkError::UndefinedInSchema {
                    name: name.to_string(),
                    path,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, DeclarationKind, Field, Import, Primitive, Spanned};

    fn spanned(value: &str) -> Spanned<String> {
        Spanned::new(value.to_string(), Range::default())
    }

    fn field(name: &str, ty: Type, index: u64) -> Field {
        Field {
            rule: None,
            name: spanned(name),
            ty,
            index: Spanned::new(index, Range::default()),
            range: Range::default(),
        }
    }

    fn local(name: &str) -> Type {
        Type::Local {
            name: spanned(name),
        }
    }

    fn imported(module: &str, name: &str) -> Type {
        Type::Imported {
            module: spanned(module),
            name: spanned(name),
        }
    }

    fn schema(imports: Vec<&str>, fields: Vec<Field>) -> Schema {
        Schema {
            imports: imports
                .into_iter()
                .map(|path| Import {
                    path: spanned(path),
                    alias: None,
                    range: Range::default(),
                })
                .collect(),
            declarations: vec![
                Declaration {
                    kind: DeclarationKind::Struct,
                    name: spanned("Entity"),
                    fields,
                    deleted: Vec::new(),
                    range: Range::default(),
                },
                Declaration {
                    kind: DeclarationKind::Struct,
                    name: spanned("Point"),
                    fields: Vec::new(),
                    deleted: Vec::new(),
                    range: Range::default(),
                },
            ],
        }
    }

    fn coords_exports() -> ExportTable {
        ExportTable::collect(&Schema {
            imports: Vec::new(),
            declarations: vec![Declaration {
                kind: DeclarationKind::Struct,
                name: spanned("Position"),
                fields: Vec::new(),
                deleted: Vec::new(),
                range: Range::default(),
            }],
        })
    }

    fn link(schema: &Schema, exists: bool) -> LinkResults {
        let document = DocumentId::new("main.t");
        let own_exports = ExportTable::collect(schema);
        let scope = Scope::resolve(&document, schema, ".t", |_| exists);
        let mut imported = HashMap::new();
        if exists {
            imported.insert(DocumentId::new("coords.t"), Arc::new(coords_exports()));
        }

        LinkContext {
            document: &document,
            schema,
            own_exports: &own_exports,
            scope: &scope,
            imported: &imported,
        }
        .link()
    }

    #[test]
    fn test_primitives_produce_no_links() {
        let schema = schema(
            vec![],
            vec![field(
                "x",
                Type::Primitive {
                    kind: Primitive::S64,
                    range: Range::default(),
                },
                0,
            )],
        );
        assert!(link(&schema, false).is_empty());
    }

    #[test]
    fn test_local_reference() {
        let schema = schema(vec![], vec![field("p", local("Point"), 0), field("q", local("Nope"), 1)]);
        let results = link(&schema, false);

        assert_eq!(
            results.field(0, 0).unwrap().resolution,
            Resolution::Resolved(Target {
                document: DocumentId::new("main.t"),
                declaration: 1,
            })
        );
        assert_eq!(
            results.field(0, 1).unwrap().error().unwrap().message(),
            "Type 'Nope' is not defined."
        );
    }

    #[test]
    fn test_imported_reference_names_schema_path() {
        let schema = schema(
            vec!["coords.t"],
            vec![
                field("position", imported("coords", "Position"), 0),
                field("location", imported("coords", "Location"), 1),
            ],
        );
        let results = link(&schema, true);

        let errors: Vec<_> = results.unresolved().map(|l| l.error().unwrap().message()).collect();
        assert_eq!(
            errors,
            vec!["Type 'Location' is not defined in imported schema 'coords.t'."]
        );
    }

    #[test]
    fn test_unknown_module() {
        let schema = schema(vec![], vec![field("p", imported("geo", "Point"), 0)]);
        let results = link(&schema, false);
        assert_eq!(
            results.field(0, 0).unwrap().error(),
            Some(&LinkError::UnknownModule {
                module: "geo".to_string()
            })
        );
    }

    #[test]
    fn test_unresolved_import_names_schema_path() {
        let schema = schema(vec!["coords.t"], vec![field("p", imported("coords", "Position"), 0)]);
        let results = link(&schema, false);
        assert_eq!(
            results.field(0, 0).unwrap().error().unwrap().message(),
            "Type 'Position' is not defined in imported schema 'coords.t'."
        );
    }

    #[test]
    fn test_array_element_is_linked() {
        let array = Type::Array {
            element: Box::new(local("Missing")),
            range: Range::default(),
        };
        let schema = schema(vec![], vec![field("items", array, 0)]);
        let results = link(&schema, false);
        assert_eq!(results.len(), 1);
        assert_eq!(
            results.field(0, 0).unwrap().error().unwrap().code(),
            DiagnosticCode::UndefinedType
        );
    }
}
