//! Export tables: the declarations a document exposes to its importers

use std::collections::BTreeMap;

use crate::ast::{DeclarationKind, Range, Schema};

/// One exported declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub kind: DeclarationKind,
    /// Position of the declaration in `Schema::declarations`
    pub declaration: usize,
    /// Range of the declaration's name token
    pub range: Range,
}

/// Name → declaration map for one document.
///
/// Built from syntax alone so it can be computed before any other document is
/// analyzed. When a name is declared twice the first declaration is exported;
/// the duplicate is reported by the validator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportTable {
    entries: BTreeMap<String, Export>,
}

impl ExportTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn collect(schema: &Schema) -> Self {
        let mut entries = BTreeMap::new();

        for (position, decl) in schema.declarations.iter().enumerate() {
            if decl.name.value.is_empty() {
                continue;
            }
            entries
                .entry(decl.name.value.clone())
                .or_insert_with(|| Export {
                    kind: decl.kind,
                    declaration: position,
                    range: decl.name.range,
                });
        }

        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<&Export> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Declaration, Spanned};

    fn decl(kind: DeclarationKind, name: &str) -> Declaration {
        Declaration {
            kind,
            name: Spanned::new(name.to_string(), Range::default()),
            fields: Vec::new(),
            deleted: Vec::new(),
            range: Range::default(),
        }
    }

    #[test]
    fn test_collects_every_named_declaration() {
        let schema = Schema {
            imports: Vec::new(),
            declarations: vec![
                decl(DeclarationKind::Struct, "Point"),
                decl(DeclarationKind::Choice, "Move"),
                decl(DeclarationKind::Struct, ""),
            ],
        };

        let table = ExportTable::collect(&schema);
        assert_eq!(table.len(), 2);
        assert_eq!(table.names().collect::<Vec<_>>(), vec!["Move", "Point"]);
        assert_eq!(table.get("Move").map(|e| e.kind), Some(DeclarationKind::Choice));
    }

    #[test]
    fn test_first_duplicate_wins() {
        let schema = Schema {
            imports: Vec::new(),
            declarations: vec![
                decl(DeclarationKind::Struct, "Point"),
                decl(DeclarationKind::Choice, "Point"),
            ],
        };

        let table = ExportTable::collect(&schema);
        let export = table.get("Point").unwrap();
        assert_eq!(export.declaration, 0);
        assert_eq!(export.kind, DeclarationKind::Struct);
    }
}
