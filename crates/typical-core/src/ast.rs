//! Syntax tree for a single schema document
//!
//! Nodes are produced by an external parser and owned by their document.
//! Every node and every token a diagnostic can point at carries a [`Range`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based line and character offset
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// Half-open source range `[start, end)`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Range spanning from the start of `self` to the end of `other`
    pub fn to(self, other: Range) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}..{}:{}]",
            self.start.line, self.start.character, self.end.line, self.end.character
        )
    }
}

/// A token value together with its location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub range: Range,
}

impl<T> Spanned<T> {
    pub fn new(value: T, range: Range) -> Self {
        Self { value, range }
    }
}

/// Root of one document: its imports and declarations in source order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub imports: Vec<Import>,
    pub declarations: Vec<Declaration>,
}

impl Schema {
    /// Iterate over every field of every declaration
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.declarations.iter().flat_map(|decl| decl.fields.iter())
    }
}

/// `import 'path' [as alias]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    /// Literal path without the surrounding quotes; the range covers the quotes
    pub path: Spanned<String>,
    pub alias: Option<Spanned<String>>,
    pub range: Range,
}

impl Import {
    /// Name other declarations use to qualify types from this import.
    ///
    /// The explicit alias wins; otherwise the file's base name with `suffix`
    /// stripped (when present).
    pub fn module_name(&self, suffix: &str) -> String {
        if let Some(alias) = &self.alias {
            return alias.value.clone();
        }

        let base = self
            .path
            .value
            .rsplit('/')
            .next()
            .unwrap_or(self.path.value.as_str());
        base.strip_suffix(suffix).unwrap_or(base).to_string()
    }

    /// Token that usage warnings attach to
    pub fn name_range(&self) -> Range {
        self.alias
            .as_ref()
            .map(|alias| alias.range)
            .unwrap_or(self.path.range)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Struct,
    Choice,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclarationKind::Struct => write!(f, "struct"),
            DeclarationKind::Choice => write!(f, "choice"),
        }
    }
}

/// A `struct` or `choice` block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub kind: DeclarationKind,
    pub name: Spanned<String>,
    pub fields: Vec<Field>,
    pub deleted: Vec<Deleted>,
    pub range: Range,
}

impl Declaration {
    /// Every index retired by any `deleted` block of this declaration
    pub fn deleted_indexes(&self) -> impl Iterator<Item = u64> + '_ {
        self.deleted
            .iter()
            .flat_map(|block| block.indexes.iter().map(|index| index.value))
    }
}

/// Compatibility rule written before a field name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRule {
    Asymmetric,
    Optional,
    Required,
}

/// `[rule] name: Type = index`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub rule: Option<FieldRule>,
    pub name: Spanned<String>,
    pub ty: Type,
    pub index: Spanned<u64>,
    pub range: Range,
}

/// `deleted 3 4 5`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deleted {
    pub indexes: Vec<Spanned<u64>>,
    pub range: Range,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primitive {
    Bool,
    S64,
    U64,
    F64,
    String,
    Bytes,
    Unit,
}

impl Primitive {
    pub const ALL: [Primitive; 7] = [
        Primitive::Bool,
        Primitive::S64,
        Primitive::U64,
        Primitive::F64,
        Primitive::String,
        Primitive::Bytes,
        Primitive::Unit,
    ];

    pub fn from_keyword(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == name)
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Primitive::Bool => "Bool",
            Primitive::S64 => "S64",
            Primitive::U64 => "U64",
            Primitive::F64 => "F64",
            Primitive::String => "String",
            Primitive::Bytes => "Bytes",
            Primitive::Unit => "Unit",
        }
    }
}

/// Field type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// Builtin type. Choice fields written without a type are `Unit`.
    Primitive { kind: Primitive, range: Range },
    /// Bare name resolved within the same document
    Local { name: Spanned<String> },
    /// `module.Name` resolved through an import
    Imported {
        module: Spanned<String>,
        name: Spanned<String>,
    },
    /// `[T]`
    Array { element: Box<Type>, range: Range },
}

impl Type {
    /// The non-array type at the bottom of any array nesting
    pub fn element_type(&self) -> &Type {
        match self {
            Type::Array { element, .. } => element.element_type(),
            other => other,
        }
    }

    pub fn range(&self) -> Range {
        match self {
            Type::Primitive { range, .. } | Type::Array { range, .. } => *range,
            Type::Local { name } => name.range,
            Type::Imported { module, name } => module.range.to(name.range),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self.element_type(),
            Type::Local { .. } | Type::Imported { .. }
        )
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive { kind, .. } => write!(f, "{}", kind.keyword()),
            Type::Local { name } => write!(f, "{}", name.value),
            Type::Imported { module, name } => write!(f, "{}.{}", module.value, name.value),
            Type::Array { element, .. } => write!(f, "[{}]", element),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(path: &str, alias: Option<&str>) -> Import {
        Import {
            path: Spanned::new(path.to_string(), Range::default()),
            alias: alias.map(|a| Spanned::new(a.to_string(), Range::default())),
            range: Range::default(),
        }
    }

    #[test]
    fn test_module_name_strips_directory_and_suffix() {
        assert_eq!(import("coords.t", None).module_name(".t"), "coords");
        assert_eq!(import("../shared/geo.t", None).module_name(".t"), "geo");
        assert_eq!(import("geo.t", Some("g")).module_name(".t"), "g");
    }

    #[test]
    fn test_module_name_without_suffix_keeps_base_name() {
        assert_eq!(import("shared/geo.txt", None).module_name(".t"), "geo.txt");
    }

    #[test]
    fn test_element_type_unwraps_nested_arrays() {
        let name = Type::Imported {
            module: Spanned::new("coords".to_string(), Range::default()),
            name: Spanned::new("Position".to_string(), Range::default()),
        };
        let nested = Type::Array {
            element: Box::new(Type::Array {
                element: Box::new(name.clone()),
                range: Range::default(),
            }),
            range: Range::default(),
        };

        assert_eq!(nested.element_type(), &name);
        assert!(nested.is_reference());
        assert_eq!(nested.to_string(), "[[coords.Position]]");
    }

    #[test]
    fn test_primitive_keywords_round_trip() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_keyword(primitive.keyword()), Some(primitive));
        }
        assert_eq!(Primitive::from_keyword("number"), None);
    }
}
