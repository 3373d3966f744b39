//! Cross-document analysis through the workspace notifications

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use typical_core::{
    Declaration, DeclarationKind, DocumentId, DocumentState, Field, Import, Primitive, Range,
    Schema, Spanned, SyntaxError, Type, Workspace,
};

fn spanned(value: &str) -> Spanned<String> {
    Spanned::new(value.to_string(), Range::default())
}

fn import(path: &str) -> Import {
    Import {
        path: spanned(path),
        alias: None,
        range: Range::default(),
    }
}

fn primitive() -> Type {
    Type::Primitive {
        kind: Primitive::S64,
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

fn field(name: &str, ty: Type, index: u64) -> Field {
    Field {
        rule: None,
        name: spanned(name),
        ty,
        index: Spanned::new(index, Range::default()),
        range: Range::default(),
    }
}

fn decl(name: &str, fields: Vec<Field>) -> Declaration {
    Declaration {
        kind: DeclarationKind::Struct,
        name: spanned(name),
        fields,
        deleted: Vec::new(),
        range: Range::default(),
    }
}

fn schema(imports: &[&str], declarations: Vec<Declaration>) -> Schema {
    Schema {
        imports: imports.iter().map(|path| import(path)).collect(),
        declarations,
    }
}

fn messages(workspace: &mut Workspace, id: &DocumentId) -> Vec<String> {
    workspace
        .diagnostics(id)
        .unwrap()
        .into_iter()
        .map(|d| d.message)
        .collect()
}

fn coords() -> Schema {
    schema(
        &[],
        vec![decl(
            "Position",
            vec![field("x", primitive(), 0), field("y", primitive(), 1)],
        )],
    )
}

fn entity() -> Schema {
    schema(
        &["coords.t"],
        vec![decl(
            "Entity",
            vec![
                field("position", imported("coords", "Position"), 0),
                field("location", imported("coords", "Location"), 1),
            ],
        )],
    )
}

#[test]
fn test_missing_imported_type() {
    let mut workspace = Workspace::new();
    let main = DocumentId::new("main.t");
    workspace.on_document_added(DocumentId::new("coords.t"), Ok(coords()));
    workspace.on_document_added(main.clone(), Ok(entity()));

    assert_eq!(
        messages(&mut workspace, &main),
        vec!["Type 'Location' is not defined in imported schema 'coords.t'."]
    );
}

#[test]
fn test_out_of_order_addition() {
    let mut workspace = Workspace::new();
    let main = DocumentId::new("main.t");
    let coords_id = DocumentId::new("coords.t");

    workspace.on_document_added(main.clone(), Ok(entity()));
    assert_eq!(
        messages(&mut workspace, &main),
        vec![
            "File 'coords.t' does not exist.".to_string(),
            "Type 'Position' is not defined in imported schema 'coords.t'.".to_string(),
            "Type 'Location' is not defined in imported schema 'coords.t'.".to_string(),
        ]
    );

    workspace.on_document_added(coords_id, Ok(coords()));
    assert_eq!(workspace.state(&main), Some(DocumentState::ExportsComputed));
    assert_eq!(
        messages(&mut workspace, &main),
        vec!["Type 'Location' is not defined in imported schema 'coords.t'."]
    );
}

#[test]
fn test_removal_resurfaces_missing_import() {
    let mut workspace = Workspace::new();
    let main = DocumentId::new("main.t");
    let coords_id = DocumentId::new("coords.t");
    workspace.on_document_added(coords_id.clone(), Ok(coords()));
    workspace.on_document_added(
        main.clone(),
        Ok(schema(
            &["coords.t"],
            vec![decl(
                "Entity",
                vec![field("position", imported("coords", "Position"), 0)],
            )],
        )),
    );
    assert!(messages(&mut workspace, &main).is_empty());

    workspace.on_document_removed(&coords_id).unwrap();
    assert!(!workspace.contains(&coords_id));
    assert_eq!(
        messages(&mut workspace, &main),
        vec![
            "File 'coords.t' does not exist.".to_string(),
            "Type 'Position' is not defined in imported schema 'coords.t'.".to_string(),
        ]
    );
}

#[test]
fn test_change_propagates_transitively() {
    let mut workspace = Workspace::new();
    let a = DocumentId::new("a.t");
    let b = DocumentId::new("b.t");
    let c = DocumentId::new("c.t");

    workspace.on_document_added(a.clone(), Ok(schema(&[], vec![decl("A", vec![])])));
    workspace.on_document_added(
        b.clone(),
        Ok(schema(&["a.t"], vec![decl("B", vec![field("a", imported("a", "A"), 0)])])),
    );
    workspace.on_document_added(
        c.clone(),
        Ok(schema(&["b.t"], vec![decl("C", vec![field("b", imported("b", "B"), 0)])])),
    );
    let all = workspace.analyze_all();
    assert!(all.values().all(Vec::is_empty));

    workspace
        .on_document_changed(&a, Ok(schema(&[], vec![decl("Renamed", vec![])])))
        .unwrap();
    assert_eq!(workspace.state(&a), Some(DocumentState::Parsed));
    assert_eq!(workspace.state(&b), Some(DocumentState::ScopesComputed));
    assert_eq!(workspace.state(&c), Some(DocumentState::ScopesComputed));

    assert_eq!(
        messages(&mut workspace, &b),
        vec!["Type 'A' is not defined in imported schema 'a.t'."]
    );
    assert!(messages(&mut workspace, &c).is_empty());
}

#[test]
fn test_import_cycles_are_legal() {
    let mut workspace = Workspace::new();
    let a = DocumentId::new("a.t");
    let b = DocumentId::new("b.t");

    workspace.on_document_added(
        a.clone(),
        Ok(schema(&["b.t"], vec![decl("A", vec![field("b", imported("b", "B"), 0)])])),
    );
    workspace.on_document_added(
        b.clone(),
        Ok(schema(&["a.t"], vec![decl("B", vec![field("a", imported("a", "A"), 0)])])),
    );

    assert!(messages(&mut workspace, &a).is_empty());
    assert!(messages(&mut workspace, &b).is_empty());
    assert_eq!(workspace.import_cycles(), vec![vec![a.clone(), b.clone()]]);
    assert_eq!(workspace.importers_of(&a), vec![b]);
}

#[test]
fn test_parse_failed_dependency_exports_nothing() {
    let mut workspace = Workspace::new();
    let main = DocumentId::new("main.t");
    let broken = DocumentId::new("coords.t");

    workspace.on_document_added(
        broken.clone(),
        Err(SyntaxError::new("Expected '=', found '}'", Range::default())),
    );
    workspace.on_document_added(
        main.clone(),
        Ok(schema(
            &["coords.t"],
            vec![decl(
                "Entity",
                vec![field("position", imported("coords", "Position"), 0)],
            )],
        )),
    );

    assert_eq!(
        messages(&mut workspace, &main),
        vec!["Type 'Position' is not defined in imported schema 'coords.t'."]
    );
    assert_eq!(
        messages(&mut workspace, &broken),
        vec!["Expected '=', found '}'"]
    );

    workspace.on_document_changed(&broken, Ok(coords())).unwrap();
    assert!(messages(&mut workspace, &main).is_empty());
}

#[test]
fn test_relative_imports_from_subdirectories() {
    let mut workspace = Workspace::new();
    let main = DocumentId::new("game/main.t");
    workspace.on_document_added(DocumentId::new("geo/coords.t"), Ok(coords()));
    workspace.on_document_added(
        main.clone(),
        Ok(schema(
            &["../geo/coords.t"],
            vec![decl(
                "Entity",
                vec![field("position", imported("coords", "Position"), 0)],
            )],
        )),
    );

    assert!(messages(&mut workspace, &main).is_empty());
    assert_eq!(
        workspace.imports_of(&main),
        vec![DocumentId::new("geo/coords.t")]
    );
}

#[test]
fn test_analysis_is_idempotent() {
    let mut workspace = Workspace::new();
    workspace.on_document_added(DocumentId::new("coords.t"), Ok(coords()));
    workspace.on_document_added(DocumentId::new("main.t"), Ok(entity()));

    let first = workspace.analyze_all();
    let second = workspace.analyze_all();
    assert_eq!(first, second);
}

/// Declarations `T0..Tn`, each referencing the previous one
fn chained_schema(fields_per_decl: &[usize]) -> Schema {
    let declarations = fields_per_decl
        .iter()
        .enumerate()
        .map(|(i, &count)| {
            let fields = (0..count)
                .map(|j| {
                    let ty = if i > 0 && j == 0 {
                        local(&format!("T{}", i - 1))
                    } else {
                        primitive()
                    };
                    field(&format!("f{}", j), ty, j as u64)
                })
                .collect();
            decl(&format!("T{}", i), fields)
        })
        .collect();
    schema(&[], declarations)
}

proptest! {
    #[test]
    fn test_clean_documents_have_no_diagnostics(
        fields in prop::collection::vec(0usize..6, 1..6),
    ) {
        let mut workspace = Workspace::new();
        let id = DocumentId::new("generated.t");
        workspace.on_document_added(id.clone(), Ok(chained_schema(&fields)));

        prop_assert!(workspace.diagnostics(&id).unwrap().is_empty());
        prop_assert_eq!(workspace.state(&id), Some(DocumentState::Validated));
    }

    #[test]
    fn test_repeated_analysis_is_stable(
        fields in prop::collection::vec(0usize..4, 1..4),
        duplicate in 0u64..3,
    ) {
        let mut generated = chained_schema(&fields);
        generated.declarations[0]
            .fields
            .push(field("extra", local("Unknown"), duplicate));

        let mut workspace = Workspace::new();
        let id = DocumentId::new("generated.t");
        workspace.on_document_added(id.clone(), Ok(generated));

        let first = workspace.diagnostics(&id).unwrap();
        let second = workspace.diagnostics(&id).unwrap();
        prop_assert!(!first.is_empty());
        prop_assert_eq!(first, second);
    }
}
