use crate::common::{catalogue, resolve_field, root_type};
use sharpdoc::catalog::{CatalogSession, NamedTypeKind};

#[test]
fn test_external_type_is_created_once() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Client.cs",
        r#"
using System;

namespace App
{
    public class Client
    {
        private Uri home;
        private Uri proxy;
    }
}
"#,
    );

    let first = resolve_field(&mut session, &unit, "home", true).unwrap();
    let second = resolve_field(&mut session, &unit, "proxy", true).unwrap();

    let (first_type, ty) = root_type(&session, first);
    let (second_type, _) = root_type(&session, second);
    assert_eq!(first_type, second_type);
    assert_eq!(
        session.named_types_of_kind(NamedTypeKind::External).count(),
        1
    );

    let external = ty.as_external().unwrap();
    assert_eq!(external.name, "Uri");
    assert_eq!(external.arity, 0);
    assert!(external.possible_namespaces.contains("System"));
    assert!(external.possible_namespaces.contains("App"));
}

#[test]
fn test_possible_namespaces_grow_through_shared_namespace() {
    let mut session = CatalogSession::in_memory();
    let one = catalogue(
        &mut session,
        "One.cs",
        "namespace App { using Lib; class A { Widget w; } }",
    );
    let two = catalogue(
        &mut session,
        "Two.cs",
        "namespace App { using Other; class B { Widget w; } }",
    );

    let first = resolve_field(&mut session, &one, "w", true).unwrap();
    let (first_type, ty) = root_type(&session, first);
    let before = ty.as_external().unwrap().possible_namespaces.clone();
    assert!(before.contains("Lib"));
    assert!(!before.contains("Other"));

    // Both lookups could mean App.Widget
    let second = resolve_field(&mut session, &two, "w", true).unwrap();
    let (second_type, ty) = root_type(&session, second);
    assert_eq!(first_type, second_type);

    let after = &ty.as_external().unwrap().possible_namespaces;
    assert!(after.is_superset(&before));
    assert!(after.contains("Other"));
    assert_eq!(
        session.named_types_of_kind(NamedTypeKind::External).count(),
        1
    );
}

#[test]
fn test_disjoint_usings_keep_external_types_apart() {
    let mut session = CatalogSession::in_memory();
    let one = catalogue(&mut session, "One.cs", "using Lib; class A { Widget w; }");
    let two = catalogue(&mut session, "Two.cs", "using Other; class B { Widget w; }");

    let a = resolve_field(&mut session, &one, "w", true).unwrap();
    let b = resolve_field(&mut session, &two, "w", true).unwrap();

    let (a_type, a_ty) = root_type(&session, a);
    let a_namespaces = a_ty.as_external().unwrap().possible_namespaces.clone();
    let (b_type, b_ty) = root_type(&session, b);
    assert_ne!(a_type, b_type);
    assert!(!a_namespaces.contains("Other"));
    assert!(!b_ty.as_external().unwrap().possible_namespaces.contains("Lib"));
    assert_eq!(
        session.named_types_of_kind(NamedTypeKind::External).count(),
        2
    );
}

#[test]
fn test_fully_qualified_names_do_not_share_rows() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Mixed.cs",
        "class Mixed { global::Lib.Widget a; global::Other.Widget b; }",
    );

    let a = resolve_field(&mut session, &unit, "a", true).unwrap();
    let b = resolve_field(&mut session, &unit, "b", true).unwrap();

    let (a_type, a_ty) = root_type(&session, a);
    let (b_type, b_ty) = root_type(&session, b);
    assert_ne!(a_type, b_type);
    assert_eq!(a_ty.name(), "Widget");
    assert!(a_ty.as_external().unwrap().possible_namespaces.contains("Lib"));
    assert!(b_ty.as_external().unwrap().possible_namespaces.contains("Other"));
}

#[test]
fn test_keywords_live_in_system() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(&mut session, "Counter.cs", "class Counter { int count; }");

    let reference = resolve_field(&mut session, &unit, "count", true).unwrap();
    let (_, ty) = root_type(&session, reference);
    let external = ty.as_external().unwrap();
    assert_eq!(external.name, "int");
    assert_eq!(
        external.possible_namespaces.iter().collect::<Vec<_>>(),
        vec!["System"]
    );
}

#[test]
fn test_creation_gating_stages_nothing() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Gate.cs",
        "using System; class Gate { Missing missing; Uri known; Uri again; }",
    );
    let before = session.stats();

    let err = resolve_field(&mut session, &unit, "missing", false).unwrap_err();
    assert_eq!(err.status_code(), "UNRESOLVED_TYPE");
    assert_eq!(session.stats(), before);
    assert!(session.pending_changes().type_references.is_empty());

    // Known types still resolve without creation
    let known = resolve_field(&mut session, &unit, "known", true).unwrap();
    let again = resolve_field(&mut session, &unit, "again", false).unwrap();
    assert_eq!(root_type(&session, known).0, root_type(&session, again).0);
}

#[test]
fn test_failed_resolution_leaves_nothing_staged() {
    let mut session = CatalogSession::in_memory();
    let gate = catalogue(
        &mut session,
        "Gate.cs",
        "namespace Lib { class Gate<T> { Dictionary<T, int> known; } }",
    );
    let holder = catalogue(
        &mut session,
        "Holder.cs",
        "namespace Lib.Inner { class Holder<T> { Dictionary<T, Missing> bad; } }",
    );
    resolve_field(&mut session, &gate, "known", true).unwrap();
    session.save_changes().unwrap();

    let locals = session.named_types_of_kind(NamedTypeKind::Local).count();
    let dictionary = session
        .named_types_of_kind(NamedTypeKind::External)
        .find(|(_, ty)| ty.name() == "Dictionary")
        .map(|(_, ty)| ty.as_external().unwrap().possible_namespaces.clone())
        .unwrap();

    // Dictionary and T resolve, Missing does not
    let err = resolve_field(&mut session, &holder, "bad", false).unwrap_err();
    assert_eq!(err.status_code(), "UNRESOLVED_TYPE");
    assert!(!session.has_pending_changes(), "{:?}", session.pending_changes());
    assert_eq!(session.named_types_of_kind(NamedTypeKind::Local).count(), locals);

    let unchanged = session
        .named_types_of_kind(NamedTypeKind::External)
        .find(|(_, ty)| ty.name() == "Dictionary")
        .map(|(_, ty)| ty.as_external().unwrap().possible_namespaces.clone())
        .unwrap();
    assert_eq!(unchanged, dictionary);
    assert!(!unchanged.contains("Lib.Inner"));
}
