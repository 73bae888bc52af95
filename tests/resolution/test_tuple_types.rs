use crate::common::{catalogue, resolve_field, root_type};
use sharpdoc::catalog::{CatalogSession, NamedTypeKind};
use sharpdoc::parsing::SourceUnit;

const RECORD: &str = r#"
namespace App
{
    class Record
    {
        (int Id, string Name) first;
        (int Id, string Name) second;
        (int, string) unnamed;
        (int Id, string Name)[] many;
        (string Name, int Id) swapped;
        (long Id, string Name) widened;
    }
}
"#;

fn setup() -> (CatalogSession, SourceUnit) {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(&mut session, "Record.cs", RECORD);
    (session, unit)
}

fn tuple_count(session: &CatalogSession) -> usize {
    session.named_types_of_kind(NamedTypeKind::Tuple).count()
}

#[test]
fn test_equal_tuples_share_one_row() {
    let (mut session, unit) = setup();

    let first = resolve_field(&mut session, &unit, "first", true).unwrap();
    let second = resolve_field(&mut session, &unit, "second", true).unwrap();

    let (tuple, ty) = root_type(&session, first);
    assert_eq!(ty.name(), "(int Id, string Name)");
    assert_eq!(root_type(&session, second).0, tuple);
    assert_eq!(tuple_count(&session), 1);

    let names: Vec<&str> = session
        .tuple_elements(tuple)
        .unwrap()
        .iter()
        .map(|element| element.name.as_str())
        .collect();
    assert_eq!(names, vec!["Id", "Name"]);
}

#[test]
fn test_tuple_reference_children_are_elements() {
    let (mut session, unit) = setup();

    let first = resolve_field(&mut session, &unit, "first", true).unwrap();
    let children: Vec<_> = session
        .reference_children(first)
        .iter()
        .map(|reference| reference.named_type)
        .collect();

    assert_eq!(children.len(), 2);
    assert_eq!(session.named_type(children[0]).unwrap().name(), "int");
    assert_eq!(session.named_type(children[1]).unwrap().name(), "string");
}

#[test]
fn test_element_names_distinguish_tuples() {
    let (mut session, unit) = setup();

    let first = resolve_field(&mut session, &unit, "first", true).unwrap();
    let unnamed = resolve_field(&mut session, &unit, "unnamed", true).unwrap();

    let unnamed_tuple = root_type(&session, unnamed).0;
    assert_ne!(root_type(&session, first).0, unnamed_tuple);
    assert_eq!(tuple_count(&session), 2);

    let names: Vec<String> = session
        .tuple_elements(unnamed_tuple)
        .unwrap()
        .iter()
        .map(|element| element.name.clone())
        .collect();
    assert_eq!(names, vec!["Item1", "Item2"]);
}

#[test]
fn test_array_of_tuples_reuses_tuple() {
    let (mut session, unit) = setup();

    let first = resolve_field(&mut session, &unit, "first", true).unwrap();
    let many = resolve_field(&mut session, &unit, "many", true).unwrap();

    assert_eq!(root_type(&session, many).0, root_type(&session, first).0);
    assert_eq!(session.type_reference(many).unwrap().rank, 1);
    assert_eq!(tuple_count(&session), 1);
}

#[test]
fn test_new_tuple_shape_needs_creation() {
    let (mut session, unit) = setup();
    resolve_field(&mut session, &unit, "first", true).unwrap();

    let err = resolve_field(&mut session, &unit, "swapped", false).unwrap_err();
    assert_eq!(err.status_code(), "UNRESOLVED_TYPE");
    assert_eq!(tuple_count(&session), 1);

    resolve_field(&mut session, &unit, "swapped", true).unwrap();
    assert_eq!(tuple_count(&session), 2);
    assert!(
        !session.pending_changes().named_types.iter().any(|id| {
            session.named_type(*id).map(|ty| ty.kind()) == Some(NamedTypeKind::Tuple)
        }),
        "new tuples are flushed as soon as they are created"
    );
}

#[test]
fn test_element_type_distinguishes_tuples() {
    let (mut session, unit) = setup();

    let first = resolve_field(&mut session, &unit, "first", true).unwrap();
    let widened = resolve_field(&mut session, &unit, "widened", true).unwrap();

    let widened_tuple = root_type(&session, widened).0;
    assert_ne!(root_type(&session, first).0, widened_tuple);
    assert_eq!(tuple_count(&session), 2);

    let elements = session.tuple_elements(widened_tuple).unwrap();
    assert_eq!(elements[0].name, "Id");
    assert_eq!(
        session.named_type(elements[0].element_type).unwrap().name(),
        "long"
    );
}

#[test]
fn test_documented_elements_compare_full_names() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Keys.cs",
        r#"
namespace App.Models { class Key { } }
namespace App.Legacy { class Key { } }
namespace App
{
    class Index
    {
        (Models.Key Id, string Name) current;
        (Models.Key Id, string Name) again;
        (Legacy.Key Id, string Name) old;
    }
}
"#,
    );

    let current = resolve_field(&mut session, &unit, "current", true).unwrap();
    let again = resolve_field(&mut session, &unit, "again", true).unwrap();
    let old = resolve_field(&mut session, &unit, "old", true).unwrap();

    let current_tuple = root_type(&session, current).0;
    assert_eq!(root_type(&session, again).0, current_tuple);
    assert_ne!(root_type(&session, old).0, current_tuple);
    assert_eq!(tuple_count(&session), 2);

    let key = session.reference_children(old)[0].named_type;
    assert_eq!(session.named_type(key).unwrap().full_name(), "App.Legacy.Key");
}
