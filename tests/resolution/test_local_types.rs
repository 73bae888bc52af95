use crate::common::{catalogue, resolve_field, root_type};
use sharpdoc::catalog::{CatalogSession, NamedTypeKind};

#[test]
fn test_type_parameter_becomes_local_type() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Container.cs",
        "namespace MyNs { public class Container<T> { public T item; } }",
    );
    let container = session.find_documented("MyNs.Container", 1).unwrap();

    let reference = resolve_field(&mut session, &unit, "item", false).unwrap();

    let (_, ty) = root_type(&session, reference);
    let local = ty.as_local().expect("T should resolve to a local type");
    assert_eq!(local.name, "T");
    assert_eq!(local.type_parameter_index, 0);
    assert_eq!(local.declaring_type, container);
}

#[test]
fn test_local_types_shadow_external_types() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Shadow.cs",
        r#"
namespace App
{
    class Loose { T stray; }
    class Box<T> { T value; }
}
"#,
    );

    let stray = resolve_field(&mut session, &unit, "stray", true).unwrap();
    assert_eq!(root_type(&session, stray).1.kind(), NamedTypeKind::External);

    let value = resolve_field(&mut session, &unit, "value", true).unwrap();
    assert_eq!(root_type(&session, value).1.kind(), NamedTypeKind::Local);
}

#[test]
fn test_parameter_index_and_outer_parameters() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Pairs.cs",
        r#"
namespace App
{
    class Pair<TLeft, TRight>
    {
        TRight right;

        class Cursor
        {
            TLeft current;
        }
    }
}
"#,
    );
    let pair = session.find_documented("App.Pair", 2).unwrap();

    let right = resolve_field(&mut session, &unit, "right", false).unwrap();
    let local = root_type(&session, right).1.as_local().unwrap().clone();
    assert_eq!(local.type_parameter_index, 1);
    assert_eq!(local.declaring_type, pair);

    let current = resolve_field(&mut session, &unit, "current", false).unwrap();
    let local = root_type(&session, current).1.as_local().unwrap();
    assert_eq!(local.name, "TLeft");
    assert_eq!(local.type_parameter_index, 0);
    assert_eq!(local.declaring_type, pair);
}

#[test]
fn test_type_parameter_as_generic_argument() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Bag.cs",
        "using System.Collections.Generic; class Bag<TItem> { List<TItem> items; }",
    );

    let items = resolve_field(&mut session, &unit, "items", true).unwrap();
    assert_eq!(root_type(&session, items).1.name(), "List");

    let argument = session.reference_children(items)[0].id;
    assert_eq!(root_type(&session, argument).1.kind(), NamedTypeKind::Local);
}
