use crate::common::{catalogue, resolve_field, root_type};
use sharpdoc::catalog::{CatalogSession, NamedTypeKind};
use sharpdoc::TypeReferenceId;

fn child_ids(session: &CatalogSession, parent: TypeReferenceId) -> Vec<TypeReferenceId> {
    session
        .reference_children(parent)
        .iter()
        .map(|reference| reference.id)
        .collect()
}

const LOOKUPS: &str = r#"
using System.Collections.Generic;

namespace App
{
    public class Lookups
    {
        public Dictionary<string, List<int>> index;
        public int[][] jagged;
        public List<int[]>[] buckets;
    }
}
"#;

#[test]
fn test_reference_tree_mirrors_generic_arguments() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(&mut session, "Lookups.cs", LOOKUPS);

    let root = resolve_field(&mut session, &unit, "index", true).unwrap();
    assert_eq!(session.pending_changes().type_references.len(), 4);

    let (_, dictionary) = root_type(&session, root);
    assert_eq!(dictionary.name(), "Dictionary");
    assert_eq!(dictionary.arity(), 2);

    let children = child_ids(&session, root);
    assert_eq!(children.len(), 2);
    assert_eq!(root_type(&session, children[0]).1.name(), "string");
    assert_eq!(
        session.type_reference(children[0]).unwrap().parent,
        Some(root)
    );

    let (_, list) = root_type(&session, children[1]);
    assert_eq!(list.name(), "List");
    assert_eq!(list.arity(), 1);

    let grandchildren = child_ids(&session, children[1]);
    assert_eq!(grandchildren.len(), 1);
    assert_eq!(root_type(&session, grandchildren[0]).1.name(), "int");
    assert!(child_ids(&session, grandchildren[0]).is_empty());
}

#[test]
fn test_array_rank_lands_on_element_type() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(&mut session, "Lookups.cs", LOOKUPS);

    let jagged = resolve_field(&mut session, &unit, "jagged", true).unwrap();
    let reference = session.type_reference(jagged).unwrap();
    assert_eq!(reference.rank, 2);
    assert_eq!(root_type(&session, jagged).1.name(), "int");
    assert!(child_ids(&session, jagged).is_empty());

    let buckets = resolve_field(&mut session, &unit, "buckets", true).unwrap();
    assert_eq!(session.type_reference(buckets).unwrap().rank, 1);
    let element = child_ids(&session, buckets)[0];
    assert_eq!(session.type_reference(element).unwrap().rank, 1);
}

#[test]
fn test_arity_selects_documented_type() {
    let mut session = CatalogSession::in_memory();
    let unit = catalogue(
        &mut session,
        "Handlers.cs",
        r#"
namespace App
{
    class Handler { }
    class Handler<T> { }

    class Router
    {
        Handler plain;
        Handler<int> typed;
    }
}
"#,
    );

    let plain = resolve_field(&mut session, &unit, "plain", true).unwrap();
    let typed = resolve_field(&mut session, &unit, "typed", true).unwrap();

    assert_eq!(
        root_type(&session, plain).0,
        session.find_documented("App.Handler", 0).unwrap()
    );
    assert_eq!(
        root_type(&session, typed).0,
        session.find_documented("App.Handler", 1).unwrap()
    );
    assert_eq!(
        session.named_types_of_kind(NamedTypeKind::External).count(),
        1,
        "only int should be external"
    );
}

#[test]
fn test_documented_types_found_through_usings() {
    let mut session = CatalogSession::in_memory();
    catalogue(
        &mut session,
        "Widget.cs",
        "namespace Lib.Controls { public class Widget { } }",
    );
    let page = catalogue(
        &mut session,
        "Page.cs",
        r#"
using Lib.Controls;

namespace App
{
    class Page
    {
        Widget header;
        Section body;

        class Section { }
    }
}
"#,
    );

    let header = resolve_field(&mut session, &page, "header", false).unwrap();
    let body = resolve_field(&mut session, &page, "body", false).unwrap();

    let (_, widget) = root_type(&session, header);
    assert_eq!(widget.full_name(), "Lib.Controls.Widget");
    let (_, section) = root_type(&session, body);
    assert_eq!(section.full_name(), "App.Page.Section");
    assert_eq!(
        session.named_types_of_kind(NamedTypeKind::External).count(),
        0
    );
}

#[test]
fn test_block_usings_come_before_parent_namespaces() {
    let mut session = CatalogSession::in_memory();
    catalogue(
        &mut session,
        "Foo.cs",
        "namespace App { class Foo { } } namespace App.Shared { class Foo { } }",
    );
    let unit = catalogue(
        &mut session,
        "Consumer.cs",
        "namespace App.Models { using App.Shared; class Consumer { Foo f; } }",
    );

    let reference = resolve_field(&mut session, &unit, "f", false).unwrap();
    let (_, ty) = root_type(&session, reference);
    assert_eq!(ty.full_name(), "App.Shared.Foo");
}
