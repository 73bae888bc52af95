use crate::common::{catalogue, resolve_field, root_type};
use sharpdoc::catalog::{CatalogSession, CatalogTable};
use tempfile::TempDir;

const CONTAINER: &str = r#"
using System;

namespace MyNs
{
    public class Container<T>
    {
        public T item;
        public Uri home;
        public (int Id, T Value) entry;
    }
}
"#;

#[test]
fn test_catalog_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("catalog.db");

    {
        let mut session = CatalogSession::open(&db).unwrap();
        let unit = catalogue(&mut session, "Container.cs", CONTAINER);
        resolve_field(&mut session, &unit, "home", true).unwrap();
        assert!(session.save_changes().unwrap() > 0);
        assert!(!session.has_pending_changes());
    }

    let mut session = CatalogSession::open(&db).unwrap();
    let stats = session.stats();
    assert_eq!(stats.files, 1);
    assert_eq!(stats.documented_types, 1);
    assert_eq!(stats.external_types, 1);

    // Known files are not catalogued twice
    let unit = catalogue(&mut session, "Container.cs", CONTAINER);
    assert!(session.pending_changes().files.is_empty());

    let home = resolve_field(&mut session, &unit, "home", false).unwrap();
    assert_eq!(root_type(&session, home).1.name(), "Uri");
    assert_eq!(session.stats().external_types, 1);

    // Type parameters are loaded from the store on demand
    let item = resolve_field(&mut session, &unit, "item", false).unwrap();
    let local = root_type(&session, item).1.as_local().unwrap();
    assert_eq!(local.type_parameter_index, 0);

    session.save_changes().unwrap();
    let store = session.store().unwrap();
    assert_eq!(store.count(CatalogTable::TypeReferences).unwrap(), 3);
}

#[test]
fn test_tuples_are_written_when_created() {
    let temp_dir = TempDir::new().unwrap();
    let db = temp_dir.path().join("catalog.db");

    let mut session = CatalogSession::open(&db).unwrap();
    let unit = catalogue(&mut session, "Container.cs", CONTAINER);
    let entry = resolve_field(&mut session, &unit, "entry", true).unwrap();

    let store = session.store().unwrap();
    assert_eq!(store.count(CatalogTable::TupleElements).unwrap(), 2);
    // References are still staged
    assert_eq!(store.count(CatalogTable::TypeReferences).unwrap(), 0);

    session.save_changes().unwrap();
    let children = session.store().unwrap().reference_children(entry).unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].parent, Some(entry));
}
