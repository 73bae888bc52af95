use sharpdoc::catalog::{CatalogSession, CatalogTable, UsageRole};
use sharpdoc::{FileWalker, Scanner, Settings};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn write_project(root: &std::path::Path) {
    fs::create_dir_all(root.join("Models")).unwrap();
    fs::create_dir_all(root.join("obj")).unwrap();

    fs::write(
        root.join("Models/Entity.cs"),
        r#"
namespace Shop.Models
{
    public abstract class Entity<TKey>
    {
        public TKey Id { get; set; }
    }
}
"#,
    )
    .unwrap();
    fs::write(
        root.join("Models/Order.cs"),
        r#"
using System;
using System.Collections.Generic;

namespace Shop.Models
{
    public class Order : Entity<Guid>
    {
        public List<(string Sku, int Quantity)> Lines { get; set; }
        public DateTime Placed;

        public decimal Total(decimal discount) => 0;
        public T Convert<T>() => default;
    }
}
"#,
    )
    .unwrap();
    fs::write(root.join("obj/Order.g.cs"), "class Generated { }").unwrap();
}

#[test]
fn test_scan_project_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_project(root);
    let db = root.join(".sharpdoc/catalog.db");

    let settings = Settings::default();
    let files = FileWalker::new(Arc::new(settings.clone())).walk(root);
    assert_eq!(files.len(), 2);

    let mut session = CatalogSession::open(&db).unwrap();
    let summary = Scanner::from_settings(&settings)
        .unwrap()
        .scan_files(&mut session, &files)
        .unwrap();
    session.save_changes().unwrap();

    assert_eq!(summary.files_scanned, 2);
    assert_eq!(summary.documented_types, 2);
    assert_eq!(summary.failure_count, 0, "{:?}", summary.failures);
    // Entity.Id, Order : Entity<Guid>, Lines, Placed, Total return, Total.discount
    assert_eq!(summary.usages, 6);

    let order = session.find_documented("Shop.Models.Order", 0).unwrap();
    let entity = session.find_documented("Shop.Models.Entity", 1).unwrap();
    let base = session
        .type_usages()
        .find(|usage| usage.owner == order && usage.role == UsageRole::BaseType)
        .unwrap();
    assert_eq!(
        session.type_reference(base.reference).unwrap().named_type,
        entity
    );

    let store = session.store().unwrap();
    assert_eq!(store.count(CatalogTable::TypeUsages).unwrap(), 6);
    assert_eq!(
        store.count(CatalogTable::TypeReferences).unwrap() as usize,
        summary.references
    );
}

#[test]
fn test_rescan_skips_catalogued_files() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    write_project(root);
    let db = root.join(".sharpdoc/catalog.db");

    let settings = Settings::default();
    let files = FileWalker::new(Arc::new(settings.clone())).walk(root);

    {
        let mut session = CatalogSession::open(&db).unwrap();
        Scanner::from_settings(&settings)
            .unwrap()
            .scan_files(&mut session, &files)
            .unwrap();
        session.save_changes().unwrap();
    }

    let mut session = CatalogSession::open(&db).unwrap();
    let summary = Scanner::from_settings(&settings)
        .unwrap()
        .scan_files(&mut session, &files)
        .unwrap();

    assert_eq!(summary.files_scanned, 0);
    assert_eq!(summary.files_skipped, 2);
    assert_eq!(summary.usages, 0);
    assert!(!session.has_pending_changes());
}
