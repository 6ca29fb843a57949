use std::fs;

use ingest::{ColumnConfig, IngestError, import_export_files, import_exports};
use sales_core::{Interval, TimeSpan, aggregate_in_span, parse_date};
use sales_core::{CategoryMapping, CategoryRule};
use sales_db::Db;
use tempfile::tempdir;

const ITEMS: &str = "\
PLU,Menu Item,Qty,Order Date,Location,Void?
81831,1/2 Chicken,2,7/1/24 11:05 AM,Covington,false
2307,Corn,1,7/1/24 11:40 AM,Covington,false
82151,1/2 Ribs,1,7/1/24 06:20 PM,Covington,true
9999,Open Food,1,7/1/24 06:25 PM,Covington,false
";

const MODIFIERS: &str = "\
PLU,Modifier,Qty,Order Date,Location,Void?
2307,Side Corn,3,7/1/24 11:10 AM,Covington,
3082,Side Corn,1,7/1/24 06:45 PM,Covington,
";

fn open_db(dir: &std::path::Path) -> Db {
    let mut db = Db::open(dir.join("import.sqlite")).expect("open db");
    db.migrate().expect("migrate db");
    db
}

fn mapping() -> CategoryMapping {
    CategoryMapping::from_rules(&[
        CategoryRule {
            category: "1/2 Chix".to_string(),
            product_ids: vec!["81831".to_string()],
        },
        CategoryRule {
            category: "1/2 Ribs".to_string(),
            product_ids: vec!["82151".to_string()],
        },
        CategoryRule {
            category: "Corn".to_string(),
            product_ids: vec!["2307".to_string(), "3082".to_string()],
        },
    ])
}

#[test]
fn import_merges_items_and_modifiers() {
    let dir = tempdir().expect("temp dir");
    let mut db = open_db(dir.path());
    let stats = import_exports(
        &mut db,
        ITEMS.as_bytes(),
        MODIFIERS.as_bytes(),
        &ColumnConfig::default(),
        None,
    )
    .expect("import");
    assert_eq!(stats.rows_read, 6);
    assert_eq!(stats.rows_voided, 1);
    assert_eq!(stats.rows_inserted, 5);
    assert_eq!(stats.locations, vec!["Covington"]);
    assert!(stats.issues.is_empty());

    let date = parse_date("2024-07-01").expect("date");
    let span = TimeSpan::for_date(date);
    let rows = db.load_location_rows("Covington", Some(&span)).expect("rows");
    let report = aggregate_in_span(&mapping(), &rows, Interval::Hour, span);
    assert_eq!(report.category_total("Corn"), Some(5.0));
    assert_eq!(report.category_total("1/2 Chix"), Some(2.0));
    assert_eq!(report.category_index("1/2 Ribs"), None);
    assert_eq!(report.buckets.len(), 24);
}

#[test]
fn reimporting_same_exports_inserts_nothing() {
    let dir = tempdir().expect("temp dir");
    let mut db = open_db(dir.path());
    let columns = ColumnConfig::default();
    import_exports(&mut db, ITEMS.as_bytes(), MODIFIERS.as_bytes(), &columns, None)
        .expect("first import");
    let again = import_exports(&mut db, ITEMS.as_bytes(), MODIFIERS.as_bytes(), &columns, None)
        .expect("second import");
    assert_eq!(again.rows_inserted, 0);
    let location = db.require_location("Covington").expect("location");
    assert_eq!(db.count_sale_rows(location.id).expect("count"), 5);
}

#[test]
fn malformed_modifiers_abort_without_writing_items() {
    let dir = tempdir().expect("temp dir");
    let mut db = open_db(dir.path());
    let bad_modifiers = "PLU,Order Date,Location\n2307,7/1/24 11:10 AM,Covington\n";
    let err = import_exports(
        &mut db,
        ITEMS.as_bytes(),
        bad_modifiers.as_bytes(),
        &ColumnConfig::default(),
        None,
    )
    .expect_err("missing column");
    assert!(matches!(err, IngestError::MalformedInput(_)));
    assert!(db.list_locations().expect("locations").is_empty());
}

#[test]
fn import_from_files_uses_fallback_location() {
    let dir = tempdir().expect("temp dir");
    let mut db = open_db(dir.path());
    let items_path = dir.path().join("items.csv");
    let modifiers_path = dir.path().join("modifiers.csv");
    fs::write(&items_path, "PLU,Qty,Order Date\n81831,1,2024-07-01 12:00:00\n").expect("items");
    fs::write(&modifiers_path, "PLU,Qty,Order Date\n").expect("modifiers");

    let stats = import_export_files(
        &mut db,
        &items_path,
        &modifiers_path,
        &ColumnConfig::default(),
        Some("Baton Rouge"),
    )
    .expect("import");
    assert_eq!(stats.rows_inserted, 1);
    assert_eq!(stats.locations, vec!["Baton Rouge"]);

    let err = import_export_files(
        &mut db,
        &dir.path().join("missing.csv"),
        &modifiers_path,
        &ColumnConfig::default(),
        None,
    )
    .expect_err("missing file");
    assert!(matches!(err, IngestError::Io(_)));
}
