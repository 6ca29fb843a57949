#![allow(dead_code)]

use std::path::PathBuf;

use chrono::NaiveDateTime;
use sales_core::{ItemKind, SaleItem, TIMESTAMP_FORMAT};
use sales_db::Db;
use tempfile::TempDir;

pub struct TestDb {
    pub _dir: TempDir,
    pub db: Db,
    pub path: PathBuf,
}

pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("test.sqlite");
    let mut db = Db::open(&path).expect("open db");
    db.migrate().expect("migrate db");
    TestDb {
        _dir: dir,
        db,
        path,
    }
}

pub fn ts(raw: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).expect("timestamp")
}

pub fn make_item(
    id: &str,
    location: &str,
    kind: ItemKind,
    product_id: &str,
    quantity: f64,
    at: &str,
) -> SaleItem {
    SaleItem {
        id: id.to_string(),
        kind,
        product_id: product_id.to_string(),
        quantity,
        timestamp: ts(at),
        location: location.to_string(),
    }
}

pub fn insert_items(db: &mut Db, items: Vec<SaleItem>) -> usize {
    db.insert_sale_rows(&items).expect("insert rows").inserted
}
