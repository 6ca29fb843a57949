use rusqlite::Connection;

#[test]
fn migrate_backfills_location_last_updated() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("backfill.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        conn.execute_batch(include_str!("../migrations/0001_init.sql"))
            .expect("migrate 0001");
        conn.execute(
            "INSERT INTO location (id, name, created_at) VALUES (1, 'Covington', '2024-06-01T00:00:00Z')",
            [],
        )
        .expect("insert location");
        conn.execute(
            r#"
            INSERT INTO sale_row (id, location_id, kind, product_id, quantity, ts, created_at)
            VALUES
              ('a', 1, 'line_item', '100', 1.0, '2024-07-01T11:00:00', '2024-07-01T20:00:00Z'),
              ('b', 1, 'line_item', '100', 1.0, '2024-07-02T11:00:00', '2024-07-02T20:00:00Z')
            "#,
            [],
        )
        .expect("insert rows");
    }

    let mut db = sales_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate db");
    db.migrate().expect("migrate twice");

    assert_eq!(
        db.last_update_time(1).expect("updated").as_deref(),
        Some("2024-07-02T20:00:00Z")
    );
}
