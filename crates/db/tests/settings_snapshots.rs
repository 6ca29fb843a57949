mod support;

use sales_core::Interval;
use support::setup_db;

#[test]
fn default_interval_falls_back_to_hour() {
    let test_db = setup_db();
    let db = &test_db.db;
    assert_eq!(db.get_default_interval().expect("interval"), Interval::Hour);
    db.set_default_interval(Interval::HalfHour).expect("set");
    assert_eq!(db.get_default_interval().expect("interval"), Interval::HalfHour);
    db.set_setting("default_interval_minutes", "45").expect("set raw");
    assert_eq!(db.get_default_interval().expect("interval"), Interval::Hour);
}

#[test]
fn snapshots_upsert_per_date_and_interval() {
    let test_db = setup_db();
    let db = &test_db.db;
    let location = db.get_or_create_location("Covington").expect("location");
    db.upsert_report_snapshot(location.id, "2024-07-01", 60, r#"{"v":1}"#)
        .expect("first");
    db.upsert_report_snapshot(location.id, "2024-07-01", 60, r#"{"v":2}"#)
        .expect("second");
    db.upsert_report_snapshot(location.id, "2024-07-01", 30, r#"{"v":3}"#)
        .expect("third");

    let stored = db
        .get_report_snapshot(location.id, "2024-07-01", 60)
        .expect("get")
        .expect("snapshot");
    assert_eq!(stored.report_json, r#"{"v":2}"#);
    assert_eq!(stored.location, "Covington");
    assert_eq!(db.list_report_snapshots(location.id).expect("list").len(), 2);
    assert!(
        db.get_report_snapshot(location.id, "2024-07-02", 60)
            .expect("get")
            .is_none()
    );
}
