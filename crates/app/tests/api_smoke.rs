use std::path::Path;

use sales_app::{ApiError, AppError, AppState, PullSalesParams, ReportParams};
use sales_core::{CategoryRule, Interval};
use tempfile::tempdir;

const ITEMS: &str = "\
PLU,Qty,Order Date,Location,Void?
81831,2,7/1/24 11:05 AM,Covington,false
2307,1,7/1/24 11:40 AM,Covington,false
82151,1,7/1/24 06:20 PM,Covington,false
";

const MODIFIERS: &str = "\
PLU,Qty,Order Date,Location,Void?
2307,3,7/1/24 11:10 AM,Covington,
3082,1,7/1/24 06:45 PM,Covington,
";

fn init_state(dir: &Path) -> AppState {
    let state = AppState::new(dir.join("app.sqlite"), dir.join("mapping.json"));
    state.initialize().expect("initialize");
    state
}

fn report_params(date: &str) -> ReportParams {
    ReportParams {
        location: "Covington".to_string(),
        date: Some(date.to_string()),
        ..ReportParams::default()
    }
}

#[test]
fn import_then_report_smoke() {
    let dir = tempdir().expect("temp dir");
    let state = init_state(dir.path());
    assert!(dir.path().join("mapping.json").exists());

    let stats = state
        .services
        .imports
        .import_csv(ITEMS, MODIFIERS, None)
        .expect("import");
    assert_eq!(stats.rows_inserted, 5);

    let generated = state
        .services
        .reports
        .generate(&report_params("2024-07-01"))
        .expect("report");
    let report = &generated.report;
    assert_eq!(report.interval, Interval::Hour);
    assert_eq!(report.categories, ["1/2 Chix", "1/2 Ribs", "Corn"]);
    assert_eq!(report.category_total("Corn"), Some(5.0));
    assert_eq!(report.buckets.len(), 2);
    assert_eq!(generated.business_date.as_deref(), Some("2024-07-01"));

    let snapshot = state
        .services
        .reports
        .snapshot("Covington", "2024-07-01", None)
        .expect("snapshot");
    assert_eq!(&snapshot.report, report);
    assert_eq!(
        state
            .services
            .reports
            .list_snapshots("Covington")
            .expect("snapshots")
            .len(),
        1
    );
}

#[test]
fn fill_and_half_hour_interval() {
    let dir = tempdir().expect("temp dir");
    let state = init_state(dir.path());
    state
        .services
        .imports
        .import_csv(ITEMS, MODIFIERS, None)
        .expect("import");
    let params = ReportParams {
        interval_minutes: Some(30),
        fill: Some(true),
        ..report_params("2024-07-01")
    };
    let generated = state.services.reports.generate(&params).expect("report");
    assert_eq!(generated.report.buckets.len(), 48);
    assert_eq!(generated.report.buckets[22].label, "11:00-11:29");
    assert_eq!(generated.report.buckets[22].counts.iter().sum::<f64>(), 5.0);

    let unbounded = ReportParams {
        location: "Covington".to_string(),
        start: Some("0001-01-01".to_string()),
        end: Some("9999-12-31".to_string()),
        fill: Some(true),
        ..ReportParams::default()
    };
    let err = state
        .services
        .reports
        .generate(&unbounded)
        .expect_err("span too long to fill");
    assert!(matches!(err, AppError::InvalidInput(_)));
    let unfilled = ReportParams {
        fill: None,
        ..unbounded
    };
    let generated = state.services.reports.generate(&unfilled).expect("unfilled");
    assert_eq!(generated.report.buckets.len(), 2);
}

#[test]
fn preview_does_not_save_a_snapshot() {
    let dir = tempdir().expect("temp dir");
    let state = init_state(dir.path());
    state
        .services
        .imports
        .import_csv(ITEMS, MODIFIERS, None)
        .expect("import");

    let preview = state
        .services
        .reports
        .preview(&report_params("2024-07-01"))
        .expect("preview");
    assert_eq!(preview.report.category_total("Corn"), Some(5.0));
    assert!(
        state
            .services
            .reports
            .list_snapshots("Covington")
            .expect("snapshots")
            .is_empty()
    );
    let err = state
        .services
        .reports
        .snapshot("Covington", "2024-07-01", None)
        .expect_err("nothing saved");
    assert!(matches!(err, AppError::NotFound(_)));
}

#[test]
fn mapping_replace_updates_reports_and_defaults_file() {
    let dir = tempdir().expect("temp dir");
    let state = init_state(dir.path());
    state
        .services
        .imports
        .import_csv(ITEMS, MODIFIERS, None)
        .expect("import");
    let stored = state
        .services
        .mappings
        .replace(&[CategoryRule {
            category: "Sides".to_string(),
            product_ids: vec!["2307".to_string(), "3082".to_string()],
        }])
        .expect("replace");
    assert_eq!(stored, 2);

    let defaults = sales_app::load_mapping_defaults(&dir.path().join("mapping.json"))
        .expect("defaults");
    assert_eq!(defaults[0].category, "Sides");

    let report = state
        .services
        .reports
        .generate(&report_params("2024-07-01"))
        .expect("report")
        .report;
    assert_eq!(report.categories, ["Sides"]);
    assert_eq!(report.grand_total(), 5.0);
}

#[test]
fn locations_and_settings_smoke() {
    let dir = tempdir().expect("temp dir");
    let state = init_state(dir.path());
    state
        .services
        .imports
        .import_csv(ITEMS, MODIFIERS, None)
        .expect("import");

    let locations = state.services.locations.list().expect("locations");
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].row_count, 5);
    assert_eq!(locations[0].dates, vec!["2024-07-01"]);

    state
        .services
        .settings
        .update(Some(30), None)
        .expect("update settings");
    assert_eq!(
        state.services.settings.get().expect("settings").default_interval_minutes,
        30
    );
    let err = state
        .services
        .settings
        .update(Some(45), None)
        .expect_err("bad interval");
    assert!(matches!(err, AppError::InvalidInput(_)));

    state
        .services
        .locations
        .clear_data("Covington")
        .expect("clear");
    let locations = state.services.locations.list().expect("locations");
    assert_eq!(locations[0].row_count, 0);

    state.services.locations.delete("Covington").expect("delete");
    let err = state
        .services
        .reports
        .generate(&report_params("2024-07-01"))
        .expect_err("missing location");
    assert_eq!(ApiError::from(err).status, 404);
}

#[test]
fn malformed_upload_and_missing_api_are_client_errors() {
    let dir = tempdir().expect("temp dir");
    let state = init_state(dir.path());
    let err = state
        .services
        .imports
        .import_csv("PLU,Qty\n1,1\n", MODIFIERS, None)
        .expect_err("malformed");
    assert_eq!(ApiError::from(err).status, 400);

    let err = state
        .services
        .pos
        .pull_sales(
            &PullSalesParams {
                location: "Covington".to_string(),
                start_date: "2024-07-01".to_string(),
                ..PullSalesParams::default()
            },
            None,
        )
        .expect_err("no api");
    assert!(matches!(err, AppError::InvalidInput(_)));
}
