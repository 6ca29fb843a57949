use ingest::ColumnConfig;
use sales_app::LocationSummary;
use sales_core::{CategoryRule, Report};
use serde::Serialize;

#[derive(Serialize)]
pub struct ReportResponse {
    pub location: String,
    pub business_date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub last_updated_at: Option<String>,
    pub report: Report,
    /// Rendered `<table>` for the dashboard page.
    pub table_html: String,
}

#[derive(Serialize)]
pub struct SnapshotEntry {
    pub business_date: String,
    pub interval_minutes: u32,
    pub created_at: String,
}

#[derive(Serialize)]
pub struct SnapshotsResponse {
    pub location: String,
    pub snapshots: Vec<SnapshotEntry>,
}

#[derive(Serialize)]
pub struct LocationsResponse {
    pub locations: Vec<LocationSummary>,
}

#[derive(Serialize)]
pub struct MappingResponse {
    pub categories: Vec<CategoryRule>,
}

#[derive(Serialize)]
pub struct SettingsResponse {
    pub default_interval_minutes: u32,
    pub columns: ColumnConfig,
    pub api_configured: bool,
    pub db_path: String,
    pub mapping_defaults_path: String,
    pub app_data_dir: String,
}

#[derive(Serialize)]
pub struct ConnectionResponse {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct UpdatedResponse {
    pub updated: i64,
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: String,
}

#[derive(Serialize)]
pub struct ClearedResponse {
    pub cleared: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}
