use ingest::ColumnConfig;
use pos_api::ApiConnection;
use sales_core::CategoryRule;
use serde::Deserialize;

#[derive(Debug, Deserialize, Default)]
pub struct EmptyRequest {}

/// Both exports as CSV text.
#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub items_csv: String,
    pub modifiers_csv: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImportFilesRequest {
    pub items_path: String,
    pub modifiers_path: String,
    pub location: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ReportRequest {
    pub location: String,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval_minutes: Option<u32>,
    pub fill: Option<bool>,
    pub subtotals: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ReportSnapshotRequest {
    pub location: String,
    pub date: String,
    pub interval_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct MappingReplaceRequest {
    pub categories: Vec<CategoryRule>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsPutRequest {
    pub default_interval_minutes: Option<u32>,
    pub columns: Option<ColumnConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PosConnectionRequest {
    pub connection: Option<ApiConnection>,
}

#[derive(Debug, Deserialize)]
pub struct PosPullSalesRequest {
    pub location: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub restaurant_guid: Option<String>,
    pub connection: Option<ApiConnection>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PosPullCategoriesRequest {
    pub connection: Option<ApiConnection>,
    pub apply: Option<bool>,
}
