/// Persisted report for one location, business date and interval.
#[derive(Debug, Clone)]
pub struct StoredSnapshot {
    pub location: String,
    pub business_date: String,
    pub interval_minutes: u32,
    pub report_json: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct SnapshotSummary {
    pub business_date: String,
    pub interval_minutes: u32,
    pub created_at: String,
}

/// Rows stored by one `insert_sale_rows` call, per location.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub inserted: usize,
    pub locations: Vec<String>,
}
