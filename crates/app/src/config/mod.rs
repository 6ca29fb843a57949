use serde::{Deserialize, Serialize};

/// Which rows a report covers and how they are bucketed. `date` selects one
/// business day; `start`/`end` select an explicit range.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ReportParams {
    pub location: String,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub interval_minutes: Option<u32>,
    /// Emit every bucket of the requested range, including empty ones.
    pub fill: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PullSalesParams {
    pub location: String,
    pub start_date: String,
    pub end_date: Option<String>,
    /// Required when the connection authenticates as a Toast client.
    pub restaurant_guid: Option<String>,
}
