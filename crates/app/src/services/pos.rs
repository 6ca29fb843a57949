use pos_api::{ApiAuth, ApiConnection, PosClient, SalesPull};
use sales_core::CategoryRule;
use sales_db::Db;
use serde::Serialize;

use crate::config::PullSalesParams;
use crate::error::{AppError, Result};
use crate::services::mappings::MappingService;
use crate::services::{SharedConfig, open_db};
use crate::util::time::resolve_date_range;

/// Outcome of pulling sales from a vendor API into the store.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PullStats {
    pub records_read: usize,
    pub records_dropped: usize,
    pub rows_inserted: usize,
    pub locations: Vec<String>,
}

#[derive(Clone)]
pub struct PosService {
    config: SharedConfig,
}

impl PosService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    /// Builds a client from the request's connection or the configured one.
    fn client(&self, connection: Option<ApiConnection>) -> Result<PosClient> {
        let connection = connection
            .or_else(|| self.config.api.clone())
            .ok_or_else(|| AppError::InvalidInput("no POS API connection configured".to_string()))?;
        Ok(PosClient::new(connection)?)
    }

    pub fn test_connection(&self, connection: Option<ApiConnection>) -> Result<bool> {
        Ok(self.client(connection)?.test_connection()?)
    }

    /// Pulls sales for every day in the range and stores them like an upload.
    /// Toast connections pull one business date at a time.
    pub fn pull_sales(
        &self,
        params: &PullSalesParams,
        connection: Option<ApiConnection>,
    ) -> Result<PullStats> {
        let location = params.location.trim();
        if location.is_empty() {
            return Err(AppError::InvalidInput("location is required".to_string()));
        }
        let (start, end) = resolve_date_range(&params.start_date, params.end_date.as_deref())?;
        let client = self.client(connection)?;

        let mut pulls: Vec<SalesPull> = Vec::new();
        if matches!(client.connection().auth, ApiAuth::ToastClient { .. }) {
            let restaurant_guid = params
                .restaurant_guid
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    AppError::InvalidInput("restaurant_guid is required for Toast".to_string())
                })?;
            for day in start.iter_days().take_while(|day| *day <= end) {
                pulls.push(client.pull_toast_orders(restaurant_guid, location, day)?);
            }
        } else {
            pulls.push(client.pull_sales(location, start, end)?);
        }

        let mut stats = PullStats::default();
        let mut items = Vec::new();
        for pull in pulls {
            stats.records_read += pull.records_read;
            stats.records_dropped += pull.records_dropped;
            items.extend(pull.items);
        }
        let mut db = self.db()?;
        let summary = db.insert_sale_rows(&items)?;
        stats.rows_inserted = summary.inserted;
        stats.locations = summary.locations;
        tracing::info!(
            location,
            records = stats.records_read,
            inserted = stats.rows_inserted,
            "stored pulled sales"
        );
        Ok(stats)
    }

    /// Fetches the vendor's category mapping; with `apply` it replaces the
    /// stored mapping.
    pub fn pull_categories(
        &self,
        connection: Option<ApiConnection>,
        apply: bool,
    ) -> Result<Vec<CategoryRule>> {
        let rules = self.client(connection)?.pull_category_mappings()?;
        if apply {
            MappingService::new(self.config.clone()).replace(&rules)?;
        }
        Ok(rules)
    }
}
