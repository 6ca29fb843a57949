use sales_db::Db;
use serde::Serialize;

use crate::error::Result;
use crate::services::{SharedConfig, open_db, require_location};

#[derive(Debug, Clone, Serialize)]
pub struct LocationSummary {
    pub name: String,
    pub created_at: String,
    pub last_updated_at: Option<String>,
    pub row_count: usize,
    pub dates: Vec<String>,
}

#[derive(Clone)]
pub struct LocationsService {
    config: SharedConfig,
}

impl LocationsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn list(&self) -> Result<Vec<LocationSummary>> {
        let db = self.db()?;
        let mut summaries = Vec::new();
        for location in db.list_locations()? {
            summaries.push(LocationSummary {
                row_count: db.count_sale_rows(location.id)?,
                dates: db.location_dates(location.id)?,
                name: location.name,
                created_at: location.created_at,
                last_updated_at: location.last_updated_at,
            });
        }
        Ok(summaries)
    }

    pub fn clear_data(&self, name: &str) -> Result<()> {
        let mut db = self.db()?;
        let location = require_location(&db, name)?;
        db.clear_location_data(location.id)?;
        tracing::info!(location = %location.name, "cleared location data");
        Ok(())
    }

    pub fn delete(&self, name: &str) -> Result<()> {
        let mut db = self.db()?;
        let location = require_location(&db, name)?;
        db.delete_location(location.id)?;
        tracing::info!(location = %location.name, "deleted location");
        Ok(())
    }
}
