use ingest::ColumnConfig;
use sales_core::Interval;
use sales_db::Db;
use serde::Serialize;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use crate::util::time::resolve_interval;

/// Snapshot of user-configurable settings stored in the DB.
#[derive(Debug, Clone, Serialize)]
pub struct SettingsSnapshot {
    pub default_interval_minutes: u32,
    pub columns: ColumnConfig,
    pub api_configured: bool,
}

#[derive(Clone)]
pub struct SettingsService {
    config: SharedConfig,
}

impl SettingsService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn get(&self) -> Result<SettingsSnapshot> {
        let db = self.db()?;
        Ok(SettingsSnapshot {
            default_interval_minutes: db.get_default_interval()?.minutes(),
            columns: load_columns(&db)?,
            api_configured: self.config.api.is_some(),
        })
    }

    pub fn update(
        &self,
        default_interval_minutes: Option<u32>,
        columns: Option<&ColumnConfig>,
    ) -> Result<()> {
        let db = self.db()?;
        if let Some(minutes) = default_interval_minutes {
            let interval = resolve_interval(Some(minutes), Interval::default())?;
            db.set_default_interval(interval)?;
        }
        if let Some(columns) = columns {
            db.set_column_config_json(&serde_json::to_string(columns)?)?;
        }
        Ok(())
    }

    pub fn columns(&self) -> Result<ColumnConfig> {
        load_columns(&self.db()?)
    }

    pub fn default_interval(&self) -> Result<Interval> {
        Ok(self.db()?.get_default_interval()?)
    }

    /// Stores `columns` unless a layout has already been saved.
    pub fn seed_columns(&self, columns: &ColumnConfig) -> Result<()> {
        let db = self.db()?;
        if db.get_column_config_json()?.is_none() {
            db.set_column_config_json(&serde_json::to_string(columns)?)?;
        }
        Ok(())
    }
}

fn load_columns(db: &Db) -> Result<ColumnConfig> {
    match db.get_column_config_json()? {
        Some(raw) => match serde_json::from_str(&raw) {
            Ok(columns) => Ok(columns),
            Err(err) => {
                tracing::warn!(error = %err, "stored column config is invalid; using defaults");
                Ok(ColumnConfig::default())
            }
        },
        None => Ok(ColumnConfig::default()),
    }
}
