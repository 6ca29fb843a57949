use std::path::PathBuf;

use ingest::ColumnConfig;
use pos_api::ApiConnection;
use sales_core::CategoryRule;
use sales_db::Db;

use crate::error::{AppError, Result};
use crate::mapping;
use crate::services::AppServices;

/// Paths and connection settings needed to run the dashboard.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub mapping_defaults_path: PathBuf,
    /// Vendor API used by pulls when a request does not bring its own.
    pub api: Option<ApiConnection>,
    /// Column layout stored on first start when the database has none.
    pub columns: Option<ColumnConfig>,
}

impl AppConfig {
    pub fn new(db_path: PathBuf, mapping_defaults_path: PathBuf) -> Self {
        Self {
            db_path,
            mapping_defaults_path,
            api: None,
            columns: None,
        }
    }
}

/// Application state shared by the HTTP server and the CLI.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub services: AppServices,
}

impl AppState {
    pub fn new(db_path: PathBuf, mapping_defaults_path: PathBuf) -> Self {
        Self::with_config(AppConfig::new(db_path, mapping_defaults_path))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let services = AppServices::new(&config);
        Self { config, services }
    }

    pub fn is_fresh_db(&self) -> bool {
        !self.config.db_path.exists()
    }

    pub fn setup_db(&self) -> Result<()> {
        setup_db(&self.config.db_path)
    }

    pub fn initialize(&self) -> Result<()> {
        let is_fresh_db = self.is_fresh_db();
        self.setup_db()
            .map_err(|err| AppError::Message(format!("initialize db: {}", err)))?;
        if is_fresh_db {
            self.apply_mapping_defaults()?;
        }
        self.sync_mapping_defaults()?;
        if let Some(columns) = &self.config.columns {
            self.services.settings.seed_columns(columns)?;
        }
        Ok(())
    }

    pub fn open_db(&self) -> Result<Db> {
        Ok(Db::open(&self.config.db_path)?)
    }

    pub fn apply_mapping_defaults(&self) -> Result<()> {
        mapping::apply_mapping_defaults(&self.config.db_path, &self.config.mapping_defaults_path)
    }

    pub fn sync_mapping_defaults(&self) -> Result<()> {
        mapping::sync_mapping_defaults(&self.config.db_path, &self.config.mapping_defaults_path)
    }

    pub fn write_mapping_defaults(&self, rules: &[CategoryRule]) -> Result<()> {
        mapping::write_mapping_defaults(&self.config.mapping_defaults_path, rules)
    }
}

pub fn setup_db(path: &std::path::Path) -> Result<()> {
    let mut db = Db::open(path)?;
    db.migrate()?;
    Ok(())
}
