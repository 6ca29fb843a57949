use std::path::Path;

use ingest::ImportStats;
use sales_db::Db;

use crate::error::Result;
use crate::services::{SharedConfig, open_db};
use crate::services::settings::SettingsService;

#[derive(Clone)]
pub struct ImportService {
    config: SharedConfig,
}

impl ImportService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    fn settings(&self) -> SettingsService {
        SettingsService::new(self.config.clone())
    }

    /// Imports an items export and a modifiers export given as CSV text.
    pub fn import_csv(
        &self,
        items_csv: &str,
        modifiers_csv: &str,
        location: Option<&str>,
    ) -> Result<ImportStats> {
        let columns = self.settings().columns()?;
        let mut db = self.db()?;
        Ok(ingest::import_exports(
            &mut db,
            items_csv.as_bytes(),
            modifiers_csv.as_bytes(),
            &columns,
            location,
        )?)
    }

    pub fn import_files(
        &self,
        items_path: &Path,
        modifiers_path: &Path,
        location: Option<&str>,
    ) -> Result<ImportStats> {
        let columns = self.settings().columns()?;
        let mut db = self.db()?;
        Ok(ingest::import_export_files(
            &mut db,
            items_path,
            modifiers_path,
            &columns,
            location,
        )?)
    }
}
