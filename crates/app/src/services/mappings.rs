use sales_core::{CategoryMapping, CategoryRule};
use sales_db::Db;

use crate::error::Result;
use crate::mapping;
use crate::services::{SharedConfig, open_db};

#[derive(Clone)]
pub struct MappingService {
    config: SharedConfig,
}

impl MappingService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn db(&self) -> Result<Db> {
        open_db(&self.config)
    }

    pub fn list(&self) -> Result<Vec<CategoryRule>> {
        let db = self.db()?;
        Ok(db.load_category_mapping()?.to_rules())
    }

    /// Replaces the stored mapping and rewrites the defaults file. Returns the
    /// number of PLUs stored.
    pub fn replace(&self, rules: &[CategoryRule]) -> Result<usize> {
        let normalized = CategoryMapping::from_rules(rules);
        let mut db = self.db()?;
        let updated = db.replace_category_mapping(&normalized.to_assignments())?;
        if let Err(err) = mapping::write_mapping_defaults(
            &self.config.mapping_defaults_path,
            &normalized.to_rules(),
        ) {
            tracing::warn!(error = %err, "failed to update mapping defaults");
        }
        Ok(updated)
    }
}
