use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use sales_core::{CategoryMapping, CategoryRule};
use sales_db::Db;

use crate::error::{AppError, Result};

pub fn apply_mapping_defaults(db_path: &Path, defaults_path: &Path) -> Result<()> {
    let rules = if defaults_path.exists() {
        load_mapping_defaults(defaults_path)?
    } else {
        load_initial_mapping()?
    };
    let mapping = CategoryMapping::from_rules(&rules);
    let mut db = Db::open(db_path)?;
    let stored = db.replace_category_mapping(&mapping.to_assignments())?;
    tracing::info!(plus = stored, categories = mapping.categories().len(), "applied mapping defaults");
    Ok(())
}

/// Writes the stored mapping back to the defaults file so edits survive a
/// fresh database.
pub fn sync_mapping_defaults(db_path: &Path, defaults_path: &Path) -> Result<()> {
    let db = Db::open(db_path)?;
    let mapping = db.load_category_mapping()?;
    if mapping.is_empty() && !defaults_path.exists() {
        return Ok(());
    }
    write_mapping_defaults(defaults_path, &mapping.to_rules())
}

pub fn load_mapping_defaults(path: &Path) -> Result<Vec<CategoryRule>> {
    let file = fs::File::open(path)?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).map_err(AppError::from)
}

pub fn load_initial_mapping() -> Result<Vec<CategoryRule>> {
    let data = include_str!("../initial-mapping.json");
    serde_json::from_str(data).map_err(AppError::from)
}

pub fn write_mapping_defaults(path: &Path, rules: &[CategoryRule]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, rules).map_err(AppError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_mapping_parses() {
        let rules = load_initial_mapping().expect("initial mapping");
        let mapping = CategoryMapping::from_rules(&rules);
        assert_eq!(mapping.resolve("81831"), Some("1/2 Chix"));
        assert_eq!(mapping.resolve("3648"), Some("Corn"));
    }

    #[test]
    fn defaults_file_round_trips() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested").join("mapping.json");
        let rules = vec![CategoryRule {
            category: "Grits".to_string(),
            product_ids: vec!["4100".to_string()],
        }];
        write_mapping_defaults(&path, &rules).expect("write");
        assert_eq!(load_mapping_defaults(&path).expect("load"), rules);
    }
}
