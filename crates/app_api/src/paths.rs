use std::path::PathBuf;

use sales_app::{AppError, Result};

pub fn expand_home_path(path: &str) -> PathBuf {
    if path == "~"
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home);
    }
    if let Some(rest) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(path)
}

/// Expands `~` and checks that an export file exists before import.
pub fn resolve_export_path(path: &str, field: &str) -> Result<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{} is required", field)));
    }
    let resolved = expand_home_path(trimmed);
    if !resolved.is_file() {
        return Err(AppError::NotFound(format!(
            "{} not found at {}",
            field,
            resolved.display()
        )));
    }
    Ok(resolved)
}
