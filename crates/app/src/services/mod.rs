mod imports;
mod locations;
mod mappings;
mod pos;
mod reports;
mod settings;

use std::sync::Arc;

use sales_core::Location;
use sales_db::Db;

use crate::app::AppConfig;
use crate::error::{AppError, Result};

pub use imports::ImportService;
pub use locations::{LocationSummary, LocationsService};
pub use mappings::MappingService;
pub use pos::{PosService, PullStats};
pub use reports::{GeneratedReport, ReportService};
pub use settings::{SettingsService, SettingsSnapshot};

type SharedConfig = Arc<AppConfig>;

/// Service registry for app-level operations.
#[derive(Clone)]
pub struct AppServices {
    pub imports: ImportService,
    pub reports: ReportService,
    pub locations: LocationsService,
    pub mappings: MappingService,
    pub settings: SettingsService,
    pub pos: PosService,
}

impl AppServices {
    pub fn new(config: &AppConfig) -> Self {
        let shared = Arc::new(config.clone());
        Self {
            imports: ImportService::new(shared.clone()),
            reports: ReportService::new(shared.clone()),
            locations: LocationsService::new(shared.clone()),
            mappings: MappingService::new(shared.clone()),
            settings: SettingsService::new(shared.clone()),
            pos: PosService::new(shared),
        }
    }
}

fn open_db(config: &SharedConfig) -> Result<Db> {
    Ok(Db::open(&config.db_path)?)
}

fn require_location(db: &Db, name: &str) -> Result<Location> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput("location is required".to_string()));
    }
    db.get_location_by_name(name)?
        .ok_or_else(|| missing_location(name))
}

fn missing_location(name: &str) -> AppError {
    AppError::NotFound(format!("location not found: {}", name))
}
