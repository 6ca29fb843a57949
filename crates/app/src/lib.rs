pub mod app;
pub mod config;
pub mod error;
pub mod mapping;
pub mod render;
pub mod services;
pub mod startup;
pub mod util;

pub use app::{AppConfig, AppState};
pub use config::{PullSalesParams, ReportParams};
pub use error::{ApiError, AppError, Result};
pub use mapping::{
    apply_mapping_defaults, load_initial_mapping, load_mapping_defaults, sync_mapping_defaults,
    write_mapping_defaults,
};
pub use render::{RenderOptions, escape_html, format_quantity, render_html, render_text};
pub use services::{
    AppServices, GeneratedReport, LocationSummary, PullStats, SettingsSnapshot,
};
pub use startup::{AppPaths, ensure_app_data_dir};
pub use util::time::{resolve_interval, resolve_span};
