mod parser;
mod pipeline;
mod types;

pub use parser::parse_export;
pub use pipeline::{import_export_files, import_exports};
pub use types::{
    ColumnConfig, ColumnRef, ExportColumns, ImportStats, IngestError, IngestIssue, ParsedExport,
    Result,
};
