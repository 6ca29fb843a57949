use std::io;

use serde::{Deserialize, Serialize};

/// Column selector: a header name (matched case-insensitively) or a
/// zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    pub fn name(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(index) => write!(f, "#{}", index),
            Self::Name(name) => write!(f, "`{}`", name),
        }
    }
}

/// Where each field lives in one export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportColumns {
    pub product_id: ColumnRef,
    pub quantity: ColumnRef,
    pub timestamp: ColumnRef,
    pub location: Option<ColumnRef>,
    pub void: Option<ColumnRef>,
}

impl Default for ExportColumns {
    fn default() -> Self {
        Self {
            product_id: ColumnRef::name("PLU"),
            quantity: ColumnRef::name("Qty"),
            timestamp: ColumnRef::name("Order Date"),
            location: Some(ColumnRef::name("Location")),
            void: Some(ColumnRef::name("Void?")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnConfig {
    pub items: ExportColumns,
    pub modifiers: ExportColumns,
}

/// Rows parsed from one export plus what was left out.
#[derive(Debug, Clone, Default)]
pub struct ParsedExport {
    pub items: Vec<sales_core::SaleItem>,
    pub rows_read: usize,
    pub rows_voided: usize,
    pub rows_skipped: usize,
    pub issues: Vec<IngestIssue>,
}

/// Import summary returned after storing an upload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportStats {
    pub rows_read: usize,
    pub rows_inserted: usize,
    pub rows_voided: usize,
    pub rows_skipped: usize,
    pub locations: Vec<String>,
    pub issues: Vec<IngestIssue>,
}

/// Non-fatal issues encountered during import.
#[derive(Debug, Clone, Serialize)]
pub struct IngestIssue {
    pub source: String,
    pub line: u64,
    pub message: String,
}

/// Errors emitted by the import pipeline.
#[derive(Debug)]
pub enum IngestError {
    Io(io::Error),
    Csv(csv::Error),
    MalformedInput(String),
    Db(sales_db::DbError),
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Csv(err) => write!(f, "csv error: {}", err),
            Self::MalformedInput(message) => write!(f, "malformed input: {}", message),
            Self::Db(err) => write!(f, "db error: {}", err),
        }
    }
}

impl std::error::Error for IngestError {}

impl From<io::Error> for IngestError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<sales_db::DbError> for IngestError {
    fn from(err: sales_db::DbError) -> Self {
        Self::Db(err)
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
