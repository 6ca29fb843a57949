mod error;
mod helpers;
mod locations;
mod mappings;
mod migrations;
mod sale_rows;
mod settings;
mod snapshots;
mod types;

use std::path::Path;

use rusqlite::Connection;

pub use error::{DbError, Result};
pub use types::{ImportSummary, StoredSnapshot, SnapshotSummary};

/// SQLite-backed history store. Every table that holds sales data is scoped
/// by `location_id`.
pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "temp_store", "MEMORY")?;
        conn.pragma_update(None, "cache_size", -20_000)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self { conn })
    }
}
