use chrono::NaiveDateTime;
use rusqlite::Row;
use rusqlite::types::Type;
use sales_core::{ItemKind, Location, SaleItem, TIMESTAMP_FORMAT};

use crate::types::{SnapshotSummary, StoredSnapshot};

fn conversion_error(
    index: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
}

#[derive(Debug, thiserror::Error)]
#[error("unknown sale row kind: {0}")]
struct UnknownKind(String);

pub(crate) fn row_to_location(row: &Row<'_>) -> std::result::Result<Location, rusqlite::Error> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        last_updated_at: row.get(3)?,
    })
}

/// Expects `id, kind, product_id, quantity, ts, location name`.
pub(crate) fn row_to_sale_item(row: &Row<'_>) -> std::result::Result<SaleItem, rusqlite::Error> {
    let kind_raw: String = row.get(1)?;
    let kind = ItemKind::parse(&kind_raw).ok_or_else(|| conversion_error(1, UnknownKind(kind_raw)))?;
    let ts_raw: String = row.get(4)?;
    let timestamp = NaiveDateTime::parse_from_str(&ts_raw, TIMESTAMP_FORMAT)
        .map_err(|err| conversion_error(4, err))?;
    Ok(SaleItem {
        id: row.get(0)?,
        kind,
        product_id: row.get(2)?,
        quantity: row.get(3)?,
        timestamp,
        location: row.get(5)?,
    })
}

pub(crate) fn row_to_snapshot(
    row: &Row<'_>,
) -> std::result::Result<StoredSnapshot, rusqlite::Error> {
    Ok(StoredSnapshot {
        location: row.get(0)?,
        business_date: row.get(1)?,
        interval_minutes: row.get::<_, i64>(2)? as u32,
        report_json: row.get(3)?,
        created_at: row.get(4)?,
    })
}

pub(crate) fn row_to_snapshot_summary(
    row: &Row<'_>,
) -> std::result::Result<SnapshotSummary, rusqlite::Error> {
    Ok(SnapshotSummary {
        business_date: row.get(0)?,
        interval_minutes: row.get::<_, i64>(1)? as u32,
        created_at: row.get(2)?,
    })
}
