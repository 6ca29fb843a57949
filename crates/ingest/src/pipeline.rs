use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::time::Instant;

use sales_core::ItemKind;
use sales_db::Db;

use crate::parser::parse_export;
use crate::types::{ColumnConfig, ImportStats, ParsedExport, Result};

fn merge(stats: &mut ImportStats, parsed: &ParsedExport) {
    stats.rows_read += parsed.rows_read;
    stats.rows_voided += parsed.rows_voided;
    stats.rows_skipped += parsed.rows_skipped;
    stats.issues.extend(parsed.issues.iter().cloned());
}

/// Parses an items export and a modifiers export, then stores every row in
/// one transaction. Nothing is written when either export is malformed.
pub fn import_exports<I: Read, M: Read>(
    db: &mut Db,
    items: I,
    modifiers: M,
    columns: &ColumnConfig,
    fallback_location: Option<&str>,
) -> Result<ImportStats> {
    let start = Instant::now();
    let items = parse_export(items, ItemKind::LineItem, &columns.items, fallback_location)?;
    let modifiers = parse_export(
        modifiers,
        ItemKind::Modifier,
        &columns.modifiers,
        fallback_location,
    )?;

    let mut stats = ImportStats::default();
    merge(&mut stats, &items);
    merge(&mut stats, &modifiers);

    let rows = items
        .items
        .into_iter()
        .chain(modifiers.items)
        .collect::<Vec<_>>();
    let summary = db.insert_sale_rows(&rows)?;
    stats.rows_inserted = summary.inserted;
    stats.locations = summary.locations;

    tracing::info!(
        rows_read = stats.rows_read,
        rows_inserted = stats.rows_inserted,
        rows_voided = stats.rows_voided,
        rows_skipped = stats.rows_skipped,
        locations = ?stats.locations,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "import finished"
    );
    Ok(stats)
}

pub fn import_export_files(
    db: &mut Db,
    items_path: &Path,
    modifiers_path: &Path,
    columns: &ColumnConfig,
    fallback_location: Option<&str>,
) -> Result<ImportStats> {
    let items = BufReader::new(File::open(items_path)?);
    let modifiers = BufReader::new(File::open(modifiers_path)?);
    import_exports(db, items, modifiers, columns, fallback_location)
}
