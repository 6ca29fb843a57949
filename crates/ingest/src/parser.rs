use std::fmt::Write as _;
use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use sales_core::{ItemKind, SaleItem, normalize_product_id, parse_timestamp};
use sha2::{Digest, Sha256};

use crate::types::{ColumnRef, ExportColumns, IngestError, IngestIssue, ParsedExport, Result};

const BOM: char = '\u{FEFF}';

struct ResolvedColumns {
    product_id: usize,
    quantity: usize,
    timestamp: usize,
    location: Option<usize>,
    void: Option<usize>,
}

fn source_name(kind: ItemKind) -> &'static str {
    match kind {
        ItemKind::LineItem => "items",
        ItemKind::Modifier => "modifiers",
    }
}

fn find_column(headers: &StringRecord, column: &ColumnRef) -> Option<usize> {
    match column {
        ColumnRef::Index(index) => (*index < headers.len()).then_some(*index),
        ColumnRef::Name(name) => headers.iter().position(|header| {
            header
                .trim_start_matches(BOM)
                .trim()
                .eq_ignore_ascii_case(name.trim())
        }),
    }
}

fn require_column(headers: &StringRecord, column: &ColumnRef, source: &str) -> Result<usize> {
    find_column(headers, column).ok_or_else(|| {
        IngestError::MalformedInput(format!(
            "{} export is missing required column {}",
            source, column
        ))
    })
}

fn resolve_columns(
    headers: &StringRecord,
    columns: &ExportColumns,
    source: &str,
    fallback_location: Option<&str>,
) -> Result<ResolvedColumns> {
    let resolved = ResolvedColumns {
        product_id: require_column(headers, &columns.product_id, source)?,
        quantity: require_column(headers, &columns.quantity, source)?,
        timestamp: require_column(headers, &columns.timestamp, source)?,
        location: columns
            .location
            .as_ref()
            .and_then(|column| find_column(headers, column)),
        void: columns
            .void
            .as_ref()
            .and_then(|column| find_column(headers, column)),
    };
    if resolved.location.is_none() && fallback_location.is_none() {
        return Err(IngestError::MalformedInput(format!(
            "{} export has no location column and no location was given",
            source
        )));
    }
    Ok(resolved)
}

fn field(record: &StringRecord, index: usize) -> &str {
    record.get(index).map(str::trim).unwrap_or("")
}

pub(crate) fn is_void_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1"
    )
}

pub(crate) fn parse_quantity(raw: &str) -> Option<f64> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|value| value.is_finite())
}

fn hex_digest(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        let _ = write!(&mut out, "{:02x}", byte);
    }
    out
}

/// Stable id for one export row so re-importing the same file is a no-op.
pub(crate) fn row_id(location: &str, kind: ItemKind, ordinal: usize, record: &StringRecord) -> String {
    let mut hasher = Sha256::new();
    hasher.update(location.as_bytes());
    hasher.update(b":");
    hasher.update(kind.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(ordinal.to_string().as_bytes());
    for value in record.iter() {
        hasher.update(b"\x1f");
        hasher.update(value.as_bytes());
    }
    hex_digest(&hasher.finalize())
}

/// Reads one POS export. Fails only when the header is unreadable or a
/// required column is missing; row-level problems become issues.
pub fn parse_export<R: Read>(
    reader: R,
    kind: ItemKind,
    columns: &ExportColumns,
    fallback_location: Option<&str>,
) -> Result<ParsedExport> {
    let source = source_name(kind);
    let fallback_location = fallback_location
        .map(str::trim)
        .filter(|value| !value.is_empty());
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();
    let resolved = resolve_columns(&headers, columns, source, fallback_location)?;

    let mut parsed = ParsedExport::default();
    for (ordinal, result) in reader.records().enumerate() {
        parsed.rows_read += 1;
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                let line = err.position().map(|pos| pos.line()).unwrap_or(0);
                tracing::warn!(source, line, error = %err, "skipping malformed csv record");
                parsed.rows_skipped += 1;
                parsed.issues.push(IngestIssue {
                    source: source.to_string(),
                    line,
                    message: err.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let skip = |parsed: &mut ParsedExport, message: String| {
            tracing::warn!(source, line, "{}", message);
            parsed.rows_skipped += 1;
            parsed.issues.push(IngestIssue {
                source: source.to_string(),
                line,
                message,
            });
        };

        if let Some(index) = resolved.void
            && is_void_flag(field(&record, index))
        {
            parsed.rows_voided += 1;
            continue;
        }

        let product_id = normalize_product_id(field(&record, resolved.product_id));
        if product_id.is_empty() {
            parsed.rows_skipped += 1;
            continue;
        }

        let raw_quantity = field(&record, resolved.quantity);
        let Some(quantity) = parse_quantity(raw_quantity) else {
            skip(&mut parsed, format!("invalid quantity `{}`", raw_quantity));
            continue;
        };

        let raw_ts = field(&record, resolved.timestamp);
        let Some(timestamp) = parse_timestamp(raw_ts) else {
            skip(&mut parsed, format!("invalid timestamp `{}`", raw_ts));
            continue;
        };

        let location = resolved
            .location
            .map(|index| field(&record, index))
            .filter(|value| !value.is_empty())
            .or(fallback_location);
        let Some(location) = location else {
            skip(&mut parsed, "missing location".to_string());
            continue;
        };

        parsed.items.push(SaleItem {
            id: row_id(location, kind, ordinal, &record),
            kind,
            product_id,
            quantity,
            timestamp,
            location: location.to_string(),
        });
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(data: &str, kind: ItemKind) -> Result<ParsedExport> {
        parse_export(data.as_bytes(), kind, &ExportColumns::default(), None)
    }

    #[test]
    fn reads_default_columns_case_insensitively() {
        let data = "\u{FEFF}plu,QTY,order date,location,void?\n81831,2,7/1/24 11:05 AM,Covington,false\n";
        let parsed = parse(data, ItemKind::LineItem).expect("parse");
        assert_eq!(parsed.rows_read, 1);
        assert_eq!(parsed.items.len(), 1);
        let item = &parsed.items[0];
        assert_eq!(item.product_id, "81831");
        assert_eq!(item.quantity, 2.0);
        assert_eq!(item.location, "Covington");
        assert_eq!(item.kind, ItemKind::LineItem);
    }

    #[test]
    fn missing_required_column_is_malformed_input() {
        let data = "PLU,Order Date,Location\n81831,7/1/24 11:05 AM,Covington\n";
        let err = parse(data, ItemKind::Modifier).expect_err("missing qty");
        match err {
            IngestError::MalformedInput(message) => {
                assert!(message.contains("modifiers"));
                assert!(message.contains("Qty"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn voided_blank_and_bad_rows_are_counted() {
        let data = "PLU,Qty,Order Date,Location,Void?\n\
                    100,1,2024-07-01 11:00:00,Covington,Yes\n\
                    ,1,2024-07-01 11:00:00,Covington,\n\
                    100,abc,2024-07-01 11:00:00,Covington,\n\
                    100,1,yesterday,Covington,\n\
                    100,1,2024-07-01 11:00:00,,\n\
                    100,\"1,000\",2024-07-01 11:00:00,Covington,N\n";
        let parsed = parse(data, ItemKind::LineItem).expect("parse");
        assert_eq!(parsed.rows_read, 6);
        assert_eq!(parsed.rows_voided, 1);
        assert_eq!(parsed.rows_skipped, 4);
        assert_eq!(parsed.issues.len(), 3);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].quantity, 1000.0);
        assert_eq!(parsed.issues[0].line, 4);
    }

    #[test]
    fn index_columns_and_fallback_location() {
        let columns = ExportColumns {
            product_id: ColumnRef::Index(2),
            quantity: ColumnRef::Index(0),
            timestamp: ColumnRef::Index(1),
            location: None,
            void: None,
        };
        let data = "a,b,c\n3,2024-07-01T18:15:00,2307.0\n";
        let parsed = parse_export(data.as_bytes(), ItemKind::Modifier, &columns, Some("Covington"))
            .expect("parse");
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.items[0].product_id, "2307");
        assert_eq!(parsed.items[0].location, "Covington");
    }

    #[test]
    fn no_location_source_is_malformed_input() {
        let columns = ExportColumns {
            location: None,
            ..ExportColumns::default()
        };
        let data = "PLU,Qty,Order Date\n100,1,2024-07-01 11:00:00\n";
        let err = parse_export(data.as_bytes(), ItemKind::LineItem, &columns, None)
            .expect_err("no location");
        assert!(matches!(err, IngestError::MalformedInput(_)));
    }

    #[test]
    fn row_ids_are_stable_and_distinct() {
        let data = "PLU,Qty,Order Date,Location\n100,1,2024-07-01 11:00:00,Covington\n100,1,2024-07-01 11:00:00,Covington\n";
        let first = parse(data, ItemKind::LineItem).expect("parse");
        let second = parse(data, ItemKind::LineItem).expect("parse");
        assert_eq!(first.items[0].id, second.items[0].id);
        assert_ne!(first.items[0].id, first.items[1].id);
        let modifiers = parse(data, ItemKind::Modifier).expect("parse");
        assert_ne!(first.items[0].id, modifiers.items[0].id);
    }

    #[test]
    fn void_flags() {
        for value in ["true", "TRUE", "yes", "Y", "1"] {
            assert!(is_void_flag(value), "{}", value);
        }
        for value in ["", "false", "no", "0", "N"] {
            assert!(!is_void_flag(value), "{}", value);
        }
    }
}
