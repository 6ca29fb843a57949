use std::collections::HashMap;

use chrono::Utc;
use rusqlite::params;
use sales_core::{SaleItem, TimeSpan, format_timestamp};

use crate::Db;
use crate::error::Result;
use crate::helpers::row_to_sale_item;
use crate::locations::location_id_in;
use crate::types::ImportSummary;

impl Db {
    /// Stores rows for any number of locations in one transaction. Rows whose
    /// id is already present are ignored.
    pub fn insert_sale_rows(&mut self, items: &[SaleItem]) -> Result<ImportSummary> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;
        let mut summary = ImportSummary::default();
        let mut location_ids: HashMap<&str, i64> = HashMap::new();
        let mut touched: Vec<i64> = Vec::new();
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO sale_row (
                  id, location_id, kind, product_id, quantity, ts, created_at
                ) VALUES (
                  ?1, ?2, ?3, ?4, ?5, ?6, ?7
                )
                "#,
            )?;
            for item in items {
                let location_id = match location_ids.get(item.location.as_str()) {
                    Some(id) => *id,
                    None => {
                        let id = location_id_in(&tx, &item.location, &now)?;
                        location_ids.insert(item.location.as_str(), id);
                        summary.locations.push(item.location.trim().to_string());
                        id
                    }
                };
                let rows = stmt.execute(params![
                    item.id,
                    location_id,
                    item.kind.as_str(),
                    item.product_id,
                    item.quantity,
                    format_timestamp(item.timestamp),
                    now,
                ])?;
                if rows > 0 {
                    summary.inserted += 1;
                    if !touched.contains(&location_id) {
                        touched.push(location_id);
                    }
                }
            }
        }
        for location_id in touched {
            tx.execute(
                "UPDATE location SET last_updated_at = ?1 WHERE id = ?2",
                params![now, location_id],
            )?;
        }
        tx.commit()?;
        Ok(summary)
    }

    /// Rows for one location ordered by timestamp, optionally limited to `span`.
    pub fn load_sale_rows(&self, location_id: i64, span: Option<&TimeSpan>) -> Result<Vec<SaleItem>> {
        let (start, end) = match span {
            Some(span) => (
                Some(format_timestamp(span.start)),
                Some(format_timestamp(span.end)),
            ),
            None => (None, None),
        };
        let mut stmt = self.conn.prepare(
            r#"
            SELECT sale_row.id, sale_row.kind, sale_row.product_id, sale_row.quantity,
                   sale_row.ts, location.name
            FROM sale_row
            JOIN location ON location.id = sale_row.location_id
            WHERE sale_row.location_id = ?1
              AND (?2 IS NULL OR sale_row.ts >= ?2)
              AND (?3 IS NULL OR sale_row.ts < ?3)
            ORDER BY sale_row.ts ASC, sale_row.id ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![location_id, start, end], row_to_sale_item)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_location_rows(&self, name: &str, span: Option<&TimeSpan>) -> Result<Vec<SaleItem>> {
        let location = self.require_location(name)?;
        self.load_sale_rows(location.id, span)
    }
}
