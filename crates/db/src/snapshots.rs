use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::{row_to_snapshot, row_to_snapshot_summary};
use crate::types::{SnapshotSummary, StoredSnapshot};

impl Db {
    pub fn upsert_report_snapshot(
        &self,
        location_id: i64,
        business_date: &str,
        interval_minutes: u32,
        report_json: &str,
    ) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            r#"
            INSERT INTO report_snapshot (
              location_id, business_date, interval_minutes, report_json, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(location_id, business_date, interval_minutes) DO UPDATE SET
              report_json = excluded.report_json,
              created_at = excluded.created_at
            "#,
            params![location_id, business_date, interval_minutes as i64, report_json, now],
        )?;
        Ok(())
    }

    pub fn get_report_snapshot(
        &self,
        location_id: i64,
        business_date: &str,
        interval_minutes: u32,
    ) -> Result<Option<StoredSnapshot>> {
        self.conn
            .query_row(
                r#"
                SELECT location.name, report_snapshot.business_date,
                       report_snapshot.interval_minutes, report_snapshot.report_json,
                       report_snapshot.created_at
                FROM report_snapshot
                JOIN location ON location.id = report_snapshot.location_id
                WHERE report_snapshot.location_id = ?1
                  AND report_snapshot.business_date = ?2
                  AND report_snapshot.interval_minutes = ?3
                "#,
                params![location_id, business_date, interval_minutes as i64],
                row_to_snapshot,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn list_report_snapshots(&self, location_id: i64) -> Result<Vec<SnapshotSummary>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT business_date, interval_minutes, created_at
            FROM report_snapshot
            WHERE location_id = ?1
            ORDER BY business_date DESC, interval_minutes ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![location_id], row_to_snapshot_summary)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
