use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use sales_core::Location;

use crate::Db;
use crate::error::{DbError, Result};
use crate::helpers::row_to_location;

impl Db {
    pub fn list_locations(&self) -> Result<Vec<Location>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, name, created_at, last_updated_at
            FROM location
            ORDER BY name ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], row_to_location)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn get_location_by_id(&self, id: i64) -> Result<Option<Location>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, created_at, last_updated_at
                FROM location
                WHERE id = ?1
                "#,
                params![id],
                row_to_location,
            )
            .optional()
            .map_err(DbError::from)
    }

    pub fn get_location_by_name(&self, name: &str) -> Result<Option<Location>> {
        self.conn
            .query_row(
                r#"
                SELECT id, name, created_at, last_updated_at
                FROM location
                WHERE name = ?1
                "#,
                params![name.trim()],
                row_to_location,
            )
            .optional()
            .map_err(DbError::from)
    }

    /// Like [`Db::get_location_by_name`] but fails with `LocationNotFound`.
    pub fn require_location(&self, name: &str) -> Result<Location> {
        self.get_location_by_name(name)?
            .ok_or_else(|| DbError::LocationNotFound(name.trim().to_string()))
    }

    pub fn get_or_create_location(&self, name: &str) -> Result<Location> {
        let now = Utc::now().to_rfc3339();
        let id = location_id_in(&self.conn, name, &now)?;
        self.get_location_by_id(id)?
            .ok_or_else(|| DbError::LocationNotFound(name.trim().to_string()))
    }

    /// Distinct business dates (`YYYY-MM-DD`) with stored rows, newest first.
    pub fn location_dates(&self, location_id: i64) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT DISTINCT substr(ts, 1, 10) AS business_date
            FROM sale_row
            WHERE location_id = ?1
            ORDER BY business_date DESC
            "#,
        )?;
        let rows = stmt
            .query_map(params![location_id], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn last_update_time(&self, location_id: i64) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT last_updated_at FROM location WHERE id = ?1",
                params![location_id],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    pub fn count_sale_rows(&self, location_id: i64) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sale_row WHERE location_id = ?1",
            params![location_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Removes stored rows and snapshots but keeps the location itself.
    pub fn clear_location_data(&mut self, location_id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM sale_row WHERE location_id = ?1",
            params![location_id],
        )?;
        tx.execute(
            "DELETE FROM report_snapshot WHERE location_id = ?1",
            params![location_id],
        )?;
        tx.execute(
            "UPDATE location SET last_updated_at = NULL WHERE id = ?1",
            params![location_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn delete_location(&mut self, location_id: i64) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute(
            "DELETE FROM sale_row WHERE location_id = ?1",
            params![location_id],
        )?;
        tx.execute(
            "DELETE FROM report_snapshot WHERE location_id = ?1",
            params![location_id],
        )?;
        tx.execute("DELETE FROM location WHERE id = ?1", params![location_id])?;
        tx.commit()?;
        Ok(())
    }
}

pub(crate) fn location_id_in(conn: &Connection, name: &str, now: &str) -> Result<i64> {
    let name = name.trim();
    conn.execute(
        r#"
        INSERT INTO location (name, created_at)
        VALUES (?1, ?2)
        ON CONFLICT(name) DO NOTHING
        "#,
        params![name, now],
    )?;
    let id = conn.query_row(
        "SELECT id FROM location WHERE name = ?1",
        params![name],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(id)
}
