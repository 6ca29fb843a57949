use rusqlite::params;
use sales_core::Interval;

use crate::Db;
use crate::error::Result;

const DEFAULT_INTERVAL_KEY: &str = "default_interval_minutes";
const COLUMN_CONFIG_KEY: &str = "column_config";

impl Db {
    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_setting WHERE key = ?1")?;
        let mut rows = stmt.query([key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get::<_, String>(0)?))
        } else {
            Ok(None)
        }
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO app_setting (key, value)
            VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn get_default_interval(&self) -> Result<Interval> {
        let interval = self
            .get_setting(DEFAULT_INTERVAL_KEY)?
            .and_then(|value| value.parse::<u32>().ok())
            .and_then(Interval::from_minutes)
            .unwrap_or_default();
        Ok(interval)
    }

    pub fn set_default_interval(&self, interval: Interval) -> Result<()> {
        self.set_setting(DEFAULT_INTERVAL_KEY, &interval.minutes().to_string())
    }

    /// Column configuration as stored JSON; decoding is left to the caller.
    pub fn get_column_config_json(&self) -> Result<Option<String>> {
        self.get_setting(COLUMN_CONFIG_KEY)
    }

    pub fn set_column_config_json(&self, value: &str) -> Result<()> {
        self.set_setting(COLUMN_CONFIG_KEY, value)
    }
}
