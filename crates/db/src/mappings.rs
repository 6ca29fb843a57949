use rusqlite::params;
use sales_core::{CategoryAssignment, CategoryMapping};

use crate::Db;
use crate::error::Result;

impl Db {
    /// Stored assignments in declaration order.
    pub fn list_category_assignments(&self) -> Result<Vec<CategoryAssignment>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT product_id, category
            FROM category_mapping
            ORDER BY position ASC
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryAssignment {
                    product_id: row.get(0)?,
                    category: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn load_category_mapping(&self) -> Result<CategoryMapping> {
        let assignments = self.list_category_assignments()?;
        Ok(CategoryMapping::from_assignments(&assignments))
    }

    pub fn category_mapping_count(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM category_mapping", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Replaces the whole mapping. A PLU listed twice keeps its first category.
    pub fn replace_category_mapping(&mut self, assignments: &[CategoryAssignment]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM category_mapping", [])?;
        let mut inserted = 0usize;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO category_mapping (product_id, category, position)
                VALUES (?1, ?2, ?3)
                "#,
            )?;
            for (position, assignment) in assignments.iter().enumerate() {
                let product_id = assignment.product_id.trim();
                let category = assignment.category.trim();
                if product_id.is_empty() || category.is_empty() {
                    continue;
                }
                inserted += stmt.execute(params![product_id, category, position as i64])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }
}
