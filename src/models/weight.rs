//! Body weight model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A body weight reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: i64,
    pub date: String,
    pub kg: f64,
    pub created_at: String,
}

impl WeightEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            kg: row.get("kg")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, date: &str, kg: f64) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO weight_entries (date, kg) VALUES (?1, ?2)",
            params![date, kg],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, date, kg, "Logged weight");

        let mut stmt = conn.prepare("SELECT * FROM weight_entries WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// Every reading, oldest date first
    pub fn list_all(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_entries ORDER BY date ASC, id ASC")?;
        let entries = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Latest reading recorded for a date
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM weight_entries WHERE date = ?1 ORDER BY id DESC LIMIT 1",
        )?;
        match stmt.query_row([date], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM weight_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_list_is_date_ordered() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        WeightEntry::create(&conn, "2025-03-05", 81.2).unwrap();
        WeightEntry::create(&conn, "2025-03-01", 82.0).unwrap();

        let dates: Vec<String> = WeightEntry::list_all(&conn)
            .unwrap()
            .into_iter()
            .map(|w| w.date)
            .collect();
        assert_eq!(dates, vec!["2025-03-01", "2025-03-05"]);

        let today = WeightEntry::get_by_date(&conn, "2025-03-05").unwrap().unwrap();
        assert_eq!(today.kg, 81.2);
        assert!(WeightEntry::get_by_date(&conn, "2025-03-06").unwrap().is_none());

        assert!(WeightEntry::delete(&conn, today.id).unwrap());
        assert_eq!(WeightEntry::list_all(&conn).unwrap().len(), 1);
    }
}
