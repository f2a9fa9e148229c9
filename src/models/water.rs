//! Water intake model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// One glass/bottle logged on a date
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterLog {
    pub id: i64,
    pub date: String,
    pub amount_ml: f64,
    pub created_at: String,
}

impl WaterLog {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            amount_ml: row.get("amount_ml")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, date: &str, amount_ml: f64) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO water_logs (date, amount_ml) VALUES (?1, ?2)",
            params![date, amount_ml],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, date, amount_ml, "Logged water");

        let mut stmt = conn.prepare("SELECT * FROM water_logs WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// Logs for a date, oldest first
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM water_logs WHERE date = ?1 ORDER BY id ASC")?;
        let logs = stmt
            .query_map([date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(logs)
    }

    /// Most recent log on a date
    pub fn last_for_date(conn: &Connection, date: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM water_logs WHERE date = ?1 ORDER BY id DESC LIMIT 1",
        )?;
        match stmt.query_row([date], Self::from_row) {
            Ok(log) => Ok(Some(log)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn total_for_date(conn: &Connection, date: &str) -> DbResult<f64> {
        let total: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount_ml), 0) FROM water_logs WHERE date = ?1",
            [date],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM water_logs WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
