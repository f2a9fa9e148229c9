//! Settings model
//!
//! Free-form key/value settings stored as JSON text.

use rusqlite::{params, Connection};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::db::DbResult;

/// Setting key for the daily calorie goal
pub const CALORIE_GOAL_KEY: &str = "calorie_goal";

pub struct Setting;

impl Setting {
    /// Read a setting as raw JSON
    pub fn get(conn: &Connection, key: &str) -> DbResult<Option<serde_json::Value>> {
        let mut stmt = conn.prepare("SELECT value FROM settings WHERE key = ?1")?;
        let raw: Option<String> = match stmt.query_row([key], |row| row.get(0)) {
            Ok(raw) => Some(raw),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Read a setting as `T`; a value of the wrong shape reads as absent
    pub fn get_as<T: DeserializeOwned>(conn: &Connection, key: &str) -> DbResult<Option<T>> {
        let Some(value) = Self::get(conn, key)? else {
            return Ok(None);
        };
        match serde_json::from_value(value) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                tracing::warn!(key, error = %e, "Ignoring malformed setting");
                Ok(None)
            }
        }
    }

    /// Insert or replace a setting
    pub fn set<T: Serialize>(conn: &Connection, key: &str, value: &T) -> DbResult<()> {
        let raw = serde_json::to_string(value)?;
        conn.execute(
            r#"
            INSERT INTO settings (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, raw],
        )?;
        Ok(())
    }

    pub fn calorie_goal(conn: &Connection) -> DbResult<Option<f64>> {
        Self::get_as(conn, CALORIE_GOAL_KEY)
    }

    pub fn set_calorie_goal(conn: &Connection, goal: f64) -> DbResult<()> {
        Self::set(conn, CALORIE_GOAL_KEY, &goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    #[test]
    fn test_calorie_goal_upsert() {
        let conn = conn();
        assert_eq!(Setting::calorie_goal(&conn).unwrap(), None);

        Setting::set_calorie_goal(&conn, 1800.0).unwrap();
        assert_eq!(Setting::calorie_goal(&conn).unwrap(), Some(1800.0));

        Setting::set_calorie_goal(&conn, 2100.0).unwrap();
        assert_eq!(Setting::calorie_goal(&conn).unwrap(), Some(2100.0));
    }

    #[test]
    fn test_wrong_shape_reads_as_absent() {
        let conn = conn();
        Setting::set(&conn, CALORIE_GOAL_KEY, &"lots").unwrap();
        assert_eq!(Setting::calorie_goal(&conn).unwrap(), None);
        assert_eq!(
            Setting::get(&conn, CALORIE_GOAL_KEY).unwrap(),
            Some(serde_json::json!("lots"))
        );
    }
}
