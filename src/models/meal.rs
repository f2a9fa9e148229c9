//! Meal model
//!
//! A logged meal with optional itemized contents.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// One item eaten as part of a meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub calories: f64,
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub date: String,
    pub name: String,
    /// Item sum, or a manual value when no items were given
    pub calories: f64,
    pub items: Vec<MealItem>,
    pub created_at: String,
}

/// Data for logging a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub date: String,
    pub name: String,
    pub calories: f64,
    #[serde(default)]
    pub items: Vec<MealItem>,
}

/// Calories consumed on one date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCalories {
    pub date: String,
    pub calories: f64,
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row.get("date")?,
            name: row.get("name")?,
            calories: row.get("calories")?,
            items: Vec::new(),
            created_at: row.get("created_at")?,
        })
    }

    fn load_items(conn: &Connection, meal_id: i64) -> DbResult<Vec<MealItem>> {
        let mut stmt = conn.prepare(
            "SELECT name, quantity, unit, calories FROM meal_items WHERE meal_id = ?1 ORDER BY position ASC",
        )?;
        let items = stmt
            .query_map([meal_id], |row| {
                Ok(MealItem {
                    name: row.get(0)?,
                    quantity: row.get(1)?,
                    unit: row.get(2)?,
                    calories: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    fn with_items(conn: &Connection, meals: Vec<Self>) -> DbResult<Vec<Self>> {
        meals
            .into_iter()
            .map(|mut meal| {
                meal.items = Self::load_items(conn, meal.id)?;
                Ok(meal)
            })
            .collect()
    }

    /// Insert a meal and its items atomically
    pub fn create(conn: &mut Connection, data: &MealCreate) -> DbResult<Self> {
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO meals (date, name, calories) VALUES (?1, ?2, ?3)",
            params![data.date, data.name, data.calories],
        )?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO meal_items (meal_id, position, name, quantity, unit, calories)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for (position, item) in data.items.iter().enumerate() {
                stmt.execute(params![
                    id,
                    position as i64,
                    item.name,
                    item.quantity,
                    item.unit,
                    item.calories,
                ])?;
            }
        }

        tx.commit()?;
        tracing::debug!(id, date = %data.date, calories = data.calories, "Logged meal");

        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(mut meal) => {
                meal.items = Self::load_items(conn, meal.id)?;
                Ok(Some(meal))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Meals logged on a date, in logging order
    pub fn get_by_date(conn: &Connection, date: &str) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE date = ?1 ORDER BY id ASC")?;
        let meals = stmt
            .query_map([date], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Self::with_items(conn, meals)
    }

    /// Delete a meal; its items cascade
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Total calories per logged date, ascending by date
    pub fn daily_calorie_totals(conn: &Connection) -> DbResult<Vec<DailyCalories>> {
        let mut stmt = conn.prepare(
            "SELECT date, SUM(calories) FROM meals GROUP BY date ORDER BY date ASC",
        )?;
        let totals = stmt
            .query_map([], |row| {
                Ok(DailyCalories {
                    date: row.get(0)?,
                    calories: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }
}
