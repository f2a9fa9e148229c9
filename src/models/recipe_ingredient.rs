//! Recipe ingredient snapshot
//!
//! The ingredient lines a saved recipe was computed from. Stored with the
//! recipe's food row so the nutrition can be recomputed later.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::IngredientContribution;

/// One stored ingredient line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: i64,
    pub food_id: i64,
    pub position: i64,
    pub name: Option<String>,
    pub quantity: f64,
    pub base_quantity: Option<f64>,
    pub calories_per_unit: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub lipid: Option<f64>,
}

impl RecipeIngredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            food_id: row.get("food_id")?,
            position: row.get("position")?,
            name: row.get("name")?,
            quantity: row.get("quantity")?,
            base_quantity: row.get("base_quantity")?,
            calories_per_unit: row.get("calories_per_unit")?,
            protein: row.get("protein")?,
            carbohydrate: row.get("carbohydrate")?,
            lipid: row.get("lipid")?,
        })
    }

    pub fn to_contribution(&self) -> IngredientContribution {
        IngredientContribution {
            name: self.name.clone(),
            calories_per_unit: self.calories_per_unit,
            protein: self.protein,
            carbohydrate: self.carbohydrate,
            lipid: self.lipid,
            quantity: self.quantity,
            base_quantity: self.base_quantity,
        }
    }

    /// Replace every ingredient line of a recipe
    ///
    /// Runs on the caller's connection; wrap in a transaction together with
    /// the food row update.
    pub fn replace_for_food(
        conn: &Connection,
        food_id: i64,
        ingredients: &[IngredientContribution],
    ) -> DbResult<usize> {
        conn.execute("DELETE FROM recipe_ingredients WHERE food_id = ?1", [food_id])?;

        let mut stmt = conn.prepare(
            r#"
            INSERT INTO recipe_ingredients (
                food_id, position, name, quantity, base_quantity,
                calories_per_unit, protein, carbohydrate, lipid
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )?;

        for (position, ing) in ingredients.iter().enumerate() {
            stmt.execute(params![
                food_id,
                position as i64,
                ing.name,
                ing.quantity,
                ing.base_quantity,
                ing.calories_per_unit,
                ing.protein,
                ing.carbohydrate,
                ing.lipid,
            ])?;
        }

        Ok(ingredients.len())
    }

    /// Ingredient lines of a recipe, in entry order
    pub fn list_for_food(conn: &Connection, food_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM recipe_ingredients WHERE food_id = ?1 ORDER BY position ASC",
        )?;
        let rows = stmt
            .query_map([food_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
