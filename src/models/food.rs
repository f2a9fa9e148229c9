//! Food model
//!
//! A user food or a saved recipe. Both carry nutrients per `base_quantity`
//! of `unit` and are stored in the same table.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::nutrition::{CalculationMode, IngredientContribution, NormalizedNutrition};

/// How a recipe's stored nutrition was derived
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecipeMeta {
    pub mode: CalculationMode,
    /// Finished weight or portion count as entered, if any
    pub final_value: Option<f64>,
}

/// A food entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Food {
    pub id: i64,
    pub name: String,
    pub unit: String,
    pub base_quantity: f64,
    pub calories_per_unit: f64,
    pub protein: f64,
    pub carbohydrate: f64,
    pub lipid: f64,
    /// Present when this food is a saved recipe
    pub recipe: Option<RecipeMeta>,
    pub created_at: String,
    pub updated_at: String,
}

fn default_base_quantity() -> f64 {
    100.0
}

/// Data for creating a new food
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodCreate {
    pub name: String,
    pub unit: String,
    #[serde(default = "default_base_quantity")]
    pub base_quantity: f64,
    pub calories_per_unit: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrate: f64,
    #[serde(default)]
    pub lipid: f64,
    #[serde(default)]
    pub recipe: Option<RecipeMeta>,
}

impl FoodCreate {
    /// Food record for a recipe from its normalized nutrition
    pub fn from_recipe(name: &str, nutrition: &NormalizedNutrition, meta: RecipeMeta) -> Self {
        Self {
            name: name.to_string(),
            unit: nutrition.unit.clone(),
            base_quantity: nutrition.base_quantity,
            calories_per_unit: nutrition.calories_per_unit,
            protein: nutrition.protein,
            carbohydrate: nutrition.carbohydrate,
            lipid: nutrition.lipid,
            recipe: Some(meta),
        }
    }
}

/// Data for updating a food
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FoodUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub base_quantity: Option<f64>,
    pub calories_per_unit: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub lipid: Option<f64>,
}

impl FoodUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit.is_none()
            && self.base_quantity.is_none()
            && self.calories_per_unit.is_none()
            && self.protein.is_none()
            && self.carbohydrate.is_none()
            && self.lipid.is_none()
    }
}

impl Food {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let mode: Option<String> = row.get("recipe_mode")?;
        let recipe = mode
            .as_deref()
            .and_then(CalculationMode::parse)
            .map(|mode| -> rusqlite::Result<RecipeMeta> {
                Ok(RecipeMeta {
                    mode,
                    final_value: row.get("recipe_final_value")?,
                })
            })
            .transpose()?;

        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            unit: row.get("unit")?,
            base_quantity: row.get("base_quantity")?,
            calories_per_unit: row.get("calories_per_unit")?,
            protein: row.get("protein")?,
            carbohydrate: row.get("carbohydrate")?,
            lipid: row.get("lipid")?,
            recipe,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn is_recipe(&self) -> bool {
        self.recipe.is_some()
    }

    /// Stored nutrition in the normalized record shape
    pub fn nutrition(&self) -> NormalizedNutrition {
        NormalizedNutrition {
            unit: self.unit.clone(),
            base_quantity: self.base_quantity,
            calories_per_unit: self.calories_per_unit,
            protein: self.protein,
            carbohydrate: self.carbohydrate,
            lipid: self.lipid,
        }
    }

    /// Use `quantity` units of this food as a recipe ingredient
    pub fn as_contribution(&self, quantity: f64) -> IngredientContribution {
        IngredientContribution {
            name: Some(self.name.clone()),
            calories_per_unit: Some(self.calories_per_unit),
            protein: Some(self.protein),
            carbohydrate: Some(self.carbohydrate),
            lipid: Some(self.lipid),
            quantity,
            base_quantity: Some(self.base_quantity),
        }
    }

    /// Insert a new food
    pub fn create(conn: &Connection, data: &FoodCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO foods (
                name, unit, base_quantity,
                calories_per_unit, protein, carbohydrate, lipid,
                recipe_mode, recipe_final_value
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.name,
                data.unit,
                data.base_quantity,
                data.calories_per_unit,
                data.protein,
                data.carbohydrate,
                data.lipid,
                data.recipe.map(|r| r.mode.as_str()),
                data.recipe.and_then(|r| r.final_value),
            ],
        )?;

        let id = conn.last_insert_rowid();
        tracing::debug!(id, name = %data.name, "Created food");
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a food by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM foods WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(food) => Ok(Some(food)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All foods sorted by name
    pub fn list(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM foods ORDER BY name COLLATE NOCASE ASC, id ASC")?;
        let foods = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    /// Saved recipes only
    pub fn list_recipes(conn: &Connection) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM foods WHERE recipe_mode IS NOT NULL ORDER BY name COLLATE NOCASE ASC, id ASC",
        )?;
        let foods = stmt
            .query_map([], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(foods)
    }

    /// Update selected fields of a food
    pub fn update(conn: &Connection, id: i64, data: &FoodUpdate) -> DbResult<Option<Self>> {
        if data.is_empty() {
            return Self::get_by_id(conn, id);
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        let mut set = |column: &str, value: Box<dyn rusqlite::ToSql>| {
            params_vec.push(value);
            updates.push(format!("{} = ?{}", column, params_vec.len()));
        };

        if let Some(ref name) = data.name {
            set("name", Box::new(name.clone()));
        }
        if let Some(ref unit) = data.unit {
            set("unit", Box::new(unit.clone()));
        }
        if let Some(v) = data.base_quantity {
            set("base_quantity", Box::new(v));
        }
        if let Some(v) = data.calories_per_unit {
            set("calories_per_unit", Box::new(v));
        }
        if let Some(v) = data.protein {
            set("protein", Box::new(v));
        }
        if let Some(v) = data.carbohydrate {
            set("carbohydrate", Box::new(v));
        }
        if let Some(v) = data.lipid {
            set("lipid", Box::new(v));
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE foods SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );
        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Overwrite the nutrition (and recipe metadata) of a food
    pub fn update_nutrition(
        conn: &Connection,
        id: i64,
        nutrition: &NormalizedNutrition,
        meta: Option<RecipeMeta>,
    ) -> DbResult<bool> {
        let rows = conn.execute(
            r#"
            UPDATE foods SET
                unit = ?1,
                base_quantity = ?2,
                calories_per_unit = ?3,
                protein = ?4,
                carbohydrate = ?5,
                lipid = ?6,
                recipe_mode = ?7,
                recipe_final_value = ?8,
                updated_at = datetime('now')
            WHERE id = ?9
            "#,
            params![
                nutrition.unit,
                nutrition.base_quantity,
                nutrition.calories_per_unit,
                nutrition.protein,
                nutrition.carbohydrate,
                nutrition.lipid,
                meta.map(|m| m.mode.as_str()),
                meta.and_then(|m| m.final_value),
                id,
            ],
        )?;
        Ok(rows > 0)
    }

    /// Delete a food; recipe ingredient rows cascade
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM foods WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM foods", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn rice() -> FoodCreate {
        FoodCreate {
            name: "Arroz branco cozido".to_string(),
            unit: "g".to_string(),
            base_quantity: 100.0,
            calories_per_unit: 128.0,
            protein: 2.5,
            carbohydrate: 28.1,
            lipid: 0.2,
            recipe: None,
        }
    }

    #[test]
    fn test_create_and_get() {
        let conn = conn();
        let food = Food::create(&conn, &rice()).unwrap();
        assert!(food.id > 0);
        assert!(!food.is_recipe());

        let loaded = Food::get_by_id(&conn, food.id).unwrap().unwrap();
        assert_eq!(loaded.name, "Arroz branco cozido");
        assert_eq!(loaded.calories_per_unit, 128.0);
        assert!(Food::get_by_id(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_recipe_meta_round_trip() {
        let conn = conn();
        let nutrition = NormalizedNutrition {
            unit: "unid".to_string(),
            base_quantity: 1.0,
            calories_per_unit: 125.0,
            protein: 12.5,
            carbohydrate: 25.0,
            lipid: 6.0,
        };
        let meta = RecipeMeta {
            mode: CalculationMode::Portions,
            final_value: Some(2.0),
        };
        let food = Food::create(&conn, &FoodCreate::from_recipe("Torta", &nutrition, meta)).unwrap();

        assert_eq!(food.recipe, Some(meta));
        assert_eq!(food.nutrition(), nutrition);
        assert_eq!(Food::list_recipes(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_list_sorted_case_insensitive() {
        let conn = conn();
        for name in ["banana", "Abacate", "cenoura"] {
            let mut data = rice();
            data.name = name.to_string();
            Food::create(&conn, &data).unwrap();
        }
        let names: Vec<String> = Food::list(&conn).unwrap().into_iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["Abacate", "banana", "cenoura"]);
        assert_eq!(Food::count(&conn).unwrap(), 3);
    }

    #[test]
    fn test_update_fields() {
        let conn = conn();
        let food = Food::create(&conn, &rice()).unwrap();
        let update = FoodUpdate {
            calories_per_unit: Some(130.0),
            lipid: Some(0.3),
            ..Default::default()
        };
        let updated = Food::update(&conn, food.id, &update).unwrap().unwrap();
        assert_eq!(updated.calories_per_unit, 130.0);
        assert_eq!(updated.lipid, 0.3);
        assert_eq!(updated.protein, 2.5);
        assert!(Food::update(&conn, 999, &update).unwrap().is_none());
    }

    #[test]
    fn test_as_contribution() {
        let conn = conn();
        let food = Food::create(&conn, &rice()).unwrap();
        let ing = food.as_contribution(150.0);
        assert_eq!(ing.quantity, 150.0);
        assert_eq!(ing.base_quantity, Some(100.0));
        assert_eq!(ing.calories_per_unit, Some(128.0));
        assert_eq!(ing.name.as_deref(), Some("Arroz branco cozido"));
    }

    #[test]
    fn test_delete() {
        let conn = conn();
        let food = Food::create(&conn, &rice()).unwrap();
        assert!(Food::delete(&conn, food.id).unwrap());
        assert!(!Food::delete(&conn, food.id).unwrap());
        assert_eq!(Food::count(&conn).unwrap(), 0);
    }
}
