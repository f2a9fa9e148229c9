//! Meal Tools
//!
//! Meal logging, either itemized or as a single calorie figure, plus the
//! quick whole-day estimate based on the calorie goal.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::{canonical_date, validate_name, validate_non_negative, DeleteResponse, ToolError, ToolResult};
use crate::db::Database;
use crate::models::{Food, Meal, MealCreate, MealItem, Setting};
use crate::nutrition::{round_to_tenth, RecipeTotals};

/// One item as entered
///
/// With `food_id` the name, unit and calories come from the stored food;
/// otherwise `name` and `calories` are required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealItemInput {
    #[serde(default)]
    pub food_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub calories: Option<f64>,
}

/// Meals of one date
#[derive(Debug, Serialize)]
pub struct MealsByDateResponse {
    pub date: String,
    pub meals: Vec<Meal>,
    pub total_calories: f64,
}

/// Whole-day estimates relative to the calorie goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuickLogPreset {
    Light,
    Normal,
    Heavy,
    Binge,
}

impl QuickLogPreset {
    pub fn factor(&self) -> f64 {
        match self {
            QuickLogPreset::Light => 0.8,
            QuickLogPreset::Normal => 1.0,
            QuickLogPreset::Heavy => 1.2,
            QuickLogPreset::Binge => 1.5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuickLogPreset::Light => "Quick estimate: light day",
            QuickLogPreset::Normal => "Quick estimate: normal day",
            QuickLogPreset::Heavy => "Quick estimate: heavy day",
            QuickLogPreset::Binge => "Quick estimate: binge day",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Some(QuickLogPreset::Light),
            "normal" => Some(QuickLogPreset::Normal),
            "heavy" => Some(QuickLogPreset::Heavy),
            "binge" => Some(QuickLogPreset::Binge),
            _ => None,
        }
    }
}

fn resolve_item(conn: &Connection, index: usize, input: &MealItemInput) -> ToolResult<MealItem> {
    let quantity = validate_non_negative(&format!("items[{}].quantity", index), input.quantity)?;

    if let Some(food_id) = input.food_id {
        let food = Food::get_by_id(conn, food_id)?
            .ok_or_else(|| ToolError::not_found("Food", food_id))?;
        let calories = RecipeTotals::of(&food.as_contribution(quantity)).total_cals;
        return Ok(MealItem {
            name: food.name,
            quantity,
            unit: food.unit,
            calories: round_to_tenth(calories),
        });
    }

    let name = input
        .name
        .as_deref()
        .ok_or_else(|| ToolError::invalid(format!("items[{}] needs a name or a food_id", index)))?;
    let name = validate_name(&format!("items[{}].name", index), name)?;
    let calories = input
        .calories
        .ok_or_else(|| ToolError::invalid(format!("items[{}] needs calories or a food_id", index)))?;
    let calories = validate_non_negative(&format!("items[{}].calories", index), calories)?;

    Ok(MealItem {
        name: name.to_string(),
        quantity,
        unit: input
            .unit
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .unwrap_or("g")
            .to_string(),
        calories,
    })
}

/// Log a meal
///
/// Meal calories are `calories` when given, else the sum of the items.
pub fn log_meal(
    db: &Database,
    date: &str,
    name: &str,
    calories: Option<f64>,
    items: &[MealItemInput],
) -> ToolResult<Meal> {
    let date = canonical_date(date)?;
    let name = validate_name("name", name)?;
    if let Some(c) = calories {
        validate_non_negative("calories", c)?;
    }
    if calories.is_none() && items.is_empty() {
        return Err(ToolError::invalid("Provide calories or at least one item"));
    }

    let items = {
        let conn = db.get_conn()?;
        items
            .iter()
            .enumerate()
            .map(|(index, input)| resolve_item(&conn, index, input))
            .collect::<ToolResult<Vec<_>>>()?
    };

    let calories =
        calories.unwrap_or_else(|| round_to_tenth(items.iter().fold(0.0, |sum, item| sum + item.calories)));

    let data = MealCreate {
        date,
        name: name.to_string(),
        calories,
        items,
    };
    let meal = db.with_conn_mut(|conn| Meal::create(conn, &data))?;
    tracing::info!(id = meal.id, date = %meal.date, calories = meal.calories, "Logged meal");
    Ok(meal)
}

pub fn get_meals_by_date(db: &Database, date: &str) -> ToolResult<MealsByDateResponse> {
    let date = canonical_date(date)?;
    let meals = db.with_conn(|conn| Meal::get_by_date(conn, &date))?;
    let total_calories = meals.iter().fold(0.0, |sum, m| sum + m.calories);
    Ok(MealsByDateResponse {
        date,
        meals,
        total_calories,
    })
}

pub fn delete_meal(db: &Database, id: i64) -> ToolResult<DeleteResponse> {
    if !db.with_conn(|conn| Meal::delete(conn, id))? {
        return Err(ToolError::not_found("Meal", id));
    }
    tracing::info!(id, "Deleted meal");
    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Log an estimated day as a single meal of `round(goal × factor)` kcal
pub fn quick_log(
    db: &Database,
    date: &str,
    preset: QuickLogPreset,
    default_goal: f64,
) -> ToolResult<Meal> {
    let date = canonical_date(date)?;
    let goal = db.with_conn(Setting::calorie_goal)?.unwrap_or(default_goal);
    let calories = (goal * preset.factor()).round();
    log_meal(db, &date, preset.label(), Some(calories), &[])
}
