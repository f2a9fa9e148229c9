//! Recipe Tools
//!
//! Compose ingredient lines into a normalized food record and keep the
//! stored record in sync with its ingredient snapshot.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use super::{validate_name, validate_non_negative, ToolError, ToolResult};
use crate::catalog::FoodCatalog;
use crate::db::Database;
use crate::models::{Food, FoodCreate, FoodUpdate, RecipeIngredient, RecipeMeta};
use crate::nutrition::{
    aggregate, compose, normalize, CalculationMode, IngredientContribution, NormalizedNutrition, RecipeTotals,
};

/// One ingredient line as entered
///
/// Exactly one source applies: a stored food (`food_id`), a reference food
/// (`reference_id`), or the inline nutrient values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeLine {
    #[serde(default)]
    pub food_id: Option<i64>,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    #[serde(default)]
    pub base_quantity: Option<f64>,
    #[serde(default)]
    pub calories_per_unit: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbohydrate: Option<f64>,
    #[serde(default)]
    pub lipid: Option<f64>,
}

/// A recipe to preview, save or overwrite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeRequest {
    pub name: String,
    #[serde(default)]
    pub mode: CalculationMode,
    /// Finished weight (weight mode) or portion count (portions mode)
    #[serde(default)]
    pub final_value: Option<f64>,
    pub ingredients: Vec<RecipeLine>,
}

/// Response for preview_recipe
#[derive(Debug, Serialize)]
pub struct RecipePreview {
    pub totals: RecipeTotals,
    pub nutrition: NormalizedNutrition,
    pub ingredients: Vec<IngredientContribution>,
}

/// A stored recipe with its ingredient snapshot
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub food: Food,
    pub totals: RecipeTotals,
    pub ingredients: Vec<RecipeIngredient>,
}

/// Response for recompute_all_recipes
#[derive(Debug, Default, Serialize)]
pub struct RecomputeReport {
    pub recipes: usize,
    pub changed: Vec<i64>,
}

fn resolve_line(
    conn: &Connection,
    catalog: &FoodCatalog,
    index: usize,
    line: &RecipeLine,
) -> ToolResult<IngredientContribution> {
    let field = |name: &str| format!("ingredients[{}].{}", index, name);
    let quantity = validate_non_negative(&field("quantity"), line.quantity)?;

    match (line.food_id, line.reference_id.as_deref()) {
        (Some(_), Some(_)) => Err(ToolError::invalid(format!(
            "ingredients[{}] names both food_id and reference_id",
            index
        ))),
        (Some(food_id), None) => {
            let food = Food::get_by_id(conn, food_id)?
                .ok_or_else(|| ToolError::not_found("Food", food_id))?;
            Ok(food.as_contribution(quantity))
        }
        (None, Some(reference_id)) => {
            let food = catalog
                .get(reference_id)
                .ok_or_else(|| ToolError::not_found("Reference food", reference_id))?;
            Ok(food.as_contribution(quantity))
        }
        (None, None) => {
            for (name, value) in [
                ("base_quantity", line.base_quantity),
                ("calories_per_unit", line.calories_per_unit),
                ("protein", line.protein),
                ("carbohydrate", line.carbohydrate),
                ("lipid", line.lipid),
            ] {
                if let Some(v) = value {
                    validate_non_negative(&field(name), v)?;
                }
            }
            Ok(IngredientContribution {
                name: line.name.as_deref().map(str::trim).map(str::to_string),
                calories_per_unit: line.calories_per_unit,
                protein: line.protein,
                carbohydrate: line.carbohydrate,
                lipid: line.lipid,
                quantity,
                base_quantity: line.base_quantity,
            })
        }
    }
}

/// Turn entered lines into contributions, in order
pub fn resolve_ingredients(
    conn: &Connection,
    catalog: &FoodCatalog,
    lines: &[RecipeLine],
) -> ToolResult<Vec<IngredientContribution>> {
    lines
        .iter()
        .enumerate()
        .map(|(index, line)| resolve_line(conn, catalog, index, line))
        .collect()
}

fn validate_final_value(value: Option<f64>) -> ToolResult<Option<f64>> {
    match value {
        Some(v) => validate_non_negative("final_value", v).map(Some),
        None => Ok(None),
    }
}

/// Validated request ready to be composed
struct Composed {
    name: String,
    meta: RecipeMeta,
    ingredients: Vec<IngredientContribution>,
    totals: RecipeTotals,
    nutrition: NormalizedNutrition,
}

fn compose_request(
    conn: &Connection,
    catalog: &FoodCatalog,
    request: &RecipeRequest,
) -> ToolResult<Composed> {
    let name = validate_name("name", &request.name)?.to_string();
    if request.ingredients.is_empty() {
        return Err(ToolError::invalid("A recipe needs at least one ingredient"));
    }
    let final_value = validate_final_value(request.final_value)?;
    let ingredients = resolve_ingredients(conn, catalog, &request.ingredients)?;
    let totals = aggregate(&ingredients);
    let nutrition = normalize(&totals, request.mode, final_value);

    Ok(Composed {
        name,
        meta: RecipeMeta {
            mode: request.mode,
            final_value,
        },
        ingredients,
        totals,
        nutrition,
    })
}

/// Compose a recipe without storing anything
pub fn preview_recipe(
    db: &Database,
    catalog: &FoodCatalog,
    mode: CalculationMode,
    final_value: Option<f64>,
    lines: &[RecipeLine],
) -> ToolResult<RecipePreview> {
    let final_value = validate_final_value(final_value)?;
    let conn = db.get_conn()?;
    let ingredients = resolve_ingredients(&conn, catalog, lines)?;
    let totals = aggregate(&ingredients);
    let nutrition = normalize(&totals, mode, final_value);

    Ok(RecipePreview {
        totals,
        nutrition,
        ingredients,
    })
}

/// Save a new recipe as a food with its ingredient snapshot
pub fn save_recipe(
    db: &Database,
    catalog: &FoodCatalog,
    request: &RecipeRequest,
) -> ToolResult<RecipeDetail> {
    let mut conn = db.get_conn()?;
    let composed = compose_request(&conn, catalog, request)?;

    let tx = conn.transaction()?;
    let food = Food::create(
        &tx,
        &FoodCreate::from_recipe(&composed.name, &composed.nutrition, composed.meta),
    )?;
    RecipeIngredient::replace_for_food(&tx, food.id, &composed.ingredients)?;
    let ingredients = RecipeIngredient::list_for_food(&tx, food.id)?;
    tx.commit()?;

    tracing::info!(
        id = food.id,
        name = %food.name,
        mode = composed.meta.mode.as_str(),
        ingredients = ingredients.len(),
        "Saved recipe"
    );

    Ok(RecipeDetail {
        food,
        totals: composed.totals,
        ingredients,
    })
}

fn require_recipe(conn: &Connection, id: i64) -> ToolResult<Food> {
    let food = Food::get_by_id(conn, id)?.ok_or_else(|| ToolError::not_found("Recipe", id))?;
    if !food.is_recipe() {
        return Err(ToolError::invalid(format!("Food {} is not a recipe", id)));
    }
    Ok(food)
}

/// Recompute and overwrite a stored recipe
pub fn update_recipe(
    db: &Database,
    catalog: &FoodCatalog,
    id: i64,
    request: &RecipeRequest,
) -> ToolResult<RecipeDetail> {
    let mut conn = db.get_conn()?;
    require_recipe(&conn, id)?;
    if request.ingredients.iter().any(|line| line.food_id == Some(id)) {
        return Err(ToolError::invalid("A recipe cannot include itself"));
    }
    let composed = compose_request(&conn, catalog, request)?;

    let tx = conn.transaction()?;
    let rename = FoodUpdate {
        name: Some(composed.name.clone()),
        ..Default::default()
    };
    Food::update(&tx, id, &rename)?;
    Food::update_nutrition(&tx, id, &composed.nutrition, Some(composed.meta))?;
    RecipeIngredient::replace_for_food(&tx, id, &composed.ingredients)?;
    let food = Food::get_by_id(&tx, id)?.ok_or_else(|| ToolError::not_found("Recipe", id))?;
    let ingredients = RecipeIngredient::list_for_food(&tx, id)?;
    tx.commit()?;

    tracing::info!(id, name = %food.name, "Updated recipe");

    Ok(RecipeDetail {
        food,
        totals: composed.totals,
        ingredients,
    })
}

/// A stored recipe, its snapshot and the raw totals behind it
pub fn get_recipe(db: &Database, id: i64) -> ToolResult<RecipeDetail> {
    let conn = db.get_conn()?;
    let food = require_recipe(&conn, id)?;
    let ingredients = RecipeIngredient::list_for_food(&conn, id)?;
    let contributions: Vec<IngredientContribution> =
        ingredients.iter().map(RecipeIngredient::to_contribution).collect();

    Ok(RecipeDetail {
        food,
        totals: aggregate(&contributions),
        ingredients,
    })
}

/// Re-normalize every stored recipe from its ingredient snapshot
///
/// Only recipes whose stored values differ are written.
pub fn recompute_all_recipes(db: &Database) -> ToolResult<RecomputeReport> {
    let mut conn = db.get_conn()?;
    let tx = conn.transaction()?;

    let mut report = RecomputeReport::default();
    for food in Food::list_recipes(&tx)? {
        let Some(meta) = food.recipe else { continue };
        report.recipes += 1;

        let contributions: Vec<IngredientContribution> = RecipeIngredient::list_for_food(&tx, food.id)?
            .iter()
            .map(RecipeIngredient::to_contribution)
            .collect();
        let nutrition = compose(&contributions, meta.mode, meta.final_value);

        if nutrition != food.nutrition() {
            Food::update_nutrition(&tx, food.id, &nutrition, Some(meta))?;
            tracing::debug!(id = food.id, name = %food.name, "Recipe nutrition changed");
            report.changed.push(food.id);
        }
    }
    tx.commit()?;

    tracing::info!(
        recipes = report.recipes,
        changed = report.changed.len(),
        "Recomputed recipes"
    );
    Ok(report)
}
