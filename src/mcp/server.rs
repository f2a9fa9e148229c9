//! Dieta MCP Server Implementation
//!
//! Implements the MCP server with all Dieta tools.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::catalog::{FoodCatalog, FoodMatcher};
use crate::db::Database;
use crate::models::{FoodCreate, FoodUpdate};
use crate::nutrition::CalculationMode;
use crate::tools::foods;
use crate::tools::meals::{self, MealItemInput, QuickLogPreset};
use crate::tools::recipes::{self, RecipeLine, RecipeRequest};
use crate::tools::reports::{self, ReportPeriod};
use crate::tools::settings;
use crate::tools::status::{StatusTracker, RECIPE_INSTRUCTIONS};
use crate::tools::water;
use crate::tools::weight;
use crate::tools::{validate_date, ToolError};

/// Dieta MCP Service
#[derive(Clone)]
pub struct DietaService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    catalog: Arc<FoodCatalog>,
    matcher: Arc<dyn FoodMatcher>,
    default_calorie_goal: f64,
    tool_router: ToolRouter<DietaService>,
}

impl DietaService {
    pub fn new(
        database_path: PathBuf,
        database: Database,
        catalog: FoodCatalog,
        matcher: Arc<dyn FoodMatcher>,
        default_calorie_goal: f64,
    ) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path, catalog.len()))),
            database,
            catalog: Arc::new(catalog),
            matcher,
            default_calorie_goal,
            tool_router: Self::tool_router(),
        }
    }
}

fn tool_error(e: ToolError) -> McpError {
    match e {
        ToolError::Invalid(_) | ToolError::NotFound { .. } => McpError::invalid_params(e.to_string(), None),
        ToolError::Db(_) => {
            tracing::error!(error = %e, "Tool failed");
            McpError::internal_error(e.to_string(), None)
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

fn parse_mode(mode: &str) -> Result<CalculationMode, McpError> {
    CalculationMode::parse(mode).ok_or_else(|| {
        McpError::invalid_params(
            format!("Invalid mode '{}', expected 'weight' or 'portions'", mode),
            None,
        )
    })
}

// ============================================================================
// Food Parameter Structs
// ============================================================================

fn default_unit() -> String { "g".to_string() }
fn default_base_quantity() -> f64 { 100.0 }
fn default_search_limit() -> usize { 20 }
fn default_mode() -> String { "weight".to_string() }
fn default_period() -> String { "7".to_string() }

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct IdParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DateParams {
    /// Date as YYYY-MM-DD
    pub date: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddFoodParams {
    pub name: String,
    /// "g", "ml" or "unid"
    #[serde(default = "default_unit")]
    pub unit: String,
    /// Amount the nutrient values refer to (100 for g/ml, 1 for unid)
    #[serde(default = "default_base_quantity")]
    pub base_quantity: f64,
    pub calories_per_unit: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrate: f64,
    #[serde(default)]
    pub lipid: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListFoodsParams {
    #[serde(default)]
    pub recipes_only: bool,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateFoodParams {
    pub id: i64,
    pub name: Option<String>,
    pub unit: Option<String>,
    pub base_quantity: Option<f64>,
    pub calories_per_unit: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub lipid: Option<f64>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SearchFoodsParams {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: usize,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RecipeLineParams {
    /// Stored food or recipe to use
    pub food_id: Option<i64>,
    /// Reference table food to use
    pub reference_id: Option<String>,
    pub name: Option<String>,
    /// Amount used, in the ingredient's own unit
    pub quantity: f64,
    /// Inline values only: amount the nutrient values refer to (default 100)
    pub base_quantity: Option<f64>,
    pub calories_per_unit: Option<f64>,
    pub protein: Option<f64>,
    pub carbohydrate: Option<f64>,
    pub lipid: Option<f64>,
}

impl From<RecipeLineParams> for RecipeLine {
    fn from(p: RecipeLineParams) -> Self {
        Self {
            food_id: p.food_id,
            reference_id: p.reference_id,
            name: p.name,
            quantity: p.quantity,
            base_quantity: p.base_quantity,
            calories_per_unit: p.calories_per_unit,
            protein: p.protein,
            carbohydrate: p.carbohydrate,
            lipid: p.lipid,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewRecipeParams {
    /// "weight" (per 100 g) or "portions" (per portion)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Finished weight or number of portions
    pub final_value: Option<f64>,
    pub ingredients: Vec<RecipeLineParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SaveRecipeParams {
    pub name: String,
    /// "weight" (per 100 g) or "portions" (per portion)
    #[serde(default = "default_mode")]
    pub mode: String,
    /// Finished weight or number of portions
    pub final_value: Option<f64>,
    pub ingredients: Vec<RecipeLineParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct UpdateRecipeParams {
    pub id: i64,
    pub name: String,
    #[serde(default = "default_mode")]
    pub mode: String,
    pub final_value: Option<f64>,
    pub ingredients: Vec<RecipeLineParams>,
}

impl SaveRecipeParams {
    fn into_request(self) -> Result<RecipeRequest, McpError> {
        Ok(RecipeRequest {
            name: self.name,
            mode: parse_mode(&self.mode)?,
            final_value: self.final_value,
            ingredients: self.ingredients.into_iter().map(RecipeLine::from).collect(),
        })
    }
}

// ============================================================================
// Log Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct MealItemParams {
    /// Stored food eaten; fills name, unit and calories
    pub food_id: Option<i64>,
    pub name: Option<String>,
    pub quantity: f64,
    pub unit: Option<String>,
    pub calories: Option<f64>,
}

impl From<MealItemParams> for MealItemInput {
    fn from(p: MealItemParams) -> Self {
        Self {
            food_id: p.food_id,
            name: p.name,
            quantity: p.quantity,
            unit: p.unit,
            calories: p.calories,
        }
    }
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct LogMealParams {
    /// Date as YYYY-MM-DD
    pub date: String,
    pub name: String,
    /// Total calories; computed from items when omitted
    pub calories: Option<f64>,
    #[serde(default)]
    pub items: Vec<MealItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct QuickLogParams {
    pub date: String,
    /// "light", "normal", "heavy" or "binge"
    pub preset: String,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWaterParams {
    pub date: String,
    pub amount_ml: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddWeightParams {
    pub date: String,
    pub kg: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetCalorieGoalParams {
    pub calorie_goal: f64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CalorieHistoryParams {
    /// "7", "30" or "all"
    #[serde(default = "default_period")]
    pub period: String,
    /// Reference date as YYYY-MM-DD, defaults to the local date
    pub today: Option<String>,
}

// ============================================================================
// Tool Implementations
// ============================================================================

#[tool_router]
impl DietaService {
    // --- Status ---

    #[tool(description = "Get the current status of the Dieta service including build info, database status, and process information")]
    async fn dieta_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database).map_err(tool_error)?;
        json_result(&status)
    }

    #[tool(description = "Get instructions for recording foods, recipes and meals. Call this when starting a session or when unsure how the tools fit together.")]
    fn recipe_instructions(&self) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(RECIPE_INSTRUCTIONS)]))
    }

    // --- Foods ---

    #[tool(description = "Create a food with nutrition per base_quantity of unit")]
    fn add_food(&self, Parameters(p): Parameters<AddFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodCreate {
            name: p.name, unit: p.unit, base_quantity: p.base_quantity,
            calories_per_unit: p.calories_per_unit, protein: p.protein,
            carbohydrate: p.carbohydrate, lipid: p.lipid, recipe: None,
        };
        let result = foods::add_food(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a food or recipe by ID")]
    fn get_food(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = foods::get_food(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List stored foods sorted by name, optionally only recipes")]
    fn list_foods(&self, Parameters(p): Parameters<ListFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::list_foods(&self.database, p.recipes_only).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Update a food. Recipes can only be renamed here; use update_recipe to change their nutrition.")]
    fn update_food(&self, Parameters(p): Parameters<UpdateFoodParams>) -> Result<CallToolResult, McpError> {
        let data = FoodUpdate {
            name: p.name, unit: p.unit, base_quantity: p.base_quantity,
            calories_per_unit: p.calories_per_unit, protein: p.protein,
            carbohydrate: p.carbohydrate, lipid: p.lipid,
        };
        let result = foods::update_food(&self.database, p.id, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a food or recipe")]
    fn delete_food(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = foods::delete_food(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Search stored foods and the reference nutrition table by name. Stored foods are listed first.")]
    fn search_foods(&self, Parameters(p): Parameters<SearchFoodsParams>) -> Result<CallToolResult, McpError> {
        let result = foods::search_foods(
            &self.database,
            &self.catalog,
            self.matcher.as_ref(),
            &p.query,
            p.limit,
        )
        .map_err(tool_error)?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Compute a recipe's totals and normalized nutrition without saving it")]
    fn preview_recipe(&self, Parameters(p): Parameters<PreviewRecipeParams>) -> Result<CallToolResult, McpError> {
        let mode = parse_mode(&p.mode)?;
        let lines: Vec<RecipeLine> = p.ingredients.into_iter().map(RecipeLine::from).collect();
        let result = recipes::preview_recipe(&self.database, &self.catalog, mode, p.final_value, &lines)
            .map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Save a recipe as a food, normalized per 100 g (weight mode) or per portion (portions mode)")]
    fn save_recipe(&self, Parameters(p): Parameters<SaveRecipeParams>) -> Result<CallToolResult, McpError> {
        let request = p.into_request()?;
        let result = recipes::save_recipe(&self.database, &self.catalog, &request).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Replace a recipe's ingredients and settings and recompute its nutrition")]
    fn update_recipe(&self, Parameters(p): Parameters<UpdateRecipeParams>) -> Result<CallToolResult, McpError> {
        let id = p.id;
        let request = SaveRecipeParams {
            name: p.name, mode: p.mode, final_value: p.final_value, ingredients: p.ingredients,
        }
        .into_request()?;
        let result = recipes::update_recipe(&self.database, &self.catalog, id, &request).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with its ingredient list and raw totals")]
    fn get_recipe(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Recompute every stored recipe from its saved ingredients")]
    fn recompute_all_recipes(&self) -> Result<CallToolResult, McpError> {
        let result = recipes::recompute_all_recipes(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Meals ---

    #[tool(description = "Log a meal with a calorie total or a list of items")]
    fn log_meal(&self, Parameters(p): Parameters<LogMealParams>) -> Result<CallToolResult, McpError> {
        let items: Vec<MealItemInput> = p.items.into_iter().map(MealItemInput::from).collect();
        let result = meals::log_meal(&self.database, &p.date, &p.name, p.calories, &items).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get the meals logged on a date")]
    fn get_meals_by_date(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = meals::get_meals_by_date(&self.database, &p.date).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a meal")]
    fn delete_meal(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = meals::delete_meal(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Log an estimated day from the calorie goal: light 80%, normal 100%, heavy 120%, binge 150%")]
    fn quick_log(&self, Parameters(p): Parameters<QuickLogParams>) -> Result<CallToolResult, McpError> {
        let preset = QuickLogPreset::parse(&p.preset).ok_or_else(|| {
            McpError::invalid_params(
                format!("Invalid preset '{}', expected light, normal, heavy or binge", p.preset),
                None,
            )
        })?;
        let result = meals::quick_log(&self.database, &p.date, preset, self.default_calorie_goal)
            .map_err(tool_error)?;
        json_result(&result)
    }

    // --- Water ---

    #[tool(description = "Log water intake in milliliters")]
    fn add_water(&self, Parameters(p): Parameters<AddWaterParams>) -> Result<CallToolResult, McpError> {
        let result = water::add_water(&self.database, &p.date, p.amount_ml).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get water logs and the total for a date")]
    fn get_water_by_date(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = water::get_water_by_date(&self.database, &p.date).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Remove the most recent water log of a date")]
    fn remove_last_water(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = water::remove_last_water(&self.database, &p.date).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a water log by ID")]
    fn delete_water(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = water::delete_water(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Weight ---

    #[tool(description = "Log body weight in kilograms")]
    fn add_weight(&self, Parameters(p): Parameters<AddWeightParams>) -> Result<CallToolResult, McpError> {
        let result = weight::add_weight(&self.database, &p.date, p.kg).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List all weight readings, oldest first, with the overall change")]
    fn list_weights(&self) -> Result<CallToolResult, McpError> {
        let result = weight::list_weights(&self.database).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a weight reading by ID")]
    fn delete_weight(&self, Parameters(p): Parameters<IdParams>) -> Result<CallToolResult, McpError> {
        let result = weight::delete_weight(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Settings ---

    #[tool(description = "Get the daily calorie goal")]
    fn get_calorie_goal(&self) -> Result<CallToolResult, McpError> {
        let result = settings::get_calorie_goal(&self.database, self.default_calorie_goal).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Set the daily calorie goal")]
    fn set_calorie_goal(&self, Parameters(p): Parameters<SetCalorieGoalParams>) -> Result<CallToolResult, McpError> {
        let result = settings::set_calorie_goal(&self.database, p.calorie_goal).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Reports ---

    #[tool(description = "Calories, water and weight for a date against the calorie goal")]
    fn daily_summary(&self, Parameters(p): Parameters<DateParams>) -> Result<CallToolResult, McpError> {
        let result = reports::daily_summary(&self.database, &p.date, self.default_calorie_goal).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Daily calorie totals for the last 7 or 30 days, or all time, with average and days on goal")]
    fn calorie_history(&self, Parameters(p): Parameters<CalorieHistoryParams>) -> Result<CallToolResult, McpError> {
        let period = ReportPeriod::parse(&p.period).ok_or_else(|| {
            McpError::invalid_params(format!("Invalid period '{}', expected 7, 30 or all", p.period), None)
        })?;
        let today: NaiveDate = match p.today.as_deref() {
            Some(date) => validate_date(date).map_err(tool_error)?,
            None => Local::now().date_naive(),
        };
        let result = reports::calorie_history(&self.database, period, today, self.default_calorie_goal)
            .map_err(tool_error)?;
        json_result(&result)
    }
}

#[tool_handler]
impl ServerHandler for DietaService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "dieta".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Dieta".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Dieta - local diet log with recipe nutrition. \
                 IMPORTANT: Call recipe_instructions before recording foods or recipes. \
                 Foods: add/get/list/update/delete_food, search_foods. \
                 Recipes: preview_recipe, save_recipe, update_recipe, get_recipe, recompute_all_recipes. \
                 Meals: log_meal, get_meals_by_date, delete_meal, quick_log. \
                 Water: add_water, get_water_by_date, remove_last_water, delete_water. \
                 Weight: add_weight, list_weights, delete_weight. \
                 Goal: get_calorie_goal, set_calorie_goal. \
                 Reports: daily_summary, calorie_history."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubstringMatcher;

    fn service() -> DietaService {
        DietaService::new(
            PathBuf::from(":memory:"),
            Database::in_memory().unwrap(),
            FoodCatalog::empty(),
            Arc::new(SubstringMatcher),
            2000.0,
        )
    }

    #[test]
    fn test_error_mapping() {
        let invalid = tool_error(ToolError::invalid("bad date"));
        assert_eq!(invalid.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let missing = tool_error(ToolError::not_found("Food", 3));
        assert_eq!(missing.message, "Food 3 not found");

        let db = tool_error(ToolError::Db(crate::db::DbError::NotInitialized));
        assert_eq!(db.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("portions").unwrap(), CalculationMode::Portions);
        assert!(parse_mode("per-cup").is_err());
    }

    #[test]
    fn test_server_info() {
        let info = service().get_info();
        assert_eq!(info.server_info.name, "dieta");
        assert!(info.instructions.unwrap().contains("save_recipe"));
    }
}
