//! Food Tools
//!
//! User foods plus lookup across user foods and the reference catalog.

use serde::Serialize;

use super::{validate_name, validate_non_negative, validate_positive, DeleteResponse, ToolError, ToolResult};
use crate::catalog::{FoodCatalog, FoodMatcher, ReferenceFood};
use crate::db::Database;
use crate::models::{Food, FoodCreate, FoodUpdate};

const MAX_SEARCH_RESULTS: usize = 100;

/// Response for list_foods
#[derive(Debug, Serialize)]
pub struct ListFoodsResponse {
    pub foods: Vec<Food>,
    pub total: usize,
}

/// Where a search hit came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodOrigin {
    User,
    Reference,
}

/// One search hit, in the common food-record shape
#[derive(Debug, Clone, Serialize)]
pub struct FoodSearchHit {
    pub origin: FoodOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub food_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_id: Option<String>,
    pub name: String,
    pub unit: String,
    pub base_quantity: f64,
    pub calories_per_unit: f64,
    pub protein: f64,
    pub carbohydrate: f64,
    pub lipid: f64,
    pub is_recipe: bool,
}

impl From<&Food> for FoodSearchHit {
    fn from(food: &Food) -> Self {
        Self {
            origin: FoodOrigin::User,
            food_id: Some(food.id),
            reference_id: None,
            name: food.name.clone(),
            unit: food.unit.clone(),
            base_quantity: food.base_quantity,
            calories_per_unit: food.calories_per_unit,
            protein: food.protein,
            carbohydrate: food.carbohydrate,
            lipid: food.lipid,
            is_recipe: food.is_recipe(),
        }
    }
}

impl From<&ReferenceFood> for FoodSearchHit {
    fn from(food: &ReferenceFood) -> Self {
        let nutrition = food.nutrition();
        Self {
            origin: FoodOrigin::Reference,
            food_id: None,
            reference_id: Some(food.id.clone()),
            name: food.description.clone(),
            unit: nutrition.unit,
            base_quantity: nutrition.base_quantity,
            calories_per_unit: nutrition.calories_per_unit,
            protein: nutrition.protein,
            carbohydrate: nutrition.carbohydrate,
            lipid: nutrition.lipid,
            is_recipe: false,
        }
    }
}

/// Response for search_foods
#[derive(Debug, Serialize)]
pub struct SearchFoodsResponse {
    pub query: String,
    pub results: Vec<FoodSearchHit>,
    pub total: usize,
}

fn validate_create(data: &FoodCreate) -> ToolResult<()> {
    validate_name("name", &data.name)?;
    validate_name("unit", &data.unit)?;
    validate_positive("base_quantity", data.base_quantity)?;
    validate_non_negative("calories_per_unit", data.calories_per_unit)?;
    validate_non_negative("protein", data.protein)?;
    validate_non_negative("carbohydrate", data.carbohydrate)?;
    validate_non_negative("lipid", data.lipid)?;
    Ok(())
}

/// Add a plain (non-recipe) food
pub fn add_food(db: &Database, mut data: FoodCreate) -> ToolResult<Food> {
    validate_create(&data)?;
    data.name = data.name.trim().to_string();
    data.unit = data.unit.trim().to_string();
    // Recipes are only created through save_recipe
    data.recipe = None;

    let food = db.with_conn(|conn| Food::create(conn, &data))?;
    tracing::info!(id = food.id, name = %food.name, "Added food");
    Ok(food)
}

pub fn get_food(db: &Database, id: i64) -> ToolResult<Food> {
    db.with_conn(|conn| Food::get_by_id(conn, id))?
        .ok_or_else(|| ToolError::not_found("Food", id))
}

/// All foods, or only saved recipes
pub fn list_foods(db: &Database, recipes_only: bool) -> ToolResult<ListFoodsResponse> {
    let foods = db.with_conn(|conn| {
        if recipes_only {
            Food::list_recipes(conn)
        } else {
            Food::list(conn)
        }
    })?;
    let total = foods.len();
    Ok(ListFoodsResponse { foods, total })
}

/// Update selected fields of a food
///
/// Saved recipes derive their nutrition from their ingredients, so only
/// their name may change here; use update_recipe for the rest.
pub fn update_food(db: &Database, id: i64, data: FoodUpdate) -> ToolResult<Food> {
    let existing = get_food(db, id)?;

    if existing.is_recipe() {
        let touches_nutrition = FoodUpdate {
            name: None,
            ..data.clone()
        };
        if !touches_nutrition.is_empty() {
            return Err(ToolError::invalid(format!(
                "Food {} is a recipe; only its name can be changed here, use update_recipe for nutrition",
                id
            )));
        }
    }

    let mut data = data;
    if let Some(ref name) = data.name {
        data.name = Some(validate_name("name", name)?.to_string());
    }
    if let Some(ref unit) = data.unit {
        data.unit = Some(validate_name("unit", unit)?.to_string());
    }
    if let Some(v) = data.base_quantity {
        validate_positive("base_quantity", v)?;
    }
    for (field, value) in [
        ("calories_per_unit", data.calories_per_unit),
        ("protein", data.protein),
        ("carbohydrate", data.carbohydrate),
        ("lipid", data.lipid),
    ] {
        if let Some(v) = value {
            validate_non_negative(field, v)?;
        }
    }

    db.with_conn(|conn| Food::update(conn, id, &data))?
        .ok_or_else(|| ToolError::not_found("Food", id))
}

/// Delete a food or recipe (its ingredient snapshot goes with it)
pub fn delete_food(db: &Database, id: i64) -> ToolResult<DeleteResponse> {
    if !db.with_conn(|conn| Food::delete(conn, id))? {
        return Err(ToolError::not_found("Food", id));
    }
    tracing::info!(id, "Deleted food");
    Ok(DeleteResponse {
        success: true,
        deleted_id: id,
    })
}

/// Search user foods and the reference catalog by name
///
/// User foods come first, then reference foods, each group in match order.
pub fn search_foods(
    db: &Database,
    catalog: &FoodCatalog,
    matcher: &dyn FoodMatcher,
    query: &str,
    limit: usize,
) -> ToolResult<SearchFoodsResponse> {
    let query = validate_name("query", query)?;
    let limit = limit.clamp(1, MAX_SEARCH_RESULTS);

    let foods = db.with_conn(Food::list)?;
    let mut user_hits: Vec<(u32, &Food)> = foods
        .iter()
        .filter_map(|food| matcher.rank(query, &food.name).map(|r| (r, food)))
        .collect();
    user_hits.sort_by_key(|(rank, _)| *rank);

    let mut results: Vec<FoodSearchHit> = user_hits
        .into_iter()
        .take(limit)
        .map(|(_, food)| FoodSearchHit::from(food))
        .collect();

    let remaining = limit - results.len();
    if remaining > 0 {
        results.extend(
            catalog
                .search(matcher, query, remaining)
                .into_iter()
                .map(FoodSearchHit::from),
        );
    }

    let total = results.len();
    Ok(SearchFoodsResponse {
        query: query.to_string(),
        results,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubstringMatcher;

    fn food(name: &str, calories: f64) -> FoodCreate {
        FoodCreate {
            name: name.to_string(),
            unit: "g".to_string(),
            base_quantity: 100.0,
            calories_per_unit: calories,
            protein: 1.0,
            carbohydrate: 2.0,
            lipid: 0.5,
            recipe: None,
        }
    }

    fn catalog() -> FoodCatalog {
        FoodCatalog::from_foods(vec![
            ReferenceFood {
                id: "1".to_string(),
                description: "Arroz, tipo 1, cozido".to_string(),
                energy_kcal: 128.3,
                protein_g: 2.5,
                carbohydrate_g: 28.1,
                lipid_g: 0.2,
            },
            ReferenceFood {
                id: "2".to_string(),
                description: "Arroz, integral, cozido".to_string(),
                energy_kcal: 123.5,
                protein_g: 2.6,
                carbohydrate_g: 25.8,
                lipid_g: 1.0,
            },
        ])
    }

    #[test]
    fn test_add_and_get_food() {
        let db = Database::in_memory().unwrap();
        let created = add_food(&db, food("  Pão francês ", 300.0)).unwrap();
        assert_eq!(created.name, "Pão francês");

        let loaded = get_food(&db, created.id).unwrap();
        assert_eq!(loaded.calories_per_unit, 300.0);
        assert!(matches!(get_food(&db, 999), Err(ToolError::NotFound { .. })));
    }

    #[test]
    fn test_add_food_rejects_bad_input() {
        let db = Database::in_memory().unwrap();
        assert!(matches!(add_food(&db, food("", 10.0)), Err(ToolError::Invalid(_))));
        assert!(matches!(add_food(&db, food("Ovo", -1.0)), Err(ToolError::Invalid(_))));

        let mut zero_base = food("Ovo", 70.0);
        zero_base.base_quantity = 0.0;
        assert!(add_food(&db, zero_base).is_err());
    }

    #[test]
    fn test_update_food() {
        let db = Database::in_memory().unwrap();
        let created = add_food(&db, food("Leite", 60.0)).unwrap();
        let updated = update_food(
            &db,
            created.id,
            FoodUpdate {
                unit: Some("ml".to_string()),
                calories_per_unit: Some(42.0),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(updated.unit, "ml");
        assert_eq!(updated.calories_per_unit, 42.0);

        let bad = FoodUpdate {
            protein: Some(-3.0),
            ..Default::default()
        };
        assert!(update_food(&db, created.id, bad).is_err());
        assert!(update_food(&db, 999, FoodUpdate::default()).is_err());
    }

    #[test]
    fn test_delete_food() {
        let db = Database::in_memory().unwrap();
        let created = add_food(&db, food("Queijo", 350.0)).unwrap();
        assert!(delete_food(&db, created.id).unwrap().success);
        assert!(matches!(delete_food(&db, created.id), Err(ToolError::NotFound { .. })));
        assert_eq!(list_foods(&db, false).unwrap().total, 0);
    }

    #[test]
    fn test_search_user_foods_first() {
        let db = Database::in_memory().unwrap();
        add_food(&db, food("Arroz da vó", 150.0)).unwrap();
        add_food(&db, food("Feijão", 76.0)).unwrap();

        let response = search_foods(&db, &catalog(), &SubstringMatcher, "arroz", 10).unwrap();
        assert_eq!(response.total, 3);
        assert_eq!(response.results[0].origin, FoodOrigin::User);
        assert_eq!(response.results[0].name, "Arroz da vó");
        assert!(response.results[1..]
            .iter()
            .all(|hit| hit.origin == FoodOrigin::Reference && hit.unit == "g"));
    }

    #[test]
    fn test_search_truncates_to_limit() {
        let db = Database::in_memory().unwrap();
        add_food(&db, food("Arroz da vó", 150.0)).unwrap();

        let response = search_foods(&db, &catalog(), &SubstringMatcher, "arroz", 2).unwrap();
        assert_eq!(response.total, 2);
        assert_eq!(response.results[1].reference_id.as_deref(), Some("2"));

        let empty = search_foods(&db, &FoodCatalog::empty(), &SubstringMatcher, "arroz", 10).unwrap();
        assert_eq!(empty.total, 1);
        assert!(search_foods(&db, &catalog(), &SubstringMatcher, "  ", 10).is_err());
    }
}
