//! Dieta Status Tool
//!
//! Runtime status of the service and the usage guide served to assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use super::ToolResult;
use crate::build_info::BuildInfo;
use crate::db::Database;
use crate::models::Food;

/// Recipe and logging instructions for AI assistants
pub const RECIPE_INSTRUCTIONS: &str = r#"
# Dieta Usage Instructions

Dieta keeps a local diet log: meals, water, body weight, and a library of
foods and recipes with normalized nutrition.

## Dates

Every date is `YYYY-MM-DD`. Resolve "today" or "yesterday" to a concrete date
before calling a tool.

## Foods

A food stores nutrition per `base_quantity` of `unit`:

| Kind | unit | base_quantity | Values are per |
|------|------|---------------|----------------|
| Solids | g | 100 | 100 grams |
| Liquids | ml | 100 | 100 milliliters |
| Countables | unid | 1 | 1 item |

Use `search_foods` first. Results marked `"origin": "user"` are stored foods
(use their `food_id`); `"origin": "reference"` results come from the bundled
nutrition table (use their `reference_id`).

## Recipes

A recipe is a food whose nutrition is computed from its ingredients.

1. Build the ingredient list. Each line has a `quantity` in the ingredient's
   own unit and exactly one source:
   - `food_id` for a stored food or another recipe
   - `reference_id` for a reference table food
   - inline `calories_per_unit`, `protein`, `carbohydrate`, `lipid` and
     `base_quantity` (default 100) for anything else
2. Pick the mode:
   - `weight`: values per 100 g of the finished dish. `final_value` is the
     cooked weight; leave it out to use the sum of the ingredient quantities.
   - `portions`: values per portion. `final_value` is the number of portions;
     leave it out for a single portion.
3. Call `preview_recipe` to check the numbers, then `save_recipe`.

Values are rounded to one decimal. Quantities are added as-is, so mixing
grams and milliliters in weight mode treats 1 ml as 1 g.

`update_recipe` replaces the ingredient list and recomputes the record.
`recompute_all_recipes` rebuilds every recipe from its stored ingredients.

## Meals

`log_meal` takes either a `calories` figure or a list of items. An item with a
`food_id` gets its name, unit and calories from that food; other items need a
`name` and `calories`.

`quick_log` records an estimated day when nothing was counted, as a fraction
of the calorie goal: `light` 80%, `normal` 100%, `heavy` 120%, `binge` 150%.

## Water, weight and reports

- `add_water` / `remove_last_water` in milliliters
- `add_weight` in kilograms
- `daily_summary` for one date against the calorie goal
- `calorie_history` for the last `7` or `30` days, or `all`
"#;

/// Runtime status of the Dieta service
#[derive(Debug, Clone, Serialize)]
pub struct DietaStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub food_count: i64,
    pub recipe_count: usize,
    pub reference_food_count: usize,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    reference_food_count: usize,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, reference_food_count: usize) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            reference_food_count,
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> ToolResult<DietaStatus> {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());
        let (food_count, recipe_count) = db.with_conn(|conn| {
            Ok((Food::count(conn)?, Food::list_recipes(conn)?.len()))
        })?;

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        Ok(DietaStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            food_count,
            recipe_count,
            reference_food_count: self.reference_food_count,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts() {
        let db = Database::in_memory().unwrap();
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/dieta.db"), 3);
        let status = tracker.get_status(&db).unwrap();

        assert_eq!(status.food_count, 0);
        assert_eq!(status.recipe_count, 0);
        assert_eq!(status.reference_food_count, 3);
        assert!(status.database_size_bytes.is_none());
        assert_eq!(status.process_id, std::process::id());
    }

    #[test]
    fn test_instructions_name_the_tools() {
        for tool in ["search_foods", "preview_recipe", "save_recipe", "log_meal", "quick_log"] {
            assert!(RECIPE_INSTRUCTIONS.contains(tool), "missing {}", tool);
        }
    }
}
