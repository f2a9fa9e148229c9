//! Re-normalize every saved recipe from its stored ingredients
//! Usage: cargo run --bin recompute_recipes

use std::collections::HashMap;

use dieta::config::Config;
use dieta::db::{migrations, Database};
use dieta::models::Food;
use dieta::tools::recipes::recompute_all_recipes;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();
    println!("Database: {}", config.database_path.display());

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        if migrations::needs_migration(conn)? {
            migrations::run_migrations(conn)?;
        }
        Ok(())
    })?;

    let before: HashMap<i64, Food> = database
        .with_conn(Food::list_recipes)?
        .into_iter()
        .map(|food| (food.id, food))
        .collect();

    let report = recompute_all_recipes(&database)?;
    println!("Checked {} recipes, {} changed", report.recipes, report.changed.len());

    for id in &report.changed {
        let Some(old) = before.get(id) else { continue };
        let Some(new) = database.with_conn(|conn| Food::get_by_id(conn, *id))? else { continue };

        println!("\nRecipe {} ({})", id, new.name);
        println!(
            "  per {} {}: {:.1} kcal -> {:.1} kcal",
            new.base_quantity, new.unit, old.calories_per_unit, new.calories_per_unit
        );
        println!(
            "  protein {:.1} -> {:.1}, carbohydrate {:.1} -> {:.1}, lipid {:.1} -> {:.1}",
            old.protein, new.protein, old.carbohydrate, new.carbohydrate, old.lipid, new.lipid
        );
    }

    Ok(())
}
