//! Dieta
//!
//! An MCP server for diet logging and recipe nutrition.

use std::sync::Arc;

use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

use dieta::build_info;
use dieta::catalog::{FoodCatalog, SubstringMatcher};
use dieta::config::Config;
use dieta::db::{self, Database};
use dieta::mcp::DietaService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout carries the MCP transport
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("dieta=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env();
    eprintln!("Database path: {}", config.database_path.display());

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let database = Database::new(&config.database_path)?;
    database.with_conn(|conn| {
        db::migrations::run_migrations(conn)?;
        let version = db::migrations::get_schema_version(conn)?;
        eprintln!("Database schema version: {}", version);
        Ok(())
    })?;

    let catalog = match config.catalog_path.as_deref() {
        Some(path) => FoodCatalog::load(path).unwrap_or_else(|e| {
            tracing::warn!("{e}; continuing without reference foods");
            FoodCatalog::empty()
        }),
        None => {
            tracing::info!("DIETA_FOOD_CATALOG not set, reference foods disabled");
            FoodCatalog::empty()
        }
    };

    let service = DietaService::new(
        config.database_path.clone(),
        database,
        catalog,
        Arc::new(SubstringMatcher),
        config.default_calorie_goal,
    );

    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
