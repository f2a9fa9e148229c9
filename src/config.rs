//! Runtime configuration
//!
//! Environment-only configuration, read once at startup.

use std::env;
use std::path::PathBuf;

use tracing::{info, warn};

pub const DEFAULT_CALORIE_GOAL: f64 = 2000.0;

#[derive(Debug, Clone)]
pub struct Config {
    /// SQLite database file (`DIETA_DATABASE_PATH`)
    pub database_path: PathBuf,
    /// Reference food table (`DIETA_FOOD_CATALOG`), optional
    pub catalog_path: Option<PathBuf>,
    /// Goal used until the user stores one (`DIETA_DEFAULT_CALORIE_GOAL`)
    pub default_calorie_goal: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_path: env::var("DIETA_DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_database_path()),
            catalog_path: env::var("DIETA_FOOD_CATALOG")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            default_calorie_goal: parse_goal(env::var("DIETA_DEFAULT_CALORIE_GOAL").ok()),
        }
    }
}

fn parse_goal(raw: Option<String>) -> f64 {
    let Some(raw) = raw else {
        info!("DIETA_DEFAULT_CALORIE_GOAL not set, using default: {DEFAULT_CALORIE_GOAL}");
        return DEFAULT_CALORIE_GOAL;
    };
    match raw.trim().parse::<f64>() {
        Ok(goal) if goal > 0.0 && goal.is_finite() => goal,
        _ => {
            warn!("Invalid DIETA_DEFAULT_CALORIE_GOAL value {raw:?}, using {DEFAULT_CALORIE_GOAL}");
            DEFAULT_CALORIE_GOAL
        }
    }
}

/// `<project root>/data/dieta.db`, next to the binary outside of `target/`
fn default_database_path() -> PathBuf {
    let mut path = env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(project_root) = path.parent().and_then(|target| target.parent()) {
            path = project_root.to_path_buf();
        }
    }

    path.push("data");
    path.push("dieta.db");
    path
}
