//! Data models
//!
//! Rust structs representing database entities.

mod food;
mod meal;
mod recipe_ingredient;
mod setting;
mod water;
mod weight;

pub use food::{Food, FoodCreate, FoodUpdate, RecipeMeta};
pub use meal::{DailyCalories, Meal, MealCreate, MealItem};
pub use recipe_ingredient::RecipeIngredient;
pub use setting::{Setting, CALORIE_GOAL_KEY};
pub use water::WaterLog;
pub use weight::WeightEntry;
