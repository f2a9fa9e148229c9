//! Recipe nutrition engine
//!
//! Pure aggregation and normalization of recipe ingredient nutrition. No I/O,
//! no shared state, no failure paths.

pub mod aggregate;
pub mod normalize;
pub mod types;

pub use aggregate::aggregate;
pub use normalize::{compose, normalize, round_to_tenth};
pub use types::{
    CalculationMode, IngredientContribution, NormalizedNutrition, RecipeTotals,
    DEFAULT_BASE_QUANTITY,
};
