//! Recipe nutrition data types
//!
//! Plain values passed into and out of the aggregator and normalizer.

use serde::{Deserialize, Serialize};

/// Reference quantity assumed when an ingredient does not declare one.
/// Most nutrient tables report values per 100 g or 100 ml.
pub const DEFAULT_BASE_QUANTITY: f64 = 100.0;

/// Treat a number the way a loose `value || fallback` would: absent, zero and
/// NaN all count as "not provided".
pub(crate) fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// One ingredient line in a recipe being composed
///
/// Nutrient fields are expressed per `base_quantity` units of the ingredient;
/// `quantity` is how much of it the recipe uses, in the same unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientContribution {
    /// Display label, never used in arithmetic
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub calories_per_unit: Option<f64>,
    #[serde(default)]
    pub protein: Option<f64>,
    #[serde(default)]
    pub carbohydrate: Option<f64>,
    #[serde(default)]
    pub lipid: Option<f64>,
    pub quantity: f64,
    #[serde(default)]
    pub base_quantity: Option<f64>,
}

impl IngredientContribution {
    /// Ingredient with every nutrient known, per 100 units
    pub fn per_100(
        quantity: f64,
        calories: f64,
        protein: f64,
        carbohydrate: f64,
        lipid: f64,
    ) -> Self {
        Self {
            name: None,
            calories_per_unit: Some(calories),
            protein: Some(protein),
            carbohydrate: Some(carbohydrate),
            lipid: Some(lipid),
            quantity,
            base_quantity: Some(DEFAULT_BASE_QUANTITY),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Reference quantity actually used for scaling (zero or missing means 100)
    pub fn effective_base_quantity(&self) -> f64 {
        truthy(self.base_quantity).unwrap_or(DEFAULT_BASE_QUANTITY)
    }

    /// Fraction of the reference quantity this line contributes
    pub fn ratio(&self) -> f64 {
        self.quantity / self.effective_base_quantity()
    }
}

/// Raw, unrounded sums over a recipe's ingredients
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RecipeTotals {
    pub total_cals: f64,
    pub total_prot: f64,
    pub total_carb: f64,
    pub total_fat: f64,
    /// Sum of ingredient quantities, no unit conversion applied
    pub total_weight: f64,
}

/// How a finished recipe is normalized into a reusable food record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CalculationMode {
    /// Per 100 units of finished weight
    #[default]
    Weight,
    /// Per single portion
    Portions,
}

impl CalculationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CalculationMode::Weight => "weight",
            CalculationMode::Portions => "portions",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "weight" => Some(CalculationMode::Weight),
            "portions" | "portion" => Some(CalculationMode::Portions),
            _ => None,
        }
    }

    /// Unit label stored on the resulting food record
    pub fn unit(&self) -> &'static str {
        match self {
            CalculationMode::Weight => "g",
            CalculationMode::Portions => "unid",
        }
    }

    /// Reference quantity stored on the resulting food record
    pub fn base_quantity(&self) -> f64 {
        match self {
            CalculationMode::Weight => 100.0,
            CalculationMode::Portions => 1.0,
        }
    }
}

/// Per-serving nutrition for a finished recipe
///
/// Same shape as a plain food entry, so it is persisted identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedNutrition {
    pub unit: String,
    pub base_quantity: f64,
    pub calories_per_unit: f64,
    pub protein: f64,
    pub carbohydrate: f64,
    pub lipid: f64,
}

impl NormalizedNutrition {
    /// All-zero record carrying the labels of `mode`
    pub fn zero(mode: CalculationMode) -> Self {
        Self {
            unit: mode.unit().to_string(),
            base_quantity: mode.base_quantity(),
            calories_per_unit: 0.0,
            protein: 0.0,
            carbohydrate: 0.0,
            lipid: 0.0,
        }
    }
}
