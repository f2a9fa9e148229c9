//! Recipe totals aggregation
//!
//! Sums the scaled nutrient contributions of a recipe's ingredients.

use super::types::{truthy, IngredientContribution, RecipeTotals};

impl RecipeTotals {
    /// Contribution of a single ingredient line
    pub fn of(ingredient: &IngredientContribution) -> Self {
        let ratio = ingredient.ratio();
        let scaled = |per_base: Option<f64>| truthy(per_base).unwrap_or(0.0) * ratio;

        Self {
            total_cals: scaled(ingredient.calories_per_unit),
            total_prot: scaled(ingredient.protein),
            total_carb: scaled(ingredient.carbohydrate),
            total_fat: scaled(ingredient.lipid),
            total_weight: ingredient.quantity,
        }
    }
}

impl std::ops::Add for RecipeTotals {
    type Output = RecipeTotals;

    fn add(self, other: RecipeTotals) -> RecipeTotals {
        RecipeTotals {
            total_cals: self.total_cals + other.total_cals,
            total_prot: self.total_prot + other.total_prot,
            total_carb: self.total_carb + other.total_carb,
            total_fat: self.total_fat + other.total_fat,
            total_weight: self.total_weight + other.total_weight,
        }
    }
}

impl std::iter::Sum for RecipeTotals {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(RecipeTotals::default(), |acc, t| acc + t)
    }
}

/// Aggregate a list of ingredients into raw recipe totals
///
/// Each nutrient is scaled by `quantity / base_quantity` (base defaults to
/// 100). The weight total is the plain sum of quantities. Total over its
/// whole domain: an empty list yields all zeros.
pub fn aggregate(ingredients: &[IngredientContribution]) -> RecipeTotals {
    ingredients.iter().map(RecipeTotals::of).sum()
}
