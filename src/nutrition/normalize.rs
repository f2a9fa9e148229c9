//! Recipe normalization
//!
//! Converts raw recipe totals into a per-100-units or per-portion record.

use super::aggregate::aggregate;
use super::types::{truthy, CalculationMode, IngredientContribution, NormalizedNutrition, RecipeTotals};

/// Round to one decimal place, matching the reference formatter
///
/// The exact binary value is rounded to the nearest tenth, so `1.15`
/// (stored as 1.1499999...) becomes `1.1`. Exact ties, which only occur for
/// odd multiples of 0.25, round away from zero.
pub fn round_to_tenth(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let quarters = value * 4.0;
    if quarters.fract() == 0.0 && quarters % 2.0 != 0.0 {
        return (value * 10.0).round() / 10.0;
    }

    // Float formatting is exact on the binary value; ties were handled above.
    format!("{:.1}", value).parse().unwrap_or(value)
}

/// Normalize recipe totals into a reusable nutrition record
///
/// `final_value` is the finished weight (weight mode) or the number of
/// portions (portions mode). Absent, zero or NaN values fall back to the raw
/// ingredient weight and to a single portion respectively. A non-positive
/// weight yields the all-zero record instead of dividing by it.
pub fn normalize(
    totals: &RecipeTotals,
    mode: CalculationMode,
    final_value: Option<f64>,
) -> NormalizedNutrition {
    let ratio = match mode {
        CalculationMode::Weight => {
            let weight = truthy(final_value).unwrap_or(totals.total_weight);
            if weight <= 0.0 || weight.is_nan() {
                tracing::debug!(weight, "Non-positive recipe weight, using zero record");
                return NormalizedNutrition::zero(mode);
            }
            100.0 / weight
        }
        CalculationMode::Portions => {
            let portions = truthy(final_value).unwrap_or(1.0);
            1.0 / portions
        }
    };

    NormalizedNutrition {
        unit: mode.unit().to_string(),
        base_quantity: mode.base_quantity(),
        calories_per_unit: round_to_tenth(totals.total_cals * ratio),
        protein: round_to_tenth(totals.total_prot * ratio),
        carbohydrate: round_to_tenth(totals.total_carb * ratio),
        lipid: round_to_tenth(totals.total_fat * ratio),
    }
}

/// Aggregate then normalize in one step
pub fn compose(
    ingredients: &[IngredientContribution],
    mode: CalculationMode,
    final_value: Option<f64>,
) -> NormalizedNutrition {
    normalize(&aggregate(ingredients), mode, final_value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_totals() -> RecipeTotals {
        aggregate(&[
            IngredientContribution::per_100(200.0, 100.0, 10.0, 20.0, 5.0),
            IngredientContribution::per_100(100.0, 50.0, 5.0, 10.0, 2.0),
        ])
    }

    #[test]
    fn test_weight_mode_cooked_reduction() {
        let n = normalize(&sample_totals(), CalculationMode::Weight, Some(250.0));
        assert_eq!(
            n,
            NormalizedNutrition {
                unit: "g".to_string(),
                base_quantity: 100.0,
                calories_per_unit: 100.0,
                protein: 10.0,
                carbohydrate: 20.0,
                lipid: 4.8,
            }
        );
    }

    #[test]
    fn test_weight_mode_raw_weight() {
        let n = normalize(&sample_totals(), CalculationMode::Weight, Some(300.0));
        assert_eq!(n.calories_per_unit, 83.3);
        assert_eq!(n.protein, 8.3);
        assert_eq!(n.carbohydrate, 16.7);
        assert_eq!(n.lipid, 4.0);
    }

    #[test]
    fn test_weight_mode_falls_back_to_ingredient_weight() {
        let totals = sample_totals();
        let explicit = normalize(&totals, CalculationMode::Weight, Some(300.0));
        assert_eq!(normalize(&totals, CalculationMode::Weight, None), explicit);
        assert_eq!(normalize(&totals, CalculationMode::Weight, Some(0.0)), explicit);
        assert_eq!(normalize(&totals, CalculationMode::Weight, Some(f64::NAN)), explicit);
    }

    #[test]
    fn test_portions_mode() {
        let n = normalize(&sample_totals(), CalculationMode::Portions, Some(2.0));
        assert_eq!(
            n,
            NormalizedNutrition {
                unit: "unid".to_string(),
                base_quantity: 1.0,
                calories_per_unit: 125.0,
                protein: 12.5,
                carbohydrate: 25.0,
                lipid: 6.0,
            }
        );
    }

    #[test]
    fn test_portions_identity_fallback() {
        let totals = sample_totals();
        let one = normalize(&totals, CalculationMode::Portions, Some(1.0));
        assert_eq!(normalize(&totals, CalculationMode::Portions, Some(0.0)), one);
        assert_eq!(normalize(&totals, CalculationMode::Portions, None), one);
        assert_eq!(one.calories_per_unit, 250.0);
        assert_eq!(one.lipid, 12.0);
    }

    #[test]
    fn test_zero_weight_guard() {
        let totals = sample_totals();
        let zero = NormalizedNutrition::zero(CalculationMode::Weight);
        assert_eq!(zero.unit, "g");
        assert_eq!(zero.base_quantity, 100.0);

        // Explicit zero falls back to a zero ingredient sum
        let empty = RecipeTotals::default();
        assert_eq!(normalize(&empty, CalculationMode::Weight, Some(0.0)), zero);
        assert_eq!(normalize(&empty, CalculationMode::Weight, None), zero);

        // Negative weight is guarded too
        assert_eq!(normalize(&totals, CalculationMode::Weight, Some(-10.0)), zero);
    }

    #[test]
    fn test_empty_recipe_in_portions_mode() {
        let n = normalize(&RecipeTotals::default(), CalculationMode::Portions, Some(4.0));
        assert_eq!(n, NormalizedNutrition::zero(CalculationMode::Portions));
    }

    #[test]
    fn test_compose_matches_aggregate_then_normalize() {
        let ingredients = [
            IngredientContribution::per_100(200.0, 100.0, 10.0, 20.0, 5.0),
            IngredientContribution::per_100(100.0, 50.0, 5.0, 10.0, 2.0),
        ];
        assert_eq!(
            compose(&ingredients, CalculationMode::Weight, Some(250.0)),
            normalize(&aggregate(&ingredients), CalculationMode::Weight, Some(250.0))
        );
    }

    #[test]
    fn test_round_to_tenth() {
        assert_eq!(round_to_tenth(83.33333333), 83.3);
        assert_eq!(round_to_tenth(16.66666667), 16.7);
        assert_eq!(round_to_tenth(4.800000000000001), 4.8);
        assert_eq!(round_to_tenth(125.0), 125.0);
        assert_eq!(round_to_tenth(0.0), 0.0);
    }

    #[test]
    fn test_round_to_tenth_ties_away_from_zero() {
        assert_eq!(round_to_tenth(0.25), 0.3);
        assert_eq!(round_to_tenth(0.75), 0.8);
        assert_eq!(round_to_tenth(12.25), 12.3);
        assert_eq!(round_to_tenth(-0.25), -0.3);
    }

    #[test]
    fn test_round_to_tenth_uses_binary_value() {
        // 1.15 is stored just below the midpoint
        assert_eq!(round_to_tenth(1.15), 1.1);
        // 2.45 and 0.05 are stored just above it
        assert_eq!(round_to_tenth(2.45), 2.5);
        assert_eq!(round_to_tenth(0.05), 0.1);
    }

    #[test]
    fn test_round_to_tenth_non_finite() {
        assert!(round_to_tenth(f64::NAN).is_nan());
        assert_eq!(round_to_tenth(f64::INFINITY), f64::INFINITY);
    }

    #[test]
    fn test_rounding_stability() {
        let totals = RecipeTotals {
            total_cals: 1234.5678,
            total_prot: 77.777,
            total_carb: 151.01,
            total_fat: 43.219,
            total_weight: 987.0,
        };
        for step in 1..200 {
            let final_value = step as f64 * 7.3;
            for mode in [CalculationMode::Weight, CalculationMode::Portions] {
                let n = normalize(&totals, mode, Some(final_value));
                for v in [n.calories_per_unit, n.protein, n.carbohydrate, n.lipid] {
                    let tenths = v * 10.0;
                    assert!(
                        (tenths - tenths.round()).abs() < 1e-6,
                        "{} has more than one decimal",
                        v
                    );
                }
            }
        }
    }
}
