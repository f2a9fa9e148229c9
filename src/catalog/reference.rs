//! Reference food table
//!
//! Read-only nutrition table bundled as JSON (one object per food, values per
//! 100 g). Loaded once at startup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::matcher::FoodMatcher;
use crate::nutrition::{IngredientContribution, NormalizedNutrition, DEFAULT_BASE_QUANTITY};

/// Catalog loading errors
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read food catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Food catalog {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Table values such as "NA", "Tr" or null read as 0
fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| v.as_f64())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0))
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// One entry of the reference table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFood {
    #[serde(default, deserialize_with = "lenient_id")]
    pub id: String,
    pub description: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub energy_kcal: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub protein_g: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub carbohydrate_g: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lipid_g: f64,
}

impl ReferenceFood {
    /// Values in the common food-record shape (per 100 g)
    pub fn nutrition(&self) -> NormalizedNutrition {
        NormalizedNutrition {
            unit: "g".to_string(),
            base_quantity: DEFAULT_BASE_QUANTITY,
            calories_per_unit: self.energy_kcal,
            protein: self.protein_g,
            carbohydrate: self.carbohydrate_g,
            lipid: self.lipid_g,
        }
    }

    /// Use `grams` of this food as a recipe ingredient
    pub fn as_contribution(&self, grams: f64) -> IngredientContribution {
        IngredientContribution::per_100(
            grams,
            self.energy_kcal,
            self.protein_g,
            self.carbohydrate_g,
            self.lipid_g,
        )
        .named(self.description.clone())
    }
}

/// In-memory reference table
#[derive(Debug, Clone, Default)]
pub struct FoodCatalog {
    foods: Vec<ReferenceFood>,
}

impl FoodCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_foods(foods: Vec<ReferenceFood>) -> Self {
        Self { foods }
    }

    /// Load a catalog from a JSON array file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let foods: Vec<ReferenceFood> =
            serde_json::from_str(&raw).map_err(|source| CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        let blank = foods.iter().filter(|f| f.description.trim().is_empty()).count();
        if blank > 0 {
            tracing::warn!(blank, "Skipping catalog entries without a description");
        }
        let foods: Vec<ReferenceFood> = foods
            .into_iter()
            .filter(|f| !f.description.trim().is_empty())
            .collect();

        tracing::info!(count = foods.len(), path = %path.display(), "Loaded food catalog");
        Ok(Self { foods })
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ReferenceFood> {
        self.foods.iter().find(|f| f.id == id)
    }

    /// Best matches for `query`, best rank first, ties by description
    pub fn search(
        &self,
        matcher: &dyn FoodMatcher,
        query: &str,
        limit: usize,
    ) -> Vec<&ReferenceFood> {
        let mut hits: Vec<(u32, &ReferenceFood)> = self
            .foods
            .iter()
            .filter_map(|food| matcher.rank(query, &food.description).map(|r| (r, food)))
            .collect();
        hits.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.description.cmp(&b.1.description)));
        hits.into_iter().take(limit).map(|(_, food)| food).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SubstringMatcher;
    use std::io::Write;

    const SAMPLE: &str = r#"[
        {"id": 1, "description": "Arroz, integral, cozido", "energy_kcal": 123.5, "protein_g": 2.6, "carbohydrate_g": 25.8, "lipid_g": 1.0},
        {"id": 2, "description": "Arroz, tipo 1, cozido", "energy_kcal": 128.3, "protein_g": 2.5, "carbohydrate_g": 28.1, "lipid_g": "Tr"},
        {"id": "TBCA-3", "description": "Feijão, carioca, cozido", "energy_kcal": 76.4, "protein_g": 4.8, "carbohydrate_g": 13.6, "lipid_g": "NA"},
        {"id": 4, "description": "", "energy_kcal": 10}
    ]"#;

    fn write_sample() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_with_lenient_values() {
        let file = write_sample();
        let catalog = FoodCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(), 3);

        let rice = catalog.get("2").unwrap();
        assert_eq!(rice.lipid_g, 0.0);
        assert_eq!(rice.energy_kcal, 128.3);

        let beans = catalog.get("TBCA-3").unwrap();
        assert_eq!(beans.lipid_g, 0.0);
        assert_eq!(beans.protein_g, 4.8);
    }

    #[test]
    fn test_load_missing_file() {
        let err = FoodCatalog::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }

    #[test]
    fn test_load_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{not json").unwrap();
        let err = FoodCatalog::load(file.path()).unwrap_err();
        assert!(matches!(err, CatalogError::Parse { .. }));
    }

    #[test]
    fn test_search_ranks_and_limits() {
        let file = write_sample();
        let catalog = FoodCatalog::load(file.path()).unwrap();
        let matcher = SubstringMatcher;

        let hits = catalog.search(&matcher, "arroz cozido", 10);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].description, "Arroz, integral, cozido");

        assert_eq!(catalog.search(&matcher, "arroz", 1).len(), 1);
        assert!(catalog.search(&matcher, "macarrão", 10).is_empty());
    }

    #[test]
    fn test_reference_food_as_ingredient() {
        let food = ReferenceFood {
            id: "1".to_string(),
            description: "Aveia, flocos".to_string(),
            energy_kcal: 394.0,
            protein_g: 13.9,
            carbohydrate_g: 66.6,
            lipid_g: 8.5,
        };
        let ing = food.as_contribution(40.0);
        assert_eq!(ing.quantity, 40.0);
        assert_eq!(ing.effective_base_quantity(), 100.0);
        assert_eq!(ing.name.as_deref(), Some("Aveia, flocos"));
        assert_eq!(food.nutrition().unit, "g");
    }
}
