//! Reference food catalog
//!
//! Bundled nutrition table and the text matcher used to look foods up.

pub mod matcher;
pub mod reference;

pub use matcher::{FoodMatcher, SubstringMatcher};
pub use reference::{CatalogError, FoodCatalog, ReferenceFood};
