use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

use crate::core::category::{EntryCategory, PrizeCategory};
use crate::core::types::Gender;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read category catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse category catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid category catalog: {0}")]
    Invalid(String),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// An extra gender pairing: entries of `entry` gender may win `prize` gender categories
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderEligibility {
    pub entry: Gender,
    pub prize: Gender,
}

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub entry_categories: Vec<EntryCategory>,
    pub prize_categories: Vec<PrizeCategory>,
    #[serde(default)]
    pub gender_eligibility: Vec<GenderEligibility>,
}

/// Entry and prize categories for a race, with eligibility rules
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    /// Entry categories in declaration order
    pub entry_categories: Vec<EntryCategory>,

    /// Prize categories in declaration order
    pub prize_categories: Vec<PrizeCategory>,

    /// Gender pairings beyond "same gender" and "anyone may win Open"
    pub gender_eligibility: Vec<GenderEligibility>,

    /// Index: short name -> index in `entry_categories`
    entry_index: HashMap<String, usize>,
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryCatalog {
    /// Create an empty catalog
    #[must_use]
    pub fn new() -> Self {
        Self {
            entry_categories: Vec::new(),
            prize_categories: Vec::new(),
            gender_eligibility: Vec::new(),
            entry_index: HashMap::new(),
        }
    }

    /// Load the embedded default catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded catalog is malformed.
    pub fn load_embedded() -> Result<Self, CatalogError> {
        // Embedded at compile time, validated by build.rs
        const EMBEDDED_CATALOG: &str = include_str!("../../categories/default_categories.json");
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Load catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid catalog.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a short name is repeated,
    /// or an age band is inverted.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            tracing::warn!(
                "Category catalog version mismatch (expected {}, found {})",
                CATALOG_VERSION,
                data.version
            );
        }

        let mut catalog = Self::new();
        for category in data.entry_categories {
            catalog.add_entry_category(category)?;
        }
        for category in data.prize_categories {
            catalog.add_prize_category(category)?;
        }
        catalog.gender_eligibility = data.gender_eligibility;

        Ok(catalog)
    }

    /// Add an entry category to the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for a repeated short name or inverted age band.
    pub fn add_entry_category(&mut self, category: EntryCategory) -> Result<(), CatalogError> {
        if category.minimum_age > category.maximum_age {
            return Err(CatalogError::Invalid(format!(
                "entry category '{}' has minimum age above maximum age",
                category.short_name
            )));
        }
        if self.entry_index.contains_key(&category.short_name) {
            return Err(CatalogError::Invalid(format!(
                "entry category '{}' declared twice",
                category.short_name
            )));
        }

        self.entry_index
            .insert(category.short_name.clone(), self.entry_categories.len());
        self.entry_categories.push(category);
        Ok(())
    }

    /// Add a prize category to the catalog
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Invalid` for a repeated short name or inverted age band.
    pub fn add_prize_category(&mut self, category: PrizeCategory) -> Result<(), CatalogError> {
        if category.minimum_age > category.maximum_age {
            return Err(CatalogError::Invalid(format!(
                "prize category '{}' has minimum age above maximum age",
                category.short_name
            )));
        }
        if self
            .prize_categories
            .iter()
            .any(|c| c.short_name == category.short_name)
        {
            return Err(CatalogError::Invalid(format!(
                "prize category '{}' declared twice",
                category.short_name
            )));
        }

        self.prize_categories.push(category);
        Ok(())
    }

    /// Look up an entry category by its short code
    #[must_use]
    pub fn entry_category(&self, short_name: &str) -> Option<&EntryCategory> {
        self.entry_index
            .get(short_name)
            .map(|&idx| &self.entry_categories[idx])
    }

    /// Prize categories, most general first
    #[must_use]
    pub fn prize_categories_by_generality(&self) -> Vec<&PrizeCategory> {
        let mut categories: Vec<&PrizeCategory> = self.prize_categories.iter().collect();
        // Stable: equally general categories keep declaration order
        categories.sort_by(|a, b| a.cmp_generality(b));
        categories
    }

    /// Number of prize categories
    #[must_use]
    pub fn len(&self) -> usize {
        self.prize_categories.len()
    }

    /// Check if the catalog has no prize categories
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.prize_categories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_embedded() {
        let catalog = CategoryCatalog::load_embedded().unwrap();
        assert!(!catalog.is_empty());
        assert!(catalog.entry_category("M40").is_some());
        assert!(catalog.entry_category("Mixed").is_some());
        assert!(catalog.entry_category("nope").is_none());
    }

    #[test]
    fn test_generality_order_of_embedded() {
        let catalog = CategoryCatalog::load_embedded().unwrap();
        let names: Vec<&str> = catalog
            .prize_categories_by_generality()
            .iter()
            .map(|c| c.short_name.as_str())
            .collect();

        let at = |name: &str| names.iter().position(|n| *n == name).unwrap();

        // Age-0 categories first, Open before Women before Mixed
        assert_eq!(names[0], "Open");
        assert!(at("Women") < at("Mixed"));
        // Same threshold and gender: the wider age band first
        assert!(at("Women") < at("WU20"));
        assert!(at("Mixed") < at("M40"));
        let m40 = names.iter().position(|n| *n == "M40").unwrap();
        let m50 = names.iter().position(|n| *n == "M50").unwrap();
        assert!(m40 < m50);
    }

    #[test]
    fn test_duplicate_short_name_rejected() {
        let json = r#"{
            "version": "1.0.0",
            "entry_categories": [
                { "short_name": "MS", "long_name": "Men", "gender": "Men" },
                { "short_name": "MS", "long_name": "Men again", "gender": "Men" }
            ],
            "prize_categories": []
        }"#;
        assert!(matches!(
            CategoryCatalog::from_json(json),
            Err(CatalogError::Invalid(_))
        ));
    }

    #[test]
    fn test_inverted_age_band_rejected() {
        let json = r#"{
            "version": "1.0.0",
            "entry_categories": [],
            "prize_categories": [
                { "short_name": "X", "long_name": "X", "gender": "Open",
                  "minimum_age": 50, "maximum_age": 40, "number_of_prizes": 1 }
            ]
        }"#;
        assert!(CategoryCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            CategoryCatalog::from_json("{ not json"),
            Err(CatalogError::ParseError(_))
        ));
    }
}
