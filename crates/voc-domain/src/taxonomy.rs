//! Taxonomy module - closed value sets for categories and sentiments

use serde::{Deserialize, Serialize};

/// Default issue categories
pub const DEFAULT_CATEGORIES: [&str; 5] = ["BM", "밸런스", "강화", "서버", "운영"];

/// Default sentiments
pub const DEFAULT_SENTIMENTS: [&str; 3] = ["부정", "중립", "긍정"];

/// Closed sets of allowed `category` and `sentiment` values.
///
/// The members are configuration, not code: the prompt lists them and the
/// merger blanks out anything the provider returns outside them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Allowed categories, in prompt order
    pub categories: Vec<String>,

    /// Allowed sentiments, in prompt order
    pub sentiments: Vec<String>,
}

impl Taxonomy {
    /// Build a taxonomy from explicit sets
    ///
    /// # Errors
    /// Returns error if either set is empty or contains blank or repeated members
    pub fn new(categories: Vec<String>, sentiments: Vec<String>) -> Result<Self, String> {
        let taxonomy = Self {
            categories,
            sentiments,
        };
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    /// Validate both sets
    pub fn validate(&self) -> Result<(), String> {
        validate_set("categories", &self.categories)?;
        validate_set("sentiments", &self.sentiments)
    }

    /// Whether `value` is an allowed category
    pub fn has_category(&self, value: &str) -> bool {
        self.categories.iter().any(|c| c == value)
    }

    /// Whether `value` is an allowed sentiment
    pub fn has_sentiment(&self, value: &str) -> bool {
        self.sentiments.iter().any(|s| s == value)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            sentiments: DEFAULT_SENTIMENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn validate_set(name: &str, values: &[String]) -> Result<(), String> {
    if values.is_empty() {
        return Err(format!("{} cannot be empty", name));
    }
    for (idx, value) in values.iter().enumerate() {
        if value.trim().is_empty() {
            return Err(format!("{} contains a blank member", name));
        }
        if values[..idx].contains(value) {
            return Err(format!("{} contains '{}' more than once", name, value));
        }
    }
    Ok(())
}
