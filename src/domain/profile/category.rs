//! Closed set of profile categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Category a profile is filed under.
///
/// The set is fixed; the canonical label pairs the Somali word with its
/// English gloss, e.g. `Ganacsiga (Business)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Business,
    Tech,
    Arts,
    Leadership,
    Sports,
    Education,
    Health,
    Community,
}

impl Category {
    /// Returns all categories in selector order.
    pub fn all() -> &'static [Category] {
        &[
            Category::Business,
            Category::Tech,
            Category::Arts,
            Category::Leadership,
            Category::Sports,
            Category::Education,
            Category::Health,
            Category::Community,
        ]
    }

    /// Somali name.
    pub fn somali(&self) -> &'static str {
        match self {
            Category::Business => "Ganacsiga",
            Category::Tech => "Teknoolajiyadda",
            Category::Arts => "Farshaxanka",
            Category::Leadership => "Hogaaminta",
            Category::Sports => "Ciyaaraha",
            Category::Education => "Waxbarashada",
            Category::Health => "Caafimaadka",
            Category::Community => "Bulshada",
        }
    }

    /// English gloss.
    pub fn english(&self) -> &'static str {
        match self {
            Category::Business => "Business",
            Category::Tech => "Tech",
            Category::Arts => "Arts",
            Category::Leadership => "Leadership",
            Category::Sports => "Sports",
            Category::Education => "Education",
            Category::Health => "Health",
            Category::Community => "Community",
        }
    }

    /// Canonical label stored in the record.
    pub fn label(&self) -> String {
        format!("{} ({})", self.somali(), self.english())
    }

    /// All canonical labels, in selector order.
    pub fn labels() -> Vec<String> {
        Self::all().iter().map(Category::label).collect()
    }

    /// Resolves a label leniently: full label, Somali word or English word,
    /// ignoring case and surrounding whitespace.
    pub fn resolve(text: &str) -> Option<Category> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        Self::all().iter().copied().find(|category| {
            category.label().to_lowercase() == needle
                || category.somali().to_lowercase() == needle
                || category.english().to_lowercase() == needle
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::resolve(s).ok_or_else(|| {
            ValidationError::invalid_format("category", format!("unknown category '{}'", s))
        })
    }
}
