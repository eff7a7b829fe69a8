//! Language enum for the card's display languages.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Display languages offered by the language selector.
///
/// Somali is the source language: inference always produces Somali text and
/// every other language is a translation of the Somali record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    So,
    En,
    Ar,
    Tr,
    Zh,
}

impl Language {
    /// The language inference produces.
    pub const SOURCE: Language = Language::So;

    /// Returns all languages in selector order.
    pub fn all() -> &'static [Language] {
        &[
            Language::So,
            Language::En,
            Language::Ar,
            Language::Tr,
            Language::Zh,
        ]
    }

    /// BCP 47 style tag (`so`, `en`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            Language::So => "so",
            Language::En => "en",
            Language::Ar => "ar",
            Language::Tr => "tr",
            Language::Zh => "zh",
        }
    }

    /// English display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Language::So => "Somali",
            Language::En => "English",
            Language::Ar => "Arabic",
            Language::Tr => "Turkish",
            Language::Zh => "Chinese",
        }
    }

    /// Name used in translation prompts, with the endonym where it helps the model.
    pub fn prompt_name(&self) -> &'static str {
        match self {
            Language::So => "Somali (Af-Soomaali)",
            Language::En => "English",
            Language::Ar => "Arabic (العربية)",
            Language::Tr => "Turkish (Türkçe)",
            Language::Zh => "Chinese (中文)",
        }
    }

    /// Flag shown in the language selector.
    pub fn icon(&self) -> &'static str {
        match self {
            Language::So => "🇸🇴",
            Language::En => "🇺🇸",
            Language::Ar => "🇸🇦",
            Language::Tr => "🇹🇷",
            Language::Zh => "🇨🇳",
        }
    }

    pub fn is_source(&self) -> bool {
        *self == Self::SOURCE
    }

    /// True for scripts laid out right-to-left.
    pub fn is_rtl(&self) -> bool {
        matches!(self, Language::Ar)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::SOURCE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Language::all()
            .iter()
            .copied()
            .find(|lang| lang.code() == needle || lang.display_name().to_lowercase() == needle)
            .ok_or_else(|| {
                ValidationError::invalid_format("language", format!("unsupported language '{}'", s))
            })
    }
}
