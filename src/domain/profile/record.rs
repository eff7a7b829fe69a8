//! The profile record and the edits that may be applied to it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Category;
use crate::domain::foundation::ValidationError;

/// Biographical fields inferred from a photo.
///
/// Serialized with the keys used on every JSON boundary (AI responses and
/// JSON export): `magaca`, `tagline`, `category`, `sooyaal`, `guulaha`,
/// `xigasho`, `socialProof`. English field names are accepted when reading.
/// All seven keys are required and unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRecord {
    #[serde(rename = "magaca", alias = "name")]
    pub name: String,

    pub tagline: String,

    pub category: String,

    #[serde(rename = "sooyaal", alias = "summary")]
    pub summary: String,

    #[serde(rename = "guulaha", alias = "achievements")]
    pub achievements: Vec<String>,

    #[serde(rename = "xigasho", alias = "quote")]
    pub quote: String,

    #[serde(rename = "socialProof", alias = "sourceAttestation")]
    pub source_attestation: String,
}

impl ProfileRecord {
    /// Checks the rules every canonical record obeys and normalizes the
    /// category to its canonical label.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if the name is blank
    /// - `InvalidFormat` if the category is not in the closed set
    pub fn into_canonical(mut self) -> Result<Self, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field(ProfileField::Name.wire_key()));
        }
        let category: Category = self.category.parse()?;
        self.category = category.label();
        Ok(self)
    }

    /// The category, if the stored text names a member of the closed set.
    pub fn category_kind(&self) -> Option<Category> {
        Category::resolve(&self.category)
    }

    /// Filename-safe form of the name.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    /// Returns the text of a scalar field; `None` for achievements.
    pub fn text(&self, field: ProfileField) -> Option<&str> {
        match field {
            ProfileField::Name => Some(&self.name),
            ProfileField::Tagline => Some(&self.tagline),
            ProfileField::Category => Some(&self.category),
            ProfileField::Summary => Some(&self.summary),
            ProfileField::Quote => Some(&self.quote),
            ProfileField::SourceAttestation => Some(&self.source_attestation),
            ProfileField::Achievements => None,
        }
    }

    /// Applies one edit. The record is left untouched when the edit is invalid.
    ///
    /// # Errors
    ///
    /// - `EmptyField` when blanking the name
    /// - `InvalidFormat` for an unknown category or a text edit on achievements
    /// - `OutOfRange` for an achievement index past the end of the list
    pub fn apply(&mut self, edit: &ProfileEdit) -> Result<(), ValidationError> {
        match edit {
            ProfileEdit::SetText { field, value } => self.set_text(*field, value),
            ProfileEdit::SetAchievement { index, value } => {
                let len = self.achievements.len();
                match (*index).cmp(&len) {
                    std::cmp::Ordering::Less => self.achievements[*index] = value.clone(),
                    std::cmp::Ordering::Equal => self.achievements.push(value.clone()),
                    std::cmp::Ordering::Greater => {
                        return Err(ValidationError::out_of_range(
                            ProfileField::Achievements.wire_key(),
                            0,
                            len as i64,
                            *index as i64,
                        ))
                    }
                }
                Ok(())
            }
            ProfileEdit::RemoveAchievement { index } => {
                if *index >= self.achievements.len() {
                    return Err(ValidationError::out_of_range(
                        ProfileField::Achievements.wire_key(),
                        0,
                        self.achievements.len() as i64 - 1,
                        *index as i64,
                    ));
                }
                self.achievements.remove(*index);
                Ok(())
            }
        }
    }

    fn set_text(&mut self, field: ProfileField, value: &str) -> Result<(), ValidationError> {
        match field {
            ProfileField::Name => {
                if value.trim().is_empty() {
                    return Err(ValidationError::empty_field(field.wire_key()));
                }
                self.name = value.to_string();
            }
            ProfileField::Tagline => self.tagline = value.to_string(),
            ProfileField::Category => {
                let category: Category = value.parse()?;
                self.category = category.label();
            }
            ProfileField::Summary => self.summary = value.to_string(),
            ProfileField::Quote => self.quote = value.to_string(),
            ProfileField::SourceAttestation => self.source_attestation = value.to_string(),
            ProfileField::Achievements => {
                return Err(ValidationError::invalid_format(
                    field.wire_key(),
                    "achievements are edited one entry at a time",
                ))
            }
        }
        Ok(())
    }
}

/// Lower-cases the name and collapses each whitespace run to a single `-`.
///
/// Falls back to `profile` when nothing is left.
pub fn slugify(name: &str) -> String {
    let slug = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_lowercase();
    if slug.is_empty() {
        "profile".to_string()
    } else {
        slug
    }
}

/// One field of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    Tagline,
    Category,
    Summary,
    Achievements,
    Quote,
    SourceAttestation,
}

impl ProfileField {
    pub fn all() -> &'static [ProfileField] {
        &[
            ProfileField::Name,
            ProfileField::Tagline,
            ProfileField::Category,
            ProfileField::Summary,
            ProfileField::Achievements,
            ProfileField::Quote,
            ProfileField::SourceAttestation,
        ]
    }

    /// Key used on the JSON boundaries.
    pub fn wire_key(&self) -> &'static str {
        match self {
            ProfileField::Name => "magaca",
            ProfileField::Tagline => "tagline",
            ProfileField::Category => "category",
            ProfileField::Summary => "sooyaal",
            ProfileField::Achievements => "guulaha",
            ProfileField::Quote => "xigasho",
            ProfileField::SourceAttestation => "socialProof",
        }
    }

    /// snake_case name used in URLs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::Tagline => "tagline",
            ProfileField::Category => "category",
            ProfileField::Summary => "summary",
            ProfileField::Achievements => "achievements",
            ProfileField::Quote => "quote",
            ProfileField::SourceAttestation => "source_attestation",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProfileField {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProfileField::all()
            .iter()
            .copied()
            .find(|field| field.as_str() == s || field.wire_key() == s)
            .ok_or_else(|| ValidationError::invalid_format("field", format!("unknown field '{}'", s)))
    }
}

/// A single change to the canonical record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ProfileEdit {
    /// Replace a scalar field.
    SetText { field: ProfileField, value: String },
    /// Replace achievement `index`; `index == len` appends.
    SetAchievement { index: usize, value: String },
    /// Remove achievement `index`.
    RemoveAchievement { index: usize },
}

impl ProfileEdit {
    pub fn set(field: ProfileField, value: impl Into<String>) -> Self {
        ProfileEdit::SetText {
            field,
            value: value.into(),
        }
    }

    pub fn set_achievement(index: usize, value: impl Into<String>) -> Self {
        ProfileEdit::SetAchievement {
            index,
            value: value.into(),
        }
    }

    /// The field this edit touches.
    pub fn field(&self) -> ProfileField {
        match self {
            ProfileEdit::SetText { field, .. } => *field,
            ProfileEdit::SetAchievement { .. } | ProfileEdit::RemoveAchievement { .. } => {
                ProfileField::Achievements
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProfileRecord {
        ProfileRecord {
            name: "Amina Ali".to_string(),
            tagline: "Dhakhtar".to_string(),
            category: "Caafimaadka (Health)".to_string(),
            summary: "Waxay aasaastay rug caafimaad.".to_string(),
            achievements: vec!["Founded a clinic".to_string(), "Published a paper".to_string()],
            quote: "Caafimaadku waa hanti.".to_string(),
            source_attestation: "Warbixin dadweyne".to_string(),
        }
    }

    #[test]
    fn serializes_with_wire_keys() {
        let json = serde_json::to_value(sample()).unwrap();
        let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        for field in ProfileField::all() {
            assert!(keys.contains(&field.wire_key().to_string()), "missing {}", field);
        }
        assert_eq!(keys.len(), 7);
    }

    #[test]
    fn deserializes_english_aliases() {
        let json = r#"{"name":"A","tagline":"t","category":"Arts","summary":"s",
            "achievements":[],"quote":"q","sourceAttestation":"p"}"#;
        let record: ProfileRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.name, "A");
        assert_eq!(record.source_attestation, "p");
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{"magaca":"A","tagline":"t","sooyaal":"s","guulaha":[],"xigasho":"q","socialProof":"p"}"#;
        let err = serde_json::from_str::<ProfileRecord>(json).unwrap_err();
        assert!(err.to_string().contains("category"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["age"] = serde_json::json!(40);
        assert!(serde_json::from_value::<ProfileRecord>(json).is_err());
    }

    #[test]
    fn non_string_achievement_is_rejected() {
        let mut json = serde_json::to_value(sample()).unwrap();
        json["guulaha"] = serde_json::json!(["ok", 3]);
        assert!(serde_json::from_value::<ProfileRecord>(json).is_err());
    }

    #[test]
    fn into_canonical_normalizes_category() {
        let mut record = sample();
        record.category = "health".to_string();
        let record = record.into_canonical().unwrap();
        assert_eq!(record.category, "Caafimaadka (Health)");
        assert_eq!(record.category_kind(), Some(Category::Health));
    }

    #[test]
    fn into_canonical_rejects_blank_name_and_unknown_category() {
        let mut blank = sample();
        blank.name = "  ".to_string();
        assert!(matches!(
            blank.into_canonical(),
            Err(ValidationError::EmptyField { .. })
        ));

        let mut unknown = sample();
        unknown.category = "Astronomy".to_string();
        assert!(matches!(
            unknown.into_canonical(),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn slugify_lowercases_and_collapses_whitespace() {
        assert_eq!(slugify("Ali Xasan"), "ali-xasan");
        assert_eq!(slugify("  Amina   H.\tAli "), "amina-h.-ali");
        assert_eq!(slugify("   "), "profile");
    }

    #[test]
    fn set_text_replaces_scalar_fields() {
        let mut record = sample();
        record.apply(&ProfileEdit::set(ProfileField::Name, "Amina H. Ali")).unwrap();
        record.apply(&ProfileEdit::set(ProfileField::Quote, "New quote")).unwrap();
        assert_eq!(record.name, "Amina H. Ali");
        assert_eq!(record.text(ProfileField::Quote), Some("New quote"));
    }

    #[test]
    fn blank_name_edit_is_rejected_without_change() {
        let mut record = sample();
        let result = record.apply(&ProfileEdit::set(ProfileField::Name, " "));
        assert!(result.is_err());
        assert_eq!(record, sample());
    }

    #[test]
    fn category_edit_must_be_in_closed_set() {
        let mut record = sample();
        record.apply(&ProfileEdit::set(ProfileField::Category, "sports")).unwrap();
        assert_eq!(record.category, "Ciyaaraha (Sports)");
        assert!(record
            .apply(&ProfileEdit::set(ProfileField::Category, "Cooking"))
            .is_err());
    }

    #[test]
    fn achievements_edit_by_index() {
        let mut record = sample();
        record.apply(&ProfileEdit::set_achievement(1, "Published two papers")).unwrap();
        record.apply(&ProfileEdit::set_achievement(2, "Trained nurses")).unwrap();
        assert_eq!(
            record.achievements,
            vec!["Founded a clinic", "Published two papers", "Trained nurses"]
        );

        record.apply(&ProfileEdit::RemoveAchievement { index: 0 }).unwrap();
        assert_eq!(record.achievements.len(), 2);
        assert_eq!(record.achievements[0], "Published two papers");
    }

    #[test]
    fn achievements_out_of_range_is_rejected() {
        let mut record = sample();
        assert!(matches!(
            record.apply(&ProfileEdit::set_achievement(5, "x")),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(record.apply(&ProfileEdit::RemoveAchievement { index: 2 }).is_err());
        assert!(record
            .apply(&ProfileEdit::set(ProfileField::Achievements, "x"))
            .is_err());
    }

    #[test]
    fn profile_edit_deserializes_from_tagged_json() {
        let edit: ProfileEdit =
            serde_json::from_str(r#"{"op":"set_text","field":"name","value":"X"}"#).unwrap();
        assert_eq!(edit, ProfileEdit::set(ProfileField::Name, "X"));
        assert_eq!(edit.field(), ProfileField::Name);

        let edit: ProfileEdit =
            serde_json::from_str(r#"{"op":"remove_achievement","index":0}"#).unwrap();
        assert_eq!(edit.field(), ProfileField::Achievements);
    }

    #[test]
    fn profile_field_parses_url_and_wire_names() {
        assert_eq!("summary".parse::<ProfileField>().unwrap(), ProfileField::Summary);
        assert_eq!("sooyaal".parse::<ProfileField>().unwrap(), ProfileField::Summary);
        assert!("age".parse::<ProfileField>().is_err());
    }
}
