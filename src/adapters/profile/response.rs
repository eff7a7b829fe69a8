//! Shared prompt schema and response parsing for the profile adapters.

use once_cell::sync::Lazy;
use serde_json::{json, Value};

use crate::domain::profile::{Category, ProfileRecord};

/// Schema for a record read from a photo. The category must be one of the
/// canonical labels.
pub static INFERENCE_SCHEMA: Lazy<Value> = Lazy::new(|| {
    record_schema(json!({
        "type": "string",
        "description": "Qaybta uu ka tirsan yahay Somalipin",
        "enum": Category::labels(),
    }))
});

/// Schema for a translated record. Category text is translated freely.
pub static TRANSLATION_SCHEMA: Lazy<Value> = Lazy::new(|| record_schema(json!({"type": "string"})));

fn record_schema(category: Value) -> Value {
    json!({
        "type": "object",
        "properties": {
            "magaca": {"type": "string", "description": "Magaca buuxa ee qofka"},
            "tagline": {"type": "string", "description": "Cinwaanka shaqada ama waxa uu caan ku yahay"},
            "category": category,
            "sooyaal": {"type": "string", "description": "2-3 jumladood oo kooban oo ku saabsan qofka"},
            "guulaha": {
                "type": "array",
                "items": {"type": "string"},
                "description": "Liiska guulaha muhiimka ah"
            },
            "xigasho": {"type": "string", "description": "Hal xigasho oo dhiirigelin ah"},
            "socialProof": {"type": "string", "description": "Xaqiijinta halka xogta laga keenay"}
        },
        "required": ["magaca", "tagline", "category", "sooyaal", "guulaha", "xigasho", "socialProof"],
        "additionalProperties": false
    })
}

/// Removes a surrounding Markdown code fence, with or without a language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line.
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Parses a model response into a record, without applying record rules.
pub fn parse_record(text: &str) -> Result<ProfileRecord, String> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Err("empty response".to_string());
    }
    serde_json::from_str(body).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{"magaca":"Ali Xasan","tagline":"Ganacsade","category":"Ganacsiga (Business)",
        "sooyaal":"Wuxuu aasaasay shirkad.","guulaha":["Shirkad"],"xigasho":"Shaqo adag.",
        "socialProof":"Warbixin"}"#;

    #[test]
    fn strips_json_fence() {
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fence("  {}  "), "{}");
    }

    #[test]
    fn unterminated_fence_is_left_alone() {
        assert_eq!(strip_code_fence("```json\n{}"), "```json\n{}");
    }

    #[test]
    fn parses_fenced_record() {
        let record = parse_record(&format!("```json\n{}\n```", RECORD)).unwrap();
        assert_eq!(record.name, "Ali Xasan");
        assert_eq!(record.achievements, vec!["Shirkad"]);
    }

    #[test]
    fn reports_missing_field() {
        let err = parse_record(r#"{"magaca":"A"}"#).unwrap_err();
        assert!(err.contains("missing field"));
    }

    #[test]
    fn empty_body_is_an_error() {
        assert_eq!(parse_record("``` ```").unwrap_err(), "empty response");
    }

    #[test]
    fn inference_schema_lists_categories_and_requires_all_keys() {
        let schema = &*INFERENCE_SCHEMA;
        assert_eq!(schema["properties"]["category"]["enum"].as_array().unwrap().len(), 8);
        assert_eq!(schema["required"].as_array().unwrap().len(), 7);
        assert_eq!(schema["additionalProperties"], false);
        assert!(TRANSLATION_SCHEMA["properties"]["category"].get("enum").is_none());
    }
}
