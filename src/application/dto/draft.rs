//! Draft DTO - Loosely typed model output and the coercions applied to it
//!
//! The model draft is never deserialized straight into domain structs. It is
//! held as a JSON object and every field is pulled out, whitelisted and
//! coerced one at a time so a malformed field degrades instead of failing.

use serde_json::Value;
use tracing::warn;

use crate::domain::entities::JsonObject;
use crate::domain::value_objects::field_sets::RECORD_FIELDS;
use crate::domain::value_objects::{normalize_chance, parse_chance};

/// Untrusted record draft returned by the model for one title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draft {
    fields: JsonObject,
}

impl Draft {
    /// Wrap any JSON value; anything but an object becomes an empty draft
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            other => {
                warn!(kind = json_kind(&other), "Draft is not a JSON object, using empty draft");
                Self::default()
            }
        }
    }

    /// Parse model output text
    pub fn parse(content: &str) -> Self {
        match serde_json::from_str::<Value>(content) {
            Ok(value) => Self::from_value(value),
            Err(e) => {
                warn!(error = %e, "Draft is not valid JSON, using empty draft");
                Self::default()
            }
        }
    }

    /// Keep only the fixed top-level record keys
    pub fn whitelisted(self) -> Self {
        Self {
            fields: whitelist(&self.fields, RECORD_FIELDS),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Trimmed, non-empty string field
    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(non_empty_str)
    }

    /// Array field; anything else reads as empty
    pub fn list(&self, key: &str) -> &[Value] {
        as_list(self.get(key))
    }

    pub fn object(&self, key: &str) -> Option<&JsonObject> {
        self.get(key).and_then(Value::as_object)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Copy of `object` restricted to `keys`
pub fn whitelist(object: &JsonObject, keys: &[&str]) -> JsonObject {
    object
        .iter()
        .filter(|(key, _)| keys.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

pub fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}

pub fn as_list(value: Option<&Value>) -> &[Value] {
    match value {
        Some(Value::Array(items)) => items.as_slice(),
        _ => &[],
    }
}

/// Number, or a string holding one (`"12"`, `" +3.5 "`)
pub fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_start_matches('+').parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

/// Non-negative whole number, e.g. a pixel size
pub fn coerce_u32(value: &Value) -> Option<u32> {
    let number = coerce_number(value)?;
    (number >= 0.0 && number.fract() == 0.0 && number <= f64::from(u32::MAX)).then_some(number as u32)
}

/// Probability from a fraction, a percentage number or a `"75%"` string
pub fn coerce_chance(value: &Value) -> Option<f64> {
    match value {
        Value::String(s) => parse_chance(s),
        other => coerce_number(other).and_then(normalize_chance),
    }
}

/// Whitelisted object keeping only scalar, non-null values
pub fn scalar_object(value: Option<&Value>, keys: &[&str]) -> Option<JsonObject> {
    let object = value?.as_object()?;
    let kept: JsonObject = whitelist(object, keys)
        .into_iter()
        .filter(|(_, v)| matches!(v, Value::String(_) | Value::Number(_) | Value::Bool(_)))
        .collect();
    (!kept.is_empty()).then_some(kept)
}

/// Non-empty strings from an array, deduplicated in first-seen order
pub fn string_list(value: Option<&Value>) -> Vec<String> {
    dedup_preserving_order(as_list(value).iter().filter_map(non_empty_str))
}

pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_non_object_draft_is_empty() {
        assert_eq!(Draft::parse("[1, 2]"), Draft::default());
        assert_eq!(Draft::parse("not json"), Draft::default());
        assert!(Draft::parse(r#"{"name": "x"}"#).text("name").is_some());
    }

    #[test]
    fn test_whitelisted_drops_unknown_keys() {
        let draft = Draft::from_value(json!({
            "name": "Boxers",
            "$schema": "https://json-schema.org/draft/2020-12/schema",
            "properties": {"name": {"type": "string"}}
        }))
        .whitelisted();
        let keys: Vec<&String> = draft.keys().collect();
        assert_eq!(keys, vec!["name"]);
    }

    #[test]
    fn test_list_of_scalar_is_empty() {
        let draft = Draft::from_value(json!({"tags": "loot", "aliases": null}));
        assert!(draft.list("tags").is_empty());
        assert!(draft.list("aliases").is_empty());
        assert!(draft.list("missing").is_empty());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(coerce_number(&json!(3)), Some(3.0));
        assert_eq!(coerce_number(&json!(" +2.5 ")), Some(2.5));
        assert_eq!(coerce_number(&json!("10%")), None);
        assert_eq!(coerce_number(&json!(true)), None);
        assert_eq!(coerce_u32(&json!(64.0)), Some(64));
        assert_eq!(coerce_u32(&json!(-1)), None);
    }

    #[test]
    fn test_coerce_chance() {
        assert_eq!(coerce_chance(&json!("75%")), Some(0.75));
        assert_eq!(coerce_chance(&json!(150)), Some(1.0));
        assert_eq!(coerce_chance(&json!(0.3)), Some(0.3));
        assert_eq!(coerce_chance(&json!(25)), Some(0.25));
        assert_eq!(coerce_chance(&json!("often")), None);
    }

    #[test]
    fn test_scalar_object() {
        let value = json!({"type": "action", "charges": 3, "nested": {"a": 1}, "notes": null, "extra": "x"});
        let kept = scalar_object(Some(&value), &["type", "charges", "nested", "notes"]).unwrap();
        assert_eq!(kept.len(), 2);
        assert!(scalar_object(Some(&json!("action")), &["type"]).is_none());
        assert!(scalar_object(Some(&json!({})), &["type"]).is_none());
    }

    #[test]
    fn test_string_list_dedups_in_order() {
        let value = json!(["Weapon", "Weapon", 7, " ", "Armor"]);
        assert_eq!(string_list(Some(&value)), vec!["Weapon", "Armor"]);
    }
}
