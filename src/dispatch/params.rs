// src/dispatch/params.rs
//! Untyped request parameters.

use std::collections::HashMap;

use serde_json::Value;

/// Flat parameter bag with case-insensitive keys and best-effort typed
/// getters. Reads never fail: a missing or unconvertible value shows up
/// as the zero value at the binding layer and validation reports it.
#[derive(Debug, Clone, Default)]
pub struct ParamBag {
    values: HashMap<String, Value>,
}

impl ParamBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bag from a JSON object; any other body reads as an empty bag.
    pub fn from_json(body: &Value) -> Self {
        let mut bag = Self::new();
        if let Some(object) = body.as_object() {
            for (key, value) in object {
                bag.insert(key, value.clone());
            }
        }
        bag
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_ascii_lowercase(), value);
    }

    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&key.to_ascii_lowercase())
    }

    /// String view of a parameter. Scalars render to text; nulls and
    /// structured values do not.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            Value::String(text) => Some(text.clone()),
            Value::Number(number) => Some(number.to_string()),
            Value::Bool(flag) => Some(flag.to_string()),
            _ => None,
        }
    }

    /// Boolean view of a parameter. Anything unrecognized reads as false.
    pub fn get_bool(&self, key: &str) -> bool {
        match self.get(key) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => {
                matches!(text.to_ascii_lowercase().as_str(), "true" | "1")
            }
            Some(Value::Number(number)) => number.as_f64().map(|n| n != 0.0).unwrap_or(false),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookups_ignore_key_case() {
        let bag = ParamBag::from_json(&json!({ "SourcePath": "/tmp/a" }));
        assert_eq!(bag.get_str("sourcepath").as_deref(), Some("/tmp/a"));
        assert_eq!(bag.get_str("SOURCEPATH").as_deref(), Some("/tmp/a"));
    }

    #[test]
    fn scalars_render_to_text() {
        let bag = ParamBag::from_json(&json!({ "port": 8700, "flag": true }));
        assert_eq!(bag.get_str("port").as_deref(), Some("8700"));
        assert_eq!(bag.get_str("flag").as_deref(), Some("true"));
    }

    #[test]
    fn structured_values_do_not_read_as_text() {
        let bag = ParamBag::from_json(&json!({ "nested": { "a": 1 }, "gone": null }));
        assert_eq!(bag.get_str("nested"), None);
        assert_eq!(bag.get_str("gone"), None);
    }

    #[test]
    fn boolean_reads_accept_the_common_spellings() {
        let bag = ParamBag::from_json(&json!({
            "a": true,
            "b": "True",
            "c": "1",
            "d": 1,
            "e": "yes",
            "f": 0,
        }));
        assert!(bag.get_bool("a"));
        assert!(bag.get_bool("b"));
        assert!(bag.get_bool("c"));
        assert!(bag.get_bool("d"));
        assert!(!bag.get_bool("e"));
        assert!(!bag.get_bool("f"));
        assert!(!bag.get_bool("missing"));
    }

    #[test]
    fn non_object_bodies_read_as_empty() {
        let bag = ParamBag::from_json(&json!(["not", "an", "object"]));
        assert_eq!(bag.get_str("action"), None);
    }
}
