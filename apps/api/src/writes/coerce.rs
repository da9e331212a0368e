//! Field readers for model-written records.
//!
//! The same logical field may arrive as a string, a number or a boolean, so
//! each reader accepts every shape and falls back to the type's empty value.

use chrono::NaiveDate;
use serde_json::Value;

use crate::writes::intent::Record;

fn present<'a>(record: &'a Record, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn string_field(record: &Record, key: &str) -> String {
    present(record, key).map(display).unwrap_or_default()
}

pub fn bool_field(record: &Record, key: &str) -> bool {
    match present(record, key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}

pub fn int_field(record: &Record, key: &str) -> i64 {
    match present(record, key) {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// A nullable foreign-key style id. Anything that is not a whole 64-bit integer is `None`.
pub fn id_field(record: &Record, key: &str) -> Option<i64> {
    match present(record, key)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A `YYYY-MM-DD` date.
pub fn date_field(record: &Record, key: &str) -> Option<NaiveDate> {
    let raw = string_field(record, key);
    if raw.trim().is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()
}

pub fn string_list_field(record: &Record, key: &str) -> Vec<String> {
    match present(record, key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(display)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn decoded(text: &str) -> Record {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_string_field_shapes() {
        let rec = decoded(r#"{"title":"Engineer","n":42,"big":12345678901234567890,"flag":true,"none":null}"#);
        assert_eq!(string_field(&rec, "title"), "Engineer");
        assert_eq!(string_field(&rec, "n"), "42");
        assert_eq!(string_field(&rec, "big"), "12345678901234567890");
        assert_eq!(string_field(&rec, "flag"), "true");
        assert_eq!(string_field(&rec, "none"), "");
        assert_eq!(string_field(&rec, "missing"), "");
    }

    #[test]
    fn test_bool_field_shapes() {
        let rec = record(json!({
            "a": true, "b": "TRUE", "c": "yes", "d": 1, "e": 0, "f": null, "g": [true]
        }));
        assert!(bool_field(&rec, "a"));
        assert!(bool_field(&rec, "b"));
        assert!(!bool_field(&rec, "c"));
        assert!(bool_field(&rec, "d"));
        assert!(!bool_field(&rec, "e"));
        assert!(!bool_field(&rec, "f"));
        assert!(!bool_field(&rec, "g"));
        assert!(!bool_field(&rec, "missing"));
    }

    #[test]
    fn test_int_field_shapes() {
        let rec = decoded(r#"{"a":42,"b":"17","c":"abc","d":3.9,"e":null,"f":false}"#);
        assert_eq!(int_field(&rec, "a"), 42);
        assert_eq!(int_field(&rec, "b"), 17);
        assert_eq!(int_field(&rec, "c"), 0);
        assert_eq!(int_field(&rec, "d"), 3);
        assert_eq!(int_field(&rec, "e"), 0);
        assert_eq!(int_field(&rec, "f"), 0);
        assert_eq!(int_field(&rec, "missing"), 0);
    }

    #[test]
    fn test_id_field_shapes() {
        let rec = decoded(r#"{"a":7,"b":"9007199254740993","c":"x","d":null,"e":1.5}"#);
        assert_eq!(id_field(&rec, "a"), Some(7));
        assert_eq!(id_field(&rec, "b"), Some(9007199254740993));
        assert_eq!(id_field(&rec, "c"), None);
        assert_eq!(id_field(&rec, "d"), None);
        assert_eq!(id_field(&rec, "e"), None);
        assert_eq!(id_field(&rec, "missing"), None);
    }

    #[test]
    fn test_date_field_is_strict() {
        let rec = record(json!({
            "ok": "2025-12-01", "blank": "  ", "bad": "12/01/2025", "time": "2025-12-01T10:00:00Z"
        }));
        assert_eq!(
            date_field(&rec, "ok"),
            NaiveDate::from_ymd_opt(2025, 12, 1)
        );
        assert_eq!(date_field(&rec, "blank"), None);
        assert_eq!(date_field(&rec, "bad"), None);
        assert_eq!(date_field(&rec, "time"), None);
        assert_eq!(date_field(&rec, "missing"), None);
    }

    #[test]
    fn test_string_list_field_shapes() {
        let rec = record(json!({
            "stack": ["rust", null, 3, true], "single": "rust", "none": null
        }));
        assert_eq!(string_list_field(&rec, "stack"), vec!["rust", "3", "true"]);
        assert!(string_list_field(&rec, "single").is_empty());
        assert!(string_list_field(&rec, "none").is_empty());
        assert!(string_list_field(&rec, "missing").is_empty());
    }
}
