//! Defensive access into loosely-typed JSON responses.
//!
//! Annotation services omit keys freely and sometimes return an object
//! where a list is documented. Every accessor here yields `None` instead of
//! failing, so callers can fall back to a named default.

use serde_json::Value;

/// Follow a chain of object keys
pub fn path<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().try_fold(value, |current, key| current.get(*key))
}

/// First element of a list. A bare object is treated as a one-element list.
pub fn first(value: &Value) -> Option<&Value> {
    match value {
        Value::Array(items) => items.first(),
        Value::Object(_) => Some(value),
        _ => None,
    }
}

/// Render a scalar as display text; empty strings, nulls and containers
/// yield `None`
pub fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text of a value that may be a scalar or a list of scalars, taking the
/// first usable entry
pub fn first_text(value: &Value) -> Option<String> {
    match value {
        Value::Array(items) => items.iter().find_map(text),
        other => text(other),
    }
}

pub fn text_at(value: &Value, keys: &[&str]) -> Option<String> {
    path(value, keys).and_then(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path() {
        let doc = json!({"gene": {"symbol": "BRCA1"}});
        assert_eq!(text_at(&doc, &["gene", "symbol"]), Some("BRCA1".to_string()));
        assert_eq!(text_at(&doc, &["gene", "id"]), None);
        assert_eq!(text_at(&doc, &["clinvar", "rcv"]), None);
    }

    #[test]
    fn test_first() {
        assert_eq!(first(&json!([1, 2])), Some(&json!(1)));
        assert_eq!(first(&json!({"a": 1})), Some(&json!({"a": 1})));
        assert_eq!(first(&json!([])), None);
        assert_eq!(first(&json!("x")), None);
    }

    #[test]
    fn test_text() {
        assert_eq!(text(&json!("Pathogenic")), Some("Pathogenic".to_string()));
        assert_eq!(text(&json!(672)), Some("672".to_string()));
        assert_eq!(text(&json!("")), None);
        assert_eq!(text(&json!(null)), None);
        assert_eq!(text(&json!({"name": "x"})), None);
        assert_eq!(first_text(&json!(["", "benign"])), Some("benign".to_string()));
    }
}
