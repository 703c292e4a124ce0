//! Type predicates and coercion of textual input
//!
//! Textual input for a non-string field is trimmed, then converted:
//! - number / timestamp: parsed as a number
//! - boolean: "true" / "false", case-insensitive
//! - array: comma separated list of trimmed items
//!
//! Only those conversions are written back to the record. Other tags see the
//! trimmed text for the type check alone.

use regex::Regex;
use serde_json::{Number, Value};
use url::Url;

use super::types::FieldType;

/// Result of coercing a value toward a declared type
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Value is checked as supplied
    Unchanged,
    /// Trimmed text used for the check only
    Trimmed(Value),
    /// Converted value that replaces the record field
    Converted(Value),
    /// Text could not be converted
    Failed,
}

/// Coerces `value` toward `field_type`.
pub fn coerce(field_type: &FieldType, value: &Value) -> Coerced {
    let text = match value {
        Value::String(s) if *field_type != FieldType::String => s.trim(),
        _ => return Coerced::Unchanged,
    };

    match field_type {
        FieldType::Number | FieldType::Timestamp => match parse_number(text) {
            Some(number) => Coerced::Converted(Value::Number(number)),
            None => Coerced::Failed,
        },
        FieldType::Boolean => {
            if text.eq_ignore_ascii_case("true") {
                Coerced::Converted(Value::Bool(true))
            } else if text.eq_ignore_ascii_case("false") {
                Coerced::Converted(Value::Bool(false))
            } else {
                Coerced::Failed
            }
        }
        FieldType::Array => Coerced::Converted(split_list(text)),
        _ => Coerced::Trimmed(Value::String(text.to_string())),
    }
}

/// Checks `value` against the predicate for `field_type`.
pub fn is_valid_type(field_type: &FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::Id => value.is_string(),
        FieldType::Timestamp => value.is_number(),
        FieldType::Url => value.as_str().map_or(false, |s| parse_url(s).is_some()),
        FieldType::Array => is_sequential_container(value),
        FieldType::Table => value.is_object(),
        FieldType::String => value.is_string(),
        FieldType::Number => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Custom(tag) => value_kind(value) == tag,
    }
}

/// Whether `value` is a gap-free sequence.
///
/// JSON arrays cannot hold holes, so every array qualifies.
pub fn is_sequential_container(value: &Value) -> bool {
    value.is_array()
}

/// Parses an absolute URL with a non-empty scheme, host and path.
///
/// The parser fills in `/` for hierarchical URLs written without a path,
/// so a bare `/` path only counts when the text spells it out.
pub fn parse_url(text: &str) -> Option<Url> {
    let url = Url::parse(text).ok()?;
    let has_host = url.host_str().map_or(false, |h| !h.is_empty());
    if url.scheme().is_empty() || !has_host || url.path().is_empty() {
        return None;
    }
    if url.path() == "/" && !has_explicit_path(text.trim()) {
        return None;
    }
    Some(url)
}

fn has_explicit_path(text: &str) -> bool {
    let rest = text.split_once("://").map_or(text, |(_, rest)| rest);
    rest.find(|c| matches!(c, '/' | '?' | '#'))
        .map_or(false, |i| rest[i..].starts_with('/'))
}

/// Matches the text form of `value` against `pattern`.
///
/// Strings match as-is, numbers and booleans through their JSON text.
/// Arrays, objects and null never match.
pub fn pattern_match(value: &Value, pattern: &Regex) -> bool {
    match value {
        Value::String(s) => pattern.is_match(s),
        Value::Number(n) => pattern.is_match(&n.to_string()),
        Value::Bool(b) => pattern.is_match(if *b { "true" } else { "false" }),
        _ => false,
    }
}

/// Returns the native kind name of a value
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "nil",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "table",
    }
}

/// Integers stay integral; anything else must be a finite float.
fn parse_number(text: &str) -> Option<Number> {
    if let Ok(n) = text.parse::<i64>() {
        return Some(Number::from(n));
    }
    if let Ok(n) = text.parse::<u64>() {
        return Some(Number::from(n));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

fn split_list(text: &str) -> Value {
    if text.is_empty() {
        return Value::Array(Vec::new());
    }
    Value::Array(
        text.split(',')
            .map(|item| Value::String(item.trim().to_string()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_coercion() {
        assert_eq!(
            coerce(&FieldType::Number, &json!(" 42 ")),
            Coerced::Converted(json!(42))
        );
        assert_eq!(
            coerce(&FieldType::Timestamp, &json!("1.5")),
            Coerced::Converted(json!(1.5))
        );
        assert_eq!(coerce(&FieldType::Number, &json!("abc")), Coerced::Failed);
        assert_eq!(coerce(&FieldType::Number, &json!("NaN")), Coerced::Failed);
    }

    #[test]
    fn test_boolean_coercion() {
        assert_eq!(
            coerce(&FieldType::Boolean, &json!("TRUE")),
            Coerced::Converted(json!(true))
        );
        assert_eq!(
            coerce(&FieldType::Boolean, &json!(" false")),
            Coerced::Converted(json!(false))
        );
        assert_eq!(coerce(&FieldType::Boolean, &json!("yes")), Coerced::Failed);
    }

    #[test]
    fn test_array_coercion() {
        assert_eq!(
            coerce(&FieldType::Array, &json!("a, b ,c")),
            Coerced::Converted(json!(["a", "b", "c"]))
        );
        assert_eq!(
            coerce(&FieldType::Array, &json!("   ")),
            Coerced::Converted(json!([]))
        );
    }

    #[test]
    fn test_string_and_non_text_untouched() {
        assert_eq!(coerce(&FieldType::String, &json!("  x  ")), Coerced::Unchanged);
        assert_eq!(coerce(&FieldType::Number, &json!(7)), Coerced::Unchanged);
        assert_eq!(
            coerce(&FieldType::Id, &json!(" abc ")),
            Coerced::Trimmed(json!("abc"))
        );
    }

    #[test]
    fn test_type_predicates() {
        assert!(is_valid_type(&FieldType::Id, &json!("abc")));
        assert!(!is_valid_type(&FieldType::Id, &json!(1)));
        assert!(is_valid_type(&FieldType::Timestamp, &json!(1700000000)));
        assert!(is_valid_type(&FieldType::Table, &json!({"a": 1})));
        assert!(!is_valid_type(&FieldType::Table, &json!([1])));
        assert!(is_valid_type(&FieldType::Array, &json!([])));
        assert!(is_valid_type(&FieldType::Boolean, &json!(false)));
    }

    #[test]
    fn test_url_predicate() {
        assert!(is_valid_type(&FieldType::Url, &json!("https://example.com/a")));
        assert!(!is_valid_type(&FieldType::Url, &json!("example.com")));
        assert!(!is_valid_type(&FieldType::Url, &json!("mailto:someone@example.com")));
        assert!(parse_url("http://localhost:8080/").is_some());
    }

    #[test]
    fn test_url_requires_written_path() {
        assert!(parse_url("https://example.com").is_none());
        assert!(parse_url("https://example.com?q=1").is_none());
        assert!(parse_url("https://example.com/").is_some());
        assert!(parse_url("https://example.com/?q=1").is_some());
        assert!(!is_valid_type(&FieldType::Url, &json!("http://localhost:8080")));
    }

    #[test]
    fn test_pattern_match_text_forms() {
        let digits = Regex::new("^[0-9]+$").unwrap();
        assert!(pattern_match(&json!("123"), &digits));
        assert!(pattern_match(&json!(123), &digits));
        assert!(!pattern_match(&json!("12a"), &digits));
        assert!(!pattern_match(&json!([1]), &digits));
    }
}
