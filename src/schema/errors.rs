//! Violation and error types for record validation
//!
//! Violation codes:
//! - FG_TYPE_MISMATCH (REJECT)
//! - FG_REQUIRED_FIELD_MISSING (REJECT)
//! - FG_IMMUTABLE_FIELD_MODIFIED (REJECT)
//! - FG_ENUM_VALUE_NOT_ALLOWED (REJECT)
//! - FG_PATTERN_MISMATCH (REJECT)
//! - FG_UNKNOWN_FIELD (REJECT)
//! - FG_SUB_SCHEMA_FIELD_REQUIRED (REJECT)
//! - FG_SUB_SCHEMA_UNRESOLVED (REJECT)
//! - FG_CUSTOM_VALIDATOR_FAILURE (REJECT)
//! - FG_NESTED_SELF_CHECK_FAILURE (REJECT)
//! - FG_FATAL_SELF_CHECK_FAILURE (FATAL)
//!
//! A fatal self-check never enters an `ErrorSet`. When a nested record's
//! self-check fails, the parent records it as `NestedSelfCheckFailure`.

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Severity levels for violations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Record rejected, all field problems are reported together
    Reject,
    /// Record-level invariant failed, caller must not proceed
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Kinds of violation a validation pass can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Value does not match (and cannot be coerced into) the declared type
    TypeMismatch,
    /// Required field absent or empty
    RequiredFieldMissing,
    /// Immutable field supplied in an update
    ImmutableFieldModified,
    /// Value outside the declared enumeration
    EnumValueNotAllowed,
    /// Value does not match the declared pattern
    PatternMismatch,
    /// Key not declared by the schema
    UnknownField,
    /// Required field of an absent nested record
    SubSchemaFieldRequired,
    /// Sub-schema resolver reported an error
    SubSchemaUnresolved,
    /// Custom field validator rejected the value
    CustomValidatorFailure,
    /// Self-check of a nested record failed
    NestedSelfCheckFailure,
    /// Record-level self-check rejected the record
    FatalSelfCheckFailure,
}

impl ViolationKind {
    /// Returns the stable string code
    pub fn code(&self) -> &'static str {
        match self {
            ViolationKind::TypeMismatch => "FG_TYPE_MISMATCH",
            ViolationKind::RequiredFieldMissing => "FG_REQUIRED_FIELD_MISSING",
            ViolationKind::ImmutableFieldModified => "FG_IMMUTABLE_FIELD_MODIFIED",
            ViolationKind::EnumValueNotAllowed => "FG_ENUM_VALUE_NOT_ALLOWED",
            ViolationKind::PatternMismatch => "FG_PATTERN_MISMATCH",
            ViolationKind::UnknownField => "FG_UNKNOWN_FIELD",
            ViolationKind::SubSchemaFieldRequired => "FG_SUB_SCHEMA_FIELD_REQUIRED",
            ViolationKind::SubSchemaUnresolved => "FG_SUB_SCHEMA_UNRESOLVED",
            ViolationKind::CustomValidatorFailure => "FG_CUSTOM_VALIDATOR_FAILURE",
            ViolationKind::NestedSelfCheckFailure => "FG_NESTED_SELF_CHECK_FAILURE",
            ViolationKind::FatalSelfCheckFailure => "FG_FATAL_SELF_CHECK_FAILURE",
        }
    }

    /// Returns the severity level for this kind
    pub fn severity(&self) -> Severity {
        match self {
            ViolationKind::FatalSelfCheckFailure => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single recorded problem with one field path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ViolationKind,
    pub message: String,
}

impl Violation {
    pub fn new(kind: ViolationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn type_mismatch(field: &str, type_name: &str) -> Self {
        Self::new(
            ViolationKind::TypeMismatch,
            format!("{} is not a {}", field, type_name),
        )
    }

    pub fn required(field: &str) -> Self {
        Self::new(
            ViolationKind::RequiredFieldMissing,
            format!("{} is required", field),
        )
    }

    pub fn immutable(field: &str) -> Self {
        Self::new(
            ViolationKind::ImmutableFieldModified,
            format!("{} cannot be updated", field),
        )
    }

    pub fn unknown_field(field: &str) -> Self {
        Self::new(
            ViolationKind::UnknownField,
            format!("{} is an unknown field", field),
        )
    }

    pub fn pattern_mismatch(field: &str) -> Self {
        Self::new(
            ViolationKind::PatternMismatch,
            format!("{} has an invalid value", field),
        )
    }

    pub fn not_allowed(field: &str, value: &str, allowed: &[String]) -> Self {
        Self::new(
            ViolationKind::EnumValueNotAllowed,
            format!(
                "'{}' is not a valid {}, expected one of '{}'",
                value,
                field,
                allowed.join("', '")
            ),
        )
    }

    pub fn sub_field_required(field: &str, sub_field: &str) -> Self {
        Self::new(
            ViolationKind::SubSchemaFieldRequired,
            format!("{}.{} is required", field, sub_field),
        )
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

/// Field path to violation mapping produced by one validation pass.
///
/// Paths of nested fields are dot-joined (`address.city`). Each path holds at
/// most one violation; a later insert for the same path replaces the earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSet {
    entries: BTreeMap<String, Violation>,
}

impl ErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a violation, replacing any existing one for the same path
    pub fn insert(&mut self, field: impl Into<String>, violation: Violation) {
        self.entries.insert(field.into(), violation);
    }

    /// Re-keys every entry of `child` as `<prefix>.<path>` and merges it in
    pub fn merge_prefixed(&mut self, prefix: &str, child: ErrorSet) {
        for (path, violation) in child.entries {
            self.entries.insert(format!("{}.{}", prefix, path), violation);
        }
    }

    pub fn contains(&self, field: &str) -> bool {
        self.entries.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&Violation> {
        self.entries.get(field)
    }

    /// Returns the message recorded for a path
    pub fn message(&self, field: &str) -> Option<&str> {
        self.entries.get(field).map(|v| v.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Violation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Renders the set as a `{"path": "message"}` JSON object
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl Serialize for ErrorSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (path, violation) in &self.entries {
            map.serialize_entry(path, &violation.message)?;
        }
        map.end()
    }
}

impl fmt::Display for ErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for violation in self.entries.values() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation.message)?;
            first = false;
        }
        Ok(())
    }
}

/// Records `violation` under `field`, creating the set on first use.
pub fn add_error(
    set: Option<ErrorSet>,
    field: impl Into<String>,
    violation: Violation,
) -> ErrorSet {
    let mut set = set.unwrap_or_default();
    set.insert(field, violation);
    set
}

/// Schema authoring errors
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Result type for schema authoring operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Failed validation in `Result` form
#[derive(Debug, Clone, Error)]
pub enum ValidationFailure {
    #[error("Record rejected: {0}")]
    Rejected(ErrorSet),

    #[error("Record check failed: {0}")]
    Fatal(String),
}

impl ValidationFailure {
    /// Returns the severity level
    pub fn severity(&self) -> Severity {
        match self {
            ValidationFailure::Rejected(_) => Severity::Reject,
            ValidationFailure::Fatal(_) => Severity::Fatal,
        }
    }

    /// Returns whether this is a fatal error
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_violation_codes() {
        assert_eq!(ViolationKind::TypeMismatch.code(), "FG_TYPE_MISMATCH");
        assert_eq!(ViolationKind::UnknownField.code(), "FG_UNKNOWN_FIELD");
        assert_eq!(
            ViolationKind::FatalSelfCheckFailure.code(),
            "FG_FATAL_SELF_CHECK_FAILURE"
        );
    }

    #[test]
    fn test_severity_levels() {
        assert_eq!(ViolationKind::RequiredFieldMissing.severity(), Severity::Reject);
        assert_eq!(ViolationKind::PatternMismatch.severity(), Severity::Reject);
        assert_eq!(ViolationKind::FatalSelfCheckFailure.severity(), Severity::Fatal);
    }

    #[test]
    fn test_nested_self_check_kind_rejects() {
        let kind = ViolationKind::NestedSelfCheckFailure;
        assert_eq!(kind.code(), "FG_NESTED_SELF_CHECK_FAILURE");
        assert_eq!(kind.severity(), Severity::Reject);
    }

    #[test]
    fn test_add_error_creates_set() {
        let set = add_error(None, "name", Violation::required("name"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.message("name"), Some("name is required"));
    }

    #[test]
    fn test_last_writer_wins() {
        let set = add_error(None, "age", Violation::type_mismatch("age", "number"));
        let set = add_error(Some(set), "age", Violation::pattern_mismatch("age"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("age").unwrap().kind, ViolationKind::PatternMismatch);
    }

    #[test]
    fn test_merge_prefixed() {
        let mut child = ErrorSet::new();
        child.insert("city", Violation::required("city"));

        let mut parent = ErrorSet::new();
        parent.merge_prefixed("address", child);

        assert!(parent.contains("address.city"));
        assert!(!parent.contains("city"));
    }

    #[test]
    fn test_error_set_json() {
        let mut set = ErrorSet::new();
        set.insert("b", Violation::required("b"));
        set.insert("a", Violation::unknown_field("a"));

        let json = set.to_json();
        assert_eq!(json["a"], "a is an unknown field");
        assert_eq!(json["b"], "b is required");
    }

    #[test]
    fn test_failure_fatality() {
        assert!(ValidationFailure::Fatal("stop".into()).is_fatal());
        assert!(!ValidationFailure::Rejected(ErrorSet::new()).is_fatal());
    }
}
