//! Schema type definitions
//!
//! Recognized type tags:
//! - id: textual identifier
//! - table: nested record (JSON object)
//! - array: sequence
//! - string, number, boolean
//! - url: absolute URL with scheme, host and path
//! - timestamp: numeric time value
//!
//! Any other tag is kept as `Custom` and never fails the type check.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::errors::{SchemaError, SchemaResult};

/// A record under validation
pub type Record = Map<String, Value>;

/// Opaque caller state handed to self-checks
pub type ExternalContext = dyn Any + Send + Sync;

/// Produces a default value from the record being validated
pub type DefaultGenerator = Arc<dyn Fn(&Record) -> Value + Send + Sync>;

/// Resolves a sub-schema from the enclosing record
pub type SubSchemaResolver = Arc<dyn Fn(&Record) -> Result<Option<Schema>, String> + Send + Sync>;

/// Field-level check: `(value, record, field_name)`
pub type CustomValidator = Arc<dyn Fn(Option<&Value>, &Record, &str) -> CustomCheck + Send + Sync>;

/// Record-level check: `(schema, record, context, is_update)`
pub type SelfCheck =
    Arc<dyn Fn(&Schema, &Record, Option<&ExternalContext>, bool) -> Result<(), String> + Send + Sync>;

/// Field type tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Id,
    Table,
    Array,
    String,
    Number,
    Boolean,
    Url,
    Timestamp,
    /// Unrecognized tag, exempt from type checking
    Custom(String),
}

impl FieldType {
    /// Parses a tag; unknown tags become `Custom`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "id" => FieldType::Id,
            "table" => FieldType::Table,
            "array" => FieldType::Array,
            "string" => FieldType::String,
            "number" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "url" => FieldType::Url,
            "timestamp" => FieldType::Timestamp,
            other => FieldType::Custom(other.to_string()),
        }
    }

    /// Returns the type name for error messages
    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Id => "id",
            FieldType::Table => "table",
            FieldType::Array => "array",
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Url => "url",
            FieldType::Timestamp => "timestamp",
            FieldType::Custom(tag) => tag,
        }
    }

    /// Whether type check failures for this tag are reported
    pub fn is_recognized(&self) -> bool {
        !matches!(self, FieldType::Custom(_))
    }
}

impl From<String> for FieldType {
    fn from(tag: String) -> Self {
        FieldType::from_tag(&tag)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.type_name().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Value assigned to an absent field when creating a record
#[derive(Clone)]
pub enum DefaultValue {
    Literal(Value),
    Generator(DefaultGenerator),
}

impl DefaultValue {
    /// Produces the default for `record`
    pub fn produce(&self, record: &Record) -> Value {
        match self {
            DefaultValue::Literal(value) => value.clone(),
            DefaultValue::Generator(generate) => generate(record),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            DefaultValue::Generator(_) => f.write_str("Generator(..)"),
        }
    }
}

/// Schema for the contents of a nested record
#[derive(Clone)]
pub enum SubSchema {
    Static(Box<Schema>),
    Resolver(SubSchemaResolver),
}

impl SubSchema {
    /// Resolves against the enclosing record
    pub fn resolve(&self, record: &Record) -> Result<Option<Schema>, String> {
        match self {
            SubSchema::Static(schema) => Ok(Some(schema.as_ref().clone())),
            SubSchema::Resolver(resolve) => resolve(record),
        }
    }
}

impl fmt::Debug for SubSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubSchema::Static(schema) => f.debug_tuple("Static").field(schema).finish(),
            SubSchema::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

/// Outcome of a custom field validator
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomCheck {
    pub ok: bool,
    pub message: Option<String>,
    /// Fields merged into the record whatever the outcome
    pub extra_fields: Option<Record>,
}

impl CustomCheck {
    pub fn pass() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: Some(message.into()),
            extra_fields: None,
        }
    }

    /// Fails with the generic "<field> is invalid" message
    pub fn reject() -> Self {
        Self::default()
    }

    pub fn with_fields(mut self, fields: Record) -> Self {
        self.extra_fields = Some(fields);
        self
    }
}

/// Field definition
#[derive(Clone, Default)]
pub struct FieldDescriptor {
    pub field_type: Option<FieldType>,
    pub default: Option<DefaultValue>,
    pub required: bool,
    pub immutable: bool,
    /// Allowed post-coercion values
    pub allowed: Option<Vec<Value>>,
    pub pattern: Option<Regex>,
    pub sub_schema: Option<SubSchema>,
    /// Value is replaced by the insert-value callback on create
    pub insert_value: bool,
    pub validator: Option<CustomValidator>,
}

impl FieldDescriptor {
    /// Create an optional field of the given type
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type: Some(field_type),
            ..Self::default()
        }
    }

    /// Create a field without a type constraint
    pub fn untyped() -> Self {
        Self::default()
    }

    /// Create a required string field
    pub fn required_string() -> Self {
        Self::new(FieldType::String).required()
    }

    /// Create an optional string field
    pub fn optional_string() -> Self {
        Self::new(FieldType::String)
    }

    /// Create a required number field
    pub fn required_number() -> Self {
        Self::new(FieldType::Number).required()
    }

    /// Create an optional number field
    pub fn optional_number() -> Self {
        Self::new(FieldType::Number)
    }

    /// Create a required boolean field
    pub fn required_boolean() -> Self {
        Self::new(FieldType::Boolean).required()
    }

    /// Create a nested record field validated by `schema`
    pub fn table(schema: Schema) -> Self {
        Self::new(FieldType::Table).sub_schema(schema)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(DefaultValue::Literal(value));
        self
    }

    pub fn default_with<F>(mut self, generate: F) -> Self
    where
        F: Fn(&Record) -> Value + Send + Sync + 'static,
    {
        self.default = Some(DefaultValue::Generator(Arc::new(generate)));
        self
    }

    /// Restrict the value to one of `values`
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Compile and attach a pattern
    pub fn try_pattern(self, pattern: &str) -> SchemaResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.pattern(regex))
    }

    pub fn sub_schema(mut self, schema: Schema) -> Self {
        self.sub_schema = Some(SubSchema::Static(Box::new(schema)));
        self
    }

    pub fn resolve_sub_schema<F>(mut self, resolve: F) -> Self
    where
        F: Fn(&Record) -> Result<Option<Schema>, String> + Send + Sync + 'static,
    {
        self.sub_schema = Some(SubSchema::Resolver(Arc::new(resolve)));
        self
    }

    pub fn insert_value(mut self) -> Self {
        self.insert_value = true;
        self
    }

    pub fn validator<F>(mut self, check: F) -> Self
    where
        F: Fn(Option<&Value>, &Record, &str) -> CustomCheck + Send + Sync + 'static,
    {
        self.validator = Some(Arc::new(check));
        self
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("field_type", &self.field_type)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("immutable", &self.immutable)
            .field("allowed", &self.allowed)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("sub_schema", &self.sub_schema)
            .field("insert_value", &self.insert_value)
            .field("validator", &self.validator.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Complete schema definition
#[derive(Clone, Default)]
pub struct Schema {
    /// Field definitions
    pub fields: HashMap<String, FieldDescriptor>,
    /// Record-level check, run only when every field passed
    pub self_check: Option<SelfCheck>,
}

impl Schema {
    /// Create a new schema
    pub fn new(fields: HashMap<String, FieldDescriptor>) -> Self {
        Self {
            fields,
            self_check: None,
        }
    }

    /// Add or replace a field
    pub fn field(mut self, name: impl Into<String>, descriptor: FieldDescriptor) -> Self {
        self.fields.insert(name.into(), descriptor);
        self
    }

    pub fn with_self_check<F>(mut self, check: F) -> Self
    where
        F: Fn(&Schema, &Record, Option<&ExternalContext>, bool) -> Result<(), String>
            + Send
            + Sync
            + 'static,
    {
        self.self_check = Some(Arc::new(check));
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Whether any field carries a default
    pub fn has_defaults(&self) -> bool {
        self.fields.values().any(|d| d.default.is_some())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("fields", &self.fields)
            .field("self_check", &self.self_check.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_type_tags() {
        for tag in ["id", "table", "array", "string", "number", "boolean", "url", "timestamp"] {
            let parsed = FieldType::from_tag(tag);
            assert!(parsed.is_recognized());
            assert_eq!(parsed.type_name(), tag);
        }
    }

    #[test]
    fn test_custom_tag_not_recognized() {
        let parsed = FieldType::from_tag("money");
        assert_eq!(parsed, FieldType::Custom("money".into()));
        assert!(!parsed.is_recognized());
        assert_eq!(parsed.to_string(), "money");
    }

    #[test]
    fn test_field_type_serde() {
        let parsed: FieldType = serde_json::from_value(json!("timestamp")).unwrap();
        assert_eq!(parsed, FieldType::Timestamp);
        assert_eq!(serde_json::to_value(FieldType::Url).unwrap(), json!("url"));
    }

    #[test]
    fn test_default_generator_sees_record() {
        let descriptor = FieldDescriptor::optional_string()
            .default_with(|record| json!(format!("{}-slug", record["name"].as_str().unwrap_or(""))));

        let mut record = Record::new();
        record.insert("name".into(), json!("post"));

        let produced = descriptor.default.as_ref().unwrap().produce(&record);
        assert_eq!(produced, json!("post-slug"));
    }

    #[test]
    fn test_try_pattern_rejects_bad_regex() {
        let result = FieldDescriptor::optional_string().try_pattern("([a-z");
        assert!(matches!(result, Err(SchemaError::InvalidPattern { .. })));
    }

    #[test]
    fn test_schema_builder() {
        let address = Schema::default().field("city", FieldDescriptor::required_string());
        let schema = Schema::default()
            .field("name", FieldDescriptor::required_string())
            .field("address", FieldDescriptor::table(address));

        assert!(schema.contains("name"));
        assert!(schema.get("address").unwrap().sub_schema.is_some());
        assert!(!schema.has_defaults());
    }
}
