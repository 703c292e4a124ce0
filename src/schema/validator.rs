//! Record validation engine
//!
//! One pass over a record:
//! 1. Defaults and insert values (create mode only)
//! 2. Per-field checks: immutability, type and coercion, enum, pattern,
//!    sub-schema recursion, required, custom validator
//! 3. Unknown-field scan
//! 4. Record-level self-check, only when no field failed
//!
//! The record is modified in place: defaults, coerced values, seeded nested
//! records and fields returned by custom validators all land in it. Callers
//! must not assume it is unchanged after a call.

use serde_json::{Map, Value};

use super::coercion::{coerce, is_valid_type, pattern_match, Coerced};
use super::errors::{ErrorSet, ValidationFailure, Violation, ViolationKind};
use super::options::ValidateOptions;
use super::types::{FieldDescriptor, FieldType, Record, Schema};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

/// Outcome of a validation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    /// Every check passed
    Valid,
    /// One or more field violations, all reported
    Invalid(ErrorSet),
    /// Self-check failed; field checks had all passed
    Fatal(String),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid)
    }

    /// Field violations, if the record was rejected
    pub fn errors(&self) -> Option<&ErrorSet> {
        match self {
            Validation::Invalid(errors) => Some(errors),
            _ => None,
        }
    }

    /// Self-check message, if the record failed it
    pub fn fatal_error(&self) -> Option<&str> {
        match self {
            Validation::Fatal(message) => Some(message),
            _ => None,
        }
    }

    pub fn into_result(self) -> Result<(), ValidationFailure> {
        match self {
            Validation::Valid => Ok(()),
            Validation::Invalid(errors) => Err(ValidationFailure::Rejected(errors)),
            Validation::Fatal(message) => Err(ValidationFailure::Fatal(message)),
        }
    }
}

/// Validates `record` against `schema`.
///
/// See [`SchemaValidator::validate`].
pub fn validate(record: &mut Record, schema: &Schema, options: &ValidateOptions) -> Validation {
    SchemaValidator::new(schema).validate(record, options)
}

/// Schema validator that enforces a schema on records.
///
/// Validation is deterministic for a fixed schema and record as long as the
/// schema's callbacks are. The schema itself is never modified.
pub struct SchemaValidator<'a> {
    schema: &'a Schema,
    metrics: Option<&'a MetricsRegistry>,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a new validator for the given schema.
    pub fn new(schema: &'a Schema) -> Self {
        Self {
            schema,
            metrics: None,
        }
    }

    /// Counts outcomes, coercions and defaults into `metrics`.
    pub fn with_metrics(mut self, metrics: &'a MetricsRegistry) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validates a record, mutating it in place.
    ///
    /// Returns `Invalid` with every field violation found, or `Fatal` when all
    /// fields passed but the schema's self-check did not. The two never mix.
    pub fn validate(&self, record: &mut Record, options: &ValidateOptions) -> Validation {
        let field_count = self.schema.fields.len().to_string();
        log_event_with_fields(
            Event::ValidationStart,
            &[("fields", field_count.as_str()), ("mode", options.mode())],
        );

        let outcome = self.run(record, options);

        if let Some(metrics) = self.metrics {
            metrics.increment_validations();
            match &outcome {
                Validation::Valid => metrics.increment_accepted(),
                Validation::Invalid(_) => metrics.increment_rejected(),
                Validation::Fatal(_) => metrics.increment_self_check_failures(),
            }
        }

        match &outcome {
            Validation::Valid => {
                log_event_with_fields(Event::ValidationComplete, &[("mode", options.mode())]);
            }
            Validation::Invalid(errors) => {
                let count = errors.len().to_string();
                log_event_with_fields(
                    Event::ValidationRejected,
                    &[("mode", options.mode()), ("violations", count.as_str())],
                );
            }
            Validation::Fatal(message) => {
                log_event_with_fields(
                    Event::SelfCheckFailed,
                    &[("message", message.as_str()), ("mode", options.mode())],
                );
            }
        }

        outcome
    }

    fn run(&self, record: &mut Record, options: &ValidateOptions) -> Validation {
        if !options.is_update() {
            self.apply_defaults(record, options);
        }

        let mut errors = ErrorSet::new();

        for (name, descriptor) in &self.schema.fields {
            self.check_field(name, descriptor, record, options, &mut errors);
        }

        for key in record.keys() {
            if !self.schema.contains(key) {
                errors.insert(key.clone(), Violation::unknown_field(key));
            }
        }

        if !errors.is_empty() {
            return Validation::Invalid(errors);
        }

        if let Some(self_check) = &self.schema.self_check {
            let context = options.context.as_deref();
            if let Err(message) = self_check(self.schema, record, context, options.is_update()) {
                return Validation::Fatal(message);
            }
        }

        Validation::Valid
    }

    fn apply_defaults(&self, record: &mut Record, options: &ValidateOptions) {
        for (name, descriptor) in &self.schema.fields {
            if let Some(default) = &descriptor.default {
                if !is_present(record, name) {
                    let value = default.produce(record);
                    record.insert(name.clone(), value);
                    if let Some(metrics) = self.metrics {
                        metrics.increment_defaults_applied();
                    }
                }
            }

            if descriptor.insert_value {
                if let Some(insert_value) = &options.insert_value {
                    record.insert(name.clone(), insert_value(descriptor));
                }
            }
        }
    }

    fn check_field(
        &self,
        name: &str,
        descriptor: &FieldDescriptor,
        record: &mut Record,
        options: &ValidateOptions,
        errors: &mut ErrorSet,
    ) {
        if options.is_update()
            && is_present(record, name)
            && descriptor.immutable
            && !descriptor.required
        {
            errors.insert(name, Violation::immutable(name));
        }

        if let Some(field_type) = &descriptor.field_type {
            self.check_type(name, field_type, record, errors);
        }

        if let Some(allowed) = &descriptor.allowed {
            if let Some(value) = present_value(record, name) {
                if !allowed.contains(value) {
                    let allowed: Vec<String> = allowed.iter().map(text_of).collect();
                    errors.insert(name, Violation::not_allowed(name, &text_of(value), &allowed));
                }
            }
        }

        if let Some(pattern) = &descriptor.pattern {
            if let Some(value) = present_value(record, name) {
                if !pattern_match(value, pattern) {
                    errors.insert(name, Violation::pattern_mismatch(name));
                }
            }
        }

        if let Some(sub_schema) = &descriptor.sub_schema {
            match sub_schema.resolve(record) {
                Ok(Some(child_schema)) => {
                    self.check_nested(name, &child_schema, record, options, errors);
                }
                Ok(None) => {}
                Err(message) => {
                    log_event_with_fields(
                        Event::SubSchemaUnresolved,
                        &[("field", name), ("message", message.as_str())],
                    );
                    errors.insert(name, Violation::new(ViolationKind::SubSchemaUnresolved, message));
                }
            }
        }

        let absent = !is_present(record, name);
        if descriptor.required && !(options.partial_update && absent) {
            let empty = matches!(record.get(name), Some(Value::String(s)) if s.is_empty());
            if absent || empty {
                errors.insert(name, Violation::required(name));
            }
        }

        if let Some(validator) = &descriptor.validator {
            if !errors.contains(name) {
                let check = validator(present_value(record, name), record, name);
                if let Some(extra_fields) = check.extra_fields {
                    record.extend(extra_fields);
                }
                if !check.ok {
                    let message = check
                        .message
                        .unwrap_or_else(|| format!("{} is invalid", name));
                    errors.insert(
                        name,
                        Violation::new(ViolationKind::CustomValidatorFailure, message),
                    );
                }
            }
        }
    }

    /// Coerces textual input in place, then applies the type predicate.
    fn check_type(
        &self,
        name: &str,
        field_type: &FieldType,
        record: &mut Record,
        errors: &mut ErrorSet,
    ) {
        let Some(value) = present_value(record, name) else {
            return;
        };

        let mut converted = None;
        let valid = match coerce(field_type, value) {
            Coerced::Unchanged => is_valid_type(field_type, value),
            Coerced::Trimmed(trimmed) => is_valid_type(field_type, &trimmed),
            Coerced::Converted(new_value) => {
                let valid = is_valid_type(field_type, &new_value);
                converted = Some(new_value);
                valid
            }
            Coerced::Failed => false,
        };

        if let Some(new_value) = converted {
            record.insert(name.to_string(), new_value);
            if let Some(metrics) = self.metrics {
                metrics.increment_values_coerced();
            }
        }

        if !valid && field_type.is_recognized() {
            errors.insert(name, Violation::type_mismatch(name, field_type.type_name()));
        }
    }

    /// Validates the nested record under `name` and merges its violations.
    fn check_nested(
        &self,
        name: &str,
        child_schema: &Schema,
        record: &mut Record,
        options: &ValidateOptions,
        errors: &mut ErrorSet,
    ) {
        if !is_present(record, name) {
            if child_schema.has_defaults() {
                record.insert(name.to_string(), Value::Object(Map::new()));
            } else {
                for (sub_name, sub_descriptor) in &child_schema.fields {
                    if sub_descriptor.required {
                        errors.insert(
                            format!("{}.{}", name, sub_name),
                            Violation::sub_field_required(name, sub_name),
                        );
                    }
                }
                return;
            }
        }

        let Some(Value::Object(child)) = record.get_mut(name) else {
            return;
        };

        let nested = SchemaValidator {
            schema: child_schema,
            metrics: self.metrics,
        };
        match nested.run(child, options) {
            Validation::Valid => {}
            Validation::Invalid(child_errors) => errors.merge_prefixed(name, child_errors),
            Validation::Fatal(message) => {
                errors.insert(
                    name,
                    Violation::new(ViolationKind::NestedSelfCheckFailure, message),
                );
            }
        }
    }
}

/// A key holding `null` counts as absent.
fn is_present(record: &Record, name: &str) -> bool {
    present_value(record, name).is_some()
}

fn present_value<'r>(record: &'r Record, name: &str) -> Option<&'r Value> {
    record.get(name).filter(|v| !v.is_null())
}

/// Strings render bare, everything else as JSON.
fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
