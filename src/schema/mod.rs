//! Schema-driven record validation
//!
//! # Design Principles
//!
//! - Every violation in a record is reported, not just the first
//! - Textual input is coerced into the declared type and written back
//! - Defaults and insert values apply only when creating a record
//! - A failing record-level self-check is fatal and never mixed with field errors
//! - Deterministic for a fixed schema and record

mod coercion;
mod errors;
mod options;
mod types;
mod validator;

pub use coercion::{
    coerce, is_sequential_container, is_valid_type, parse_url, pattern_match, Coerced,
};
pub use errors::{
    add_error, ErrorSet, SchemaError, SchemaResult, Severity, ValidationFailure, Violation,
    ViolationKind,
};
pub use options::{InsertValueCallback, ValidateOptions};
pub use types::{
    CustomCheck, CustomValidator, DefaultGenerator, DefaultValue, ExternalContext,
    FieldDescriptor, FieldType, Record, Schema, SelfCheck, SubSchema, SubSchemaResolver,
};
pub use validator::{validate, SchemaValidator, Validation};
