//! fieldguard - schema-driven record validation and coercion
//!
//! A record (a JSON object) is checked against a declarative [`schema::Schema`].
//! Validation applies defaults, coerces textual input into declared types,
//! recurses into nested schemas and reports every violation at once.

pub mod identifier;
pub mod observability;
pub mod schema;

pub use identifier::is_valid_identifier;
pub use schema::{
    validate, ErrorSet, FieldDescriptor, FieldType, Record, Schema, SchemaValidator,
    ValidateOptions, Validation,
};
