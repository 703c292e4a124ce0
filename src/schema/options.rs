//! Per-call validation options
//!
//! Create mode (the default) applies defaults and insert values.
//! Either update mode skips them and enables immutability checks;
//! partial updates additionally skip required checks for absent fields.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use super::types::{ExternalContext, FieldDescriptor};

/// Supplies the value of fields flagged with `insert_value`
pub type InsertValueCallback = Arc<dyn Fn(&FieldDescriptor) -> Value + Send + Sync>;

/// Options for one validation call.
#[derive(Clone, Default)]
pub struct ValidateOptions {
    /// Record carries only the fields being changed
    pub partial_update: bool,
    /// Record replaces an existing one
    pub full_update: bool,
    pub insert_value: Option<InsertValueCallback>,
    /// Opaque state forwarded to the schema's self-check
    pub context: Option<Arc<ExternalContext>>,
}

impl ValidateOptions {
    /// Options for creating a new record.
    pub fn create() -> Self {
        Self::default()
    }

    /// Options for a partial update.
    pub fn partial_update() -> Self {
        Self {
            partial_update: true,
            ..Self::default()
        }
    }

    /// Options for a full update.
    pub fn full_update() -> Self {
        Self {
            full_update: true,
            ..Self::default()
        }
    }

    pub fn with_insert_value<F>(mut self, callback: F) -> Self
    where
        F: Fn(&FieldDescriptor) -> Value + Send + Sync + 'static,
    {
        self.insert_value = Some(Arc::new(callback));
        self
    }

    pub fn with_context(mut self, context: Arc<ExternalContext>) -> Self {
        self.context = Some(context);
        self
    }

    /// Whether either update mode is set.
    pub fn is_update(&self) -> bool {
        self.partial_update || self.full_update
    }

    /// Human-readable mode name for logs.
    pub fn mode(&self) -> &'static str {
        if self.partial_update {
            "partial_update"
        } else if self.full_update {
            "full_update"
        } else {
            "create"
        }
    }
}

impl fmt::Debug for ValidateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidateOptions")
            .field("partial_update", &self.partial_update)
            .field("full_update", &self.full_update)
            .field("insert_value", &self.insert_value.as_ref().map(|_| ".."))
            .field("context", &self.context.as_ref().map(|_| ".."))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_create() {
        let options = ValidateOptions::default();
        assert!(!options.is_update());
        assert_eq!(options.mode(), "create");
    }

    #[test]
    fn test_update_modes() {
        assert!(ValidateOptions::partial_update().is_update());
        assert!(ValidateOptions::full_update().is_update());
        assert_eq!(ValidateOptions::full_update().mode(), "full_update");
    }

    #[test]
    fn test_context_is_opaque() {
        let options = ValidateOptions::create().with_context(Arc::new(17u32));
        let context = options.context.as_ref().unwrap();
        assert_eq!(context.downcast_ref::<u32>(), Some(&17));
    }
}
