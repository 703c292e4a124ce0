//! Observable validation events

use std::fmt;

use super::logger::{min_level, LogLevel};

/// Events emitted by the validation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Validation pass begins
    ValidationStart,
    /// Record accepted
    ValidationComplete,
    /// Record rejected with field violations
    ValidationRejected,
    /// Record-level self-check failed
    SelfCheckFailed,
    /// Sub-schema resolver returned an error
    SubSchemaUnresolved,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ValidationStart => "VALIDATION_BEGIN",
            Event::ValidationComplete => "VALIDATION_COMPLETE",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::SelfCheckFailed => "SELF_CHECK_FAILED",
            Event::SubSchemaUnresolved => "SUB_SCHEMA_UNRESOLVED",
        }
    }

    /// Level the event is logged at
    pub fn level(&self) -> LogLevel {
        match self {
            Event::ValidationStart | Event::ValidationComplete | Event::ValidationRejected => {
                LogLevel::Trace
            }
            Event::SelfCheckFailed | Event::SubSchemaUnresolved => LogLevel::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_events_have_string_representation() {
        let events = [
            Event::ValidationStart,
            Event::ValidationComplete,
            Event::ValidationRejected,
            Event::SelfCheckFailed,
            Event::SubSchemaUnresolved,
        ];

        for event in events {
            let s = event.as_str();
            assert!(!s.is_empty());
            assert!(s.chars().all(|c| c.is_ascii_uppercase() || c == '_'));
        }
    }

    #[test]
    fn test_per_call_events_are_trace() {
        assert_eq!(Event::ValidationStart.level(), LogLevel::Trace);
        assert_eq!(Event::ValidationRejected.level(), LogLevel::Trace);
        assert_eq!(Event::SelfCheckFailed.level(), LogLevel::Info);
    }

    #[test]
    fn test_no_event_written_at_default_level() {
        let events = [
            Event::ValidationStart,
            Event::ValidationComplete,
            Event::ValidationRejected,
            Event::SelfCheckFailed,
            Event::SubSchemaUnresolved,
        ];

        for event in events {
            assert!(event.level() < min_level());
        }
    }
}
