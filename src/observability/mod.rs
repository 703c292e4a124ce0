//! Observability for the validation engine
//!
//! - Structured JSON-lines logging with a level threshold
//! - Typed validation events
//! - Atomic counters
//!
//! # Usage
//!
//! ```ignore
//! use fieldguard::observability::{log_event_with_fields, set_min_level, Event, LogLevel, MetricsRegistry};
//!
//! set_min_level(LogLevel::Trace);
//! log_event_with_fields(Event::ValidationRejected, &[("violations", "2")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_validations();
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{min_level, set_min_level, LogLevel, Logger};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log an event with fields at the event's own level
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.level(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event_with_fields() {
        // Below the default level, so this writes nothing
        log_event_with_fields(Event::ValidationRejected, &[("violations", "3")]);
    }
}
