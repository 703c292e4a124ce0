//! Validation counters
//!
//! - Counters only, monotonic
//! - Relaxed atomics, safe to share across threads

use std::sync::atomic::{AtomicU64, Ordering};

/// Registry of validation counters
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Top-level validation calls
    validations: AtomicU64,
    /// Calls that returned `Valid`
    accepted: AtomicU64,
    /// Calls that returned field violations
    rejected: AtomicU64,
    /// Calls stopped by a self-check
    self_check_failures: AtomicU64,
    /// Field values rewritten by coercion
    values_coerced: AtomicU64,
    /// Defaults assigned to absent fields
    defaults_applied: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_validations(&self) {
        self.validations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_self_check_failures(&self) {
        self.self_check_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_values_coerced(&self) {
        self.values_coerced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_defaults_applied(&self) {
        self.defaults_applied.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            validations: self.validations.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            self_check_failures: self.self_check_failures.load(Ordering::Relaxed),
            values_coerced: self.values_coerced.load(Ordering::Relaxed),
            defaults_applied: self.defaults_applied.load(Ordering::Relaxed),
        }
    }

    /// Current values as a JSON object
    pub fn to_json(&self) -> serde_json::Value {
        let s = self.snapshot();
        serde_json::json!({
            "validations": s.validations,
            "accepted": s.accepted,
            "rejected": s.rejected,
            "self_check_failures": s.self_check_failures,
            "values_coerced": s.values_coerced,
            "defaults_applied": s.defaults_applied,
        })
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub validations: u64,
    pub accepted: u64,
    pub rejected: u64,
    pub self_check_failures: u64,
    pub values_coerced: u64,
    pub defaults_applied: u64,
}
