//! Canonical identifier check
//!
//! Accepts exactly `8-4-4-4-12` lower-case hexadecimal groups, e.g.
//! `550e8400-e29b-41d4-a716-446655440000`. No trimming, no case folding.

use regex::Regex;
use std::sync::OnceLock;

static IDENTIFIER: OnceLock<Regex> = OnceLock::new();

fn identifier_pattern() -> &'static Regex {
    IDENTIFIER.get_or_init(|| {
        Regex::new("^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
            .unwrap_or_else(|e| unreachable!("identifier pattern is valid: {}", e))
    })
}

/// Returns true if `text` is a canonical lower-case identifier.
pub fn is_valid_identifier(text: &str) -> bool {
    identifier_pattern().is_match(text)
}
