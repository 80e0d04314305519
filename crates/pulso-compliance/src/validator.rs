//! Outbound content validation.
//!
//! Notification titles and bodies must never carry personal identifiers
//! in the clear. The scan runs on plaintext before any payload field is
//! encrypted, and a failed scan is a hard gate: the send is rejected,
//! never retried.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// National identifier with separators: `ddd.ddd.ddd-dd`.
static FORMATTED_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{3}\.\d{3}\.\d{3}-\d{2}").unwrap());

/// Bare 11-digit run, the same identifier with separators stripped.
static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{11}\b").unwrap());

/// Result of a content scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationReport {
    /// `false` when any violation was found.
    pub is_valid: bool,
    /// One entry per field/pattern match, naming what was found where.
    pub violations: Vec<String>,
}

/// Scans outbound notification content for disallowed personal-data
/// patterns.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentValidator;

impl ContentValidator {
    /// Create a content validator.
    pub fn new() -> Self {
        Self
    }

    /// Scan a title and body. Every match appends one violation.
    pub fn validate(&self, title: &str, body: &str) -> ValidationReport {
        let mut violations = Vec::new();
        scan_field("title", title, &mut violations);
        scan_field("body", body, &mut violations);

        ValidationReport {
            is_valid: violations.is_empty(),
            violations,
        }
    }
}

fn scan_field(field: &str, content: &str, violations: &mut Vec<String>) {
    if FORMATTED_ID.is_match(content) {
        violations.push(format!(
            "{field} contains sensitive information: formatted national identifier"
        ));
    }
    if BARE_ID.is_match(content) {
        violations.push(format!(
            "{field} contains sensitive information: bare 11-digit identifier"
        ));
    }
}
