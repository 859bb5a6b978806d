//! Schema port - Authoritative pass/fail check for assembled records

use std::fmt;

use serde_json::Value;

/// One schema violation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON pointer into the record; empty for the root
    pub path: String,
    pub message: String,
}

impl SchemaIssue {
    /// Path for display, `(root)` when empty
    pub fn location(&self) -> &str {
        if self.path.is_empty() {
            "(root)"
        } else {
            &self.path
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location(), self.message)
    }
}

/// A rejected record: the first violation plus every violation found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaViolation {
    pub path: String,
    pub message: String,
    pub issues: Vec<SchemaIssue>,
}

impl SchemaViolation {
    /// Build from a non-empty issue list; `None` when there is nothing to report
    pub fn from_issues(issues: Vec<SchemaIssue>) -> Option<Self> {
        let first = issues.first()?.clone();
        Some(Self {
            path: first.path,
            message: first.message,
            issues,
        })
    }
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let location = if self.path.is_empty() { "(root)" } else { self.path.as_str() };
        write!(f, "schema violation at {}: {}", location, self.message)
    }
}

impl std::error::Error for SchemaViolation {}

pub trait SchemaValidatorPort: Send + Sync {
    /// The schema document, as sent to the model
    fn schema(&self) -> &Value;

    fn validate(&self, record: &Value) -> Result<(), SchemaViolation>;
}
