//! Slug identifiers for records

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Upper bound on identifier length
pub const MAX_SLUG_LEN: usize = 120;

/// Used when the input has no alphanumeric characters at all
pub const FALLBACK_SLUG: &str = "item";

static NON_SLUG_CHARS: OnceLock<Regex> = OnceLock::new();

/// Convert arbitrary text into a lowercase `[a-z0-9-]+` identifier.
///
/// Deterministic and idempotent; never returns an empty string.
pub fn slugify(value: &str) -> String {
    let re = NON_SLUG_CHARS.get_or_init(|| Regex::new(r"[^a-z0-9]+").unwrap());
    let lowered = value.to_lowercase();
    let replaced = re.replace_all(&lowered, "-");
    let trimmed = replaced.trim_matches('-');

    // Everything left is ASCII, so byte slicing is safe.
    let bounded = &trimmed[..trimmed.len().min(MAX_SLUG_LEN)];
    let bounded = bounded.trim_end_matches('-');

    if bounded.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        bounded.to_string()
    }
}

/// Identifier of a record, unique within an output directory
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn from_text(text: &str) -> Self {
        Self(slugify(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RecordId> for String {
    fn from(id: RecordId) -> String {
        id.0
    }
}
