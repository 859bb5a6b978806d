//! Provenance and metadata stamping
//!
//! Fills attribution and timestamp fields the draft left out. Draft values
//! win when they are usable; confidence is always clamped into [0, 1].

use chrono::{DateTime, Utc};

use crate::application::dto::{coerce_number, non_empty_str, whitelist};
use crate::domain::entities::{JsonObject, Metadata, Provenance};
use crate::domain::value_objects::clamp_confidence;
use crate::domain::value_objects::field_sets::{METADATA_FIELDS, PROVENANCE_FIELDS};

/// ISO-8601 UTC with second precision
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.format(TIMESTAMP_FORMAT).to_string()
}

fn text(object: Option<&JsonObject>, key: &str) -> Option<String> {
    object.and_then(|o| o.get(key)).and_then(non_empty_str)
}

pub fn stamp_provenance(draft: Option<&JsonObject>, source_url: &str) -> Provenance {
    let defaults = Provenance::wiki(source_url);
    let draft = draft.map(|o| whitelist(o, PROVENANCE_FIELDS));
    let draft = draft.as_ref();
    let confidence = draft
        .and_then(|o| o.get("confidence"))
        .and_then(coerce_number);

    Provenance {
        source_type: text(draft, "source_type").unwrap_or(defaults.source_type),
        source_ref: text(draft, "source_ref").unwrap_or(defaults.source_ref),
        extraction_method: text(draft, "extraction_method").unwrap_or(defaults.extraction_method),
        confidence: clamp_confidence(confidence),
    }
}

pub fn stamp_metadata(draft: Option<&JsonObject>, now: DateTime<Utc>) -> Metadata {
    let defaults = Metadata::new(format_timestamp(now));
    let draft = draft.map(|o| whitelist(o, METADATA_FIELDS));
    let draft = draft.as_ref();

    Metadata {
        created_at: text(draft, "created_at").unwrap_or(defaults.created_at),
        updated_at: text(draft, "updated_at").unwrap_or(defaults.updated_at),
        version: text(draft, "version").unwrap_or(defaults.version),
        license: text(draft, "license").unwrap_or(defaults.license),
    }
}
