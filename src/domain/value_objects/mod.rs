//! Value objects - Immutable objects defined by their attributes

pub mod field_sets;
mod item_kind;
mod probability;
mod record_id;
mod stat_code;

pub use item_kind::ItemKind;
pub use probability::{clamp_confidence, normalize_chance, parse_chance, DEFAULT_CONFIDENCE};
pub use record_id::{slugify, RecordId, FALLBACK_SLUG, MAX_SLUG_LEN};
pub use stat_code::{normalize_label, StatCode, STAT_ALIASES};
