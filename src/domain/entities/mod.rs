//! Domain entities - Core business objects with identity

mod effect;
mod image;
mod record;

/// Loosely typed JSON object, used for whitelisted free-form sub-objects
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

pub use effect::{
    collapse_number, Condition, Effect, Modifier, ModifierOp, Outcome, OutcomeAction, Trigger,
    TEMPORARY_STACK_RULE, UNSPECIFIED_EVENT,
};
pub use image::{FocalPoint, Image, ImageType, SrcsetEntry};
pub use record::{
    Dimensions, Durability, Enchantment, Metadata, Physical, Provenance, Record, DEFAULT_SERIES,
};
