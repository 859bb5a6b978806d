//! Allowed key sets for every structured part of a record.
//!
//! Draft objects are filtered against these before any field is read.

pub const RECORD_FIELDS: &[&str] = &[
    "id",
    "name",
    "kind",
    "kind_detail",
    "series",
    "description",
    "ai_description",
    "aliases",
    "activation",
    "enchantments",
    "images",
    "effects",
    "tags",
    "physical",
    "provenance",
    "metadata",
];

pub const PROVENANCE_FIELDS: &[&str] = &["source_type", "source_ref", "extraction_method", "confidence"];
pub const METADATA_FIELDS: &[&str] = &["created_at", "updated_at", "version", "license"];

pub const ACTIVATION_FIELDS: &[&str] = &["type", "cost", "charges", "recharge", "duration", "notes"];
pub const ENCHANTMENT_FIELDS: &[&str] = &["name", "description", "params"];

pub const EFFECT_FIELDS: &[&str] = &[
    "name",
    "trigger",
    "chance",
    "area",
    "save",
    "modifiers",
    "targeting",
    "outcomes",
    "notes",
];
pub const TRIGGER_FIELDS: &[&str] = &["event", "conditions"];
pub const CONDITION_FIELDS: &[&str] = &["left", "op", "right"];
pub const MODIFIER_FIELDS: &[&str] = &["stat", "op", "value", "stack_rule"];
pub const TARGETING_FIELDS: &[&str] = &["type", "range", "range_unit", "count", "shape"];
pub const SAVE_FIELDS: &[&str] = &["ability", "dc", "on_success", "on_failure"];
pub const AREA_FIELDS: &[&str] = &["shape", "size", "unit"];
pub const OUTCOME_FIELDS: &[&str] = &["result", "prob", "effects", "notes"];
pub const OUTCOME_ACTION_FIELDS: &[&str] = &["action", "target", "params"];

pub const IMAGE_FIELDS: &[&str] = &[
    "type",
    "src",
    "alt",
    "srcset",
    "mime",
    "width",
    "height",
    "focal_point",
    "attribution",
    "foundry",
];
pub const SRCSET_FIELDS: &[&str] = &["src", "width", "density"];
pub const FOCAL_POINT_FIELDS: &[&str] = &["x", "y"];
pub const ATTRIBUTION_FIELDS: &[&str] = &["author", "source", "license", "url"];
pub const FOUNDRY_FIELDS: &[&str] = &["img", "token_img", "scale"];

pub const PHYSICAL_FIELDS: &[&str] = &["weight_kg", "dimensions_cm", "durability"];
pub const DIMENSION_FIELDS: &[&str] = &["length", "width", "height"];
pub const DURABILITY_FIELDS: &[&str] = &["max", "current"];
