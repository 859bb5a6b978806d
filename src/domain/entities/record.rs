//! Record entity - The accepted structured description of one wiki item

use serde::{Deserialize, Serialize};

use super::{Effect, Image, JsonObject};
use crate::domain::value_objects::{ItemKind, RecordId, DEFAULT_CONFIDENCE};

/// Series stamped on records whose draft names none
pub const DEFAULT_SERIES: &str = "Dungeon Crawler Carl";

/// A fully reconciled item record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub kind: ItemKind,
    /// Ordered, deduplicated sub-type tokens
    pub kind_detail: Vec<String>,
    pub series: String,
    pub description: Option<String>,
    pub ai_description: Option<String>,
    pub aliases: Vec<String>,
    pub activation: Option<JsonObject>,
    pub enchantments: Vec<Enchantment>,
    pub images: Vec<Image>,
    pub effects: Vec<Effect>,
    pub tags: Vec<String>,
    pub physical: Option<Physical>,
    pub provenance: Provenance,
    pub metadata: Metadata,
}

/// A named enchantment and its raw parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enchantment {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "JsonObject::is_empty")]
    pub params: JsonObject,
}

/// Physical properties; every number is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Physical {
    pub weight_kg: Option<f64>,
    pub dimensions_cm: Option<Dimensions>,
    pub durability: Option<Durability>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Durability {
    pub max: Option<f64>,
    pub current: Option<f64>,
}

/// Where a record came from and how it was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub source_type: String,
    pub source_ref: String,
    pub extraction_method: String,
    /// Always within [0, 1]
    pub confidence: f64,
}

impl Provenance {
    pub fn wiki(source_ref: impl Into<String>) -> Self {
        Self {
            source_type: "wiki".to_string(),
            source_ref: source_ref.into(),
            extraction_method: "llm".to_string(),
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub created_at: String,
    pub updated_at: String,
    pub version: String,
    pub license: String,
}

impl Metadata {
    pub fn new(timestamp: impl Into<String>) -> Self {
        let timestamp = timestamp.into();
        Self {
            created_at: timestamp.clone(),
            updated_at: timestamp,
            version: "1.0.0".to_string(),
            license: "TBD".to_string(),
        }
    }
}
