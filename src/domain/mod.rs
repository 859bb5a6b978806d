//! Domain layer - Core record model with no I/O
//!
//! This layer contains:
//! - Entities: Record, Effect, Image and their nested parts
//! - Value Objects: StatCode, ItemKind, RecordId, probability helpers
//! - Domain Services: Markup mining over raw wiki text

pub mod entities;
pub mod services;
pub mod value_objects;
