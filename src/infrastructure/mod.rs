//! Infrastructure layer - External adapters and implementations
//!
//! This layer contains:
//! - Config: Application configuration
//! - MediaWiki: category listings, page text and media info
//! - OpenAI: schema-constrained drafting
//! - Schema validator: the authoritative record check
//! - Persistence: raw text, records and the failure log on disk

pub mod config;
pub mod mediawiki;
pub mod openai;
pub mod persistence;
pub mod schema_validator;
