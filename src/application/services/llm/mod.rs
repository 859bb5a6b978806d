//! LLM prompt construction

pub mod prompt_builder;

pub use prompt_builder::{build_extraction_request, build_system_prompt, RESPONSE_SCHEMA_NAME};
