//! Outbound ports - Interfaces that the application requires from external systems

mod llm_port;
mod media_info_port;
mod page_source_port;
mod record_store_port;
mod schema_port;

pub use llm_port::{ChatMessage, LlmPort, LlmRequest, LlmResponse, MessageRole, ResponseSchema};
pub use media_info_port::{MediaInfo, MediaInfoPort};
pub use page_source_port::{PageSourcePort, SourcePage};
pub use record_store_port::RecordStorePort;
pub use schema_port::{SchemaIssue, SchemaValidatorPort, SchemaViolation};
