//! Application services - Use case implementations
//!
//! Each service follows hexagonal architecture principles: it is generic over
//! the outbound ports it needs and never touches the network or filesystem
//! directly.

pub mod collection_service;
pub mod draft_normalizer;
pub mod image_refresh_service;
pub mod llm;
pub mod media_resolver;
pub mod reconciliation_service;
pub mod record_stamper;
pub mod record_validation_service;

#[cfg(test)]
pub(crate) mod test_support;

pub use collection_service::{CollectOptions, CollectSummary, CollectionService};
pub use image_refresh_service::ImageRefreshService;
pub use media_resolver::{MediaResolver, ResolvedMedia};
pub use reconciliation_service::{ReconcileError, ReconciliationService, MAX_ATTEMPTS};
pub use record_validation_service::{RecordCheck, RecordValidationService};
