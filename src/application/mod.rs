//! Application layer - Use cases orchestrating the domain through ports
//!
//! - DTOs: the untrusted model draft and its coercions
//! - Ports: outbound interfaces implemented by infrastructure
//! - Services: reconciliation, media resolution, collection and maintenance

pub mod dto;
pub mod ports;
pub mod services;
