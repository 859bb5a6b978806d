//! DCC Collector - Wiki item pages to schema-valid records
//!
//! Pages are mined for facts, drafted by a schema-constrained model, then
//! reconciled and validated before anything is written.

pub mod application;
pub mod domain;
pub mod infrastructure;
