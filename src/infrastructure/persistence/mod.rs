//! Filesystem persistence adapters
//!
//! Raw page text, records and the failure log all live on local disk.

mod file_store;

pub use file_store::{render_json, sanitize_title_for_fs, sha256_hex, FileStore, StoreError};
