//! Record store port - Raw page text and produced records
//!
//! These traits define the contracts the file store must implement.
//! Application services depend on these traits, not concrete implementations.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::Record;

#[async_trait]
pub trait RecordStorePort: Send + Sync {
    /// Content hash of the stored raw text for a title, if any
    async fn raw_hash(&self, title: &str) -> Result<Option<String>>;

    /// Store raw text for a title and return its content hash
    async fn save_raw(&self, title: &str, text: &str) -> Result<String>;

    async fn load_raw(&self, title: &str) -> Result<Option<String>>;

    /// Write an accepted record under its id
    async fn save_record(&self, record: &Record) -> Result<PathBuf>;

    /// Every stored record file, sorted by path
    async fn list_records(&self) -> Result<Vec<PathBuf>>;

    async fn load_record(&self, path: &Path) -> Result<Value>;

    async fn write_record_value(&self, path: &Path, value: &Value) -> Result<()>;

    /// Append a `title<TAB>error` line to the failure log
    async fn log_failure(&self, title: &str, error: &str) -> Result<()>;
}
