//! File-backed record store
//!
//! Raw wikitext lives under the raw directory, one file per title. Records
//! are pretty-printed JSON with sorted keys, one file per id.

use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::application::ports::outbound::RecordStorePort;
use crate::domain::entities::Record;

const RAW_SUFFIX: &str = ".wikitext.txt";
const FAILURE_LOG: &str = "failures.txt";
/// Used when a title sanitizes to nothing
const FALLBACK_STEM: &str = "item";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    fn json(path: &Path, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Make a wiki title safe to use as a file name on any platform
pub fn sanitize_title_for_fs(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            other => other,
        })
        .collect();
    let safe = replaced.trim().trim_end_matches(['.', ' ']);
    if safe.is_empty() {
        FALLBACK_STEM.to_string()
    } else {
        safe.to_string()
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Rebuild objects with their keys in sorted order
fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect::<Map<String, Value>>(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

/// Pretty JSON, sorted keys, trailing newline
pub fn render_json(value: &Value) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(&sort_keys(value.clone()))?;
    text.push('\n');
    Ok(text)
}

#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
    raw_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl FileStore {
    pub fn new(
        data_dir: impl Into<PathBuf>,
        raw_dir: impl Into<PathBuf>,
        tmp_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            data_dir: data_dir.into(),
            raw_dir: raw_dir.into(),
            tmp_dir: tmp_dir.into(),
        }
    }

    pub fn raw_path(&self, title: &str) -> PathBuf {
        self.raw_dir
            .join(format!("{}{}", sanitize_title_for_fs(title), RAW_SUFFIX))
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", id))
    }

    pub fn failure_log_path(&self) -> PathBuf {
        self.tmp_dir.join(FAILURE_LOG)
    }

    async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    async fn write_file(path: &Path, contents: &str) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e))?;
        }
        tokio::fs::write(path, contents)
            .await
            .map_err(|e| StoreError::io(path, e))
    }

    async fn write_json(path: &Path, value: &Value) -> Result<(), StoreError> {
        let text = render_json(value).map_err(|e| StoreError::json(path, e))?;
        Self::write_file(path, &text).await
    }
}

#[async_trait]
impl RecordStorePort for FileStore {
    async fn raw_hash(&self, title: &str) -> Result<Option<String>> {
        let bytes = Self::read_optional(&self.raw_path(title)).await?;
        Ok(bytes.map(|b| sha256_hex(&b)))
    }

    async fn save_raw(&self, title: &str, text: &str) -> Result<String> {
        let path = self.raw_path(title);
        Self::write_file(&path, text).await?;
        debug!(title, path = %path.display(), "Saved raw wikitext");
        Ok(sha256_hex(text.as_bytes()))
    }

    async fn load_raw(&self, title: &str) -> Result<Option<String>> {
        let bytes = Self::read_optional(&self.raw_path(title)).await?;
        Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
    }

    async fn save_record(&self, record: &Record) -> Result<PathBuf> {
        let path = self.record_path(record.id.as_str());
        let value = serde_json::to_value(record).map_err(|e| StoreError::json(&path, e))?;
        Self::write_json(&path, &value).await?;
        Ok(path)
    }

    async fn list_records(&self) -> Result<Vec<PathBuf>> {
        let mut entries = match tokio::fs::read_dir(&self.data_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.data_dir, e).into()),
        };

        let mut paths = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io(&self.data_dir, e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    async fn load_record(&self, path: &Path) -> Result<Value> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| StoreError::io(path, e))?;
        Ok(serde_json::from_slice(&bytes).map_err(|e| StoreError::json(path, e))?)
    }

    async fn write_record_value(&self, path: &Path, value: &Value) -> Result<()> {
        Ok(Self::write_json(path, value).await?)
    }

    async fn log_failure(&self, title: &str, error: &str) -> Result<()> {
        let path = self.failure_log_path();
        tokio::fs::create_dir_all(&self.tmp_dir)
            .await
            .map_err(|e| StoreError::io(&self.tmp_dir, e))?;

        // one line per failure
        let line = format!("{}\t{}\n", title, error.replace(['\r', '\n'], " "));
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|e| StoreError::io(&path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Metadata, Provenance};
    use crate::domain::value_objects::{ItemKind, RecordId};
    use serde_json::json;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> FileStore {
        FileStore::new(
            dir.path().join("items"),
            dir.path().join("raw"),
            dir.path().join("tmp"),
        )
    }

    fn record(name: &str) -> Record {
        Record {
            id: RecordId::from_text(name),
            name: name.to_string(),
            kind: ItemKind::Clothing,
            kind_detail: vec![],
            series: "Dungeon Crawler Carl".to_string(),
            description: None,
            ai_description: None,
            aliases: vec![],
            activation: None,
            enchantments: vec![],
            images: vec![],
            effects: vec![],
            tags: vec![],
            physical: None,
            provenance: Provenance::wiki("https://dcc.fandom.com/wiki/Boxers"),
            metadata: Metadata::new("2024-03-09T14:05:07Z"),
        }
    }

    #[test]
    fn test_sanitize_title_for_fs() {
        assert_eq!(sanitize_title_for_fs("Boxers: The Sequel?"), "Boxers_ The Sequel_");
        assert_eq!(sanitize_title_for_fs("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_title_for_fs("Trailing dots.. "), "Trailing dots");
        assert_eq!(sanitize_title_for_fs("   "), "item");
        assert_eq!(sanitize_title_for_fs("..."), "item");
    }

    #[test]
    fn test_sha256_hex() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_render_json_sorts_keys() {
        let text = render_json(&json!({"b": 1, "a": {"d": 2, "c": 3}})).unwrap();
        assert_eq!(
            text,
            "{\n  \"a\": {\n    \"c\": 3,\n    \"d\": 2\n  },\n  \"b\": 1\n}\n"
        );
    }

    #[tokio::test]
    async fn test_raw_hash_tracks_saved_text() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert_eq!(store.raw_hash("Boxers/Shorts").await.unwrap(), None);
        let hash = store.save_raw("Boxers/Shorts", "text").await.unwrap();
        assert_eq!(store.raw_hash("Boxers/Shorts").await.unwrap(), Some(hash));
        assert!(dir.path().join("raw/Boxers_Shorts.wikitext.txt").exists());
        assert_eq!(
            store.load_raw("Boxers/Shorts").await.unwrap().as_deref(),
            Some("text")
        );
    }

    #[tokio::test]
    async fn test_records_round_trip_through_directory() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        assert!(store.list_records().await.unwrap().is_empty());
        let path = store.save_record(&record("Enchanted Boxers")).await.unwrap();
        store.save_record(&record("Apple")).await.unwrap();
        tokio::fs::write(dir.path().join("items/notes.txt"), "x").await.unwrap();

        assert_eq!(path, dir.path().join("items/enchanted-boxers.json"));
        let listed = store.list_records().await.unwrap();
        assert_eq!(listed, vec![dir.path().join("items/apple.json"), path.clone()]);

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(text.starts_with("{\n  \"activation\": null,"));
        assert!(text.ends_with("}\n"));

        let mut value = store.load_record(&path).await.unwrap();
        value["name"] = json!("Renamed");
        store.write_record_value(&path, &value).await.unwrap();
        assert_eq!(store.load_record(&path).await.unwrap()["name"], "Renamed");
    }

    #[tokio::test]
    async fn test_failures_are_appended() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.log_failure("Boxers", "first\nsecond").await.unwrap();
        store.log_failure("Sock", "boom").await.unwrap();

        let log = tokio::fs::read_to_string(store.failure_log_path()).await.unwrap();
        assert_eq!(log, "Boxers\tfirst second\nSock\tboom\n");
    }
}
