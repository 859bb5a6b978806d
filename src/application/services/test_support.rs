//! Hand-written port doubles shared by the service tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::application::ports::outbound::{
    LlmPort, LlmRequest, LlmResponse, MediaInfo, MediaInfoPort, PageSourcePort, RecordStorePort,
    SchemaIssue, SchemaValidatorPort, SchemaViolation, SourcePage,
};
use crate::domain::entities::Record;

/// In-memory media catalogue counting every lookup
#[derive(Default)]
pub struct MockMedia {
    pub files: HashMap<String, MediaInfo>,
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl MockMedia {
    pub fn with_file(mut self, name: &str, url: &str) -> Self {
        self.files.insert(
            name.to_string(),
            MediaInfo {
                url: url.to_string(),
                mime: Some("image/png".to_string()),
                width: Some(64),
                height: Some(64),
                checksum: Some("abc123".to_string()),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaInfoPort for MockMedia {
    type Error = std::io::Error;

    async fn lookup(&self, filename: &str) -> Result<Option<MediaInfo>, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout"));
        }
        Ok(self.files.get(filename).cloned())
    }
}

/// Returns scripted drafts in order, repeating the last one
pub struct ScriptedLlm {
    drafts: Mutex<Vec<String>>,
    pub calls: AtomicUsize,
    fail: bool,
}

impl ScriptedLlm {
    pub fn new(drafts: &[Value]) -> Self {
        Self {
            drafts: Mutex::new(drafts.iter().map(Value::to_string).collect()),
            calls: AtomicUsize::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmPort for ScriptedLlm {
    type Error = std::io::Error;

    async fn generate(&self, _request: LlmRequest) -> Result<LlmResponse, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "down"));
        }
        let mut drafts = self.drafts.lock().unwrap();
        let content = if drafts.len() > 1 {
            drafts.remove(0)
        } else {
            drafts.first().cloned().unwrap_or_else(|| "{}".to_string())
        };
        Ok(LlmResponse {
            content,
            model: "mock".to_string(),
            tokens_used: 0,
        })
    }
}

/// Rejects the first `rejections` records, numbering each rejection
pub struct CountingValidator {
    schema: Value,
    rejections: usize,
    pub calls: AtomicUsize,
}

impl CountingValidator {
    pub fn rejecting(rejections: usize) -> Self {
        Self {
            schema: json!({"type": "object"}),
            rejections,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn accepting() -> Self {
        Self::rejecting(0)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SchemaValidatorPort for CountingValidator {
    fn schema(&self) -> &Value {
        &self.schema
    }

    fn validate(&self, _record: &Value) -> Result<(), SchemaViolation> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if call > self.rejections {
            return Ok(());
        }
        let issue = SchemaIssue {
            path: "/name".to_string(),
            message: format!("rejection {}", call),
        };
        Err(SchemaViolation::from_issues(vec![issue]).unwrap())
    }
}

/// Wiki double serving fixed pages
#[derive(Default)]
pub struct MockSource {
    pub titles: Vec<String>,
    pub pages: HashMap<String, String>,
}

impl MockSource {
    pub fn with_page(mut self, title: &str, text: &str) -> Self {
        self.titles.push(title.to_string());
        self.pages.insert(title.to_string(), text.to_string());
        self
    }
}

#[async_trait]
impl PageSourcePort for MockSource {
    type Error = std::io::Error;

    async fn list_category_titles(&self, _category: &str) -> Result<Vec<String>, Self::Error> {
        Ok(self.titles.clone())
    }

    async fn fetch_page(&self, title: &str) -> Result<SourcePage, Self::Error> {
        let text = self
            .pages
            .get(title)
            .cloned()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, title.to_string()))?;
        Ok(SourcePage {
            title: title.to_string(),
            url: format!("https://wiki.test/wiki/{}", title.replace(' ', "_")),
            text,
            page_id: None,
        })
    }
}

/// Store double keeping everything in maps; the raw "hash" is the text itself
#[derive(Default)]
pub struct MemoryStore {
    pub raws: Mutex<HashMap<String, String>>,
    pub records: Mutex<HashMap<PathBuf, Value>>,
    pub failures: Mutex<Vec<(String, String)>>,
}

impl MemoryStore {
    pub fn with_raw(self, title: &str, text: &str) -> Self {
        self.raws.lock().unwrap().insert(title.to_string(), text.to_string());
        self
    }

    pub fn with_record(self, path: &str, value: Value) -> Self {
        self.records.lock().unwrap().insert(PathBuf::from(path), value);
        self
    }

    pub fn record(&self, path: &str) -> Option<Value> {
        self.records.lock().unwrap().get(Path::new(path)).cloned()
    }
}

#[async_trait]
impl RecordStorePort for MemoryStore {
    async fn raw_hash(&self, title: &str) -> Result<Option<String>> {
        Ok(self.raws.lock().unwrap().get(title).cloned())
    }

    async fn save_raw(&self, title: &str, text: &str) -> Result<String> {
        self.raws.lock().unwrap().insert(title.to_string(), text.to_string());
        Ok(text.to_string())
    }

    async fn load_raw(&self, title: &str) -> Result<Option<String>> {
        Ok(self.raws.lock().unwrap().get(title).cloned())
    }

    async fn save_record(&self, record: &Record) -> Result<PathBuf> {
        let path = PathBuf::from(format!("{}.json", record.id));
        self.records
            .lock()
            .unwrap()
            .insert(path.clone(), serde_json::to_value(record)?);
        Ok(path)
    }

    async fn list_records(&self) -> Result<Vec<PathBuf>> {
        let mut paths: Vec<PathBuf> = self.records.lock().unwrap().keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }

    async fn load_record(&self, path: &Path) -> Result<Value> {
        self.records
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no record at {}", path.display()))
    }

    async fn write_record_value(&self, path: &Path, value: &Value) -> Result<()> {
        self.records
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), value.clone());
        Ok(())
    }

    async fn log_failure(&self, title: &str, error: &str) -> Result<()> {
        self.failures
            .lock()
            .unwrap()
            .push((title.to_string(), error.to_string()));
        Ok(())
    }
}
