//! Collection Service - Crawls a category and writes one record per page
//!
//! A page whose raw text hash has not changed since the previous run is
//! skipped. Per-title failures are appended to the failure log and counted;
//! they never stop the crawl.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::application::ports::outbound::{
    LlmPort, MediaInfoPort, PageSourcePort, RecordStorePort, SchemaValidatorPort,
};
use crate::application::services::reconciliation_service::ReconciliationService;

/// Options for one crawl
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub category: String,
    /// Maximum titles to process; 0 means no limit
    pub limit: usize,
    /// Start after this title when it appears in the listing
    pub resume_from: Option<String>,
}

impl CollectOptions {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            limit: 0,
            resume_from: None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CollectSummary {
    pub written: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum TitleOutcome {
    Written(PathBuf),
    Unchanged,
}

/// Apply `--resume-from` then `--limit` to a category listing
pub fn select_titles(titles: Vec<String>, resume_from: Option<&str>, limit: usize) -> Vec<String> {
    let start = resume_from
        .and_then(|resume| titles.iter().position(|t| t == resume))
        .map(|index| index + 1)
        .unwrap_or(0);

    let remaining = titles.into_iter().skip(start);
    if limit > 0 {
        remaining.take(limit).collect()
    } else {
        remaining.collect()
    }
}

pub struct CollectionService<P, S, L, M, V>
where
    P: PageSourcePort,
    S: RecordStorePort,
    L: LlmPort,
    M: MediaInfoPort,
    V: SchemaValidatorPort,
{
    source: P,
    store: S,
    engine: ReconciliationService<L, M, V>,
}

impl<P, S, L, M, V> CollectionService<P, S, L, M, V>
where
    P: PageSourcePort,
    S: RecordStorePort,
    L: LlmPort,
    M: MediaInfoPort,
    V: SchemaValidatorPort,
{
    pub fn new(source: P, store: S, engine: ReconciliationService<L, M, V>) -> Self {
        Self {
            source,
            store,
            engine,
        }
    }

    /// Crawl the category and reconcile every selected title
    #[instrument(skip(self), fields(category = %options.category))]
    pub async fn collect(&self, options: &CollectOptions) -> Result<CollectSummary> {
        let titles = self
            .source
            .list_category_titles(&options.category)
            .await
            .with_context(|| format!("failed to list category {}", options.category))?;
        let titles = select_titles(titles, options.resume_from.as_deref(), options.limit);
        info!(count = titles.len(), "Collecting titles");

        let mut summary = CollectSummary::default();
        for title in &titles {
            match self.collect_title(title).await {
                Ok(TitleOutcome::Written(path)) => {
                    summary.written += 1;
                    info!(title = %title, path = %path.display(), "Wrote record");
                }
                Ok(TitleOutcome::Unchanged) => {
                    summary.skipped += 1;
                    debug!(title = %title, "Raw text unchanged, skipping");
                }
                Err(e) => {
                    summary.failed += 1;
                    let message = format!("{:#}", e);
                    error!(title = %title, error = %message, "Failed to collect title");
                    if let Err(log_err) = self.store.log_failure(title, &message).await {
                        warn!(title = %title, error = %log_err, "Could not append to failure log");
                    }
                }
            }
        }

        info!(
            written = summary.written,
            skipped = summary.skipped,
            failed = summary.failed,
            "Collection finished"
        );
        Ok(summary)
    }

    async fn collect_title(&self, title: &str) -> Result<TitleOutcome> {
        let page = self
            .source
            .fetch_page(title)
            .await
            .with_context(|| format!("failed to fetch {}", title))?;

        let previous = self.store.raw_hash(title).await?;
        let current = self.store.save_raw(title, &page.text).await?;
        if previous.as_deref() == Some(current.as_str()) {
            return Ok(TitleOutcome::Unchanged);
        }

        let record = self.engine.reconcile(title, &page.url, &page.text).await?;
        let path = self.store.save_record(&record).await?;
        Ok(TitleOutcome::Written(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::media_resolver::MediaResolver;
    use crate::application::services::test_support::{
        CountingValidator, MemoryStore, MockMedia, MockSource, ScriptedLlm,
    };
    use serde_json::json;

    fn titles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn engine(
        validator: CountingValidator,
    ) -> ReconciliationService<ScriptedLlm, MockMedia, CountingValidator> {
        let llm = ScriptedLlm::new(&[json!({"effects": []})]);
        ReconciliationService::new(llm, MediaResolver::new(MockMedia::default()), validator)
    }

    #[test]
    fn test_select_titles() {
        let all = titles(&["A", "B", "C", "D"]);
        assert_eq!(select_titles(all.clone(), None, 0), all);
        assert_eq!(select_titles(all.clone(), Some("B"), 0), titles(&["C", "D"]));
        assert_eq!(select_titles(all.clone(), Some("B"), 1), titles(&["C"]));
        assert_eq!(select_titles(all.clone(), None, 2), titles(&["A", "B"]));
        // unknown resume title starts from the top
        assert_eq!(select_titles(all.clone(), Some("Z"), 0), all);
    }

    #[tokio::test]
    async fn test_collect_writes_and_skips_unchanged() {
        let source = MockSource::default()
            .with_page("Enchanted Boxers", "A pair of boxers.")
            .with_page("Old Sock", "A sock.");
        let store = MemoryStore::default().with_raw("Old Sock", "A sock.");
        let service = CollectionService::new(source, store, engine(CountingValidator::accepting()));

        let summary = service.collect(&CollectOptions::new("Items")).await.unwrap();

        assert_eq!(
            summary,
            CollectSummary {
                written: 1,
                skipped: 1,
                failed: 0
            }
        );
        let record = service.store.record("enchanted-boxers.json").unwrap();
        assert_eq!(record["name"], "Enchanted Boxers");
        assert_eq!(
            record["provenance"]["source_ref"],
            "https://wiki.test/wiki/Enchanted_Boxers"
        );
    }

    #[tokio::test]
    async fn test_changed_raw_text_is_reconciled_again() {
        let source = MockSource::default().with_page("Old Sock", "A smelly sock.");
        let store = MemoryStore::default().with_raw("Old Sock", "A sock.");
        let service = CollectionService::new(source, store, engine(CountingValidator::accepting()));

        let summary = service.collect(&CollectOptions::new("Items")).await.unwrap();

        assert_eq!(summary.written, 1);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_failures_are_logged_and_counted() {
        let mut source = MockSource::default().with_page("Boxers", "A pair of boxers.");
        // listed but never served
        source.titles.push("Ghost".to_string());
        let service = CollectionService::new(
            source,
            MemoryStore::default(),
            engine(CountingValidator::rejecting(usize::MAX)),
        );

        let summary = service.collect(&CollectOptions::new("Items")).await.unwrap();

        assert_eq!(summary.failed, 2);
        assert_eq!(summary.written, 0);
        let failures = service.store.failures.lock().unwrap().clone();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].0, "Boxers");
        assert!(failures[0].1.contains("rejection 3"));
        assert_eq!(failures[1].0, "Ghost");
        assert!(failures[1].1.starts_with("failed to fetch Ghost"));
    }

    #[tokio::test]
    async fn test_resume_and_limit_are_applied() {
        let source = MockSource::default()
            .with_page("A", "a")
            .with_page("B", "b")
            .with_page("C", "c");
        let service = CollectionService::new(
            source,
            MemoryStore::default(),
            engine(CountingValidator::accepting()),
        );
        let options = CollectOptions {
            category: "Items".to_string(),
            limit: 1,
            resume_from: Some("A".to_string()),
        };

        let summary = service.collect(&options).await.unwrap();

        assert_eq!(summary.written, 1);
        assert!(service.store.record("b.json").is_some());
        assert!(service.store.record("c.json").is_none());
    }
}
