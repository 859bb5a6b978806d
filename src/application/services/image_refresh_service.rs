//! Image Refresh Service - Re-resolves image URLs in stored records
//!
//! Records written before media resolution improved may carry bare filenames
//! or legacy `hash_sha1` keys. Each stored record is re-run through the media
//! resolver, using file references mined from the page's stored raw text as
//! fallbacks, and rewritten only when something changed.

use anyhow::Result;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument};

use crate::application::ports::outbound::{MediaInfoPort, RecordStorePort};
use crate::application::services::media_resolver::{is_versioned_url, MediaResolver};
use crate::domain::services::mine_file_references;

/// Key older records stored the media checksum under
const LEGACY_HASH_KEY: &str = "hash_sha1";

/// Path segment preceding the page title in a wiki URL
const WIKI_PATH_MARKER: &str = "/wiki/";

/// Recover the page title from a wiki page URL
pub fn title_from_source_ref(source_ref: &str) -> Option<String> {
    let (_, tail) = source_ref.split_once(WIKI_PATH_MARKER)?;
    let tail = tail.split('#').next().unwrap_or_default();
    let decoded = urlencoding::decode(tail)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| tail.to_string());
    let title = decoded.replace('_', " ").trim().to_string();
    (!title.is_empty()).then_some(title)
}

fn needs_refresh(src: &str) -> bool {
    !src.is_empty() && !is_versioned_url(src)
}

pub struct ImageRefreshService<S: RecordStorePort, M: MediaInfoPort> {
    store: S,
    resolver: MediaResolver<M>,
}

impl<S: RecordStorePort, M: MediaInfoPort> ImageRefreshService<S, M> {
    pub fn new(store: S, resolver: MediaResolver<M>) -> Self {
        Self { store, resolver }
    }

    /// Refresh every stored record; returns how many files were rewritten
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> Result<usize> {
        let mut changed = 0;

        for path in self.store.list_records().await? {
            let mut record = self.store.load_record(&path).await?;
            if self.refresh_record(&mut record).await? {
                self.store.write_record_value(&path, &record).await?;
                debug!(path = %path.display(), "Rewrote record images");
                changed += 1;
            }
        }

        info!(changed, "Image refresh finished");
        Ok(changed)
    }

    /// Refresh one record in place; true when anything was modified
    pub async fn refresh_record(&self, record: &mut Value) -> Result<bool> {
        let has_images = record
            .get("images")
            .and_then(Value::as_array)
            .is_some_and(|images| !images.is_empty());
        if !has_images {
            return Ok(false);
        }

        let candidates = self.fallback_candidates(record).await?;
        let Some(images) = record.get_mut("images").and_then(Value::as_array_mut) else {
            return Ok(false);
        };

        let mut updated = false;
        for image in images.iter_mut().filter_map(Value::as_object_mut) {
            updated |= self.refresh_image(image, &candidates).await;
        }
        Ok(updated)
    }

    async fn refresh_image(&self, image: &mut Map<String, Value>, candidates: &[String]) -> bool {
        let mut updated = image.remove(LEGACY_HASH_KEY).is_some();

        let src = image
            .get("src")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        if !needs_refresh(&src) {
            return updated;
        }

        let resolved = self.resolver.resolve(&src, candidates).await;
        if resolved.src != src {
            image.insert("src".to_string(), Value::String(resolved.src));
            updated = true;
        }

        let metadata = [
            ("mime", resolved.mime.map(Value::from)),
            ("width", resolved.width.map(Value::from)),
            ("height", resolved.height.map(Value::from)),
        ];
        for (key, value) in metadata {
            let Some(value) = value else { continue };
            if image.get(key).map_or(true, Value::is_null) {
                image.insert(key.to_string(), value);
                updated = true;
            }
        }

        updated
    }

    async fn fallback_candidates(&self, record: &Value) -> Result<Vec<String>> {
        let title = record
            .pointer("/provenance/source_ref")
            .and_then(Value::as_str)
            .and_then(title_from_source_ref)
            .or_else(|| {
                record
                    .get("name")
                    .and_then(Value::as_str)
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
            });
        let Some(title) = title else {
            return Ok(Vec::new());
        };

        Ok(self
            .store
            .load_raw(&title)
            .await?
            .map(|raw| mine_file_references(&raw))
            .unwrap_or_default())
    }
}
