//! Media Resolver - Turns image references into absolute media URLs
//!
//! References arrive as bare filenames, `[[File:...]]` links or URLs. Each is
//! reduced to a normalized filename and looked up through the media-info port.
//! Lookups are memoized for the lifetime of the resolver, misses included.

use std::collections::HashMap;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::application::ports::outbound::{MediaInfo, MediaInfoPort};

/// Path marker of a canonical, versioned media URL
const REVISION_MARKER: &str = "/revision/";

/// Outcome of resolving one reference
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedMedia {
    pub src: String,
    pub mime: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub hash: Option<String>,
}

impl ResolvedMedia {
    fn unresolved(reference: &str) -> Self {
        Self {
            src: reference.to_string(),
            mime: None,
            width: None,
            height: None,
            hash: None,
        }
    }
}

impl From<MediaInfo> for ResolvedMedia {
    fn from(info: MediaInfo) -> Self {
        Self {
            src: info.url,
            mime: info.mime,
            width: info.width,
            height: info.height,
            hash: info.checksum,
        }
    }
}

pub fn is_absolute_url(value: &str) -> bool {
    let lowered = value.trim_start().to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Absolute URL that already points at a specific media revision
pub fn is_versioned_url(value: &str) -> bool {
    is_absolute_url(value) && value.contains(REVISION_MARKER)
}

/// Reduce a reference to the filename the wiki knows it by.
///
/// Query strings are dropped, percent-escapes decoded, `File:`/`Image:`
/// prefixes removed and underscores read as spaces.
pub fn normalize_filename(reference: &str) -> Option<String> {
    let trimmed = reference.trim();
    let without_query = trimmed.split(['?', '#']).next().unwrap_or_default();

    let raw = if is_absolute_url(without_query) {
        without_query
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or_default()
    } else {
        without_query
            .trim_start_matches("[[")
            .trim_end_matches("]]")
            .split('|')
            .next()
            .unwrap_or_default()
    };

    let decoded = urlencoding::decode(raw)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    let decoded = decoded.trim();
    let lowered = decoded.to_ascii_lowercase();
    let name = if lowered.starts_with("file:") {
        &decoded[5..]
    } else if lowered.starts_with("image:") {
        &decoded[6..]
    } else {
        decoded
    };

    let name = name.replace('_', " ").trim().to_string();
    (!name.is_empty()).then_some(name)
}

/// Memoizing resolver over a media-info collaborator
pub struct MediaResolver<M: MediaInfoPort> {
    media: M,
    /// Lowercase filename to lookup result; `None` marks a known miss
    cache: Mutex<HashMap<String, Option<MediaInfo>>>,
}

impl<M: MediaInfoPort> MediaResolver<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve a reference, walking `candidates` when it does not resolve.
    ///
    /// Never fails: an unresolvable reference comes back unchanged.
    pub async fn resolve(&self, reference: &str, candidates: &[String]) -> ResolvedMedia {
        if is_versioned_url(reference.trim()) {
            return ResolvedMedia::unresolved(reference);
        }

        if let Some(name) = normalize_filename(reference) {
            if let Some(info) = self.lookup(&name).await {
                return info.into();
            }
        }

        for candidate in candidates {
            let Some(name) = normalize_filename(candidate) else {
                continue;
            };
            if let Some(info) = self.lookup(&name).await {
                if is_absolute_url(&info.url) {
                    debug!(reference, candidate = %name, "Resolved image through fallback candidate");
                    return info.into();
                }
            }
        }

        debug!(reference, "Image reference left unresolved");
        ResolvedMedia::unresolved(reference)
    }

    async fn lookup(&self, name: &str) -> Option<MediaInfo> {
        let key = name.to_lowercase();
        // Held across the call so concurrent callers never duplicate a lookup
        let mut cache = self.cache.lock().await;
        if let Some(hit) = cache.get(&key) {
            return hit.clone();
        }

        debug!(filename = name, "Media cache miss");
        match self.media.lookup(name).await {
            Ok(info) => {
                let info = info.filter(|i| !i.url.trim().is_empty());
                cache.insert(key, info.clone());
                info
            }
            Err(e) => {
                warn!(filename = name, error = %e, "Media lookup failed");
                None
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn media(&self) -> &M {
        &self.media
    }
}
