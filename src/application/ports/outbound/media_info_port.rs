//! Media info port - Look up hosted media by filename

use async_trait::async_trait;

/// What the wiki knows about one media file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaInfo {
    /// Absolute, versioned URL
    pub url: String,
    pub mime: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub checksum: Option<String>,
}

#[async_trait]
pub trait MediaInfoPort: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Look up a normalized filename; `Ok(None)` when the file is unknown
    async fn lookup(&self, filename: &str) -> Result<Option<MediaInfo>, Self::Error>;
}
