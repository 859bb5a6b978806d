//! MediaWiki API client
//!
//! Serves both the page-source and media-info ports. Every request goes
//! through one retry loop: server errors and transport failures back off
//! exponentially, and each successful call is followed by a polite pause.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::application::ports::outbound::{MediaInfo, MediaInfoPort, PageSourcePort, SourcePage};
use crate::infrastructure::config::AppConfig;

/// Largest page the API hands out for category listings
const CATEGORY_PAGE_SIZE: &str = "500";

/// Connection and pacing settings
#[derive(Debug, Clone)]
pub struct MediaWikiSettings {
    pub api_url: String,
    /// Prefix joined with a title to form the page URL
    pub page_base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause after every successful request
    pub rate_limit: Duration,
    /// Total attempts per request
    pub max_attempts: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
}

impl MediaWikiSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            api_url: config.wiki_api.clone(),
            page_base_url: config.wiki_base_url.clone(),
            user_agent: config.user_agent(),
            timeout: config.http_timeout,
            rate_limit: config.rate_limit,
            max_attempts: config.http_max_retries,
            backoff_min: Duration::from_secs(1),
            backoff_max: Duration::from_secs(30),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MediaWikiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Server returned status {0}")]
    Status(u16),
    #[error("API error [{code}]: {info}")]
    Api { code: String, info: String },
    #[error("Unexpected response shape: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Page not found: {0}")]
    MissingPage(String),
}

/// Client for the wiki's `api.php`
#[derive(Clone)]
pub struct MediaWikiClient {
    client: Client,
    settings: MediaWikiSettings,
}

impl MediaWikiClient {
    pub fn new(settings: MediaWikiSettings) -> Result<Self, MediaWikiError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { client, settings })
    }

    /// Public URL of a page
    pub fn page_url(&self, title: &str) -> String {
        format!("{}{}", self.settings.page_base_url, title.replace(' ', "_"))
    }

    /// GET `api.php` with retries, returning the decoded JSON payload
    async fn get(&self, params: &[(&str, String)]) -> Result<Value, MediaWikiError> {
        let attempts = self.settings.max_attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            if let Some(error) = &last_error {
                let delay = self.backoff(attempt - 1);
                warn!(attempt, delay_ms = delay.as_millis() as u64, error = %error, "Retrying wiki request");
                tokio::time::sleep(delay).await;
            }

            let result = self
                .client
                .get(&self.settings.api_url)
                .query(&[("format", "json")])
                .query(params)
                .send()
                .await;

            let response = match result {
                Ok(response) => response,
                Err(e) if is_retryable_error(&e) => {
                    last_error = Some(MediaWikiError::Http(e));
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let status = response.status();
            if is_retryable_status(status) {
                last_error = Some(MediaWikiError::Status(status.as_u16()));
                continue;
            }
            if !status.is_success() {
                return Err(MediaWikiError::Status(status.as_u16()));
            }

            let payload: Value = response.json().await?;
            tokio::time::sleep(self.settings.rate_limit).await;

            if let Some(error) = payload.get("error") {
                let field = |key: &str| {
                    error
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or("unknown")
                        .to_string()
                };
                return Err(MediaWikiError::Api {
                    code: field("code"),
                    info: field("info"),
                });
            }
            return Ok(payload);
        }

        Err(last_error.unwrap_or(MediaWikiError::Status(0)))
    }

    /// Exponential delay for the n-th retry, clamped and lightly jittered
    fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        let delay = self
            .settings
            .backoff_min
            .saturating_mul(1 << exponent)
            .clamp(self.settings.backoff_min, self.settings.backoff_max);
        let jitter = rand::thread_rng().gen_range(0.0..0.1);
        delay + delay.mul_f64(jitter)
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || matches!(
            status,
            StatusCode::REQUEST_TIMEOUT | StatusCode::TOO_MANY_REQUESTS
        )
}

fn is_retryable_error(error: &reqwest::Error) -> bool {
    error.is_timeout() || error.is_connect() || error.is_request()
}

#[async_trait]
impl PageSourcePort for MediaWikiClient {
    type Error = MediaWikiError;

    #[instrument(skip(self))]
    async fn list_category_titles(&self, category: &str) -> Result<Vec<String>, Self::Error> {
        let mut titles = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut params = vec![
                ("action", "query".to_string()),
                ("list", "categorymembers".to_string()),
                ("cmtitle", format!("Category:{}", category)),
                ("cmlimit", CATEGORY_PAGE_SIZE.to_string()),
            ];
            if let Some(token) = &continuation {
                params.push(("cmcontinue", token.clone()));
            }

            let response: CategoryMembersResponse = serde_json::from_value(self.get(&params).await?)?;
            titles.extend(
                response
                    .query
                    .categorymembers
                    .into_iter()
                    .filter(|member| member.ns == 0)
                    .map(|member| member.title),
            );

            continuation = response.continuation.and_then(|c| c.cmcontinue);
            if continuation.is_none() {
                break;
            }
        }

        debug!(count = titles.len(), "Listed category members");
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn fetch_page(&self, title: &str) -> Result<SourcePage, Self::Error> {
        let params = [
            ("action", "query".to_string()),
            ("prop", "revisions".to_string()),
            ("rvprop", "content".to_string()),
            ("rvslots", "main".to_string()),
            ("titles", title.to_string()),
        ];

        let response: PagesResponse = serde_json::from_value(self.get(&params).await?)?;
        let page = response
            .query
            .pages
            .into_values()
            .next()
            .ok_or_else(|| MediaWikiError::MissingPage(title.to_string()))?;
        let text = page
            .revisions
            .into_iter()
            .next()
            .map(|revision| revision.slots.main.content)
            .ok_or_else(|| MediaWikiError::MissingPage(title.to_string()))?;

        Ok(SourcePage {
            title: title.to_string(),
            url: self.page_url(title),
            text,
            page_id: page.pageid,
        })
    }
}

#[async_trait]
impl MediaInfoPort for MediaWikiClient {
    type Error = MediaWikiError;

    async fn lookup(&self, filename: &str) -> Result<Option<MediaInfo>, Self::Error> {
        let params = [
            ("action", "query".to_string()),
            ("prop", "imageinfo".to_string()),
            ("iiprop", "url|mime|size|sha1".to_string()),
            ("titles", format!("File:{}", filename)),
        ];

        let response: ImageInfoResponse = serde_json::from_value(self.get(&params).await?)?;
        let info = response
            .query
            .pages
            .into_values()
            .flat_map(|page| page.imageinfo)
            .find(|info| !info.url.trim().is_empty());

        Ok(info.map(|info| MediaInfo {
            url: info.url,
            mime: info.mime,
            width: info.width,
            height: info.height,
            checksum: info.sha1,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct CategoryMembersResponse {
    query: CategoryQuery,
    #[serde(rename = "continue")]
    continuation: Option<Continuation>,
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    categorymembers: Vec<CategoryMember>,
}

#[derive(Debug, Deserialize)]
struct CategoryMember {
    ns: i64,
    title: String,
}

#[derive(Debug, Deserialize)]
struct Continuation {
    cmcontinue: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PagesResponse {
    query: PagesQuery,
}

#[derive(Debug, Deserialize)]
struct PagesQuery {
    #[serde(default)]
    pages: HashMap<String, Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    pageid: Option<u64>,
    #[serde(default)]
    revisions: Vec<Revision>,
}

#[derive(Debug, Deserialize)]
struct Revision {
    slots: Slots,
}

#[derive(Debug, Deserialize)]
struct Slots {
    main: Slot,
}

#[derive(Debug, Deserialize)]
struct Slot {
    #[serde(rename = "*")]
    content: String,
}

#[derive(Debug, Deserialize)]
struct ImageInfoResponse {
    query: ImageInfoQuery,
}

#[derive(Debug, Deserialize)]
struct ImageInfoQuery {
    #[serde(default)]
    pages: HashMap<String, ImagePage>,
}

#[derive(Debug, Deserialize)]
struct ImagePage {
    #[serde(default)]
    imageinfo: Vec<ImageInfo>,
}

#[derive(Debug, Deserialize)]
struct ImageInfo {
    #[serde(default)]
    url: String,
    mime: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    sha1: Option<String>,
}
