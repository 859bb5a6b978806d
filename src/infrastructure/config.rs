//! Application configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the model endpoint; only `collect` needs it
    pub openai_api_key: Option<String>,
    /// OpenAI-compatible API base URL
    pub openai_base_url: String,
    /// Model used for drafting records
    pub openai_model: String,

    /// MediaWiki `api.php` endpoint
    pub wiki_api: String,
    /// Prefix joined with a page title to build its URL
    pub wiki_base_url: String,
    /// Contact address sent in the User-Agent
    pub contact_email: String,

    pub data_dir: PathBuf,
    pub raw_dir: PathBuf,
    pub tmp_dir: PathBuf,
    pub schema_path: PathBuf,

    /// Category crawled when none is given
    pub category_root: String,
    /// Series stamped on records whose draft names none
    pub record_series: String,

    /// Pause after every successful wiki request
    pub rate_limit: Duration,
    pub http_timeout: Duration,
    pub http_max_retries: u32,
}

/// Read a variable, treating unset and blank the same
fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let rate_limit: f64 = env_or("RATE_LIMIT_SECONDS", "0.7")
            .parse()
            .context("RATE_LIMIT_SECONDS must be a number of seconds")?;
        let rate_limit = Duration::try_from_secs_f64(rate_limit)
            .context("RATE_LIMIT_SECONDS must be a non-negative number")?;

        Ok(Self {
            openai_api_key: env::var("OPENAI_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            openai_model: env_or("OPENAI_MODEL", "gpt-5-thinking"),

            wiki_api: env_or("WIKI_API", "https://dungeon-crawler-carl.fandom.com/api.php"),
            wiki_base_url: env_or(
                "WIKI_BASE_URL",
                "https://dungeon-crawler-carl.fandom.com/wiki/",
            ),
            contact_email: env_or("CRAWLER_CONTACT_EMAIL", "you@example.com"),

            data_dir: env_or("DATA_DIR", "data/v1/items").into(),
            raw_dir: env_or("RAW_DIR", "data/v1/raw").into(),
            tmp_dir: env_or("TMP_DIR", "data/v1/tmp").into(),
            schema_path: env_or("SCHEMA_PATH", "schemas/dcc-record.schema.json").into(),

            category_root: env_or("CATEGORY_ROOT", "Items"),
            record_series: env_or("RECORD_SERIES", "Dungeon Crawler Carl"),

            rate_limit,
            http_timeout: Duration::from_secs(
                env_or("HTTP_TIMEOUT_SECONDS", "30")
                    .parse()
                    .context("HTTP_TIMEOUT_SECONDS must be a whole number")?,
            ),
            http_max_retries: env_or("HTTP_MAX_RETRIES", "5")
                .parse()
                .context("HTTP_MAX_RETRIES must be a whole number")?,
        })
    }

    /// User-Agent sent to the wiki
    pub fn user_agent(&self) -> String {
        format!("dcc-dnd-collector/1.0 ({})", self.contact_email)
    }

    /// The API key, or an error naming the missing variable
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .context("OPENAI_API_KEY environment variable is required")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_falls_back_on_blank() {
        env::set_var("DCC_TEST_BLANK_VALUE", "   ");
        assert_eq!(env_or("DCC_TEST_BLANK_VALUE", "fallback"), "fallback");
        env::set_var("DCC_TEST_SET_VALUE", " value ");
        assert_eq!(env_or("DCC_TEST_SET_VALUE", "fallback"), "value");
        assert_eq!(env_or("DCC_TEST_UNSET_VALUE", "fallback"), "fallback");
    }

    #[test]
    fn test_user_agent_names_contact() {
        let mut config = AppConfig::from_env().unwrap();
        config.contact_email = "crawler@example.org".to_string();
        assert_eq!(config.user_agent(), "dcc-dnd-collector/1.0 (crawler@example.org)");
    }
}
