//! Page source port - Category listing and page text

use async_trait::async_trait;

/// One fetched wiki page
#[derive(Debug, Clone, PartialEq)]
pub struct SourcePage {
    pub title: String,
    pub url: String,
    pub text: String,
    pub page_id: Option<u64>,
}

#[async_trait]
pub trait PageSourcePort: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Article titles in a category, in listing order
    async fn list_category_titles(&self, category: &str) -> Result<Vec<String>, Self::Error>;

    async fn fetch_page(&self, title: &str) -> Result<SourcePage, Self::Error>;
}
