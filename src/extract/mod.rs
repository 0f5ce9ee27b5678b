//! Article content extraction
//!
//! Each saved item's URL is fetched and run through a readability pass to
//! recover the article body. One URL, one independently-failing I/O call;
//! failures are the caller's to collect.

use crate::error::{Error, Result};
use crate::http::HttpClient;
use async_trait::async_trait;
use url::Url;

/// Readable content recovered from one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Page title
    pub title: String,
    /// Cleaned article HTML
    pub html: String,
    /// Plain text of the article
    pub text: String,
}

/// Extraction seam, injectable so the enrichment pass can be tested
/// without a network.
#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Fetch one URL and return its readable content
    async fn extract(&self, url: &Url) -> Result<Article>;
}

/// Extractor backed by the shared HTTP client and a readability pass
pub struct ReadabilityExtractor {
    http: HttpClient,
}

impl ReadabilityExtractor {
    /// Create an extractor over a configured transport
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ArticleExtractor for ReadabilityExtractor {
    async fn extract(&self, url: &Url) -> Result<Article> {
        let response = self.http.get(url.as_str()).await?;
        let body = response.text().await.map_err(Error::Http)?;

        let product = readability::extractor::extract(&mut body.as_bytes(), url)
            .map_err(|e| Error::extraction(format!("{url}: {e:?}")))?;

        Ok(Article {
            title: product.title,
            html: product.content,
            text: product.text,
        })
    }
}

impl std::fmt::Debug for ReadabilityExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadabilityExtractor").finish()
    }
}
