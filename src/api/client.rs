//! Paged retrieval client
//!
//! Translates one (offset, page size) pair into one network call against
//! the retrieval endpoint and parses the structured response. No side
//! effects beyond the call itself; retry behavior lives in the transport
//! tier and in the driver.

use super::types::{Credential, PageRequest, PageResponse, RawPage, RETRIEVE_PATH};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::StringMap;

/// Client for the saved-item collection endpoint
pub struct PocketClient {
    http: HttpClient,
    credential: Credential,
}

impl PocketClient {
    /// Create a client from a configured transport and credential.
    ///
    /// The transport's base URL must point at the API host.
    pub fn new(http: HttpClient, credential: Credential) -> Self {
        Self { http, credential }
    }

    /// Fetch one page of the collection.
    ///
    /// Returns the page's items in server order plus the advisory total
    /// count. Transport failures and retryable statuses are retried inside
    /// the HTTP layer; whatever arrives here is either a page or a
    /// classified error.
    pub async fn fetch_page(&self, request: PageRequest) -> Result<PageResponse> {
        let response = self
            .http
            .post_form(RETRIEVE_PATH, self.form_fields(request))
            .await?;

        let body = response.text().await.map_err(Error::Http)?;
        let raw: RawPage = serde_json::from_str(&body)
            .map_err(|e| Error::decode(format!("malformed retrieval response: {e}")))?;
        Ok(raw.into_page())
    }

    /// Form fields for one page request.
    ///
    /// `state=all` + `detailType=complete` + `sort=newest` are fixed: the
    /// export always walks the whole collection newest-first with full
    /// detail, and `total=1` asks the server to report the collection size.
    fn form_fields(&self, request: PageRequest) -> StringMap {
        let mut form = StringMap::new();
        form.insert("consumer_key".into(), self.credential.consumer_key.clone());
        form.insert("access_token".into(), self.credential.access_token.clone());
        form.insert("state".into(), "all".into());
        form.insert("detailType".into(), "complete".into());
        form.insert("sort".into(), "newest".into());
        form.insert("count".into(), request.page_size.to_string());
        form.insert("offset".into(), request.offset.to_string());
        form.insert("total".into(), "1".into());
        form
    }
}

impl std::fmt::Debug for PocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credential stays out of debug output
        f.debug_struct("PocketClient").finish_non_exhaustive()
    }
}
