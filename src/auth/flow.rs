//! Authorization handshake
//!
//! Three-step flow against the OAuth endpoints: obtain a request token,
//! send the user to the consent page, then exchange the approved request
//! token for an access token. The access token is the opaque credential
//! every later API call carries unchanged.

use super::callback;
use super::token_cache::TokenCache;
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::StringMap;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;
use url::Url;

const REQUEST_TOKEN_PATH: &str = "/v3/oauth/request";
const EXCHANGE_TOKEN_PATH: &str = "/v3/oauth/authorize";
const CONSENT_PATH: &str = "/auth/authorize";

/// How long to wait for the user to approve access
const CONSENT_TIMEOUT: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Deserialize)]
struct RequestTokenResponse {
    code: String,
}

/// Access token with the username the service reports for it
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    /// The opaque credential
    pub access_token: String,
    /// Account the token belongs to
    #[serde(default)]
    pub username: Option<String>,
}

/// Drives the one-time interactive authorization handshake
pub struct AuthFlow {
    http: HttpClient,
    consumer_key: String,
    redirect_uri: String,
    api_base_url: String,
}

impl AuthFlow {
    /// Create a flow over a configured transport.
    ///
    /// The transport's base URL must already point at the API host;
    /// `api_base_url` is repeated here for consent-URL construction.
    pub fn new(
        http: HttpClient,
        consumer_key: impl Into<String>,
        redirect_uri: impl Into<String>,
        api_base_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            consumer_key: consumer_key.into(),
            redirect_uri: redirect_uri.into(),
            api_base_url: api_base_url.into(),
        }
    }

    /// Return a usable access token, running the interactive flow if the
    /// cache has none (or `force` is set).
    pub async fn acquire(&self, cache: &TokenCache, force: bool) -> Result<String> {
        if !force {
            if let Some(token) = cache.load() {
                return Ok(token);
            }
        }

        let request_token = self.request_token().await?;
        let consent = self.consent_url(&request_token)?;

        println!("Open this URL in your browser and approve access:\n\n  {consent}\n");
        info!("waiting for the authorization redirect");
        callback::wait_for_redirect(&self.redirect_uri, CONSENT_TIMEOUT).await?;

        let token = self.exchange_token(&request_token).await?;
        cache.save(&token.access_token)?;
        if let Some(username) = &token.username {
            info!(username, "authorized");
        }
        Ok(token.access_token)
    }

    /// Obtain a request token for this application
    pub async fn request_token(&self) -> Result<String> {
        let mut form = StringMap::new();
        form.insert("consumer_key".into(), self.consumer_key.clone());
        form.insert("redirect_uri".into(), self.redirect_uri.clone());

        let response = self.http.post_form(REQUEST_TOKEN_PATH, form).await?;
        let parsed: RequestTokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("malformed request-token response: {e}")))?;
        Ok(parsed.code)
    }

    /// Consent page URL the user must visit to approve the request token
    pub fn consent_url(&self, request_token: &str) -> Result<Url> {
        let mut url = Url::parse(&self.api_base_url)?;
        url.set_path(CONSENT_PATH);
        url.query_pairs_mut()
            .append_pair("request_token", request_token)
            .append_pair("redirect_uri", &self.redirect_uri);
        Ok(url)
    }

    /// Exchange an approved request token for an access token
    pub async fn exchange_token(&self, request_token: &str) -> Result<AccessToken> {
        let mut form = StringMap::new();
        form.insert("consumer_key".into(), self.consumer_key.clone());
        form.insert("code".into(), request_token.to_string());

        let response = self.http.post_form(EXCHANGE_TOKEN_PATH, form).await?;
        response
            .json()
            .await
            .map_err(|e| Error::auth(format!("malformed access-token response: {e}")))
    }
}

impl std::fmt::Debug for AuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthFlow")
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}
