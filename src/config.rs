//! Exporter configuration
//!
//! Central knobs for the export run: API endpoints, credentials source,
//! file locations, page size, and retry behavior. Defaults match the
//! service's documented limits; the consumer key and redirect URI can be
//! overridden through the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the consumer key
pub const CONSUMER_KEY_ENV: &str = "POCKET_CONSUMER_KEY";

/// Environment variable overriding the OAuth redirect URI
pub const REDIRECT_URI_ENV: &str = "POCKET_REDIRECT_URI";

/// Registered consumer key used when the environment provides none
const DEFAULT_CONSUMER_KEY: &str = "114692-452aa92a814fd6b440742ce";

/// Loopback redirect the authorization flow listens on
const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:51337/finish";

/// Base URL of the Pocket API
const DEFAULT_API_BASE_URL: &str = "https://getpocket.com";

/// Checkpoint file written after every retrieved page
const DEFAULT_CHECKPOINT_FILE: &str = ".pocket_checkpoint";

/// Cached access token file name (under the home directory)
const TOKEN_FILE_NAME: &str = ".pocket_access_token";

/// Configuration for an export run
#[derive(Debug, Clone)]
pub struct ExporterConfig {
    /// Application consumer key sent with every API call
    pub consumer_key: String,
    /// Redirect URI registered for the authorization handshake
    pub redirect_uri: String,
    /// Base URL for API requests (overridable for tests)
    pub api_base_url: String,
    /// Where the cached access token lives
    pub token_path: PathBuf,
    /// Where the checkpoint file lives
    pub checkpoint_path: PathBuf,
    /// Items requested per page (clamped to the server cap at run start)
    pub page_size: u32,
    /// Per-request timeout; generous because the service can be slow
    pub request_timeout: Duration,
    /// Transport-level retry attempts per request
    pub max_retries: u32,
    /// Fixed delay between outer retries on connection failures
    pub stall_retry_delay: Duration,
    /// Wall-clock budget for the outer connection-retry loop
    pub max_stall: Duration,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            consumer_key: DEFAULT_CONSUMER_KEY.to_string(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_path: default_token_path(),
            checkpoint_path: PathBuf::from(DEFAULT_CHECKPOINT_FILE),
            page_size: crate::api::MAX_PAGE_SIZE,
            request_timeout: Duration::from_secs(90),
            max_retries: 5,
            stall_retry_delay: Duration::from_secs(5),
            max_stall: Duration::from_secs(15 * 60),
        }
    }
}

impl ExporterConfig {
    /// Create a config from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(key) = std::env::var(CONSUMER_KEY_ENV) {
            if !key.is_empty() {
                config.consumer_key = key;
            }
        }
        if let Ok(uri) = std::env::var(REDIRECT_URI_ENV) {
            if !uri.is_empty() {
                config.redirect_uri = uri;
            }
        }
        config
    }

    /// Set the API base URL
    #[must_use]
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// Set the token cache path
    #[must_use]
    pub fn with_token_path(mut self, path: impl AsRef<Path>) -> Self {
        self.token_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the checkpoint path
    #[must_use]
    pub fn with_checkpoint_path(mut self, path: impl AsRef<Path>) -> Self {
        self.checkpoint_path = path.as_ref().to_path_buf();
        self
    }

    /// Set the requested page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Default location of the cached access token
fn default_token_path() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(TOKEN_FILE_NAME)
}
