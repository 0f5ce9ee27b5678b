//! On-disk access token cache
//!
//! The token is reused across runs so the interactive handshake only ever
//! happens once per account.

use crate::error::{Error, Result};
use crate::types::OptionStringExt;
use std::fs;
use std::path::{Path, PathBuf};

/// File-backed access token cache
#[derive(Debug, Clone)]
pub struct TokenCache {
    path: PathBuf,
}

impl TokenCache {
    /// Create a cache at the given path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The cache file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cached token, if any
    pub fn load(&self) -> Option<String> {
        fs::read_to_string(&self.path)
            .ok()
            .map(|s| s.trim().to_string())
            .none_if_empty()
    }

    /// Persist a token, replacing any prior one
    pub fn save(&self, token: &str) -> Result<()> {
        fs::write(&self.path, token)
            .map_err(|e| Error::auth(format!("failed to write {}: {e}", self.path.display())))
    }

    /// Remove the cached token. Idempotent.
    pub fn forget(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::auth(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
