//! Durable storage for the OAuth token record

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;

/// Token payload as returned by the OAuth provider.
///
/// Unknown provider fields are dropped on read; the fields kept here
/// are the ones the refresh flow needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRecord {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Storage interface for the current token record. Pure storage, no
/// policy: the auth flow decides when to persist or discard.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> SyncResult<Option<TokenRecord>>;
    fn persist(&self, record: &TokenRecord) -> SyncResult<()>;
}

/// Token store backed by a single JSON file.
pub struct JsonFileTokenStore {
    path: PathBuf,
}

impl JsonFileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for JsonFileTokenStore {
    /// A missing or empty file means no stored token; a present but
    /// malformed file is an error.
    fn load(&self) -> SyncResult<Option<TokenRecord>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let record: TokenRecord = serde_json::from_str(&raw)?;
        log::debug!("Successfully retrieved tokens from file");
        Ok(Some(record))
    }

    /// Writes a sibling temp file and renames it over the target, so a
    /// crash mid-write never leaves a truncated token file.
    fn persist(&self, record: &TokenRecord) -> SyncResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(record)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        log::debug!("Successfully stored tokens");
        Ok(())
    }
}

#[cfg(test)]
#[path = "token_store_tests.rs"]
mod tests;
