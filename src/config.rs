//! Configuration loading for price_sync
//!
//! Credentials and endpoints live in a JSON config file
//! (`conf/config.json` by default); runtime knobs such as the worker
//! count can be overridden from the command line.

use std::path::Path;

use serde::Deserialize;

use crate::error::SyncResult;

/// Top-level configuration, one section per collaborator.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub allegro: AllegroConfig,
    pub prestashop: PrestaShopConfig,
    pub mail: MailConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Allegro OAuth client credentials
#[derive(Debug, Clone, Deserialize)]
pub struct AllegroConfig {
    pub client_id: String,
    pub client_secret: String,
}

/// PrestaShop webservice endpoint and API key
#[derive(Debug, Clone, Deserialize)]
pub struct PrestaShopConfig {
    pub url: String,
    pub api_key: String,
}

/// SMTP account plus the operator-facing mail texts
#[derive(Debug, Clone, Deserialize)]
pub struct MailConfig {
    pub server: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    /// Comma-separated list of recipient addresses
    pub receiver: String,
    /// Subject for the device-approval prompt
    pub auth_subject: String,
    /// Body prefix for the device-approval prompt; the verification
    /// URL is appended to it
    pub auth_content: String,
    /// Subject for the end-of-run report
    pub report_subject: String,
    /// Report and label language, `pl` or `en`
    pub content_lang: String,
}

/// Engine tuning knobs, all optional in the config file
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    #[serde(default = "default_token_path")]
    pub token_path: String,
}

fn default_workers() -> usize {
    10
}

fn default_page_size() -> u64 {
    1000
}

fn default_token_path() -> String {
    "conf/token.json".to_string()
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            page_size: default_page_size(),
            token_path: default_token_path(),
        }
    }
}

impl Config {
    /// Load and parse the JSON config file. A missing or malformed
    /// file aborts the run.
    pub fn load(path: &Path) -> SyncResult<Config> {
        log::debug!("Loading configuration from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        log::debug!("Successfully initialized config");
        Ok(config)
    }
}

/// Report and mismatch-label language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Locale {
    Pl,
    En,
}

impl Locale {
    /// Resolve the configured `content_lang` value. Unrecognized values
    /// fall back to `en` and log a configuration error.
    pub fn from_config(lang: &str) -> Self {
        match lang {
            "pl" => Locale::Pl,
            "en" => Locale::En,
            other => {
                log::error!("Content language \"{other}\" is not supported. Using en instead.");
                Locale::En
            }
        }
    }

    /// Label attached to catalog products without a marketplace match
    pub fn storefront_label(self) -> &'static str {
        match self {
            Locale::Pl => "Niedopasowano PS",
            Locale::En => "Mismatched PS",
        }
    }

    /// Label attached to offers without a catalog match
    pub fn marketplace_label(self) -> &'static str {
        match self {
            Locale::Pl => "Niedopasowano Allegro",
            Locale::En => "Mismatched Allegro",
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
