//! PrestaShop webservice clients (catalog listing, price updates)

pub mod catalog;
pub mod product_xml;
pub mod update;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;

use crate::config::PrestaShopConfig;

/// Authenticated PrestaShop webservice client.
#[derive(Clone)]
pub struct PrestaShopApi {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) auth_header: String,
    pub(crate) workers: usize,
}

impl PrestaShopApi {
    pub fn new(config: &PrestaShopConfig, workers: usize) -> Self {
        log::debug!("Creating PrestaShop API client");
        Self::with_base_url(&config.url, &config.api_key, workers)
    }

    /// Client pointed at an arbitrary base URL (for mock servers).
    pub(crate) fn with_base_url(base_url: &str, api_key: &str, workers: usize) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_header: format!("Basic {}", STANDARD.encode(api_key)),
            workers,
        }
    }
}

/// PrestaShop emits ids as numbers on listing and echoes them as
/// strings on update.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum IdValue {
    Number(u64),
    Text(String),
}

impl IdValue {
    pub(crate) fn into_string(self) -> String {
        match self {
            IdValue::Number(n) => n.to_string(),
            IdValue::Text(s) => s,
        }
    }
}

/// Same story for prices.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    pub(crate) fn as_f64(&self) -> Option<f64> {
        match self {
            PriceValue::Number(n) => Some(*n),
            PriceValue::Text(s) => s.parse().ok(),
        }
    }
}
