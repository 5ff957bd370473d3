//! Allegro API clients (OAuth device flow, sale offers)

pub mod auth;
pub mod offers;

pub use auth::AllegroAuth;

use reqwest::Client;

/// Production REST API endpoint
pub const API_URL: &str = "https://api.allegro.pl";
/// Production OAuth endpoint
pub const AUTH_URL: &str = "https://allegro.pl/auth/oauth";

/// Every REST call must request the versioned media type.
pub(crate) const ACCEPT_V1: &str = "application/vnd.allegro.public.v1+json";

/// Authenticated Allegro REST client used by the offer-fetch pipeline.
#[derive(Clone)]
pub struct AllegroApi {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) token: String,
    pub(crate) workers: usize,
    pub(crate) page_size: u64,
}

impl AllegroApi {
    pub fn new(token: String, workers: usize, page_size: u64) -> Self {
        log::debug!("Creating Allegro API client");
        Self::with_base_url(API_URL, token, workers, page_size)
    }

    /// Client pointed at an arbitrary base URL (for mock servers).
    pub(crate) fn with_base_url(
        base_url: &str,
        token: String,
        workers: usize,
        page_size: u64,
    ) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            workers,
            page_size,
        }
    }
}
