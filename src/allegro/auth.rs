//! OAuth device-flow authorization against Allegro.
//!
//! The flow prefers a stored refresh token; when the provider rejects
//! it (or no token is stored) a device-code grant is started and the
//! operator is mailed the verification URL while the token endpoint is
//! polled at the provider-specified interval.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::Deserialize;

use super::AUTH_URL;
use crate::config::AllegroConfig;
use crate::error::{SyncError, SyncResult};
use crate::notifier::Notifier;
use crate::token_store::{TokenRecord, TokenStore};

const DEVICE_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:device_code";

/// Transient device-code grant; lives for one authorization attempt.
#[derive(Debug, Deserialize)]
pub struct DeviceGrant {
    pub device_code: String,
    pub verification_uri_complete: String,
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Owns the device-flow state machine and the persisted token record.
pub struct AllegroAuth {
    client: Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
    store: Box<dyn TokenStore>,
}

impl AllegroAuth {
    pub fn new(config: &AllegroConfig, store: Box<dyn TokenStore>) -> Self {
        Self::with_auth_url(AUTH_URL, config, store)
    }

    /// Authorizer pointed at an arbitrary OAuth endpoint (for mock
    /// servers).
    pub(crate) fn with_auth_url(
        auth_url: &str,
        config: &AllegroConfig,
        store: Box<dyn TokenStore>,
    ) -> Self {
        Self {
            client: Client::new(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            store,
        }
    }

    fn basic_secret(&self) -> String {
        format!(
            "Basic {}",
            STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
        )
    }

    /// Produce a valid bearer token, refreshing the stored record when
    /// possible and falling back to a fresh device grant when the
    /// provider rejects the refresh. Transport errors abort the run;
    /// there is no fallback from a broken network to a cached token.
    pub async fn authorize(
        &self,
        notifier: &dyn Notifier,
        subject: &str,
        content: &str,
    ) -> SyncResult<String> {
        let token = match self.store.load()? {
            Some(record) => match self.refresh(&record).await? {
                Some(token) => {
                    log::debug!("Authorized by refresh token");
                    token
                }
                None => {
                    log::info!("Refresh token rejected, starting device authorization");
                    self.device_grant(notifier, subject, content).await?
                }
            },
            None => self.device_grant(notifier, subject, content).await?,
        };
        log::info!("Successfully authorized - Allegro");
        Ok(token)
    }

    /// One refresh request. `Ok(Some)` on success, `Ok(None)` when the
    /// provider answered with an error payload (caller falls through to
    /// the device grant), `Err` on transport failures or an
    /// unrecognizable response.
    async fn refresh(&self, record: &TokenRecord) -> SyncResult<Option<String>> {
        let url = format!("{}/token", self.auth_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", record.refresh_token.as_str()),
            ])
            .header("Authorization", self.basic_secret())
            .send()
            .await?;
        let text = response.text().await?;

        if let Ok(refreshed) = serde_json::from_str::<TokenRecord>(&text) {
            self.store.persist(&refreshed)?;
            return Ok(Some(refreshed.access_token));
        }
        if let Ok(err) = serde_json::from_str::<ProviderError>(&text) {
            log::debug!("Refresh rejected: {}", err.error);
            return Ok(None);
        }
        Err(SyncError::Auth(
            "undefined response while refreshing the token".to_string(),
        ))
    }

    async fn device_grant(
        &self,
        notifier: &dyn Notifier,
        subject: &str,
        content: &str,
    ) -> SyncResult<String> {
        let url = format!("{}/device", self.auth_url);
        let response = self
            .client
            .post(&url)
            .query(&[("client_id", self.client_id.as_str())])
            .header("Authorization", self.basic_secret())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }
        let grant: DeviceGrant = serde_json::from_str(&response.text().await?)?;

        // A broken mail path must not abort the grant; the operator
        // can still be reached out-of-band.
        let prompt = format!("{content}{}", grant.verification_uri_complete);
        if let Err(e) = notifier.send(subject, &prompt) {
            log::error!("Something went wrong with mail: {e}");
        } else {
            log::info!("Successfully sent token authorization email");
        }

        self.poll(&grant).await
    }

    /// Poll the token endpoint until the operator approves. The wait is
    /// intentionally unbounded and paced by the provider interval; any
    /// error code other than `authorization_pending` aborts.
    async fn poll(&self, grant: &DeviceGrant) -> SyncResult<String> {
        let url = format!("{}/token", self.auth_url);
        loop {
            let response = self
                .client
                .post(&url)
                .query(&[
                    ("grant_type", DEVICE_GRANT_TYPE),
                    ("device_code", grant.device_code.as_str()),
                ])
                .header("Authorization", self.basic_secret())
                .send()
                .await?;
            let text = response.text().await?;

            if let Ok(record) = serde_json::from_str::<TokenRecord>(&text) {
                self.store.persist(&record)?;
                log::debug!("Token access granted");
                return Ok(record.access_token);
            }

            let err: ProviderError = serde_json::from_str(&text)?;
            if err.error != "authorization_pending" {
                return Err(SyncError::Auth(match err.error_description {
                    Some(description) => format!("{}: {description}", err.error),
                    None => err.error,
                }));
            }
            log::info!("Authorization pending...");
            tokio::time::sleep(Duration::from_secs(grant.interval)).await;
        }
    }
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
