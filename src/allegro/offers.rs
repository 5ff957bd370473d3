//! Concurrent offer-fetch pipeline.
//!
//! Determines the total offer count with a one-item probe, walks the
//! listing in fixed pages and resolves every listed offer on a bounded
//! worker pool. Per-offer failures are logged and drop that offer; a
//! failed page is skipped; only the probe itself is run-fatal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::{AllegroApi, ACCEPT_V1};
use crate::error::{is_connection_reset, SyncError, SyncResult};
use crate::models::{FetchOutcome, PricedOffer};

/// Offer parameter carrying the EAN used as the matching key
const EAN_PARAMETER_ID: &str = "225693";
/// External-reference id marking an offer as excluded from sync
const BLACKLIST_MARKER: &str = "*";

#[derive(Debug, Deserialize)]
struct OfferList {
    #[serde(default)]
    offers: Vec<OfferSummary>,
    #[serde(rename = "totalCount")]
    total_count: u64,
}

#[derive(Debug, Deserialize)]
struct OfferSummary {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OfferDetail {
    #[serde(default)]
    external: Option<ExternalReference>,
    #[serde(default)]
    parameters: Vec<OfferParameter>,
    #[serde(rename = "sellingMode")]
    selling_mode: SellingMode,
}

#[derive(Debug, Deserialize)]
struct ExternalReference {
    id: String,
}

#[derive(Debug, Deserialize)]
struct OfferParameter {
    id: String,
    #[serde(default)]
    values: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SellingMode {
    price: OfferPrice,
}

#[derive(Debug, Deserialize)]
struct OfferPrice {
    amount: String,
}

/// A resolved offer is either priced or excluded by the blacklist
/// marker; blacklisting is policy, not an error.
enum Resolved {
    Priced(PricedOffer),
    Blacklisted,
}

impl AllegroApi {
    /// Total number of active offers, from a one-item probe request.
    pub async fn offer_count(&self) -> SyncResult<u64> {
        let list = self.list_offers(1, 0).await?;
        Ok(list.total_count)
    }

    async fn list_offers(&self, limit: u64, offset: u64) -> SyncResult<OfferList> {
        let url = format!("{}/sale/offers", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("limit", limit.to_string()), ("offset", offset.to_string())])
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_V1)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }
        Ok(serde_json::from_str(&response.text().await?)?)
    }

    /// Fetch and resolve every active offer. Returns the priced offers
    /// plus the number of blacklisted offers that were skipped.
    pub async fn fetch_all(&self) -> SyncResult<FetchOutcome> {
        let total = self.offer_count().await?;
        log::info!("Fetching {total} offers");

        let processed = Arc::new(AtomicUsize::new(0));
        let skipped = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut offers = Vec::new();

        let mut offset = 0u64;
        while offset < total {
            let listing = match self.list_offers(self.page_size, offset).await {
                Ok(listing) => listing,
                Err(e) => {
                    log::error!("Error occurred while listing offers at offset {offset}: {e}");
                    offset += self.page_size;
                    continue;
                }
            };

            let mut tasks: JoinSet<Option<PricedOffer>> = JoinSet::new();
            for summary in listing.offers {
                let api = self.clone();
                let semaphore = Arc::clone(&semaphore);
                let processed = Arc::clone(&processed);
                let skipped = Arc::clone(&skipped);
                tasks.spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return None;
                    };
                    let result = api.resolve_with_retry(&summary.id).await;
                    let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                    match result {
                        Ok(Resolved::Priced(offer)) => {
                            log::info!("{done}/{total}");
                            Some(offer)
                        }
                        Ok(Resolved::Blacklisted) => {
                            skipped.fetch_add(1, Ordering::SeqCst);
                            log::info!("{done}/{total}: product on blacklist - * detected");
                            None
                        }
                        Err(e) => {
                            log::error!(
                                "{done}/{total}: error occurred while getting the price for offer {}: {e}",
                                summary.id
                            );
                            None
                        }
                    }
                });
            }
            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok(Some(offer)) => offers.push(offer),
                    Ok(None) => {}
                    Err(e) => log::error!("Offer task failed: {e}"),
                }
            }

            log::info!(
                "Successfully fetched offers {offset}-{}",
                offset + self.page_size
            );
            offset += self.page_size;
        }

        Ok(FetchOutcome {
            offers,
            skipped: skipped.load(Ordering::SeqCst),
        })
    }

    /// Resolve one offer, retrying exactly once when the connection was
    /// dropped mid-request. Every other failure is terminal for the
    /// offer.
    async fn resolve_with_retry(&self, offer_id: &str) -> SyncResult<Resolved> {
        let mut attempts_left = 1u32;
        loop {
            match self.resolve_offer(offer_id).await {
                Err(SyncError::Network(err))
                    if attempts_left > 0 && is_connection_reset(&err) =>
                {
                    attempts_left -= 1;
                    log::warn!("Trying again due to the dropped connection...");
                }
                Ok(resolved) => {
                    if attempts_left == 0 {
                        log::info!("Successfully got price after retry!");
                    }
                    return Ok(resolved);
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn resolve_offer(&self, offer_id: &str) -> SyncResult<Resolved> {
        let url = format!("{}/sale/offers/{}", self.base_url, offer_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", ACCEPT_V1)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }
        let detail: OfferDetail = serde_json::from_str(&response.text().await?)?;

        if let Some(external) = &detail.external {
            if external.id == BLACKLIST_MARKER {
                return Ok(Resolved::Blacklisted);
            }
        }

        let amount = &detail.selling_mode.price.amount;
        let price: f64 = amount
            .parse()
            .map_err(|_| SyncError::InvalidPrice(amount.clone()))?;

        let key = detail
            .parameters
            .iter()
            .find(|parameter| parameter.id == EAN_PARAMETER_ID)
            .and_then(|parameter| parameter.values.first())
            .cloned();
        if key.is_none() {
            log::warn!("EAN not found for offer {offer_id}");
        }

        Ok(Resolved::Priced(PricedOffer {
            key,
            price,
            offer_id: offer_id.to_string(),
        }))
    }
}

#[cfg(test)]
#[path = "offers_tests.rs"]
mod tests;
