//! Concurrent price-update pipeline with echo verification.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::product_xml::rewrite_product_xml;
use super::{IdValue, PrestaShopApi, PriceValue};
use crate::error::{SyncError, SyncResult};
use crate::models::{ReconciliationRow, UpdateOutcome, UpdateReport};

/// Fixed gross-to-net divisor applied to every pushed price
pub const TAX_DIVISOR: f64 = 1.23;

/// Net price rounded to two decimal places.
pub fn net_price(gross: f64) -> f64 {
    (gross / TAX_DIVISOR * 100.0).round() / 100.0
}

#[derive(Debug, Deserialize)]
struct UpdateEcho {
    product: EchoProduct,
}

#[derive(Debug, Deserialize)]
struct EchoProduct {
    id: IdValue,
    price: PriceValue,
}

impl PrestaShopApi {
    /// Update every matched row on a bounded worker pool; every other
    /// row variant lands in `not_updated` untouched.
    ///
    /// Dispatched ids are recorded in `updated_ids` up front, before
    /// their updates verify; per-row verification results are in
    /// `outcomes`.
    pub async fn update_all(
        &self,
        rows: Vec<ReconciliationRow>,
        skipped: usize,
    ) -> UpdateReport {
        let mut not_updated = Vec::new();
        let mut dispatch = Vec::new();
        for row in rows {
            match row {
                ReconciliationRow::Matched {
                    product_id, price, ..
                } => dispatch.push((product_id, price)),
                other => not_updated.push(other),
            }
        }

        let total = dispatch.len();
        let updated_ids: Vec<String> = dispatch.iter().map(|(id, _)| id.clone()).collect();
        let completed = Arc::new(AtomicUsize::new(0));
        let semaphore = Arc::new(Semaphore::new(self.workers));

        let mut tasks: JoinSet<Option<UpdateOutcome>> = JoinSet::new();
        for (product_id, price) in dispatch {
            let api = self.clone();
            let semaphore = Arc::clone(&semaphore);
            let completed = Arc::clone(&completed);
            tasks.spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return None;
                };
                let outcome = api.update_one(&product_id, price).await;
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                log::info!("{done}/{total}");
                Some(outcome)
            });
        }

        let mut outcomes = Vec::with_capacity(total);
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some(outcome)) => outcomes.push(outcome),
                Ok(None) => {}
                Err(e) => log::error!("Update task failed: {e}"),
            }
        }

        UpdateReport {
            updated_ids,
            outcomes,
            not_updated,
            skipped,
        }
    }

    /// Update one product, retrying exactly once on a server-side
    /// error or request timeout. A verification mismatch is terminal
    /// and never retried.
    pub(crate) async fn update_one(&self, product_id: &str, gross: f64) -> UpdateOutcome {
        let net = net_price(gross);
        let mut attempts_left = 1u32;
        let mut retried = false;
        loop {
            match self.update_attempt(product_id, net).await {
                Ok(()) => {
                    log::debug!("Successfully updated product {product_id}");
                    if retried {
                        log::info!("Successfully updated product {product_id} after retry!");
                    }
                    return UpdateOutcome {
                        product_id: product_id.to_string(),
                        success: true,
                        retried,
                    };
                }
                Err(SyncError::Verification { .. }) => {
                    log::error!("Undefined error occurred while updating product {product_id}");
                    return UpdateOutcome {
                        product_id: product_id.to_string(),
                        success: false,
                        retried,
                    };
                }
                Err(err) if attempts_left > 0 && is_retryable(&err) => {
                    attempts_left -= 1;
                    retried = true;
                    log::warn!("Trying again due to: {err}");
                }
                Err(err) => {
                    log::error!("Error occurred while updating product {product_id}: {err}");
                    return UpdateOutcome {
                        product_id: product_id.to_string(),
                        success: false,
                        retried,
                    };
                }
            }
        }
    }

    /// One full update round trip: fetch the document, rewrite it,
    /// write it back, verify the echo.
    async fn update_attempt(&self, product_id: &str, net: f64) -> SyncResult<()> {
        let get_url = format!("{}/products/{}", self.base_url, product_id);
        let response = self
            .client
            .get(&get_url)
            .header("Authorization", &self.auth_header)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }
        let xml = response.text().await?;
        log::debug!("Sent get xml form request");

        let net_text = format!("{net:.2}");
        let body = rewrite_product_xml(&xml, &net_text)?;

        let put_url = format!("{}/products", self.base_url);
        let response = self
            .client
            .put(&put_url)
            .header("Authorization", &self.auth_header)
            .header("Io-Format", "JSON")
            .body(body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }
        let echo: UpdateEcho = serde_json::from_str(&response.text().await?)?;
        log::debug!("Sent update price request");

        let echoed_price = echo.product.price.as_f64();
        let id_matches = echo.product.id.into_string() == product_id;
        let price_matches = echoed_price.is_some_and(|p| (p - net).abs() < 0.005);
        if id_matches && price_matches {
            Ok(())
        } else {
            Err(SyncError::Verification {
                product_id: product_id.to_string(),
            })
        }
    }
}

fn is_retryable(err: &SyncError) -> bool {
    match err {
        SyncError::HttpStatus(status) => status.is_server_error(),
        SyncError::Network(e) => e.is_timeout(),
        _ => false,
    }
}

#[cfg(test)]
#[path = "update_tests.rs"]
mod tests;
