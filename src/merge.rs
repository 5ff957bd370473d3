//! Catalog reconciliation.
//!
//! Matches marketplace offers against catalog entries by exact key
//! equality and classifies every input into matched or per-side
//! unmatched rows. Keys are compared verbatim; no case or whitespace
//! normalization is applied.

use std::collections::{HashMap, VecDeque};

use crate::config::Locale;
use crate::models::{CatalogEntry, PricedOffer, ReconciliationRow};

/// Merge the storefront catalog with the fetched offer prices.
///
/// First match wins in catalog listing order, and each offer and each
/// catalog entry is consumed at most once. Output order is matched
/// rows in offer order, then unmatched catalog entries in listing
/// order, then unmatched offers in offer order.
pub fn merge(
    catalog: Vec<CatalogEntry>,
    offers: Vec<PricedOffer>,
    content_lang: &str,
) -> Vec<ReconciliationRow> {
    let locale = Locale::from_config(content_lang);

    // Candidate catalog indices per key, preserving listing order so
    // the earliest entry is matched first.
    let mut by_key: HashMap<&str, VecDeque<usize>> = HashMap::new();
    for (index, entry) in catalog.iter().enumerate() {
        if let Some(key) = entry.key.as_deref() {
            by_key.entry(key).or_default().push_back(index);
        }
    }

    let mut taken = vec![false; catalog.len()];
    let mut rows = Vec::with_capacity(catalog.len() + offers.len());
    let mut unmatched_marketplace = Vec::new();

    for offer in &offers {
        let candidate = offer
            .key
            .as_deref()
            .and_then(|key| by_key.get_mut(key))
            .and_then(VecDeque::pop_front);
        match (offer.key.as_deref(), candidate) {
            (Some(key), Some(index)) => {
                taken[index] = true;
                log::debug!("Successfully merged product: {key}");
                rows.push(ReconciliationRow::Matched {
                    key: key.to_string(),
                    product_id: catalog[index].product_id.clone(),
                    price: offer.price,
                });
            }
            _ => {
                log::debug!("Mismatched offer: {}", offer.offer_id);
                unmatched_marketplace.push(ReconciliationRow::UnmatchedMarketplace {
                    label: locale.marketplace_label(),
                    offer_id: offer.offer_id.clone(),
                });
            }
        }
    }

    for (index, entry) in catalog.iter().enumerate() {
        if !taken[index] {
            log::debug!("Mismatched product: {}", entry.product_id);
            rows.push(ReconciliationRow::UnmatchedStorefront {
                label: locale.storefront_label(),
                product_id: entry.product_id.clone(),
            });
        }
    }
    rows.extend(unmatched_marketplace);

    log::info!("Successfully merged lists");
    rows
}

#[cfg(test)]
#[path = "merge_tests.rs"]
mod tests;
