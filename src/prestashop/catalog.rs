//! Storefront catalog listing.

use serde::Deserialize;

use super::{IdValue, PrestaShopApi};
use crate::error::{SyncError, SyncResult};
use crate::models::CatalogEntry;

#[derive(Debug, Deserialize)]
struct ProductList {
    #[serde(default)]
    products: Vec<ProductSummary>,
}

#[derive(Debug, Deserialize)]
struct ProductSummary {
    id: IdValue,
    #[serde(default)]
    ean13: Option<String>,
}

impl PrestaShopApi {
    /// Fetch the full product list as `{id, ean13}` pairs. An empty
    /// EAN normalizes to an absent key. Failure here is run-fatal.
    pub async fn fetch_catalog(&self) -> SyncResult<Vec<CatalogEntry>> {
        let url = format!("{}/products?display=[id,ean13]", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", &self.auth_header)
            .header("Output-Format", "JSON")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(SyncError::HttpStatus(response.status()));
        }
        let list: ProductList = serde_json::from_str(&response.text().await?)?;
        log::debug!("Sent get all ids request");

        let entries: Vec<CatalogEntry> = list
            .products
            .into_iter()
            .map(|product| CatalogEntry {
                key: product.ean13.filter(|ean| !ean.is_empty()),
                product_id: product.id.into_string(),
            })
            .collect();
        log::debug!("Fetched {} catalog entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
