//! Shared data types flowing between the fetch, merge and update stages

/// One marketplace offer with its resolved price and matching key.
///
/// `key` is `None` when the offer carries no EAN parameter; such offers
/// always end up in the unmatched-marketplace bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOffer {
    pub key: Option<String>,
    pub price: f64,
    pub offer_id: String,
}

/// One storefront product as listed by the catalog endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub key: Option<String>,
    pub product_id: String,
}

/// Classified outcome of reconciling one offer or catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconciliationRow {
    /// Offer and catalog entry agree on a key; eligible for update
    Matched {
        key: String,
        product_id: String,
        price: f64,
    },
    /// Catalog product without a counterpart on the marketplace
    UnmatchedStorefront {
        label: &'static str,
        product_id: String,
    },
    /// Marketplace offer without a counterpart in the catalog
    UnmatchedMarketplace {
        label: &'static str,
        offer_id: String,
    },
}

impl ReconciliationRow {
    /// One report line for an unmatched row, `None` for matched rows.
    pub fn summary_line(&self) -> Option<String> {
        match self {
            ReconciliationRow::Matched { .. } => None,
            ReconciliationRow::UnmatchedStorefront { label, product_id } => {
                Some(format!("{label} {product_id}"))
            }
            ReconciliationRow::UnmatchedMarketplace { label, offer_id } => {
                Some(format!("{label} {offer_id}"))
            }
        }
    }
}

/// Offers collected from the marketplace plus the blacklist skip count.
#[derive(Debug)]
pub struct FetchOutcome {
    pub offers: Vec<PricedOffer>,
    pub skipped: usize,
}

/// Result of one product update attempt chain.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOutcome {
    pub product_id: String,
    pub success: bool,
    pub retried: bool,
}

/// Aggregated result of the update phase.
///
/// `updated_ids` records every dispatched product id at dispatch time,
/// whether or not its update later verified; `outcomes` carries the
/// per-product truth for callers that need it.
#[derive(Debug)]
pub struct UpdateReport {
    pub updated_ids: Vec<String>,
    pub outcomes: Vec<UpdateOutcome>,
    pub not_updated: Vec<ReconciliationRow>,
    pub skipped: usize,
}
