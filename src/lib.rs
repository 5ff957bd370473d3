//! Allegro to PrestaShop price synchronization
//!
//! This library authenticates against the Allegro OAuth device flow,
//! collects prices for all active sale offers, reconciles them against
//! a PrestaShop product catalog by EAN and pushes updated net prices
//! back to the shop.

pub mod allegro;
pub mod config;
pub mod error;
pub mod merge;
pub mod models;
pub mod notifier;
pub mod prestashop;
pub mod report;
pub mod token_store;

pub use allegro::{AllegroApi, AllegroAuth};
pub use config::{Config, Locale};
pub use error::{SyncError, SyncResult};
pub use merge::merge;
pub use models::{
    CatalogEntry, FetchOutcome, PricedOffer, ReconciliationRow, UpdateOutcome, UpdateReport,
};
pub use notifier::{EmailNotifier, Notifier};
pub use prestashop::PrestaShopApi;
pub use token_store::{JsonFileTokenStore, TokenRecord, TokenStore};
