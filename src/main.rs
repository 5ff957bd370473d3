//! Price Sync - Allegro to PrestaShop price synchronization
//!
//! Thin orchestration entry point: authorize, fetch offer prices,
//! reconcile against the shop catalog, push updates, mail the report.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use price_sync::{
    merge, report, AllegroApi, AllegroAuth, Config, EmailNotifier, JsonFileTokenStore, Notifier,
    PrestaShopApi,
};

/// Synchronizes product prices from Allegro offers to a PrestaShop catalog
#[derive(Parser, Debug)]
#[command(name = "price_sync")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "conf/config.json")]
    config: String,

    /// Override the configured worker pool size
    #[arg(long)]
    workers: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config =
        Config::load(Path::new(&args.config)).context("Failed to load configuration")?;
    let workers = args.workers.unwrap_or(config.sync.workers);

    log::info!("Starting price_sync with {workers} workers");

    let notifier = EmailNotifier::new(config.mail.clone());
    let store = JsonFileTokenStore::new(&config.sync.token_path);
    let auth = AllegroAuth::new(&config.allegro, Box::new(store));
    let token = auth
        .authorize(
            &notifier,
            &config.mail.auth_subject,
            &config.mail.auth_content,
        )
        .await
        .context("Authorization failed")?;

    let allegro = AllegroApi::new(token, workers, config.sync.page_size);
    let outcome = allegro
        .fetch_all()
        .await
        .context("Fetching offers failed")?;
    log::info!(
        "Fetched {} priced offers, {} skipped",
        outcome.offers.len(),
        outcome.skipped
    );

    let prestashop = PrestaShopApi::new(&config.prestashop, workers);
    let catalog = prestashop
        .fetch_catalog()
        .await
        .context("Fetching catalog failed")?;

    let rows = merge(catalog, outcome.offers, &config.mail.content_lang);
    let update_report = prestashop.update_all(rows, outcome.skipped).await;
    log::info!(
        "Updated {} products, {} not updated",
        update_report.updated_ids.len(),
        update_report.not_updated.len()
    );

    let body = report::render(&update_report, &config.mail.content_lang);
    if let Err(e) = notifier.send(&config.mail.report_subject, &body) {
        log::error!("Something went wrong with mail: {e}");
    } else {
        log::info!("Successfully sent report");
    }

    Ok(())
}
