//! # News Query
//!
//! Browse top headlines and search news articles from the GNews API from the
//! terminal. Without an API key, or whenever the provider is unreachable,
//! results come from a small built-in dataset so the tool always has
//! something to show.
//!
//! ## Usage
//!
//! ```sh
//! news_query -c technology --pages 2 -l list
//! news_query -q "space" --detail 1
//! ```
//!
//! ## Architecture
//!
//! 1. **Client** ([`api::NewsClient`]): one provider call per request, normalized
//!    into canonical articles, with mock-data fallback
//! 2. **Controller** ([`controller::NewsQueryController`]): filters, paging,
//!    loading/error transitions, and the observable snapshot
//! 3. **Output** ([`outputs`]): terminal layouts and JSON snapshot files

use chrono::Utc;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod controller;
mod error;
mod mock;
mod models;
mod outputs;
mod utils;

use api::NewsClient;
use cli::Cli;
use config::Config;
use controller::NewsQueryController;
use outputs::{json, text};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    let args = Cli::parse();
    debug!(?args.query, ?args.category, args.pages, "Parsed CLI arguments");

    // ---- Configuration ----
    let base_config = match &args.config {
        Some(path) => Config::load(path).await?,
        None => Config::default(),
    };
    let config = args.apply_to(base_config);
    config.validate()?;

    let controller = NewsQueryController::new(NewsClient::from_config(config)?);
    if controller.client().is_offline() {
        warn!("No GNews API key configured; using the built-in sample articles");
    }

    let mut updates = controller.subscribe();
    tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update();
            debug!(
                loading = state.loading,
                articles = state.articles.len(),
                error = ?state.error,
                "Snapshot updated"
            );
        }
    });

    // ---- First page ----
    let update = args.filter_update();
    match args.query.as_deref() {
        Some(query) => controller.search(query, update).await,
        None => controller.fetch(update).await,
    }

    if controller.snapshot().error.is_some() {
        warn!("First request failed; retrying once");
        controller.retry().await;
    }

    // ---- Further pages ----
    for _ in 1..args.pages {
        if !controller.snapshot().has_more {
            info!("No more pages available");
            break;
        }
        controller.load_more().await;
        if controller.snapshot().error.is_some() {
            controller.retry().await;
        }
    }

    let state = controller.snapshot();
    let now = Utc::now();

    // ---- Output ----
    match args.detail {
        Some(n) => match n.checked_sub(1).and_then(|i| state.articles.get(i)) {
            Some(article) => print!("{}", text::render_detail(article, now)),
            None => {
                error!(requested = n, available = state.articles.len(), "No such article");
                let loaded = state.articles.len();
                return Err(format!("article {n} not found ({loaded} loaded)").into());
            }
        },
        None => print!("{}", text::render(&state, args.layout, args.sort, now)),
    }

    if let Some(path) = &args.json_output {
        if let Err(e) = json::write_snapshot(&state, path).await {
            error!(path = %path, error = %e, "Failed to write JSON snapshot");
            return Err(e.into());
        }
    }

    let filters = controller.filters().await;
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        ?filters,
        articles = state.articles.len(),
        total = state.total_results,
        "Execution complete"
    );

    if let Some(message) = state.error {
        error!(error = %message, "Query did not recover");
        return Err(message.into());
    }
    Ok(())
}
