//! # Research Roster
//!
//! Collects people associated with a company from public sources, resolves
//! them into unique identities, scores how research-like each one is, and
//! exports the roster as CSV, JSON and a text summary.
//!
//! ## Usage
//!
//! ```sh
//! research_roster --company "Acme AI" --domain acme.ai -o ./out
//! ```
//!
//! ## Architecture
//!
//! 1. **Collecting**: Each source connector queries one public source and yields raw candidates
//! 2. **Normalizing**: Candidates are cleaned, lower-cased and classified (location tier, relevance)
//! 3. **Resolving**: A single resolver task merges candidates into identities and scores them
//! 4. **Output**: The location-filtered roster is written as CSV, JSON and text

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod error;
mod http;
mod models;
mod normalize;
mod outputs;
mod pipeline;
mod resolver;
mod scrapers;
mod utils;

use cli::Cli;
use config::RosterConfig;
use http::Http;
use models::Roster;
use outputs::{json, output_path, summary, table};
use resolver::filter_by_location;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("research_roster starting up");

    let args = Cli::parse();
    debug!(company = %args.company, output_dir = %args.output_dir, config = ?args.config, "Parsed CLI arguments");

    // Early check: ensure output dir is writable before any network work
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let config = Arc::new(RosterConfig::load(args.config.as_deref()).await?);
    let ctx = args.source_context(&config);
    let sources = args.selected_sources();
    let http = Http::from_config(&config.connectors)?;
    info!(
        company = %ctx.company,
        sources = ?sources.iter().map(|s| s.as_str()).collect::<Vec<_>>(),
        concurrency = args.concurrency,
        "Collecting candidates"
    );

    // ---- Collect, normalize and resolve ----
    let (resolver, stats) =
        pipeline::run(&sources, &ctx, &http, Arc::clone(&config), args.concurrency).await?;

    let identities = resolver.finalize();
    let filtered = filter_by_location(&identities, args.min_location);
    let relevant = filtered.iter().filter(|i| i.is_relevant).count();
    info!(
        identities = identities.len(),
        kept = filtered.len(),
        relevant,
        min_location = %args.min_location,
        "Resolution complete"
    );
    if filtered.is_empty() {
        warn!("No identities resolved; writing empty roster");
    }

    let now = Local::now();
    let roster = Roster {
        company: ctx.company.clone(),
        generated_at: now.to_rfc3339(),
        min_location: args.min_location,
        relevance_threshold: config.relevance.threshold,
        stats,
        identities,
        filtered,
    };

    // ---- Output ----
    let date = now.date_naive().to_string();
    let csv_path = output_path(&args.output_dir, &roster, &date, "csv");
    let json_path = output_path(&args.output_dir, &roster, &date, "json");
    let txt_path = output_path(&args.output_dir, &roster, &date, "txt");

    if let Err(e) = table::write_roster(&roster, &csv_path).await {
        error!(path = %csv_path.display(), error = %e, "Failed to write CSV");
    }
    if let Err(e) = json::write_snapshot(&roster, &json_path).await {
        error!(path = %json_path.display(), error = %e, "Failed to write JSON snapshot");
    }
    if let Err(e) = summary::write_summary(&roster, &txt_path).await {
        error!(path = %txt_path.display(), error = %e, "Failed to write text summary");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
