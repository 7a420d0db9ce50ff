//! Review miner binary entrypoint.
//! Runs one ingest pass: reviews from a JSON document → classifier → CSV store.
//!
//! Env:
//!   REVIEWS_INPUT_PATH  JSON document with the reviews (required)
//!   REVIEW_BUSINESS     business identifier used as fallback record name
//!   REVIEW_CONFIG_PATH, REVIEW_RELEVANCE_THRESHOLD, REVIEW_STORE_PATH, REVIEW_INDUSTRY
//!   LOG_FORMAT=json     structured logs

use anyhow::{bail, Context};
use review_miner::ingest::{self, providers::json_file::JsonFileSource};
use review_miner::{build_from_config, ClassifierConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("review_miner=info,warn"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().compact())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = ClassifierConfig::load_default().context("loading classifier config")?;
    let (classifier, store) = build_from_config(&cfg)?;

    let input = std::env::var("REVIEWS_INPUT_PATH").context("REVIEWS_INPUT_PATH is not set")?;
    let business = std::env::var("REVIEW_BUSINESS").unwrap_or_default();
    let source = JsonFileSource::from_path(&input);

    let now = chrono::Local::now().naive_local();
    let report = ingest::run_once(&source, &business, &classifier, &store, now).await;

    for (i, r) in report.ranked.iter().enumerate() {
        tracing::info!(
            rank = i + 1,
            author = %r.review.author,
            rating = r.review.rating,
            when = %r.review.relative_time,
            score = r.score,
            terms = ?r.matched_terms,
            "{}",
            r.highlighted
        );
    }

    tracing::info!(
        store = %store.path().display(),
        new_reviews = report.written,
        duplicates_skipped = report.skipped,
        "review statistics"
    );

    if let Some(e) = &report.fetch_error {
        tracing::warn!(error = %e, "no reviews were fetched");
    }
    if !report.persisted_all() {
        bail!(
            "{} review(s) could not be written to {}",
            report.write_errors.len(),
            store.path().display()
        );
    }
    Ok(())
}
