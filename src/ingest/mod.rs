// src/ingest/mod.rs
//! One ingest pass per business: fetch → filter → rank → dedup → append.

pub mod providers;
pub mod types;

use chrono::NaiveDateTime;
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use once_cell::sync::OnceCell;

use crate::classifier::ReviewClassifier;
use crate::error::{FetchError, StoreError};
use crate::ingest::types::ReviewSource;
use crate::review::{RawReview, ScoredReview};
use crate::store::CsvRecordStore;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("reviews_fetched_total", "Raw reviews returned by sources.");
        describe_counter!(
            "reviews_relevant_total",
            "Reviews admitted by the employment relevance filter."
        );
        describe_counter!(
            "reviews_irrelevant_total",
            "Reviews rejected by the relevance filter or rating floor."
        );
        describe_counter!("reviews_written_total", "Records appended to the store.");
        describe_counter!(
            "reviews_duplicate_total",
            "Reviews skipped because the store already holds them."
        );
        describe_counter!("reviews_fetch_errors_total", "Source fetch failures.");
        describe_counter!("reviews_write_errors_total", "Store append failures.");
        describe_counter!(
            "reviews_malformed_total",
            "Review elements that could not be parsed."
        );
        describe_histogram!(
            "reviews_relevance_score",
            "Ranking score of admitted reviews."
        );
        describe_gauge!(
            "reviews_pipeline_last_run_ts",
            "Unix ts when the ingest pipeline last ran."
        );
    });
}

/// Caller-visible result of one pass.
#[derive(Debug, Default)]
pub struct PipelineReport {
    /// Name written into the `name` column.
    pub business_name: String,
    pub fetched: usize,
    pub relevant: usize,
    pub rejected: usize,
    pub written: usize,
    pub skipped: usize,
    /// Admitted reviews in ranking order, for display.
    pub ranked: Vec<ScoredReview>,
    /// Set when the source failed; the pass then ran over an empty batch.
    pub fetch_error: Option<FetchError>,
    pub write_errors: Vec<StoreError>,
}

impl PipelineReport {
    /// True when every admitted, non-duplicate review was saved.
    pub fn persisted_all(&self) -> bool {
        self.write_errors.is_empty()
    }
}

/// Prefer the place name reported by the source; fall back to the query.
fn resolve_business_name(query: &str, reviews: &[RawReview]) -> String {
    reviews
        .iter()
        .map(|r| r.business_name.trim())
        .find(|n| !n.is_empty())
        .unwrap_or(query)
        .to_string()
}

/// Run one ingest pass for `business`.
///
/// Fetch failures never abort: they are logged, counted, reported in
/// `PipelineReport::fetch_error`, and the pass continues with no reviews.
pub async fn run_once(
    source: &dyn ReviewSource,
    business: &str,
    classifier: &ReviewClassifier,
    store: &CsvRecordStore,
    now: NaiveDateTime,
) -> PipelineReport {
    ensure_metrics_described();

    let mut report = PipelineReport::default();
    let raw = match source.fetch_reviews(business).await {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(
                target: "ingest",
                error = %e,
                retryable = e.is_retryable(),
                source = source.name(),
                "source error; continuing with no reviews"
            );
            counter!("reviews_fetch_errors_total").increment(1);
            report.fetch_error = Some(e);
            Vec::new()
        }
    };
    report.fetched = raw.len();
    report.business_name = resolve_business_name(business, &raw);

    let classified = classifier.classify_batch(&raw);
    report.relevant = classified.ranked.len();
    report.rejected = classified.rejected;
    for r in &classified.ranked {
        histogram!("reviews_relevance_score").record(r.score as f64);
    }

    let saved = store.append_batch(&classified.ranked, &report.business_name, now);
    report.written = saved.written;
    report.skipped = saved.skipped;
    report.write_errors = saved.errors;
    report.ranked = classified.ranked;

    // Telemetry
    counter!("reviews_fetched_total").increment(report.fetched as u64);
    counter!("reviews_relevant_total").increment(report.relevant as u64);
    counter!("reviews_irrelevant_total").increment(report.rejected as u64);
    counter!("reviews_written_total").increment(report.written as u64);
    counter!("reviews_duplicate_total").increment(report.skipped as u64);
    counter!("reviews_write_errors_total").increment(report.write_errors.len() as u64);
    gauge!("reviews_pipeline_last_run_ts").set(chrono::Utc::now().timestamp() as f64);

    tracing::info!(
        target: "ingest",
        business = %report.business_name,
        fetched = report.fetched,
        relevant = report.relevant,
        written = report.written,
        skipped = report.skipped,
        "ingest pass finished"
    );

    report
}
