// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod classifier;
pub mod config;
pub mod dedup;
pub mod error;
pub mod lexicon;
pub mod position;
pub mod relevance;
pub mod review;
pub mod store;

// Fetch seam + one-pass pipeline
pub mod ingest;

// ---- Re-exports for stable public API ----
pub use crate::classifier::ReviewClassifier;
pub use crate::config::ClassifierConfig;
pub use crate::error::{FetchError, StoreError};
pub use crate::review::{PersistedRecord, Position, RawReview, ScoredReview, NONE_PROVIDED};
pub use crate::store::CsvRecordStore;

/// Build the classifier and store described by `cfg`.
///
/// The store reuses the configured position phrase lists.
pub fn build_from_config(cfg: &ClassifierConfig) -> anyhow::Result<(ReviewClassifier, CsvRecordStore)> {
    let classifier = ReviewClassifier::from_config(cfg)?;
    let store = CsvRecordStore::with_classifier(
        cfg.store_path(),
        cfg.industry(),
        classifier.position_classifier().clone(),
    );
    Ok((classifier, store))
}
