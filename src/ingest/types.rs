// src/ingest/types.rs
use crate::error::FetchError;
use crate::review::RawReview;

/// The fetch collaborator: "given a business identifier, return its reviews in order".
///
/// No data is `Ok(vec![])`; errors distinguish retryable from configuration failures.
#[async_trait::async_trait]
pub trait ReviewSource: Send + Sync {
    async fn fetch_reviews(&self, business: &str) -> Result<Vec<RawReview>, FetchError>;
    fn name(&self) -> &'static str;
}
