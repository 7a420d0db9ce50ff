// src/ingest/providers/json_file.rs
//! Reviews from a JSON document: either a bare array of reviews, `{ "reviews": [...] }`,
//! or a Places-details style `{ "result": { "name", "formatted_address", "reviews" } }`.
//!
//! Elements that fail to parse are skipped so one bad record doesn't drop the batch.

use async_trait::async_trait;
use metrics::counter;
use serde_json::Value;
use std::path::PathBuf;

use crate::error::FetchError;
use crate::ingest::types::ReviewSource;
use crate::review::RawReview;

pub struct JsonFileSource {
    mode: Mode,
}

enum Mode {
    File(PathBuf),
    Inline(String),
}

impl JsonFileSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            mode: Mode::File(path.into()),
        }
    }

    pub fn from_fixture_str(s: &str) -> Self {
        Self {
            mode: Mode::Inline(s.to_string()),
        }
    }

    pub fn parse_reviews(s: &str) -> Result<Vec<RawReview>, FetchError> {
        let doc: Value = serde_json::from_str(s)
            .map_err(|e| FetchError::Fatal(format!("review document is not JSON: {e}")))?;

        let (items, place_name, place_address) = match doc {
            Value::Array(items) => (items, None, None),
            Value::Object(mut obj) => {
                let mut scope = match obj.remove("result") {
                    Some(Value::Object(inner)) => inner,
                    _ => obj,
                };
                let name = scope.get("name").and_then(Value::as_str).map(str::to_string);
                let address = scope
                    .get("formatted_address")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let items = match scope.remove("reviews") {
                    Some(Value::Array(items)) => items,
                    // place without reviews: valid, just empty
                    None | Some(Value::Null) => Vec::new(),
                    Some(_) => {
                        return Err(FetchError::Fatal("`reviews` is not an array".into()));
                    }
                };
                (items, name, address)
            }
            _ => {
                return Err(FetchError::Fatal(
                    "review document must be an array or object".into(),
                ))
            }
        };

        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.into_iter().enumerate() {
            match serde_json::from_value::<RawReview>(item) {
                Ok(mut r) => {
                    if r.business_name.is_empty() {
                        if let Some(n) = &place_name {
                            r.business_name = n.clone();
                        }
                    }
                    if r.business_address.is_empty() {
                        if let Some(a) = &place_address {
                            r.business_address = a.clone();
                        }
                    }
                    out.push(r);
                }
                Err(e) => {
                    tracing::warn!(target: "ingest", index = i, error = %e, "skipping malformed review");
                    counter!("reviews_malformed_total").increment(1);
                }
            }
        }
        Ok(out)
    }
}

#[async_trait]
impl ReviewSource for JsonFileSource {
    /// The document holds a single place's reviews; `business` is not used to select.
    async fn fetch_reviews(&self, _business: &str) -> Result<Vec<RawReview>, FetchError> {
        match &self.mode {
            Mode::Inline(s) => Self::parse_reviews(s),
            Mode::File(path) => {
                let body = tokio::fs::read_to_string(path).await.map_err(|e| {
                    let msg = format!("reading {}: {e}", path.display());
                    match e.kind() {
                        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                            FetchError::Fatal(msg)
                        }
                        _ => FetchError::Transient(msg),
                    }
                })?;
                Self::parse_reviews(&body)
            }
        }
    }

    fn name(&self) -> &'static str {
        "json-file"
    }
}
