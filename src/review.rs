// src/review.rs
//! Review records as they move through the pipeline:
//! `RawReview` (fetched) → `ScoredReview` (in-memory only) → `PersistedRecord` (CSV row).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder written into whichever of pros/cons does not carry the review text.
pub const NONE_PROVIDED: &str = "None provided";

/// A review as handed over by the fetch layer.
///
/// Every field defaults when missing so one malformed record never fails a batch.
/// Aliases accept the Places API field names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReview {
    #[serde(default, alias = "author_name")]
    pub author: String,
    #[serde(default, deserialize_with = "de_rating")]
    pub rating: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "relative_time_description", alias = "time")]
    pub relative_time: String,
    #[serde(default, alias = "name")]
    pub business_name: String,
    #[serde(default, alias = "formatted_address", alias = "address")]
    pub business_address: String,
}

/// Accepts integer, float (truncated), numeric string or null.
fn de_rating<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(|f| f as i64)
            .unwrap_or(0),
        _ => 0,
    })
}

/// Transient view used for ranking and inspection. Never persisted directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredReview {
    pub review: RawReview,
    pub score: f32,
    pub matched_terms: Vec<String>,
    pub employment_related: bool,
    /// Display rendering with matched terms as `[TERM]`.
    pub highlighted: String,
}

/// Inferred relationship of the reviewer to the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    Employee,
    Customer,
    #[serde(rename = "Google Reviewer")]
    GoogleReviewer,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Employee => "Employee",
            Position::Customer => "Customer",
            Position::GoogleReviewer => "Google Reviewer",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the record store. Field order is the column order on disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRecord {
    pub name: String,
    pub industry: String,
    pub rating: i64,
    pub pros: String,
    pub cons: String,
    pub position: Position,
    pub created_at: NaiveDateTime,
}

/// Column names in on-disk order.
pub const COLUMNS: [&str; 7] = [
    "name",
    "industry",
    "rating",
    "pros",
    "cons",
    "position",
    "created_at",
];

/// Route review text into (pros, cons) by rating bucket.
///
/// Neutral (3) and positive (>= 4) both land in `pros`; only ratings <= 2 fill `cons`.
pub fn split_pros_cons(rating: i64, text: &str) -> (String, String) {
    if rating >= 4 {
        (text.to_string(), NONE_PROVIDED.to_string())
    } else if rating == 3 {
        (text.to_string(), NONE_PROVIDED.to_string())
    } else {
        (NONE_PROVIDED.to_string(), text.to_string())
    }
}
