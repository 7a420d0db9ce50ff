// src/dedup.rs
//! Duplicate detection against already-persisted rows.
//!
//! Pure decision over a slice of rows; reading the store is the caller's job.
//! A candidate duplicates a row when the ratings are equal and one trimmed text
//! contains the other. The two-way substring test absorbs truncation differences
//! between a re-fetched review and the stored copy.
//!
//! Rows are read as `DedupRow`, which only needs `rating`, `pros` and `cons`, so rows
//! written by older or foreign tools (blank `created_at`, unknown `position`) still
//! take part in the check.

use serde::Deserialize;

use crate::review::{PersistedRecord, NONE_PROVIDED};

/// The part of a candidate the dedup check looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub rating: i64,
}

/// Lenient view of a stored row. Every other column is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DedupRow {
    #[serde(default)]
    pub rating: String,
    #[serde(default)]
    pub pros: String,
    #[serde(default)]
    pub cons: String,
}

impl From<&PersistedRecord> for DedupRow {
    fn from(r: &PersistedRecord) -> Self {
        Self {
            rating: r.rating.to_string(),
            pros: r.pros.clone(),
            cons: r.cons.clone(),
        }
    }
}

/// Whichever of pros/cons carries real text (`cons` wins if both somehow do).
pub fn content_text(row: &DedupRow) -> &str {
    if row.cons != NONE_PROVIDED {
        &row.cons
    } else if row.pros != NONE_PROVIDED {
        &row.pros
    } else {
        ""
    }
}

/// Stored ratings are compared as text (`"5"`); a numeric spelling such as `"5.0"`
/// also counts.
pub fn rating_matches(candidate: i64, stored: &str) -> bool {
    let stored = stored.trim();
    stored == candidate.to_string() || stored.parse::<f64>().ok() == Some(candidate as f64)
}

/// Two-way substring overlap after trimming.
pub fn texts_overlap(a: &str, b: &str) -> bool {
    let (a, b) = (a.trim(), b.trim());
    a.contains(b) || b.contains(a)
}

pub fn duplicates_row(candidate: &Candidate<'_>, row: &DedupRow) -> bool {
    rating_matches(candidate.rating, &row.rating) && texts_overlap(candidate.text, content_text(row))
}

pub fn is_duplicate(candidate: &Candidate<'_>, existing: &[DedupRow]) -> bool {
    existing.iter().any(|r| duplicates_row(candidate, r))
}
