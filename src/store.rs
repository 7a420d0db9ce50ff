// src/store.rs
//! Append-only CSV record store.
//!
//! - Fixed columns: `name, industry, rating, pros, cons, position, created_at`.
//! - Header is written once, when the store goes from `Absent` to `Populated`.
//! - Every append re-reads the file and runs the duplicate check under the store's
//!   lock, so callers sharing one `CsvRecordStore` cannot double-write.
//! - The duplicate check reads only `rating`, `pros` and `cons` of each row, so rows
//!   with blank or foreign `created_at`/`position` values still count.
//! - Read failures during the duplicate check fail open (treated as no records);
//!   write failures are returned.
//!
//! Separate processes appending to the same file are not coordinated.

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, warn};

use crate::dedup::{is_duplicate, Candidate, DedupRow};
use crate::error::StoreError;
use crate::position::PositionClassifier;
use crate::review::{split_pros_cons, PersistedRecord, ScoredReview, COLUMNS};

pub const DEFAULT_STORE_PATH: &str = "company_reviews_new.csv";
pub const DEFAULT_INDUSTRY: &str = "Cannabis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// No file, or a zero-length file.
    Absent,
    Populated,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Written(PersistedRecord),
    SkippedDuplicate,
}

impl AppendOutcome {
    pub fn written(&self) -> bool {
        matches!(self, AppendOutcome::Written(_))
    }
}

/// Per-batch counts. `errors` holds write failures; the batch continues past them.
#[derive(Debug, Default)]
pub struct SaveReport {
    pub written: usize,
    pub skipped: usize,
    pub errors: Vec<StoreError>,
}

impl SaveReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct CsvRecordStore {
    path: PathBuf,
    industry: String,
    classifier: PositionClassifier,
    lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn open<P: AsRef<Path>>(path: P, industry: impl Into<String>) -> Self {
        Self::with_classifier(path, industry, PositionClassifier::default())
    }

    pub fn with_classifier<P: AsRef<Path>>(
        path: P,
        industry: impl Into<String>,
        classifier: PositionClassifier,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            industry: industry.into(),
            classifier,
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn industry(&self) -> &str {
        &self.industry
    }

    pub fn state(&self) -> StoreState {
        match fs::metadata(&self.path) {
            Ok(m) if m.len() > 0 => StoreState::Populated,
            _ => StoreState::Absent,
        }
    }

    /// All records currently on disk. Rows that fail to parse are skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<PersistedRecord>, StoreError> {
        self.read_rows()
    }

    /// `rating`/`pros`/`cons` of every row, whatever the other columns hold.
    pub fn read_dedup_rows(&self) -> Result<Vec<DedupRow>, StoreError> {
        self.read_rows()
    }

    fn read_rows<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        if self.state() == StoreState::Absent {
            return Ok(Vec::new());
        }
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&self.path)?;
        let mut out = Vec::new();
        for (i, row) in rdr.deserialize::<T>().enumerate() {
            match row {
                Ok(r) => out.push(r),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => {
                    warn!(target: "store", row = i + 1, error = %e, "skipping unreadable row");
                }
            }
        }
        Ok(out)
    }

    /// Records for the duplicate check. Fails open: an unreadable store counts as empty.
    fn existing_for_dedup(&self) -> Vec<DedupRow> {
        match self.read_dedup_rows() {
            Ok(v) => v,
            Err(e) => {
                warn!(
                    target: "store",
                    path = %self.path.display(),
                    error = %e,
                    "duplicate check could not read store; treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Map a scored review to the on-disk row.
    pub fn to_record(
        &self,
        candidate: &ScoredReview,
        business_name: &str,
        created_at: NaiveDateTime,
    ) -> PersistedRecord {
        let text = &candidate.review.text;
        let rating = candidate.review.rating;
        let (pros, cons) = split_pros_cons(rating, text);
        PersistedRecord {
            name: business_name.to_string(),
            industry: self.industry.clone(),
            rating,
            pros,
            cons,
            position: self.classifier.classify(text),
            created_at,
        }
    }

    /// Read → duplicate check → append, under the store lock.
    pub fn append(
        &self,
        candidate: &ScoredReview,
        business_name: &str,
        now: NaiveDateTime,
    ) -> Result<AppendOutcome, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let existing = self.existing_for_dedup();
        let key = Candidate {
            text: &candidate.review.text,
            rating: candidate.review.rating,
        };
        if is_duplicate(&key, &existing) {
            debug!(target: "store", rating = key.rating, "duplicate review skipped");
            return Ok(AppendOutcome::SkippedDuplicate);
        }

        let record = self.to_record(candidate, business_name, now);
        self.write_row(&record)?;
        debug!(
            target: "store",
            rating = record.rating,
            position = %record.position,
            "review appended"
        );
        Ok(AppendOutcome::Written(record))
    }

    /// Append many; duplicates are skipped, write errors are collected and the batch
    /// moves on to the next review.
    pub fn append_batch(
        &self,
        reviews: &[ScoredReview],
        business_name: &str,
        now: NaiveDateTime,
    ) -> SaveReport {
        let mut report = SaveReport::default();
        for r in reviews {
            match self.append(r, business_name, now) {
                Ok(AppendOutcome::Written(_)) => report.written += 1,
                Ok(AppendOutcome::SkippedDuplicate) => report.skipped += 1,
                Err(e) => {
                    warn!(target: "store", error = %e, "failed to persist review");
                    report.errors.push(e);
                }
            }
        }
        info!(
            target: "store",
            path = %self.path.display(),
            written = report.written,
            skipped = report.skipped,
            failed = report.errors.len(),
            "save finished"
        );
        report
    }

    fn write_row(&self, record: &PersistedRecord) -> Result<(), StoreError> {
        let needs_header = self.state() == StoreState::Absent;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .terminator(csv::Terminator::CRLF)
            .from_writer(file);
        if needs_header {
            wtr.write_record(COLUMNS)?;
        }
        wtr.serialize(record)?;
        wtr.flush()?;
        Ok(())
    }
}
