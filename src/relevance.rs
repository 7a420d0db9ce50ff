// src/relevance.rs
//! Relevance gate primitives: whole-word term compilation, weighted scoring,
//! highlighting, and the threshold-or-phrase filter.
//!
//! Boundary rule: a scored term matches only between Unicode word boundaries (`\b` in
//! the `regex` crate), case-insensitively. `job` does not match `jobless`; multi-word
//! and hyphenated terms (`quality control`, `work-life`) match as whole phrases.
//! Strong-signal phrases are plain substrings of the lower-cased text, so `employee`
//! also admits `employees` and `work` admits `workers`.

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::lexicon::Lexicon;

pub const DEFAULT_RELEVANCE_THRESHOLD: f32 = 1.0;
pub const ENV_RELEVANCE_THRESHOLD: &str = "REVIEW_RELEVANCE_THRESHOLD";

// Dev logging gate: REVIEW_DEV_LOG=1 AND dev env (debug build or APP_ENV in {local,development,dev})
pub(crate) fn dev_logging_enabled() -> bool {
    let on = std::env::var("REVIEW_DEV_LOG").ok().as_deref() == Some("1");
    if !on {
        return false;
    }
    if cfg!(debug_assertions) {
        return true;
    }
    matches!(
        std::env::var("APP_ENV")
            .unwrap_or_default()
            .to_ascii_lowercase()
            .as_str(),
        "local" | "development" | "dev"
    )
}

pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Minimal, anonymized dev logger for filter decisions.
fn dev_log_relevance(event: &str, text: &str, matched: &[String], reasons: &[String], score: f32) {
    if !dev_logging_enabled() {
        return;
    }
    let id = anon_hash(text);
    let matched_short = truncate_vec(matched, 5);
    let reasons_short = truncate_vec(reasons, 5);
    // Review text is never logged. Only hashed id + short lists.
    info!(
        target: "relevance",
        %id, %score, event,
        matched = ?matched_short,
        reasons = ?reasons_short
    );
}

pub(crate) fn truncate_vec<T: ToString>(v: &[T], max: usize) -> Vec<String> {
    v.iter().take(max).map(|x| x.to_string()).collect()
}

/// Parse an optional threshold override; rejects negative and non-finite values.
pub(crate) fn parse_threshold_env(raw: Option<String>) -> Option<f32> {
    raw.and_then(|s| s.trim().parse::<f32>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Result of scoring a text against a lexicon.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relevance {
    pub score: f32,
    /// Matched terms in lexicon order.
    pub matched: Vec<String>,
}

/// Compile `term` into a case-insensitive whole-word pattern.
fn whole_word(term: &str) -> anyhow::Result<Regex> {
    let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
    Regex::new(&pattern).map_err(|e| anyhow::anyhow!("term `{}` regex error: {}", term, e))
}

#[derive(Debug)]
struct CompiledTerm {
    term: String,
    weight: f32,
    re: Regex,
}

/// Weighted keyword scorer over a `Lexicon`.
#[derive(Debug)]
pub struct RelevanceScorer {
    terms: Vec<CompiledTerm>,
}

impl RelevanceScorer {
    pub fn new(lexicon: &Lexicon) -> anyhow::Result<Self> {
        let terms = lexicon
            .entries()
            .map(|(term, weight)| {
                Ok(CompiledTerm {
                    term: term.to_string(),
                    weight,
                    re: whole_word(term)?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { terms })
    }

    /// Sum of weights of every term present at least once. No de-overlap:
    /// `work` and `working` both contribute when both occur.
    pub fn score(&self, text: &str) -> Relevance {
        let mut rel = Relevance::default();
        if text.is_empty() {
            return rel;
        }
        for t in &self.terms {
            if t.re.is_match(text) {
                rel.score += t.weight;
                rel.matched.push(t.term.clone());
            }
        }
        rel
    }

    /// Replace every occurrence of each matched term with `[TERM]`.
    /// Display only; the filter and classifier never look at this.
    pub fn highlight(&self, text: &str) -> String {
        let mut out = text.to_string();
        for t in &self.terms {
            if t.re.is_match(text) {
                let marker = format!("[{}]", t.term.to_uppercase());
                out = t.re.replace_all(&out, regex::NoExpand(&marker)).into_owned();
            }
        }
        out
    }

    /// Score and highlight in one call.
    pub fn score_and_highlight(&self, text: &str) -> (Relevance, String) {
        (self.score(text), self.highlight(text))
    }
}

/// Filter knobs (`[filter]` in config).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default = "default_strong_phrases")]
    pub strong_phrases: Vec<String>,
    /// Cap on relevant reviews kept per run (`None` = unlimited).
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Drop reviews rated below this before filtering. Fractional floors (`3.5`) are allowed.
    #[serde(default)]
    pub min_rating: Option<f64>,
}

fn default_threshold() -> f32 {
    DEFAULT_RELEVANCE_THRESHOLD
}

pub fn default_strong_phrases() -> Vec<String> {
    [
        "place to work",
        "working here",
        "worked here",
        "workplace",
        "management",
        "staff",
        "work",
        "employee",
        "manager",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_RELEVANCE_THRESHOLD,
            strong_phrases: default_strong_phrases(),
            max_results: None,
            min_rating: None,
        }
    }
}

/// Outcome of the filter with a short explanation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterVerdict {
    pub relevant: bool,
    pub relevance: Relevance,
    pub reasons: Vec<String>,
}

/// Boolean gate: weighted score >= threshold, OR any strong-signal phrase present.
#[derive(Debug)]
pub struct RelevanceFilter {
    scorer: RelevanceScorer,
    threshold: f32,
    /// Lower-cased, non-empty.
    phrases: Vec<String>,
}

impl RelevanceFilter {
    pub fn new(lexicon: &Lexicon, settings: &FilterSettings) -> anyhow::Result<Self> {
        let scorer = RelevanceScorer::new(lexicon)?;
        let threshold = if settings.threshold.is_finite() && settings.threshold >= 0.0 {
            settings.threshold
        } else {
            DEFAULT_RELEVANCE_THRESHOLD
        };
        let phrases = settings
            .strong_phrases
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        Ok(Self {
            scorer,
            threshold,
            phrases,
        })
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn scorer(&self) -> &RelevanceScorer {
        &self.scorer
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        self.evaluate(text).relevant
    }

    pub fn evaluate(&self, text: &str) -> FilterVerdict {
        let relevance = self.scorer.score(text);
        let mut reasons = Vec::new();

        let passed_threshold = relevance.score >= self.threshold;
        if passed_threshold {
            reasons.push(format!("threshold_ok:{:.2}", self.threshold));
        } else {
            reasons.push(format!("threshold_fail:{:.2}", self.threshold));
        }

        let lower = text.to_lowercase();
        let mut phrase_hit = false;
        for phrase in &self.phrases {
            if lower.contains(phrase.as_str()) {
                phrase_hit = true;
                reasons.push(format!("phrase:{phrase}"));
            }
        }

        let relevant = passed_threshold || phrase_hit;
        dev_log_relevance(
            if relevant { "admitted" } else { "rejected" },
            text,
            &relevance.matched,
            &reasons,
            relevance.score,
        );

        FilterVerdict {
            relevant,
            relevance,
            reasons,
        }
    }
}

/* ----------------------------
Tests
---------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn filter_with(threshold: f32, phrases: &[&str]) -> RelevanceFilter {
        let settings = FilterSettings {
            threshold,
            strong_phrases: phrases.iter().map(|s| s.to_string()).collect(),
            ..FilterSettings::default()
        };
        RelevanceFilter::new(&Lexicon::filter_seed(), &settings).expect("filter")
    }

    #[test]
    fn empty_text_scores_zero() {
        let s = RelevanceScorer::new(&Lexicon::filter_seed()).unwrap();
        let r = s.score("");
        assert_eq!(r.score, 0.0);
        assert!(r.matched.is_empty());
    }

    #[test]
    fn whole_word_only() {
        let lex = Lexicon::from_pairs(&[("job", 1.5)]).unwrap();
        let s = RelevanceScorer::new(&lex).unwrap();
        assert_eq!(s.score("Jobless again").score, 0.0);
        assert_eq!(s.score("Great JOB, folks.").matched, vec!["job"]);
    }

    #[test]
    fn overlapping_terms_both_count() {
        let lex = Lexicon::from_pairs(&[("work", 6.0), ("working", 6.0)]).unwrap();
        let s = RelevanceScorer::new(&lex).unwrap();
        let r = s.score("I love working here, great work.");
        assert_eq!(r.score, 12.0);
        assert_eq!(r.matched, vec!["work", "working"]);
    }

    #[test]
    fn matched_terms_follow_lexicon_order() {
        let s = RelevanceScorer::new(&Lexicon::filter_seed()).unwrap();
        let r = s.score("Pay is fine, the manager is kind, wages on time.");
        // wages (direct) < manager (work env) < pay (general)
        assert_eq!(r.matched, vec!["wages", "manager", "pay"]);
        assert!((r.score - (3.0 + 2.0 + 1.5)).abs() < 1e-6);
    }

    #[test]
    fn phrases_and_hyphenated_terms_match() {
        let s = RelevanceScorer::new(&Lexicon::filter_seed()).unwrap();
        let r = s.score("Good work-life balance and strict Quality Control.");
        assert!(r.matched.iter().any(|m| m == "quality control"));
        assert!(r.matched.iter().any(|m| m == "work-life"));
    }

    #[test]
    fn highlight_marks_every_occurrence() {
        let lex = Lexicon::from_pairs(&[("boss", 6.0), ("job", 4.0)]).unwrap();
        let s = RelevanceScorer::new(&lex).unwrap();
        let out = s.highlight("Boss said the job was fine. The boss lied.");
        assert_eq!(out, "[BOSS] said the [JOB] was fine. The [BOSS] lied.");
        assert_eq!(s.highlight("nothing here"), "nothing here");
    }

    #[test]
    fn threshold_path_admits() {
        let f = filter_with(1.0, &[]);
        let v = f.evaluate("The pay was fair");
        assert!(v.relevant);
        assert!(v.reasons.iter().any(|r| r == "threshold_ok:1.00"));
    }

    #[test]
    fn phrase_path_admits_regardless_of_score() {
        let f = filter_with(100.0, &["worked here"]);
        let v = f.evaluate("I worked here for two years.");
        assert!(v.relevant);
        assert!(v.relevance.score < 100.0);
        assert!(v.reasons.iter().any(|r| r == "phrase:worked here"));
        assert!(v.reasons.iter().any(|r| r.starts_with("threshold_fail")));
    }

    #[test]
    fn strong_phrases_match_inflected_forms() {
        let f = filter_with(1_000.0, &["employee", "work", "manager", "staff"]);
        for text in [
            "The employees are friendly and helpful",
            "Great workers, they really care",
            "Managers here are kind",
            "Staffing agency placed me here",
        ] {
            let v = f.evaluate(text);
            assert!(v.relevant, "expected PASS: {text} -> {:?}", v.reasons);
            assert!(v.reasons.iter().any(|r| r.starts_with("phrase:")));
        }
    }

    #[test]
    fn unrelated_text_is_rejected() {
        let f = filter_with(1.0, &["worked here"]);
        assert!(!f.is_relevant("Delicious pizza, fast delivery."));
    }

    #[test]
    fn invalid_threshold_falls_back_to_default() {
        let f = filter_with(f32::NAN, &[]);
        assert_eq!(f.threshold(), DEFAULT_RELEVANCE_THRESHOLD);
        let f = filter_with(-3.0, &[]);
        assert_eq!(f.threshold(), DEFAULT_RELEVANCE_THRESHOLD);
    }

    #[test]
    fn threshold_env_parsing() {
        assert_eq!(parse_threshold_env(Some(" 2.5 ".into())), Some(2.5));
        assert_eq!(parse_threshold_env(Some("-1".into())), None);
        assert_eq!(parse_threshold_env(Some("abc".into())), None);
        assert_eq!(parse_threshold_env(None), None);
    }

    #[test]
    fn anon_hash_is_short_and_stable() {
        let a = anon_hash("same text");
        assert_eq!(a.len(), 12);
        assert_eq!(a, anon_hash("same text"));
        assert_ne!(a, anon_hash("other text"));
    }
}
