// src/classifier.rs
//! Review classification: relevance gate, ranking score, position.
//!
//! The filter decides *whether* a review is employment-related; the ranking scorer
//! (heavier, display-oriented lexicon) decides the order and the highlighted text.

use std::cmp::Ordering;

use crate::config::ClassifierConfig;
use crate::lexicon::Lexicon;
use crate::position::PositionClassifier;
use crate::relevance::{FilterSettings, RelevanceFilter, RelevanceScorer};
use crate::review::{Position, RawReview, ScoredReview};

#[derive(Debug)]
pub struct ReviewClassifier {
    filter: RelevanceFilter,
    ranker: RelevanceScorer,
    position: PositionClassifier,
    max_results: Option<usize>,
    min_rating: Option<f64>,
}

/// Outcome of one batch pass.
#[derive(Debug, Default)]
pub struct Classified {
    /// Admitted reviews, highest ranking score first (ties keep input order).
    pub ranked: Vec<ScoredReview>,
    pub rejected: usize,
    /// Admitted but dropped by `max_results`.
    pub over_limit: usize,
}

impl ReviewClassifier {
    pub fn new(
        filter_lexicon: &Lexicon,
        settings: &FilterSettings,
        ranking_lexicon: &Lexicon,
        position: PositionClassifier,
    ) -> anyhow::Result<Self> {
        Ok(Self {
            filter: RelevanceFilter::new(filter_lexicon, settings)?,
            ranker: RelevanceScorer::new(ranking_lexicon)?,
            position,
            max_results: settings.max_results,
            min_rating: settings.min_rating,
        })
    }

    pub fn from_config(cfg: &ClassifierConfig) -> anyhow::Result<Self> {
        Self::new(
            &cfg.filter_lexicon()?,
            &cfg.filter.settings,
            &cfg.ranking_lexicon()?,
            PositionClassifier::from_settings(&cfg.position),
        )
    }

    pub fn filter(&self) -> &RelevanceFilter {
        &self.filter
    }

    pub fn position_classifier(&self) -> &PositionClassifier {
        &self.position
    }

    pub fn is_relevant(&self, text: &str) -> bool {
        self.filter.is_relevant(text)
    }

    pub fn classify_position(&self, text: &str) -> Position {
        self.position.classify(text)
    }

    /// Score a single review (admitted or not).
    pub fn score_review(&self, review: &RawReview) -> ScoredReview {
        let employment_related = self.passes_rating(review) && self.filter.is_relevant(&review.text);
        let (rel, highlighted) = self.ranker.score_and_highlight(&review.text);
        ScoredReview {
            review: review.clone(),
            score: rel.score,
            matched_terms: rel.matched,
            employment_related,
            highlighted,
        }
    }

    /// Filter in input order, cap at `max_results`, then rank by score.
    pub fn classify_batch(&self, reviews: &[RawReview]) -> Classified {
        let mut out = Classified::default();
        for r in reviews {
            let scored = self.score_review(r);
            if !scored.employment_related {
                out.rejected += 1;
                continue;
            }
            if self.max_results.is_some_and(|max| out.ranked.len() >= max) {
                out.over_limit += 1;
                continue;
            }
            out.ranked.push(scored);
        }
        // stable: equal scores keep fetch order
        out.ranked
            .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        out
    }

    fn passes_rating(&self, review: &RawReview) -> bool {
        self.min_rating
            .is_none_or(|min| review.rating as f64 >= min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(settings: FilterSettings) -> ReviewClassifier {
        ReviewClassifier::new(
            &Lexicon::filter_seed(),
            &settings,
            &Lexicon::ranking_seed(),
            PositionClassifier::default(),
        )
        .unwrap()
    }

    fn raw(text: &str, rating: i64) -> RawReview {
        RawReview {
            text: text.into(),
            rating,
            ..RawReview::default()
        }
    }

    #[test]
    fn ranks_admitted_reviews_by_score() {
        let c = classifier(FilterSettings::default());
        let out = c.classify_batch(&[
            raw("Tasty burgers", 5),
            raw("Nice team", 4),
            raw("Got hired after the interview, salary is good, manager is fair", 5),
        ]);
        assert_eq!(out.rejected, 1);
        assert_eq!(out.ranked.len(), 2);
        assert!(out.ranked[0].review.text.starts_with("Got hired"));
        assert!(out.ranked[0].score > out.ranked[1].score);
        assert!(out.ranked.iter().all(|r| r.employment_related));
        assert!(out.ranked[0].highlighted.contains("[SALARY]"));
    }

    #[test]
    fn ties_keep_input_order() {
        let c = classifier(FilterSettings::default());
        let out = c.classify_batch(&[raw("good team", 5), raw("bad team", 1)]);
        assert_eq!(out.ranked[0].review.text, "good team");
        assert_eq!(out.ranked[1].review.text, "bad team");
    }

    #[test]
    fn max_results_caps_in_fetch_order() {
        let c = classifier(FilterSettings {
            max_results: Some(1),
            ..FilterSettings::default()
        });
        let out = c.classify_batch(&[raw("nice team", 5), raw("salary and wage are great", 5)]);
        assert_eq!(out.ranked.len(), 1);
        assert_eq!(out.ranked[0].review.text, "nice team");
        assert_eq!(out.over_limit, 1);
    }

    #[test]
    fn min_rating_rejects_low_reviews() {
        let c = classifier(FilterSettings {
            min_rating: Some(3.0),
            ..FilterSettings::default()
        });
        let out = c.classify_batch(&[raw("awful manager", 1), raw("decent manager", 4)]);
        assert_eq!(out.rejected, 1);
        assert_eq!(out.ranked[0].review.rating, 4);
    }

    #[test]
    fn fractional_min_rating_floor() {
        let c = classifier(FilterSettings {
            min_rating: Some(3.5),
            ..FilterSettings::default()
        });
        let out = c.classify_batch(&[raw("ok manager", 3), raw("good manager", 4)]);
        assert_eq!(out.rejected, 1);
        assert_eq!(out.ranked.len(), 1);
        assert_eq!(out.ranked[0].review.rating, 4);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let c = classifier(FilterSettings::default());
        let out = c.classify_batch(&[]);
        assert!(out.ranked.is_empty());
        assert_eq!(out.rejected, 0);
    }

    #[test]
    fn missing_text_is_scored_as_empty() {
        let c = classifier(FilterSettings::default());
        let s = c.score_review(&RawReview::default());
        assert_eq!(s.score, 0.0);
        assert!(!s.employment_related);
        assert_eq!(c.classify_position(&s.review.text), Position::GoogleReviewer);
    }
}
