// src/lexicon.rs
//! # Lexicon
//!
//! Ordered term → weight table, grouped into tiers. Direct employment language
//! sits in the heaviest tier, general workplace-culture words in the lightest.
//!
//! - Iteration order is tier order, then term order within a tier. Scorers report
//!   matched terms in exactly this order.
//! - Terms are trimmed and lower-cased; empty and repeated terms are dropped
//!   (first occurrence keeps its weight).
//! - Two built-in seeds: `filter_seed()` gates reviews, `ranking_seed()` ranks and
//!   highlights the admitted ones.

use anyhow::{bail, Result};
use serde::Deserialize;
use std::collections::HashSet;

/// One tier as it appears in config (`[[filter.tiers]]` / `[[ranking.tiers]]`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TierCfg {
    #[serde(default)]
    pub name: String,
    pub weight: f32,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tier {
    pub name: String,
    pub weight: f32,
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lexicon {
    tiers: Vec<Tier>,
}

impl Lexicon {
    /// Build from config tiers, normalizing terms and rejecting unusable weights.
    pub fn from_tiers(tiers: Vec<TierCfg>) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut out = Vec::with_capacity(tiers.len());
        for t in tiers {
            if !t.weight.is_finite() || t.weight <= 0.0 {
                bail!("lexicon tier `{}` has invalid weight {}", t.name, t.weight);
            }
            let terms: Vec<String> = t
                .terms
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .filter(|s| seen.insert(s.clone()))
                .collect();
            out.push(Tier {
                name: t.name,
                weight: t.weight,
                terms,
            });
        }
        Ok(Self { tiers: out })
    }

    /// Convenience for tests and small tables: `[("job", 1.5), ...]`, one tier per entry.
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(S, f32)]) -> Result<Self> {
        Self::from_tiers(
            pairs
                .iter()
                .map(|(term, weight)| TierCfg {
                    name: String::new(),
                    weight: *weight,
                    terms: vec![term.as_ref().to_string()],
                })
                .collect(),
        )
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    /// `(term, weight)` in lexicon order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, f32)> + '_ {
        self.tiers
            .iter()
            .flat_map(|t| t.terms.iter().map(move |term| (term.as_str(), t.weight)))
    }

    pub fn weight_of(&self, term: &str) -> Option<f32> {
        let t = term.trim().to_lowercase();
        self.entries().find(|(k, _)| *k == t).map(|(_, w)| w)
    }

    pub fn len(&self) -> usize {
        self.tiers.iter().map(|t| t.terms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Weights used to admit reviews at search time.
    pub fn filter_seed() -> Self {
        seed(&[
            (
                "direct_employment",
                3.0,
                &[
                    "workplace",
                    "worked here",
                    "working here",
                    "employee",
                    "employer",
                    "employed",
                    "salary",
                    "wage",
                    "wages",
                ],
            ),
            (
                "industry",
                2.5,
                &[
                    "cultivation",
                    "growing",
                    "processing",
                    "packaging",
                    "production",
                    "quality control",
                    "compliance",
                    "facility",
                ],
            ),
            (
                "work_environment",
                2.0,
                &[
                    "management",
                    "supervisor",
                    "manager",
                    "benefits",
                    "work-life",
                    "work life",
                    "shifts",
                    "coworkers",
                    "co-workers",
                ],
            ),
            (
                "general_work",
                1.5,
                &[
                    "job", "pay", "staff", "team", "hours", "schedule", "position",
                ],
            ),
            (
                "culture",
                1.0,
                &[
                    "toxic",
                    "culture",
                    "environment",
                    "training",
                    "experience",
                    "safety",
                    "clean",
                ],
            ),
        ])
    }

    /// Weights used to rank and highlight admitted reviews.
    pub fn ranking_seed() -> Self {
        seed(&[
            (
                "hiring_and_pay",
                8.0,
                &[
                    "interview",
                    "interviewed",
                    "hiring",
                    "hired",
                    "fired",
                    "laid off",
                    "layoff",
                    "salary",
                    "wage",
                    "compensation",
                ],
            ),
            (
                "work_environment",
                6.0,
                &[
                    "workplace",
                    "work",
                    "working",
                    "employee",
                    "employer",
                    "management",
                    "manager",
                    "supervisor",
                    "boss",
                    "hr",
                    "human resources",
                ],
            ),
            (
                "culture",
                5.0,
                &[
                    "culture",
                    "environment",
                    "toxic",
                    "benefits",
                    "insurance",
                    "vacation",
                    "pto",
                    "work-life",
                ],
            ),
            (
                "role",
                4.0,
                &[
                    "position",
                    "role",
                    "job",
                    "staff",
                    "team",
                    "coworker",
                    "colleague",
                    "department",
                ],
            ),
            (
                "general",
                3.0,
                &[
                    "company",
                    "business",
                    "corporate",
                    "office",
                    "professional",
                    "career",
                    "training",
                ],
            ),
        ])
    }
}

fn seed(tiers: &[(&str, f32, &[&str])]) -> Lexicon {
    Lexicon {
        tiers: tiers
            .iter()
            .map(|(name, weight, terms)| Tier {
                name: name.to_string(),
                weight: *weight,
                terms: terms.iter().map(|t| t.to_string()).collect(),
            })
            .collect(),
    }
}
