// src/config.rs
//! Classifier + store configuration.
//!
//! Resolution order:
//! 1) `$REVIEW_CONFIG_PATH` (must exist)
//! 2) `config/classifier.toml`
//! 3) built-in defaults
//!
//! Then env overrides: `REVIEW_RELEVANCE_THRESHOLD`, `REVIEW_STORE_PATH`, `REVIEW_INDUSTRY`.
//! Every TOML section is optional; empty tier lists fall back to the built-in seeds.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::lexicon::{Lexicon, TierCfg};
use crate::position::PositionSettings;
use crate::relevance::{parse_threshold_env, FilterSettings, ENV_RELEVANCE_THRESHOLD};
use crate::store::{DEFAULT_INDUSTRY, DEFAULT_STORE_PATH};

pub const DEFAULT_CONFIG_PATH: &str = "config/classifier.toml";
pub const ENV_CONFIG_PATH: &str = "REVIEW_CONFIG_PATH";
pub const ENV_STORE_PATH: &str = "REVIEW_STORE_PATH";
pub const ENV_INDUSTRY: &str = "REVIEW_INDUSTRY";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub ranking: RankingSection,
    #[serde(default)]
    pub position: PositionSettings,
    #[serde(default)]
    pub store: StoreSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterSection {
    #[serde(flatten)]
    pub settings: FilterSettings,
    #[serde(default)]
    pub tiers: Vec<TierCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RankingSection {
    #[serde(default)]
    pub tiers: Vec<TierCfg>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreSection {
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl ClassifierConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let cfg: ClassifierConfig = toml::from_str(toml_str)?;
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading classifier config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing classifier config at {}", path.display()))
    }

    /// Env path → default path → built-in defaults, then env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(t) = parse_threshold_env(std::env::var(ENV_RELEVANCE_THRESHOLD).ok()) {
            self.filter.settings.threshold = t;
        }
        if let Some(p) = non_empty_env(ENV_STORE_PATH) {
            self.store.path = Some(PathBuf::from(p));
        }
        if let Some(i) = non_empty_env(ENV_INDUSTRY) {
            self.store.industry = Some(i);
        }
    }

    pub fn filter_lexicon(&self) -> Result<Lexicon> {
        if self.filter.tiers.is_empty() {
            return Ok(Lexicon::filter_seed());
        }
        Lexicon::from_tiers(self.filter.tiers.clone()).context("filter lexicon")
    }

    pub fn ranking_lexicon(&self) -> Result<Lexicon> {
        if self.ranking.tiers.is_empty() {
            return Ok(Lexicon::ranking_seed());
        }
        Lexicon::from_tiers(self.ranking.tiers.clone()).context("ranking lexicon")
    }

    pub fn store_path(&self) -> PathBuf {
        self.store
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_PATH))
    }

    pub fn industry(&self) -> String {
        self.store
            .industry
            .clone()
            .unwrap_or_else(|| DEFAULT_INDUSTRY.to_string())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    const SAMPLE: &str = r#"
[filter]
threshold = 2.5
strong_phrases = ["night shift"]
max_results = 10

[[filter.tiers]]
name = "direct"
weight = 3.0
terms = ["employer", "wage"]

[[ranking.tiers]]
name = "all"
weight = 1.0
terms = ["boss"]

[position]
employee_phrases = ["i work"]

[store]
path = "out/reviews.csv"
industry = "Manufacturing"
"#;

    #[test]
    fn parses_all_sections() {
        let cfg = ClassifierConfig::from_toml_str(SAMPLE).unwrap();
        assert_eq!(cfg.filter.settings.threshold, 2.5);
        assert_eq!(cfg.filter.settings.strong_phrases, vec!["night shift"]);
        assert_eq!(cfg.filter.settings.max_results, Some(10));
        assert_eq!(cfg.filter.settings.min_rating, None);
        assert_eq!(cfg.filter_lexicon().unwrap().len(), 2);
        assert_eq!(cfg.ranking_lexicon().unwrap().weight_of("boss"), Some(1.0));
        assert_eq!(cfg.position.employee_phrases, vec!["i work"]);
        // customer list falls back to defaults
        assert!(cfg.position.customer_phrases.iter().any(|p| p == "bought"));
        assert_eq!(cfg.store_path(), PathBuf::from("out/reviews.csv"));
        assert_eq!(cfg.industry(), "Manufacturing");
    }

    #[test]
    fn min_rating_accepts_integer_or_fraction() {
        let cfg = ClassifierConfig::from_toml_str("[filter]\nmin_rating = 3.5\n").unwrap();
        assert_eq!(cfg.filter.settings.min_rating, Some(3.5));
        let cfg = ClassifierConfig::from_toml_str("[filter]\nmin_rating = 4\n").unwrap();
        assert_eq!(cfg.filter.settings.min_rating, Some(4.0));
    }

    #[test]
    fn empty_config_uses_seeds() {
        let cfg = ClassifierConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.filter.settings, FilterSettings::default());
        assert_eq!(cfg.filter_lexicon().unwrap(), Lexicon::filter_seed());
        assert_eq!(cfg.ranking_lexicon().unwrap(), Lexicon::ranking_seed());
        assert_eq!(cfg.store_path(), PathBuf::from(DEFAULT_STORE_PATH));
        assert_eq!(cfg.industry(), DEFAULT_INDUSTRY);
    }

    #[test]
    fn bad_tier_weight_is_an_error() {
        let cfg = ClassifierConfig::from_toml_str(
            r#"
[[filter.tiers]]
weight = -1.0
terms = ["job"]
"#,
        )
        .unwrap();
        assert!(cfg.filter_lexicon().is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_RELEVANCE_THRESHOLD);
        env::remove_var(ENV_STORE_PATH);
        env::remove_var(ENV_INDUSTRY);

        // No files → built-in defaults
        let cfg = ClassifierConfig::load_default().unwrap();
        assert_eq!(cfg.industry(), DEFAULT_INDUSTRY);

        // Fallback file in ./config/
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_PATH),
            "[store]\nindustry = \"Logistics\"\n",
        )
        .unwrap();
        assert_eq!(ClassifierConfig::load_default().unwrap().industry(), "Logistics");

        // Env path wins; env overrides win over file values
        let p_env = tmp.path().join("custom.toml");
        fs::write(&p_env, "[filter]\nthreshold = 4.0\n").unwrap();
        env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
        env::set_var(ENV_INDUSTRY, "Agriculture");
        let cfg = ClassifierConfig::load_default().unwrap();
        assert_eq!(cfg.filter.settings.threshold, 4.0);
        assert_eq!(cfg.industry(), "Agriculture");

        env::set_var(ENV_RELEVANCE_THRESHOLD, "1.5");
        let cfg = ClassifierConfig::load_default().unwrap();
        assert_eq!(cfg.filter.settings.threshold, 1.5);

        // Missing env path is an error
        env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(ClassifierConfig::load_default().is_err());

        env::remove_var(ENV_CONFIG_PATH);
        env::remove_var(ENV_RELEVANCE_THRESHOLD);
        env::remove_var(ENV_INDUSTRY);
        env::set_current_dir(&old).unwrap();
    }
}
