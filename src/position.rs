// src/position.rs
//! Reviewer position inference.
//!
//! First-person employment phrases beat customer phrases; anything else is a
//! generic "Google Reviewer". Plain substring matching on the lower-cased text,
//! no scoring.

use serde::Deserialize;

use crate::review::Position;

/// Phrase lists (`[position]` in config).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PositionSettings {
    #[serde(default = "default_employee_phrases")]
    pub employee_phrases: Vec<String>,
    #[serde(default = "default_customer_phrases")]
    pub customer_phrases: Vec<String>,
}

impl Default for PositionSettings {
    fn default() -> Self {
        Self {
            employee_phrases: default_employee_phrases(),
            customer_phrases: default_customer_phrases(),
        }
    }
}

pub fn default_employee_phrases() -> Vec<String> {
    to_strings(&[
        "i work",
        "worked here",
        "working here",
        "my job",
        "my role",
        "my position",
        "my manager",
        "my supervisor",
        "my team",
        "my department",
        "my coworkers",
        "my colleagues",
        "interviewed",
        "got hired",
        "got fired",
        "laid off",
        "my salary",
        "my wage",
        "employee",
        "employer",
    ])
}

pub fn default_customer_phrases() -> Vec<String> {
    to_strings(&[
        "bought",
        "purchased",
        "ordered",
        "customer service",
        "shopping",
        "shop",
        "store",
        "retail",
        "service",
        "product quality",
        "delivery",
        "ordered online",
    ])
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct PositionClassifier {
    employee: Vec<String>,
    customer: Vec<String>,
}

impl PositionClassifier {
    pub fn new<S: AsRef<str>>(employee_phrases: &[S], customer_phrases: &[S]) -> Self {
        Self {
            employee: clean(employee_phrases),
            customer: clean(customer_phrases),
        }
    }

    pub fn from_settings(settings: &PositionSettings) -> Self {
        Self::new(
            settings.employee_phrases.as_slice(),
            settings.customer_phrases.as_slice(),
        )
    }

    /// Total and deterministic: every input maps to exactly one label.
    pub fn classify(&self, text: &str) -> Position {
        let lower = text.to_lowercase();
        if self.employee.iter().any(|p| lower.contains(p.as_str())) {
            Position::Employee
        } else if self.customer.iter().any(|p| lower.contains(p.as_str())) {
            Position::Customer
        } else {
            Position::GoogleReviewer
        }
    }
}

impl Default for PositionClassifier {
    fn default() -> Self {
        Self::from_settings(&PositionSettings::default())
    }
}

// Empty phrases would match everything.
fn clean<S: AsRef<str>>(phrases: &[S]) -> Vec<String> {
    phrases
        .iter()
        .map(|p| p.as_ref().trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
