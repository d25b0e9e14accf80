//! Lexicon configuration for the heuristic scorers
//!
//! A [`Lexicon`] holds every phrase table the scorers consult plus the
//! priority weights. It is plain data: load it from YAML, or start from
//! [`Lexicon::default`] which carries the built-in tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use triage_core::{Category, Error, Result};

/// All phrase tables and weights used by the heuristics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lexicon {
    /// Keyword phrases per category (`other` must not appear)
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryLexicon>,

    /// Spam-indicative phrases
    #[serde(default = "default_spam_phrases")]
    pub spam_phrases: Vec<String>,

    /// Urgency keyword tables
    #[serde(default)]
    pub priority: PriorityLexicon,

    /// Priority scoring weights and thresholds
    #[serde(default)]
    pub priority_weights: PriorityWeights,
}

impl Lexicon {
    /// Load a lexicon from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let lexicon: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse lexicon: {}", e)))?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Load a lexicon from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "Failed to read lexicon {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Reject tables the category classifier cannot use
    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for entry in &self.categories {
            if entry.category == Category::Other {
                return Err(Error::config(
                    "the 'other' category is the fallback and cannot carry keywords",
                ));
            }
            if !seen.insert(entry.category) {
                return Err(Error::config(format!(
                    "category '{}' is listed more than once",
                    entry.category
                )));
            }
        }
        Ok(())
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            categories: default_categories(),
            spam_phrases: default_spam_phrases(),
            priority: PriorityLexicon::default(),
            priority_weights: PriorityWeights::default(),
        }
    }
}

/// Keyword phrases for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLexicon {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryLexicon {
    pub fn new(category: Category, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }
}

/// Urgency keyword tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityLexicon {
    /// Any match forces the `critical` tier
    #[serde(default = "default_critical_keywords")]
    pub critical: Vec<String>,

    #[serde(default = "default_high_keywords")]
    pub high: Vec<String>,

    /// Low-priority signals
    #[serde(default = "default_low_keywords")]
    pub low: Vec<String>,
}

impl Default for PriorityLexicon {
    fn default() -> Self {
        Self {
            critical: default_critical_keywords(),
            high: default_high_keywords(),
            low: default_low_keywords(),
        }
    }
}

/// Priority scoring weights and tier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityWeights {
    #[serde(default = "default_baseline")]
    pub baseline: i32,

    /// Added per distinct critical keyword
    #[serde(default = "default_critical_weight")]
    pub critical: i32,

    /// Added per distinct high keyword
    #[serde(default = "default_high_weight")]
    pub high: i32,

    /// Subtracted per distinct low-priority signal
    #[serde(default = "default_low_penalty")]
    pub low_penalty: i32,

    /// Flat bonus for reply/forward subjects
    #[serde(default = "default_reply_bonus")]
    pub reply_bonus: i32,

    /// Added per exclamation mark once the subject has more than two
    #[serde(default = "default_exclamation_weight")]
    pub exclamation: i32,

    /// Minimum score for the `high` tier
    #[serde(default = "default_high_threshold")]
    pub high_threshold: i32,

    /// Scores at or below this land in `low`
    #[serde(default = "default_low_threshold")]
    pub low_threshold: i32,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            baseline: default_baseline(),
            critical: default_critical_weight(),
            high: default_high_weight(),
            low_penalty: default_low_penalty(),
            reply_bonus: default_reply_bonus(),
            exclamation: default_exclamation_weight(),
            high_threshold: default_high_threshold(),
            low_threshold: default_low_threshold(),
        }
    }
}

fn default_baseline() -> i32 {
    50
}

fn default_critical_weight() -> i32 {
    25
}

fn default_high_weight() -> i32 {
    10
}

fn default_low_penalty() -> i32 {
    15
}

fn default_reply_bonus() -> i32 {
    5
}

fn default_exclamation_weight() -> i32 {
    3
}

fn default_high_threshold() -> i32 {
    60
}

fn default_low_threshold() -> i32 {
    30
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_categories() -> Vec<CategoryLexicon> {
    vec![
        CategoryLexicon::new(
            Category::Bug,
            &[
                "bug", "error", "crash", "broken", "not working", "doesn't work",
                "exception", "glitch", "fails", "failed", "stack trace",
            ],
        ),
        CategoryLexicon::new(
            Category::FeatureRequest,
            &[
                "feature", "would be nice", "would love", "suggestion", "add support",
                "enhancement", "could you add", "please add", "wish list", "roadmap",
            ],
        ),
        CategoryLexicon::new(
            Category::Question,
            &[
                "how do i", "how to", "what is", "question", "wondering", "is it possible",
                "can you explain", "where can i", "help me understand",
            ],
        ),
        CategoryLexicon::new(
            Category::Complaint,
            &[
                "disappointed", "unhappy", "terrible", "worst", "frustrated",
                "unacceptable", "complaint", "angry", "poor service", "waste of",
            ],
        ),
        CategoryLexicon::new(
            Category::Billing,
            &[
                "invoice", "refund", "charge", "payment", "billing", "subscription",
                "pricing", "credit card", "receipt", "overcharged",
            ],
        ),
        CategoryLexicon::new(
            Category::Technical,
            &[
                "server", "api", "database", "integration", "configuration", "timeout",
                "outage", "is down", "went down", "performance", "latency", "ssl", "dns",
            ],
        ),
        CategoryLexicon::new(
            Category::Account,
            &[
                "password", "login", "log in", "account", "username", "sign in",
                "locked out", "two-factor", "2fa", "profile",
            ],
        ),
    ]
}

fn default_spam_phrases() -> Vec<String> {
    to_strings(&[
        "lottery", "click here", "work from home", "congratulations", "you won",
        "you have won", "million dollars", "free money", "act now", "limited time offer",
        "claim your prize", "wire transfer", "crypto investment", "earn money fast",
        "100% free", "no credit check", "viagra", "casino", "unsubscribe",
    ])
}

fn default_critical_keywords() -> Vec<String> {
    to_strings(&[
        "urgent", "emergency", "critical", "outage", "is down", "went down",
        "site down", "security breach", "data loss", "hacked", "production",
        "system failure",
    ])
}

fn default_high_keywords() -> Vec<String> {
    to_strings(&[
        "asap", "important", "can't access", "cannot access", "blocked", "deadline",
        "immediately", "not loading", "high priority",
    ])
}

fn default_low_keywords() -> Vec<String> {
    to_strings(&[
        "nice to have", "low priority", "no rush", "when you have time", "whenever",
        "minor", "just curious", "someday",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_is_valid() {
        let lexicon = Lexicon::default();
        lexicon.validate().unwrap();
        assert_eq!(lexicon.categories.len(), 7);
        assert!(lexicon
            .categories
            .iter()
            .all(|c| c.category != Category::Other));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
spam_phrases:
  - "miracle cure"
priority_weights:
  critical: 30
"#;
        let lexicon = Lexicon::from_yaml(yaml).unwrap();
        assert_eq!(lexicon.spam_phrases, vec!["miracle cure".to_string()]);
        assert_eq!(lexicon.priority_weights.critical, 30);
        assert_eq!(lexicon.priority_weights.baseline, 50);
        assert_eq!(lexicon.categories, default_categories());
        assert_eq!(lexicon.priority, PriorityLexicon::default());
    }

    #[test]
    fn test_other_category_rejected() {
        let yaml = r#"
categories:
  - category: other
    keywords: ["misc"]
"#;
        let err = Lexicon::from_yaml(yaml).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_duplicate_category_rejected() {
        let yaml = r#"
categories:
  - category: bug
    keywords: ["crash"]
  - category: bug
    keywords: ["error"]
"#;
        assert!(Lexicon::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.yaml");
        std::fs::write(&path, "spam_phrases: [\"jackpot\"]\n").unwrap();

        let lexicon = Lexicon::from_file(&path).unwrap();
        assert_eq!(lexicon.spam_phrases, vec!["jackpot".to_string()]);

        let missing = Lexicon::from_file(dir.path().join("nope.yaml"));
        assert!(matches!(missing, Err(Error::Config(_))));
    }
}
