//! Classification rule definitions

use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use triage_core::{Category, Error, Priority, Result};

/// How a rule's pattern is matched against `subject + " " + body`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    /// Case-insensitive substring containment
    #[default]
    Keyword,
    /// Case-insensitive regular expression
    Regex,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Regex => "regex",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyword" => Ok(Self::Keyword),
            "regex" => Ok(Self::Regex),
            other => Err(Error::invalid_argument(format!(
                "unknown pattern type '{}'",
                other
            ))),
        }
    }
}

/// A stored override rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationRule {
    /// Monotonic id; higher ids were created later and are evaluated first
    pub id: u64,

    pub pattern: String,

    pub pattern_type: PatternType,

    pub category: Category,

    pub priority: Priority,

    /// Team override; falls back to the assignment resolver when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    /// Matching tickets are classified as spam, ignoring category/priority
    #[serde(default)]
    pub auto_spam: bool,

    pub created_at: DateTime<Utc>,
}

/// A rule definition before the store assigns it an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRule {
    pub pattern: String,

    #[serde(default)]
    pub pattern_type: PatternType,

    pub category: Category,

    pub priority: Priority,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,

    #[serde(default)]
    pub auto_spam: bool,
}

impl NewRule {
    /// Keyword rule
    pub fn keyword(pattern: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            pattern: pattern.into(),
            pattern_type: PatternType::Keyword,
            category,
            priority,
            assigned_to: None,
            auto_spam: false,
        }
    }

    /// Regex rule
    pub fn regex(pattern: impl Into<String>, category: Category, priority: Priority) -> Self {
        Self {
            pattern_type: PatternType::Regex,
            ..Self::keyword(pattern, category, priority)
        }
    }

    /// Spam rule. Category and priority are fixed by the spam outcome.
    pub fn spam(pattern: impl Into<String>, pattern_type: PatternType) -> Self {
        Self {
            pattern_type,
            auto_spam: true,
            ..Self::keyword(pattern, Category::Other, Priority::Low)
        }
    }

    /// Route matching tickets to `team`
    pub fn with_assignee(mut self, team: impl Into<String>) -> Self {
        self.assigned_to = Some(team.into());
        self
    }

    /// Reject rules that could never be evaluated
    pub fn validate(&self) -> Result<()> {
        if self.pattern.trim().is_empty() {
            return Err(Error::invalid_argument("rule pattern must not be empty"));
        }
        if let Some(team) = &self.assigned_to {
            if team.trim().is_empty() {
                return Err(Error::invalid_argument("rule assignee must not be blank"));
            }
        }
        RuleMatcher::compile(&self.pattern, self.pattern_type).map(|_| ())
    }

    /// Attach the store-assigned id
    pub fn into_rule(self, id: u64, created_at: DateTime<Utc>) -> ClassificationRule {
        ClassificationRule {
            id,
            pattern: self.pattern,
            pattern_type: self.pattern_type,
            category: self.category,
            priority: self.priority,
            assigned_to: self.assigned_to,
            auto_spam: self.auto_spam,
            created_at,
        }
    }
}

/// Compiled form of a rule pattern
#[derive(Debug, Clone)]
pub enum RuleMatcher {
    /// Lowercased needle
    Keyword(String),
    Regex(Regex),
}

impl RuleMatcher {
    /// Compile a pattern. Malformed regexes fail with `InvalidArgument`.
    pub fn compile(pattern: &str, pattern_type: PatternType) -> Result<Self> {
        match pattern_type {
            PatternType::Keyword => Ok(Self::Keyword(pattern.to_lowercase())),
            PatternType::Regex => RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map(Self::Regex)
                .map_err(|e| {
                    Error::invalid_argument(format!("invalid regex '{}': {}", pattern, e))
                }),
        }
    }

    /// Test the raw text and its lowercased form
    pub fn is_match(&self, text: &str, lowered: &str) -> bool {
        match self {
            Self::Keyword(needle) => lowered.contains(needle.as_str()),
            Self::Regex(re) => re.is_match(text),
        }
    }
}

/// A batch of rule definitions loaded from YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleBook {
    /// Rules in file order; importing them in this order means the last
    /// entry is evaluated first
    pub rules: Vec<NewRule>,
}

impl RuleBook {
    /// Load a rule book from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let book: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse rule book: {}", e)))?;
        for rule in &book.rules {
            rule.validate()?;
        }
        Ok(book)
    }

    /// Load a rule book from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let m = RuleMatcher::compile("VIP-Client", PatternType::Keyword).unwrap();
        let text = "Escalation for vip-CLIENT account";
        assert!(m.is_match(text, &text.to_lowercase()));
        assert!(!m.is_match("regular client", "regular client"));
    }

    #[test]
    fn test_regex_match_is_case_insensitive() {
        let m = RuleMatcher::compile(r"order\s+#\d{4}", PatternType::Regex).unwrap();
        let text = "Where is ORDER #1234?";
        assert!(m.is_match(text, &text.to_lowercase()));
        assert!(!m.is_match("order #12", "order #12"));
    }

    #[test]
    fn test_malformed_regex_rejected_at_creation() {
        let rule = NewRule::regex("([unclosed", Category::Bug, Priority::High);
        let err = rule.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_blank_pattern_rejected() {
        let rule = NewRule::keyword("   ", Category::Bug, Priority::High);
        assert!(rule.validate().is_err());
    }

    #[test]
    fn test_spam_rule_defaults() {
        let rule = NewRule::spam("lottery", PatternType::Keyword);
        assert!(rule.auto_spam);
        assert_eq!(rule.category, Category::Other);
        assert_eq!(rule.priority, Priority::Low);
    }

    #[test]
    fn test_pattern_type_parse() {
        assert_eq!("REGEX".parse::<PatternType>().unwrap(), PatternType::Regex);
        assert!("glob".parse::<PatternType>().is_err());
    }

    #[test]
    fn test_rule_book_deserialization() {
        let yaml = r#"
rules:
  - pattern: "vip-client"
    category: complaint
    priority: critical
    assigned_to: exec-escalation
  - pattern: "(?:bitcoin|crypto) giveaway"
    pattern_type: regex
    category: other
    priority: low
    auto_spam: true
"#;
        let book = RuleBook::from_yaml(yaml).unwrap();
        assert_eq!(book.rules.len(), 2);
        assert_eq!(book.rules[0].pattern_type, PatternType::Keyword);
        assert_eq!(book.rules[0].assigned_to.as_deref(), Some("exec-escalation"));
        assert!(book.rules[1].auto_spam);
    }

    #[test]
    fn test_rule_book_rejects_bad_regex() {
        let yaml = r#"
rules:
  - pattern: "(["
    pattern_type: regex
    category: bug
    priority: low
"#;
        assert!(matches!(
            RuleBook::from_yaml(yaml),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_rule_serialization_is_snake_case() {
        let rule = NewRule::keyword("refund", Category::FeatureRequest, Priority::High)
            .into_rule(7, Utc::now());
        let json = serde_json::to_string(&rule).unwrap();
        assert!(json.contains("\"pattern_type\":\"keyword\""));
        assert!(json.contains("\"category\":\"feature_request\""));
        assert!(!json.contains("assigned_to"));
    }
}
