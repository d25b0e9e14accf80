//! Core types for triage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A single inbound support request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Opaque, unique ticket identifier
    pub id: String,

    /// Subject line
    pub subject: String,

    /// Free-text body
    #[serde(default)]
    pub body: String,

    /// Sender address
    #[serde(default)]
    pub from: String,

    /// When the ticket was received
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Optional tags supplied by the caller
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Ticket {
    /// Create a new ticket received now
    pub fn new(id: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            body: body.into(),
            from: String::new(),
            created_at: Utc::now(),
            tags: BTreeSet::new(),
        }
    }

    /// Set the sender address
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Set the receive timestamp
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Subject and body joined with a single space, as matched by rules
    pub fn text(&self) -> String {
        format!("{} {}", self.subject, self.body)
    }

    /// Lowercased subject and body, as scanned by the heuristics
    pub fn normalized_text(&self) -> String {
        self.text().to_lowercase()
    }
}

/// Fixed category enumeration.
///
/// Declaration order is the tie-break order used by the category classifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Bug,
    FeatureRequest,
    Question,
    Complaint,
    Billing,
    Technical,
    Account,
    Other,
}

impl Category {
    /// All categories in enumeration order
    pub const ALL: [Category; 8] = [
        Category::Bug,
        Category::FeatureRequest,
        Category::Question,
        Category::Complaint,
        Category::Billing,
        Category::Technical,
        Category::Account,
        Category::Other,
    ];

    /// Stable snake_case name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::FeatureRequest => "feature_request",
            Self::Question => "question",
            Self::Complaint => "complaint",
            Self::Billing => "billing",
            Self::Technical => "technical",
            Self::Account => "account",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| Error::invalid_argument(format!("unknown category '{}'", s)))
    }
}

/// Priority tier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// All tiers, most urgent first
    pub const ALL: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Score recorded when a classification rule assigns this tier
    pub fn rule_score(&self) -> u8 {
        match self {
            Self::Critical => 90,
            Self::High => 70,
            Self::Medium | Self::Low => 50,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == wanted)
            .ok_or_else(|| Error::invalid_argument(format!("unknown priority '{}'", s)))
    }
}

/// The engine's verdict for one ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketClassification {
    /// Ticket this classification belongs to
    pub ticket_id: String,

    pub category: Category,

    pub priority: Priority,

    /// Raw urgency score before tiering (0-100)
    pub priority_score: u8,

    /// Heuristic agreement measure (0.0-1.0)
    pub confidence: f64,

    /// Human-readable justifications, in the order they were produced
    pub reasons: Vec<String>,

    /// Team the ticket is routed to
    pub assigned_to: Option<String>,

    pub is_spam: bool,

    /// Spam score (0.0-1.0), recorded even below the spam threshold
    pub spam_score: f64,

    pub classified_at: DateTime<Utc>,

    /// Set only by an explicit human review
    pub reviewed: bool,
}

/// Fields a reviewer may change. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
}

impl ReviewUpdate {
    /// Create an empty update (confirms the classification as-is)
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the category
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Override the priority
    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Override the assignee
    pub fn assigned_to(mut self, team: impl Into<String>) -> Self {
        self.assigned_to = Some(team.into());
        self
    }

    /// Whether no field would change
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.priority.is_none() && self.assigned_to.is_none()
    }
}

/// Aggregate counts over all persisted classifications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub total_classified: usize,
    pub by_category: BTreeMap<Category, usize>,
    pub by_priority: BTreeMap<Priority, usize>,
    pub by_assignment: BTreeMap<String, usize>,
    pub spam_count: usize,

    /// Non-spam classifications still awaiting review
    pub unreviewed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trip_names() {
        for category in Category::ALL {
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
        assert_eq!(
            " Feature_Request ".parse::<Category>().unwrap(),
            Category::FeatureRequest
        );
    }

    #[test]
    fn test_unknown_category_is_invalid_argument() {
        let err = "spam".parse::<Category>().unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_priority_rule_scores() {
        assert_eq!(Priority::Critical.rule_score(), 90);
        assert_eq!(Priority::High.rule_score(), 70);
        assert_eq!(Priority::Medium.rule_score(), 50);
        assert_eq!(Priority::Low.rule_score(), 50);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_ticket_text() {
        let ticket = Ticket::new("T-1", "Login BROKEN", "Cannot sign in");
        assert_eq!(ticket.text(), "Login BROKEN Cannot sign in");
        assert_eq!(ticket.normalized_text(), "login broken cannot sign in");
    }

    #[test]
    fn test_ticket_deserialization_defaults() {
        let yaml = r#"
id: T-7
subject: "Invoice question"
"#;
        let ticket: Ticket = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(ticket.id, "T-7");
        assert!(ticket.body.is_empty());
        assert!(ticket.tags.is_empty());
    }

    #[test]
    fn test_stats_serialize_with_enum_keys() {
        let mut stats = ClassificationStats::default();
        stats.by_category.insert(Category::FeatureRequest, 2);
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"feature_request\":2"));
    }
}
