//! Storage records
//!
//! What the engine writes to the record store. Enum-valued fields are kept
//! as their snake_case names and parsed back at load time, so a record
//! written by a newer build with an unknown name surfaces as a storage
//! error instead of silently changing meaning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use triage_core::{Error, Result, TicketClassification};
use triage_policy::{AssignmentRule, ClassificationRule};

/// Collection holding one classification per ticket id
pub const CLASSIFICATIONS: &str = "classifications";

/// Collection holding override rules keyed by [`rule_key`]
pub const RULES: &str = "rules";

/// Collection holding assignment rules keyed by category name
pub const ASSIGNMENT_RULES: &str = "assignment_rules";

/// Collection holding the review history keyed by chain position
pub const HISTORY: &str = "history";

/// Collection holding id counters
pub const SEQUENCES: &str = "sequences";

/// Counter key for rule ids
pub const RULE_SEQUENCE: &str = "rules";

/// Key for a rule id. Zero-padded so key order is id order.
pub fn rule_key(id: u64) -> String {
    format!("{:012}", id)
}

fn parse_field<T>(field: &str, value: &str) -> Result<T>
where
    T: FromStr<Err = Error>,
{
    value
        .parse()
        .map_err(|e| Error::storage(format!("Corrupt {} field: {}", field, e)))
}

/// Last id issued from a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    pub last: u64,
}

/// Persisted classification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationRecord {
    pub ticket_id: String,
    pub category: String,
    pub priority: String,
    pub priority_score: u8,
    pub confidence: f64,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub is_spam: bool,
    #[serde(default)]
    pub spam_score: f64,
    pub classified_at: DateTime<Utc>,
    #[serde(default)]
    pub reviewed: bool,
}

impl From<&TicketClassification> for ClassificationRecord {
    fn from(c: &TicketClassification) -> Self {
        Self {
            ticket_id: c.ticket_id.clone(),
            category: c.category.as_str().to_string(),
            priority: c.priority.as_str().to_string(),
            priority_score: c.priority_score,
            confidence: c.confidence,
            reasons: c.reasons.clone(),
            assigned_to: c.assigned_to.clone(),
            is_spam: c.is_spam,
            spam_score: c.spam_score,
            classified_at: c.classified_at,
            reviewed: c.reviewed,
        }
    }
}

impl TryFrom<ClassificationRecord> for TicketClassification {
    type Error = Error;

    fn try_from(r: ClassificationRecord) -> Result<Self> {
        Ok(Self {
            category: parse_field("category", &r.category)?,
            priority: parse_field("priority", &r.priority)?,
            ticket_id: r.ticket_id,
            priority_score: r.priority_score.min(100),
            confidence: r.confidence,
            reasons: r.reasons,
            assigned_to: r.assigned_to,
            is_spam: r.is_spam,
            spam_score: r.spam_score,
            classified_at: r.classified_at,
            reviewed: r.reviewed,
        })
    }
}

/// Persisted override rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    pub id: u64,
    pub pattern: String,
    pub pattern_type: String,
    pub category: String,
    pub priority: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub auto_spam: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&ClassificationRule> for RuleRecord {
    fn from(rule: &ClassificationRule) -> Self {
        Self {
            id: rule.id,
            pattern: rule.pattern.clone(),
            pattern_type: rule.pattern_type.as_str().to_string(),
            category: rule.category.as_str().to_string(),
            priority: rule.priority.as_str().to_string(),
            assigned_to: rule.assigned_to.clone(),
            auto_spam: rule.auto_spam,
            created_at: rule.created_at,
        }
    }
}

impl TryFrom<RuleRecord> for ClassificationRule {
    type Error = Error;

    fn try_from(r: RuleRecord) -> Result<Self> {
        Ok(Self {
            pattern_type: parse_field("pattern_type", &r.pattern_type)?,
            category: parse_field("category", &r.category)?,
            priority: parse_field("priority", &r.priority)?,
            id: r.id,
            pattern: r.pattern,
            assigned_to: r.assigned_to,
            auto_spam: r.auto_spam,
            created_at: r.created_at,
        })
    }
}

/// Persisted assignment rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    pub category: String,
    pub team: String,
    #[serde(default)]
    pub workload: u32,
    #[serde(default = "default_active")]
    pub active: bool,
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl From<&AssignmentRule> for AssignmentRecord {
    fn from(rule: &AssignmentRule) -> Self {
        Self {
            category: rule.category.as_str().to_string(),
            team: rule.team.clone(),
            workload: rule.workload,
            active: rule.active,
            updated_at: rule.updated_at,
        }
    }
}

impl TryFrom<AssignmentRecord> for AssignmentRule {
    type Error = Error;

    fn try_from(r: AssignmentRecord) -> Result<Self> {
        Ok(Self {
            category: parse_field("category", &r.category)?,
            team: r.team,
            workload: r.workload,
            active: r.active,
            updated_at: r.updated_at,
        })
    }
}
