//! Hash-chained review history
//!
//! Every review appends one [`HistoryEntry`]. Each entry carries the hash
//! of its predecessor, so editing or dropping an entry breaks the chain.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use triage_core::{Category, Priority, TicketClassification};

/// Kind of action recorded in the history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Review,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Review => "review",
        }
    }
}

/// One immutable audit record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Position in the chain, starting at 1
    pub id: u64,

    pub ticket_id: String,

    pub action: HistoryAction,

    pub previous_category: Category,
    pub new_category: Category,

    pub previous_priority: Priority,
    pub new_priority: Priority,

    #[serde(default)]
    pub previous_assigned_to: Option<String>,
    #[serde(default)]
    pub new_assigned_to: Option<String>,

    pub timestamp: DateTime<Utc>,

    /// Hash of the preceding entry
    pub previous_hash: Option<String>,

    /// Hash of this entry
    pub hash: Option<String>,
}

impl HistoryEntry {
    /// Unsealed review entry capturing before and after state
    pub fn review(before: &TicketClassification, after: &TicketClassification) -> Self {
        Self {
            id: 0,
            ticket_id: after.ticket_id.clone(),
            action: HistoryAction::Review,
            previous_category: before.category,
            new_category: after.category,
            previous_priority: before.priority,
            new_priority: after.priority,
            previous_assigned_to: before.assigned_to.clone(),
            new_assigned_to: after.assigned_to.clone(),
            timestamp: Utc::now(),
            previous_hash: None,
            hash: None,
        }
    }

    /// Store key that keeps entries in chain order
    pub fn key(&self) -> String {
        format!("{:012}", self.id)
    }
}

/// Tracks the head of the chain and seals new entries onto it
#[derive(Debug, Clone, Default)]
pub struct HistoryChain {
    head: Option<String>,
    last_id: u64,
}

impl HistoryChain {
    /// Empty chain
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue a chain whose newest stored entry is `last`
    pub fn resume(last: Option<&HistoryEntry>) -> Self {
        match last {
            Some(entry) => Self {
                head: entry.hash.clone(),
                last_id: entry.id,
            },
            None => Self::new(),
        }
    }

    /// Assign the next id, link to the head and hash the entry.
    ///
    /// The chain head only moves when the caller commits the sealed entry.
    pub fn seal(&self, mut entry: HistoryEntry) -> HistoryEntry {
        entry.id = self.last_id + 1;
        entry.previous_hash = self.head.clone();
        entry.hash = Some(compute_hash(&entry));
        entry
    }

    /// Advance the head past a persisted entry
    pub fn commit(&mut self, entry: &HistoryEntry) {
        self.head = entry.hash.clone();
        self.last_id = entry.id;
    }

    /// Hash of the newest entry
    pub fn head(&self) -> Option<&str> {
        self.head.as_deref()
    }

    /// Number of entries sealed so far
    pub fn len(&self) -> u64 {
        self.last_id
    }

    pub fn is_empty(&self) -> bool {
        self.last_id == 0
    }
}

/// Compute hash for an entry (excluding the hash field itself)
pub fn compute_hash(entry: &HistoryEntry) -> String {
    let mut hasher = Sha256::new();

    hasher.update(entry.id.to_be_bytes());
    hasher.update(entry.ticket_id.as_bytes());
    hasher.update(entry.action.as_str().as_bytes());
    hasher.update(entry.previous_category.as_str().as_bytes());
    hasher.update(entry.new_category.as_str().as_bytes());
    hasher.update(entry.previous_priority.as_str().as_bytes());
    hasher.update(entry.new_priority.as_str().as_bytes());
    for team in [&entry.previous_assigned_to, &entry.new_assigned_to] {
        // 0 marks an absent assignee so None and Some("") differ
        match team {
            Some(team) => {
                hasher.update([1u8]);
                hasher.update(team.as_bytes());
            }
            None => hasher.update([0u8]),
        }
    }
    hasher.update(
        entry
            .timestamp
            .to_rfc3339_opts(SecondsFormat::Nanos, true)
            .as_bytes(),
    );
    if let Some(ref prev) = entry.previous_hash {
        hasher.update(prev.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

/// Result of re-checking a stored chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainVerification {
    /// Entries checked
    pub entries: usize,

    /// Id of the first entry whose link or hash does not check out
    pub first_broken: Option<u64>,
}

impl ChainVerification {
    pub fn is_intact(&self) -> bool {
        self.first_broken.is_none()
    }
}

/// Verify entries given in chain order
pub fn verify_chain(entries: &[HistoryEntry]) -> ChainVerification {
    let mut prev_hash: Option<String> = None;
    let mut expected_id = 1;

    for entry in entries {
        let intact = entry.id == expected_id
            && entry.previous_hash == prev_hash
            && entry.hash.as_deref() == Some(compute_hash(entry).as_str());

        if !intact {
            return ChainVerification {
                entries: entries.len(),
                first_broken: Some(entry.id),
            };
        }

        prev_hash = entry.hash.clone();
        expected_id += 1;
    }

    ChainVerification {
        entries: entries.len(),
        first_broken: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classification(category: Category, priority: Priority) -> TicketClassification {
        TicketClassification {
            ticket_id: "T-1".to_string(),
            category,
            priority,
            priority_score: 50,
            confidence: 0.6,
            reasons: vec![],
            assigned_to: Some("support".to_string()),
            is_spam: false,
            spam_score: 0.0,
            classified_at: Utc::now(),
            reviewed: false,
        }
    }

    fn build_chain(n: usize) -> Vec<HistoryEntry> {
        let mut chain = HistoryChain::new();
        let before = classification(Category::Question, Priority::Medium);
        let after = classification(Category::Billing, Priority::High);

        (0..n)
            .map(|_| {
                let entry = chain.seal(HistoryEntry::review(&before, &after));
                chain.commit(&entry);
                entry
            })
            .collect()
    }

    #[test]
    fn test_history_chain() {
        let entries = build_chain(3);

        assert_eq!(entries[0].id, 1);
        assert_eq!(entries[0].previous_hash, None);
        assert_eq!(entries[1].previous_hash, entries[0].hash);
        assert!(verify_chain(&entries).is_intact());
        assert_eq!(entries[2].key(), "000000000003");
    }

    #[test]
    fn test_tamper_detection() {
        let mut entries = build_chain(3);

        entries[1].new_priority = Priority::Low;

        let report = verify_chain(&entries);
        assert!(!report.is_intact());
        assert_eq!(report.first_broken, Some(2));
    }

    #[test]
    fn test_dropped_entry_detected() {
        let mut entries = build_chain(3);
        entries.remove(1);
        assert_eq!(verify_chain(&entries).first_broken, Some(3));
    }

    #[test]
    fn test_resume_continues_chain() {
        let entries = build_chain(2);
        let mut chain = HistoryChain::resume(entries.last());
        assert_eq!(chain.len(), 2);

        let before = classification(Category::Bug, Priority::Low);
        let next = chain.seal(HistoryEntry::review(&before, &before));
        chain.commit(&next);

        let mut all = entries;
        all.push(next);
        assert!(verify_chain(&all).is_intact());
        assert_eq!(chain.head(), all[2].hash.as_deref());
    }

    #[test]
    fn test_hash_survives_serde() {
        let entries = build_chain(2);
        let json = serde_json::to_string(&entries).unwrap();
        let restored: Vec<HistoryEntry> = serde_json::from_str(&json).unwrap();
        assert!(verify_chain(&restored).is_intact());
    }
}
