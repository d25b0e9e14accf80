//! Classification orchestrator

use crate::config::EngineConfig;
use crate::locks::KeyLocks;
use crate::records::{
    rule_key, AssignmentRecord, ClassificationRecord, RuleRecord, SequenceRecord,
    ASSIGNMENT_RULES, CLASSIFICATIONS, HISTORY, RULES, RULE_SEQUENCE, SEQUENCES,
};
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use triage_classifiers::HeuristicPipeline;
use triage_core::{
    Category, Error, Priority, Result, ReviewUpdate, Ticket, TicketClassification,
};
use triage_policy::{
    AssignmentResolver, AssignmentRule, ClassificationRule, NewRule, RuleMatch, RuleSet,
};
use triage_storage::{Collection, RecordStore, ScanOptions};
use triage_telemetry::history::verify_chain;
use triage_telemetry::{
    ChainVerification, ClassificationSource, HistoryChain, HistoryEntry, MetricsCollector,
};

/// Priority score recorded for spam-rule hits
const SPAM_RULE_SCORE: u8 = 10;

/// Confidence and spam score recorded for spam-rule hits
const SPAM_RULE_CONFIDENCE: f64 = 0.95;

/// Confidence recorded for classification-rule hits
const RULE_CONFIDENCE: f64 = 0.9;

/// Classifies tickets and persists the results.
///
/// All state lives in the record store; the engine caches the compiled
/// rule set and the assignment table and rebuilds them after every
/// mutation it performs.
pub struct ClassificationEngine {
    classifications: Collection<ClassificationRecord>,
    rules: Collection<RuleRecord>,
    assignments: Collection<AssignmentRecord>,
    history: Collection<HistoryEntry>,
    sequences: Collection<SequenceRecord>,

    pipeline: HeuristicPipeline,
    default_teams: BTreeMap<Category, String>,

    rule_set: RwLock<Arc<RuleSet>>,
    resolver: RwLock<Arc<AssignmentResolver>>,

    ticket_locks: KeyLocks,
    /// Last allocated rule id; held while rules are mutated
    rule_ids: Mutex<u64>,
    /// Held while assignment rules are mutated
    assignment_lock: Mutex<()>,
    history_chain: Mutex<HistoryChain>,

    metrics: MetricsCollector,
}

impl ClassificationEngine {
    /// Open an engine over `store`, loading rules and the history head
    pub async fn open(store: Arc<dyn RecordStore>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = HeuristicPipeline::new(&config.lexicon)?;

        let engine = Self {
            classifications: Collection::new(Arc::clone(&store), CLASSIFICATIONS),
            rules: Collection::new(Arc::clone(&store), RULES),
            assignments: Collection::new(Arc::clone(&store), ASSIGNMENT_RULES),
            history: Collection::new(Arc::clone(&store), HISTORY),
            sequences: Collection::new(Arc::clone(&store), SEQUENCES),
            pipeline,
            default_teams: config.default_teams,
            rule_set: RwLock::new(Arc::new(RuleSet::default())),
            resolver: RwLock::new(Arc::new(AssignmentResolver::default())),
            ticket_locks: KeyLocks::new(),
            rule_ids: Mutex::new(0),
            assignment_lock: Mutex::new(()),
            history_chain: Mutex::new(HistoryChain::new()),
            metrics: MetricsCollector::new(),
        };

        let last_rule_id = {
            let newest = engine
                .rules
                .scan(&ScanOptions::new().reverse().limit(1))
                .await?;
            let stored = newest.first().map(|(_, record)| record.id).unwrap_or(0);
            let issued = engine
                .sequences
                .get(RULE_SEQUENCE)
                .await?
                .map(|seq| seq.last)
                .unwrap_or(0);
            stored.max(issued)
        };
        *engine.rule_ids.lock().await = last_rule_id;
        engine.refresh_rules().await?;

        if config.seed_assignment_rules {
            engine.seed_assignment_rules().await?;
        }
        engine.refresh_assignments().await?;

        let head = engine
            .history
            .scan(&ScanOptions::new().reverse().limit(1))
            .await?;
        *engine.history_chain.lock().await =
            HistoryChain::resume(head.first().map(|(_, entry)| entry));

        info!(
            store = store.name(),
            rules = engine.rule_set.read().len(),
            last_rule_id,
            "Classification engine opened"
        );

        Ok(engine)
    }

    /// Classify a ticket, or return its existing classification unchanged
    pub async fn classify(&self, ticket: &Ticket) -> Result<TicketClassification> {
        validate_ticket(ticket)?;
        let _guard = self.ticket_locks.lock(&ticket.id).await;

        if let Some(existing) = self.load_classification(&ticket.id).await? {
            self.metrics.record_cache_hit();
            debug!(ticket = %ticket.id, "Returning existing classification");
            return Ok(existing);
        }

        self.classify_and_store(ticket).await
    }

    /// Recompute an unreviewed classification against the current rules and
    /// lexicon. Reviewed classifications are returned unchanged.
    pub async fn reclassify(&self, ticket: &Ticket) -> Result<TicketClassification> {
        validate_ticket(ticket)?;
        let _guard = self.ticket_locks.lock(&ticket.id).await;

        if let Some(existing) = self.load_classification(&ticket.id).await? {
            if existing.reviewed {
                debug!(ticket = %ticket.id, "Reviewed classification left untouched");
                return Ok(existing);
            }
        }

        self.classify_and_store(ticket).await
    }

    /// Fetch the stored classification for a ticket
    pub async fn get_classification(
        &self,
        ticket_id: &str,
    ) -> Result<Option<TicketClassification>> {
        self.load_classification(ticket_id).await
    }

    /// Apply a human review.
    ///
    /// Only the fields set in `update` change. A history entry recording
    /// the before and after state is appended even when nothing changes.
    /// The reviewed classification is stored first; if the history entry
    /// cannot be written, the previous classification is put back.
    pub async fn review(
        &self,
        ticket_id: &str,
        update: ReviewUpdate,
    ) -> Result<TicketClassification> {
        if let Some(team) = &update.assigned_to {
            if team.trim().is_empty() {
                return Err(Error::invalid_argument("assignee must not be blank"));
            }
        }

        let _guard = self.ticket_locks.lock(ticket_id).await;

        let before = self
            .load_classification(ticket_id)
            .await?
            .ok_or_else(|| Error::not_found("classification", ticket_id))?;

        let mut after = before.clone();
        if let Some(category) = update.category {
            after.category = category;
        }
        if let Some(priority) = update.priority {
            after.priority = priority;
        }
        if let Some(team) = update.assigned_to {
            after.assigned_to = Some(team);
        }
        after.reviewed = true;

        self.store_classification(&after).await?;
        let entry = match self
            .append_history(HistoryEntry::review(&before, &after))
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                warn!(
                    ticket = %ticket_id,
                    error = %e,
                    "History append failed, restoring classification"
                );
                self.store_classification(&before).await?;
                return Err(e);
            }
        };
        self.metrics.record_review();

        info!(
            ticket = %ticket_id,
            history_id = entry.id,
            category = %after.category,
            priority = %after.priority,
            assigned_to = ?after.assigned_to,
            "Classification reviewed"
        );

        Ok(after)
    }

    /// Validate and store a new override rule. It is evaluated before every
    /// existing rule.
    pub async fn add_classification_rule(&self, rule: NewRule) -> Result<ClassificationRule> {
        rule.validate()?;

        let mut last_id = self.rule_ids.lock().await;
        let rule = rule.into_rule(*last_id + 1, Utc::now());

        // Record the id as issued first so it is never handed out again
        self.sequences
            .put(RULE_SEQUENCE, &SequenceRecord { last: rule.id })
            .await?;
        self.rules
            .put(&rule_key(rule.id), &RuleRecord::from(&rule))
            .await?;
        *last_id = rule.id;
        self.refresh_rules().await?;

        info!(
            rule_id = rule.id,
            pattern = %rule.pattern,
            pattern_type = %rule.pattern_type,
            auto_spam = rule.auto_spam,
            "Classification rule added"
        );

        Ok(rule)
    }

    /// Rules in evaluation order
    pub fn list_classification_rules(&self) -> Vec<ClassificationRule> {
        self.rule_set.read().rules().cloned().collect()
    }

    /// Delete a rule. Unknown ids succeed; the return value reports whether
    /// a rule was removed.
    pub async fn delete_classification_rule(&self, id: u64) -> Result<bool> {
        let _last_id = self.rule_ids.lock().await;
        let removed = self.rules.delete(&rule_key(id)).await?;
        if removed {
            self.refresh_rules().await?;
            info!(rule_id = id, "Classification rule deleted");
        } else {
            debug!(rule_id = id, "Delete of unknown rule ignored");
        }
        Ok(removed)
    }

    /// Create or replace the routing rule for a category. The stored
    /// workload is carried over.
    pub async fn update_assignment_rule(
        &self,
        category: Category,
        team: &str,
        active: bool,
    ) -> Result<AssignmentRule> {
        let team = team.trim();
        if team.is_empty() {
            return Err(Error::invalid_argument("team must not be blank"));
        }

        let _lock = self.assignment_lock.lock().await;

        let workload = match self.assignments.get(category.as_str()).await? {
            Some(record) => record.workload,
            None => 0,
        };
        let rule = AssignmentRule {
            workload,
            ..AssignmentRule::new(category, team).with_active(active)
        };
        self.assignments
            .put(category.as_str(), &AssignmentRecord::from(&rule))
            .await?;
        self.refresh_assignments().await?;

        info!(category = %category, team = %rule.team, active, "Assignment rule updated");

        Ok(rule)
    }

    /// Stored assignment rules in category order
    pub async fn get_assignment_rules(&self) -> Result<Vec<AssignmentRule>> {
        let mut rules = self.load_assignment_rules().await?;
        rules.sort_by_key(|rule| rule.category);
        Ok(rules)
    }

    /// Review history for one ticket, oldest first
    pub async fn history(&self, ticket_id: &str) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .history
            .all()
            .await?
            .into_iter()
            .filter(|entry| entry.ticket_id == ticket_id)
            .collect())
    }

    /// Re-check the hash chain over the whole review history
    pub async fn verify_history(&self) -> Result<ChainVerification> {
        let _chain = self.history_chain.lock().await;
        let entries = self.history.all().await?;
        let report = verify_chain(&entries);
        if let Some(id) = report.first_broken {
            warn!(entry = id, "Review history chain is broken");
        }
        Ok(report)
    }

    /// In-process counters
    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Every stored classification. Records that fail to map are skipped.
    pub(crate) async fn all_classifications(&self) -> Result<Vec<TicketClassification>> {
        let records = self.classifications.scan(&ScanOptions::new()).await?;
        Ok(records
            .into_iter()
            .filter_map(|(key, record)| match TicketClassification::try_from(record) {
                Ok(classification) => Some(classification),
                Err(e) => {
                    warn!(ticket = %key, error = %e, "Skipping corrupt classification");
                    None
                }
            })
            .collect())
    }

    async fn classify_and_store(&self, ticket: &Ticket) -> Result<TicketClassification> {
        let (classification, source) = self.evaluate(ticket);
        self.store_classification(&classification).await?;
        self.metrics
            .record_classification(source, classification.is_spam);

        info!(
            ticket = %ticket.id,
            source = source.as_str(),
            category = %classification.category,
            priority = %classification.priority,
            score = classification.priority_score,
            is_spam = classification.is_spam,
            assigned_to = ?classification.assigned_to,
            "Ticket classified"
        );

        Ok(classification)
    }

    /// Rule check, then heuristics. Pure apart from metrics.
    fn evaluate(&self, ticket: &Ticket) -> (TicketClassification, ClassificationSource) {
        let rules = Arc::clone(&self.rule_set.read());
        let resolver = Arc::clone(&self.resolver.read());
        let classified_at = Utc::now();

        match rules.find_matching_rule(ticket) {
            Some(RuleMatch::Spam(_)) => (
                TicketClassification {
                    ticket_id: ticket.id.clone(),
                    category: Category::Other,
                    priority: Priority::Low,
                    priority_score: SPAM_RULE_SCORE,
                    confidence: SPAM_RULE_CONFIDENCE,
                    reasons: vec!["Matched spam rule".to_string()],
                    assigned_to: None,
                    is_spam: true,
                    spam_score: SPAM_RULE_CONFIDENCE,
                    classified_at,
                    reviewed: false,
                },
                ClassificationSource::SpamRule,
            ),
            Some(RuleMatch::Classify(rule)) => (
                TicketClassification {
                    ticket_id: ticket.id.clone(),
                    category: rule.category,
                    priority: rule.priority,
                    priority_score: rule.priority.rule_score(),
                    confidence: RULE_CONFIDENCE,
                    reasons: vec!["Matched classification rule".to_string()],
                    assigned_to: rule
                        .assigned_to
                        .clone()
                        .or_else(|| resolver.resolve(rule.category)),
                    is_spam: false,
                    spam_score: 0.0,
                    classified_at,
                    reviewed: false,
                },
                ClassificationSource::Rule,
            ),
            None => {
                let verdict = self.pipeline.evaluate(ticket);
                self.metrics.record_scoring_latency(verdict.latency_us);

                let category = verdict.category.category;
                (
                    TicketClassification {
                        ticket_id: ticket.id.clone(),
                        category,
                        priority: verdict.priority.priority,
                        priority_score: verdict.priority.score,
                        confidence: verdict.confidence,
                        reasons: verdict.reasons,
                        assigned_to: resolver.resolve(category),
                        is_spam: verdict.spam.is_spam,
                        spam_score: verdict.spam.score,
                        classified_at,
                        reviewed: false,
                    },
                    ClassificationSource::Heuristic,
                )
            }
        }
    }

    async fn load_classification(&self, ticket_id: &str) -> Result<Option<TicketClassification>> {
        self.classifications
            .get(ticket_id)
            .await?
            .map(TicketClassification::try_from)
            .transpose()
    }

    async fn store_classification(&self, classification: &TicketClassification) -> Result<()> {
        self.classifications
            .put(
                &classification.ticket_id,
                &ClassificationRecord::from(classification),
            )
            .await
    }

    async fn append_history(&self, entry: HistoryEntry) -> Result<HistoryEntry> {
        let mut chain = self.history_chain.lock().await;
        let entry = chain.seal(entry);
        self.history.put(&entry.key(), &entry).await?;
        chain.commit(&entry);
        Ok(entry)
    }

    async fn refresh_rules(&self) -> Result<()> {
        let records = self.rules.all().await?;
        let rules = records
            .into_iter()
            .filter_map(|record| {
                let id = record.id;
                match ClassificationRule::try_from(record) {
                    Ok(rule) => Some(rule),
                    Err(e) => {
                        warn!(rule_id = id, error = %e, "Skipping corrupt rule");
                        None
                    }
                }
            })
            .collect::<Vec<_>>();

        *self.rule_set.write() = Arc::new(RuleSet::new(rules));
        Ok(())
    }

    async fn load_assignment_rules(&self) -> Result<Vec<AssignmentRule>> {
        let records = self.assignments.scan(&ScanOptions::new()).await?;
        Ok(records
            .into_iter()
            .filter_map(|(key, record)| match AssignmentRule::try_from(record) {
                Ok(rule) => Some(rule),
                Err(e) => {
                    warn!(category = %key, error = %e, "Skipping corrupt assignment rule");
                    None
                }
            })
            .collect())
    }

    async fn refresh_assignments(&self) -> Result<()> {
        let rules = self.load_assignment_rules().await?;
        let resolver = AssignmentResolver::new(rules, self.default_teams.clone());
        *self.resolver.write() = Arc::new(resolver);
        Ok(())
    }

    async fn seed_assignment_rules(&self) -> Result<()> {
        let _lock = self.assignment_lock.lock().await;

        let existing = self.assignments.scan(&ScanOptions::new().limit(1)).await?;
        if !existing.is_empty() {
            return Ok(());
        }

        for (category, team) in &self.default_teams {
            let rule = AssignmentRule::new(*category, team.as_str());
            self.assignments
                .put(category.as_str(), &AssignmentRecord::from(&rule))
                .await?;
        }

        info!(count = self.default_teams.len(), "Seeded assignment rules");
        Ok(())
    }
}

fn validate_ticket(ticket: &Ticket) -> Result<()> {
    if ticket.id.trim().is_empty() {
        return Err(Error::invalid_argument("ticket id must not be empty"));
    }
    Ok(())
}
