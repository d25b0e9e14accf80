//! Read-only projections over stored classifications

use crate::engine::ClassificationEngine;
use std::cmp::Ordering;
use triage_core::{Category, ClassificationStats, Priority, Result, TicketClassification};

/// Highest priority score first, then most recently classified, then id
fn by_priority_score(a: &TicketClassification, b: &TicketClassification) -> Ordering {
    b.priority_score
        .cmp(&a.priority_score)
        .then_with(|| newest_first(a, b))
}

/// Highest spam score first, then most recently classified, then id
fn by_spam_score(a: &TicketClassification, b: &TicketClassification) -> Ordering {
    b.spam_score
        .total_cmp(&a.spam_score)
        .then_with(|| newest_first(a, b))
}

fn newest_first(a: &TicketClassification, b: &TicketClassification) -> Ordering {
    b.classified_at
        .cmp(&a.classified_at)
        .then_with(|| a.ticket_id.cmp(&b.ticket_id))
}

fn select<F>(
    records: Vec<TicketClassification>,
    keep: impl Fn(&TicketClassification) -> bool,
    order: F,
    limit: usize,
) -> Vec<TicketClassification>
where
    F: Fn(&TicketClassification, &TicketClassification) -> Ordering,
{
    let mut selected: Vec<_> = records.into_iter().filter(|c| keep(c)).collect();
    selected.sort_by(order);
    selected.truncate(limit);
    selected
}

impl ClassificationEngine {
    /// Classifications in `category`, spam included
    pub async fn list_by_category(
        &self,
        category: Category,
        limit: usize,
    ) -> Result<Vec<TicketClassification>> {
        let all = self.all_classifications().await?;
        Ok(select(all, |c| c.category == category, by_priority_score, limit))
    }

    /// Non-spam classifications with `priority`
    pub async fn list_by_priority(
        &self,
        priority: Priority,
        limit: usize,
    ) -> Result<Vec<TicketClassification>> {
        let all = self.all_classifications().await?;
        Ok(select(
            all,
            |c| !c.is_spam && c.priority == priority,
            by_priority_score,
            limit,
        ))
    }

    /// Non-spam classifications routed to `team`
    pub async fn list_by_assignee(
        &self,
        team: &str,
        limit: usize,
    ) -> Result<Vec<TicketClassification>> {
        let all = self.all_classifications().await?;
        Ok(select(
            all,
            |c| !c.is_spam && c.assigned_to.as_deref() == Some(team),
            by_priority_score,
            limit,
        ))
    }

    /// Spam classifications, highest spam score first
    pub async fn get_spam_tickets(&self, limit: usize) -> Result<Vec<TicketClassification>> {
        let all = self.all_classifications().await?;
        Ok(select(all, |c| c.is_spam, by_spam_score, limit))
    }

    /// Non-spam classifications awaiting review
    pub async fn get_unreviewed(&self, limit: usize) -> Result<Vec<TicketClassification>> {
        let all = self.all_classifications().await?;
        Ok(select(
            all,
            |c| !c.is_spam && !c.reviewed,
            by_priority_score,
            limit,
        ))
    }

    /// Aggregate counts over every stored classification
    pub async fn get_stats(&self) -> Result<ClassificationStats> {
        let all = self.all_classifications().await?;
        let mut stats = ClassificationStats {
            total_classified: all.len(),
            ..ClassificationStats::default()
        };

        for c in &all {
            *stats.by_category.entry(c.category).or_default() += 1;
            *stats.by_priority.entry(c.priority).or_default() += 1;
            if let Some(team) = &c.assigned_to {
                *stats.by_assignment.entry(team.clone()).or_default() += 1;
            }
            if c.is_spam {
                stats.spam_count += 1;
            } else if !c.reviewed {
                stats.unreviewed += 1;
            }
        }

        Ok(stats)
    }
}
