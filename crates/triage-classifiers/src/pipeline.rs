//! Heuristic pipeline running the three scorers over one ticket

use crate::category::{CategoryClassifier, CategoryVerdict};
use crate::lexicon::Lexicon;
use crate::priority::{PriorityScorer, PriorityVerdict};
use crate::spam::{SpamDetector, SpamVerdict};
use std::time::Instant;
use tracing::debug;
use triage_core::{Result, Ticket};

/// Upper bound on heuristic confidence
const MAX_CONFIDENCE: f64 = 0.95;

/// Combined output of the three scorers
#[derive(Debug, Clone, PartialEq)]
pub struct HeuristicVerdict {
    pub spam: SpamVerdict,
    pub category: CategoryVerdict,
    pub priority: PriorityVerdict,

    /// Category reason, then priority reasons, then the spam reason if any
    /// spam phrase matched
    pub reasons: Vec<String>,

    /// `min(0.95, 0.5 + 0.1 * reasons + 0.05 * category matches)`
    pub confidence: f64,

    /// Latency in microseconds
    pub latency_us: u64,
}

/// Spam detector, category classifier and priority scorer built from one
/// lexicon. Immutable and shareable across threads.
#[derive(Debug, Clone)]
pub struct HeuristicPipeline {
    spam: SpamDetector,
    category: CategoryClassifier,
    priority: PriorityScorer,
}

impl HeuristicPipeline {
    /// Build all scorers from a lexicon
    pub fn new(lexicon: &Lexicon) -> Result<Self> {
        lexicon.validate()?;

        Ok(Self {
            spam: SpamDetector::new(&lexicon.spam_phrases)?,
            category: CategoryClassifier::new(&lexicon.categories)?,
            priority: PriorityScorer::new(&lexicon.priority, lexicon.priority_weights)?,
        })
    }

    /// Run every scorer over the ticket
    pub fn evaluate(&self, ticket: &Ticket) -> HeuristicVerdict {
        let start = Instant::now();
        let text = ticket.normalized_text();

        let spam = self.spam.detect(&text);
        let category = self.category.classify(&text);
        let priority = self.priority.score_text(&ticket.subject, &text);

        let mut reasons = Vec::with_capacity(priority.reasons.len() + 2);
        reasons.push(category.reason.clone());
        reasons.extend(priority.reasons.iter().cloned());
        if !spam.matched.is_empty() {
            reasons.push(format!(
                "Spam score {:.2} from phrases: {}",
                spam.score,
                spam.matched.join(", ")
            ));
        }

        let confidence = confidence(reasons.len(), category.match_count);
        let latency_us = start.elapsed().as_micros() as u64;

        debug!(
            ticket = %ticket.id,
            category = %category.category,
            priority = %priority.priority,
            score = priority.score,
            spam_score = spam.score,
            latency_us,
            "Heuristics evaluated"
        );

        HeuristicVerdict {
            spam,
            category,
            priority,
            reasons,
            confidence,
            latency_us,
        }
    }

    pub fn spam_detector(&self) -> &SpamDetector {
        &self.spam
    }

    pub fn category_classifier(&self) -> &CategoryClassifier {
        &self.category
    }

    pub fn priority_scorer(&self) -> &PriorityScorer {
        &self.priority
    }
}

/// Heuristic confidence. Computed in hundredths to keep results exact.
pub fn confidence(reason_count: usize, category_matches: usize) -> f64 {
    let hundredths = 50 + 10 * reason_count as u64 + 5 * category_matches as u64;
    (hundredths as f64 / 100.0).min(MAX_CONFIDENCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::{Category, Priority};

    fn pipeline() -> HeuristicPipeline {
        HeuristicPipeline::new(&Lexicon::default()).unwrap()
    }

    #[test]
    fn test_confidence_formula() {
        assert_eq!(confidence(1, 0), 0.6);
        assert_eq!(confidence(2, 3), 0.85);
        assert_eq!(confidence(10, 10), 0.95);
    }

    #[test]
    fn test_outage_ticket() {
        let ticket = Ticket::new(
            "T-1",
            "URGENT: site is down",
            "production outage, customers can't log in",
        );
        let verdict = pipeline().evaluate(&ticket);

        assert!(matches!(
            verdict.category.category,
            Category::Technical | Category::Bug
        ));
        assert_eq!(verdict.priority.priority, Priority::Critical);
        assert!(!verdict.spam.is_spam);
        assert_eq!(verdict.reasons[0], verdict.category.reason);
    }

    #[test]
    fn test_billing_ticket() {
        let ticket = Ticket::new(
            "T-2",
            "Re: question about pricing",
            "how do I get a refund on my last invoice?",
        );
        let verdict = pipeline().evaluate(&ticket);

        assert_eq!(verdict.category.category, Category::Billing);
        assert_ne!(verdict.priority.priority, Priority::Critical);
        // category reason + reply bonus; 0.5 + 0.2 + 0.15
        assert_eq!(verdict.reasons.len(), 2);
        assert_eq!(verdict.confidence, 0.85);
    }

    #[test]
    fn test_spam_reason_recorded_below_threshold() {
        let ticket = Ticket::new("T-3", "Newsletter", "click here to unsubscribe");
        let verdict = pipeline().evaluate(&ticket);

        assert!(!verdict.spam.is_spam);
        assert_eq!(verdict.spam.score, 0.7);
        assert!(verdict.reasons.last().unwrap().starts_with("Spam score 0.70"));
    }

    #[test]
    fn test_deterministic() {
        let ticket = Ticket::new("T-4", "Refund", "password reset and a refund");
        let p = pipeline();
        let first = p.evaluate(&ticket);
        let second = p.evaluate(&ticket);
        assert_eq!(first.category, second.category);
        assert_eq!(first.priority, second.priority);
        assert_eq!(first.reasons, second.reasons);
        assert_eq!(first.confidence, second.confidence);
    }
}
