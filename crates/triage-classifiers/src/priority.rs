//! Urgency scoring and priority tiering

use crate::lexicon::{PriorityLexicon, PriorityWeights};
use crate::matcher::PhraseSet;
use triage_core::{Priority, Result, Ticket};

/// Subject prefixes marking a reply or forward thread
const THREAD_PREFIXES: [&str; 3] = ["re:", "fw:", "fwd:"];

/// Verdict of the priority scorer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityVerdict {
    pub priority: Priority,

    /// Clamped score in `0..=100`
    pub score: u8,

    pub reasons: Vec<String>,
}

/// Computes a 0-100 urgency score and maps it to a tier.
#[derive(Debug, Clone)]
pub struct PriorityScorer {
    critical: PhraseSet,
    high: PhraseSet,
    low: PhraseSet,
    weights: PriorityWeights,
}

impl PriorityScorer {
    pub fn new(lexicon: &PriorityLexicon, weights: PriorityWeights) -> Result<Self> {
        Ok(Self {
            critical: PhraseSet::new(&lexicon.critical)?,
            high: PhraseSet::new(&lexicon.high)?,
            low: PhraseSet::new(&lexicon.low)?,
            weights,
        })
    }

    /// Score a ticket
    pub fn score(&self, ticket: &Ticket) -> PriorityVerdict {
        self.score_text(&ticket.subject, &ticket.normalized_text())
    }

    /// Score from the raw subject and the lowercased subject+body text
    pub fn score_text(&self, subject: &str, text: &str) -> PriorityVerdict {
        let w = &self.weights;
        let mut score = w.baseline;
        let mut reasons = Vec::new();

        let critical = self.critical.matches(text);
        if !critical.is_empty() {
            score = score.saturating_add(weighted(w.critical, critical.len()));
            reasons.push(format!("Critical keywords: {}", critical.join(", ")));
        }

        let high = self.high.matches(text);
        if !high.is_empty() {
            score = score.saturating_add(weighted(w.high, high.len()));
            reasons.push(format!("High-priority keywords: {}", high.join(", ")));
        }

        let low = self.low.matches(text);
        if !low.is_empty() {
            score = score.saturating_sub(weighted(w.low_penalty, low.len()));
            reasons.push(format!("Low-priority signals: {}", low.join(", ")));
        }

        let subject_lower = subject.trim_start().to_lowercase();
        if THREAD_PREFIXES.iter().any(|p| subject_lower.starts_with(p)) {
            score = score.saturating_add(w.reply_bonus);
            reasons.push("Reply/forward thread".to_string());
        }

        let exclamations = subject.matches('!').count();
        if exclamations > 2 {
            score = score.saturating_add(weighted(w.exclamation, exclamations));
            reasons.push(format!("Subject has {} exclamation marks", exclamations));
        }

        let score = score.clamp(0, 100);

        let priority = if !critical.is_empty() {
            Priority::Critical
        } else if !high.is_empty() && score >= w.high_threshold {
            Priority::High
        } else if score <= w.low_threshold || !low.is_empty() {
            Priority::Low
        } else {
            Priority::Medium
        };

        PriorityVerdict {
            priority,
            score: u8::try_from(score).unwrap_or(100),
            reasons,
        }
    }
}

/// `weight * hits`, saturating at the `i32` bounds
fn weighted(weight: i32, hits: usize) -> i32 {
    weight.saturating_mul(i32::try_from(hits).unwrap_or(i32::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scorer() -> PriorityScorer {
        PriorityScorer::new(&PriorityLexicon::default(), PriorityWeights::default()).unwrap()
    }

    fn score(subject: &str, body: &str) -> PriorityVerdict {
        scorer().score(&Ticket::new("t", subject, body))
    }

    #[test]
    fn test_baseline_is_medium() {
        let verdict = score("Hello", "I have a note for you");
        assert_eq!(verdict.score, 50);
        assert_eq!(verdict.priority, Priority::Medium);
        assert!(verdict.reasons.is_empty());
    }

    #[test]
    fn test_outage_is_critical_and_clamped() {
        let verdict = score("URGENT: site is down", "production outage, customers can't log in");
        assert_eq!(verdict.priority, Priority::Critical);
        assert_eq!(verdict.score, 100);
    }

    #[test]
    fn test_critical_overrides_low_score() {
        let verdict = score(
            "security breach",
            "nice to have, low priority, no rush, minor, whenever you have a moment",
        );
        assert!(verdict.score <= 30, "score was {}", verdict.score);
        assert_eq!(verdict.priority, Priority::Critical);
    }

    #[test]
    fn test_high_requires_threshold() {
        let verdict = score("Need this asap", "");
        assert_eq!(verdict.score, 60);
        assert_eq!(verdict.priority, Priority::High);

        // 50 + 10 - 15 = 45, below the high threshold and a low signal present
        let verdict = score("asap", "but it's a minor thing");
        assert_eq!(verdict.score, 45);
        assert_eq!(verdict.priority, Priority::Low);
    }

    #[test]
    fn test_low_signal_forces_low_tier() {
        let verdict = score("Idea", "nice to have");
        assert_eq!(verdict.score, 35);
        assert_eq!(verdict.priority, Priority::Low);
    }

    #[test]
    fn test_reply_bonus() {
        let verdict = score("Re: pricing", "");
        assert_eq!(verdict.score, 55);
        assert_eq!(verdict.priority, Priority::Medium);
        assert_eq!(verdict.reasons, vec!["Reply/forward thread".to_string()]);

        assert_eq!(score("FW: pricing", "").score, 55);
        assert_eq!(score("Fwd: pricing", "").score, 55);
    }

    #[test]
    fn test_exclamation_marks() {
        assert_eq!(score("help!!", "").score, 50);
        assert_eq!(score("help!!!", "").score, 59);
        assert_eq!(score("help!!!!", "").score, 62);
    }

    #[test]
    fn test_score_never_below_zero() {
        let verdict = score(
            "nice to have",
            "low priority, no rush, minor, whenever, someday, just curious",
        );
        assert_eq!(verdict.score, 0);
        assert_eq!(verdict.priority, Priority::Low);
    }

    #[test]
    fn test_down_only_counts_as_a_phrase() {
        let verdict = score("Re: question about pricing", "how do i download my last invoice?");
        assert_eq!(verdict.priority, Priority::Medium);
        assert_eq!(verdict.score, 55);
        assert!(verdict.reasons.iter().all(|r| !r.starts_with("Critical")));

        assert_eq!(score("Help", "the server went down").priority, Priority::Critical);
    }

    #[test]
    fn test_extreme_weights_saturate() {
        let weights = PriorityWeights {
            critical: 2_000_000_000,
            exclamation: i32::MAX,
            ..PriorityWeights::default()
        };
        let scorer = PriorityScorer::new(&PriorityLexicon::default(), weights).unwrap();
        let verdict = scorer.score(&Ticket::new("o", "urgent outage!!!", "production"));
        assert_eq!(verdict.priority, Priority::Critical);
        assert_eq!(verdict.score, 100);

        let weights = PriorityWeights {
            baseline: i32::MIN,
            low_penalty: i32::MAX,
            ..PriorityWeights::default()
        };
        let scorer = PriorityScorer::new(&PriorityLexicon::default(), weights).unwrap();
        let verdict = scorer.score(&Ticket::new("l", "no rush", "minor, someday"));
        assert_eq!(verdict.priority, Priority::Low);
        assert_eq!(verdict.score, 0);
    }
}
