//! Spam detection from a fixed phrase lexicon

use crate::matcher::PhraseSet;
use triage_core::Result;

/// Score of a single phrase hit
const BASE_SCORE: u32 = 30;

/// Added for every distinct phrase hit
const PER_MATCH: u32 = 20;

/// Tickets scoring strictly above this are spam
pub const SPAM_THRESHOLD: f64 = 0.7;

/// Verdict of the spam detector
#[derive(Debug, Clone, PartialEq)]
pub struct SpamVerdict {
    pub is_spam: bool,

    /// 0.0 when nothing matched, otherwise `min(1.0, 0.3 + 0.2 * matches)`
    pub score: f64,

    /// Distinct phrases that matched, in lexicon order
    pub matched: Vec<String>,
}

/// Phrase-count spam detector. Stateless after construction.
#[derive(Debug, Clone)]
pub struct SpamDetector {
    phrases: PhraseSet,
}

impl SpamDetector {
    /// Create a detector over the given phrases
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self {
            phrases: PhraseSet::new(phrases)?,
        })
    }

    /// Score lowercased ticket text
    pub fn detect(&self, text: &str) -> SpamVerdict {
        let matched = self.phrases.matches(text);
        let score = score_for(matched.len());

        SpamVerdict {
            is_spam: score > SPAM_THRESHOLD,
            score,
            matched: matched.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Spam score for a number of distinct phrase matches.
///
/// Computed in integer percent so that two matches land exactly on the
/// threshold rather than a float rounding error above it.
pub fn score_for(matches: usize) -> f64 {
    if matches == 0 {
        return 0.0;
    }
    let matches = u32::try_from(matches).unwrap_or(u32::MAX);
    let percent = BASE_SCORE
        .saturating_add(PER_MATCH.saturating_mul(matches))
        .min(100);
    f64::from(percent) / 100.0
}
