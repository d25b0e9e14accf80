//! Multi-phrase matcher shared by the scorers

use aho_corasick::AhoCorasick;
use triage_core::{Error, Result};

/// A fixed set of lowercase phrases scanned with a single Aho-Corasick pass.
///
/// Matching is substring containment; each phrase counts at most once per
/// scan regardless of how often it occurs.
#[derive(Debug, Clone)]
pub struct PhraseSet {
    phrases: Vec<String>,
    automaton: AhoCorasick,
}

impl PhraseSet {
    /// Build a phrase set. Phrases are trimmed and lowercased; blanks and
    /// duplicates are dropped while first-seen order is kept.
    pub fn new<I, S>(phrases: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut unique: Vec<String> = Vec::new();
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !unique.contains(&phrase) {
                unique.push(phrase);
            }
        }

        let automaton = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&unique)
            .map_err(|e| Error::config(format!("Failed to build phrase matcher: {}", e)))?;

        Ok(Self {
            phrases: unique,
            automaton,
        })
    }

    /// Distinct phrases contained in `text`, in phrase-set order.
    ///
    /// `text` is expected to be lowercased already.
    pub fn matches<'a>(&'a self, text: &str) -> Vec<&'a str> {
        let mut seen = vec![false; self.phrases.len()];
        for m in self.automaton.find_overlapping_iter(text) {
            seen[m.pattern().as_usize()] = true;
        }

        self.phrases
            .iter()
            .zip(seen)
            .filter(|(_, hit)| *hit)
            .map(|(phrase, _)| phrase.as_str())
            .collect()
    }

    /// Number of distinct phrases contained in `text`
    pub fn count(&self, text: &str) -> usize {
        self.matches(text).len()
    }

    /// The normalized phrases
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}
