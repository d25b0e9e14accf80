//! Triage Classifiers
//!
//! Deterministic, lexicon-driven scoring for support tickets.
//!
//! Three independent scorers run over the same lowercased ticket text:
//! - [`SpamDetector`]: spam-phrase matches mapped to a bounded spam score
//! - [`CategoryClassifier`]: best-matching category by keyword count
//! - [`PriorityScorer`]: 0-100 urgency score and its priority tier
//!
//! All phrase tables come from an injected [`Lexicon`], so they can be
//! replaced or tested without touching the scoring control flow.

pub mod category;
pub mod lexicon;
pub mod matcher;
pub mod pipeline;
pub mod priority;
pub mod spam;

pub use category::{CategoryClassifier, CategoryVerdict};
pub use lexicon::{CategoryLexicon, Lexicon, PriorityLexicon, PriorityWeights};
pub use matcher::PhraseSet;
pub use pipeline::{HeuristicPipeline, HeuristicVerdict};
pub use priority::{PriorityScorer, PriorityVerdict};
pub use spam::{SpamDetector, SpamVerdict};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::category::CategoryClassifier;
    pub use crate::lexicon::Lexicon;
    pub use crate::pipeline::{HeuristicPipeline, HeuristicVerdict};
    pub use crate::priority::PriorityScorer;
    pub use crate::spam::SpamDetector;
}
