//! Keyword-count category classifier

use crate::lexicon::CategoryLexicon;
use crate::matcher::PhraseSet;
use triage_core::{Category, Result};
use tracing::debug;

/// Verdict of the category classifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryVerdict {
    pub category: Category,

    /// Distinct keywords of the winning category found in the text
    pub match_count: usize,

    pub reason: String,
}

/// Picks the category whose keyword table has the most distinct hits.
///
/// Tables are held in [`Category`] enumeration order; a later category only
/// wins with a strictly higher count, so ties resolve to the earlier one.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    tables: Vec<(Category, PhraseSet)>,
}

impl CategoryClassifier {
    /// Build from per-category keyword tables. Any `other` table is ignored.
    pub fn new(lexicons: &[CategoryLexicon]) -> Result<Self> {
        let mut tables = Vec::with_capacity(lexicons.len());
        for entry in lexicons {
            if entry.category == Category::Other {
                continue;
            }
            tables.push((entry.category, PhraseSet::new(&entry.keywords)?));
        }
        tables.sort_by_key(|(category, _)| *category);

        Ok(Self { tables })
    }

    /// Classify lowercased ticket text
    pub fn classify(&self, text: &str) -> CategoryVerdict {
        let mut best: Option<(Category, Vec<&str>)> = None;

        for (category, phrases) in &self.tables {
            let hits = phrases.matches(text);
            if hits.is_empty() {
                continue;
            }
            let better = match &best {
                Some((_, best_hits)) => hits.len() > best_hits.len(),
                None => true,
            };
            if better {
                best = Some((*category, hits));
            }
        }

        match best {
            Some((category, hits)) => {
                debug!(category = %category, matches = hits.len(), "Category selected");
                CategoryVerdict {
                    category,
                    match_count: hits.len(),
                    reason: format!(
                        "Category '{}' matched {} keyword(s): {}",
                        category,
                        hits.len(),
                        hits.join(", ")
                    ),
                }
            }
            None => CategoryVerdict {
                category: Category::Other,
                match_count: 0,
                reason: "No category patterns matched".to_string(),
            },
        }
    }
}
