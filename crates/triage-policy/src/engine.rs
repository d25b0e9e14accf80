//! Ordered rule evaluation

use crate::rule::{ClassificationRule, RuleMatcher};
use tracing::{debug, warn};
use triage_core::Ticket;

/// Outcome of a rule hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleMatch<'a> {
    /// An `auto_spam` rule fired
    Spam(&'a ClassificationRule),

    /// A classification rule fired
    Classify(&'a ClassificationRule),
}

impl<'a> RuleMatch<'a> {
    /// The rule that fired
    pub fn rule(&self) -> &'a ClassificationRule {
        match self {
            Self::Spam(rule) | Self::Classify(rule) => rule,
        }
    }
}

struct CompiledRule {
    rule: ClassificationRule,
    matcher: RuleMatcher,
}

/// Compiled rules in evaluation order: most recently created (highest id)
/// first. Traversal stops at the first match.
#[derive(Default)]
pub struct RuleSet {
    rules: Vec<CompiledRule>,
}

impl RuleSet {
    /// Compile and order rules. Rules whose pattern no longer compiles are
    /// skipped with a warning.
    pub fn new(rules: impl IntoIterator<Item = ClassificationRule>) -> Self {
        let mut compiled: Vec<CompiledRule> = rules
            .into_iter()
            .filter_map(|rule| match RuleMatcher::compile(&rule.pattern, rule.pattern_type) {
                Ok(matcher) => Some(CompiledRule { rule, matcher }),
                Err(e) => {
                    warn!(rule_id = rule.id, error = %e, "Skipping uncompilable rule");
                    None
                }
            })
            .collect();

        compiled.sort_by(|a, b| b.rule.id.cmp(&a.rule.id));

        Self { rules: compiled }
    }

    /// First rule whose pattern matches the ticket text
    pub fn find_matching_rule(&self, ticket: &Ticket) -> Option<RuleMatch<'_>> {
        if self.rules.is_empty() {
            return None;
        }

        let text = ticket.text();
        let lowered = text.to_lowercase();

        let hit = self
            .rules
            .iter()
            .find(|compiled| compiled.matcher.is_match(&text, &lowered))?;

        debug!(
            ticket = %ticket.id,
            rule_id = hit.rule.id,
            auto_spam = hit.rule.auto_spam,
            "Rule matched"
        );

        Some(if hit.rule.auto_spam {
            RuleMatch::Spam(&hit.rule)
        } else {
            RuleMatch::Classify(&hit.rule)
        })
    }

    /// Rules in evaluation order
    pub fn rules(&self) -> impl Iterator<Item = &ClassificationRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{NewRule, PatternType};
    use chrono::Utc;
    use triage_core::{Category, Priority};

    fn rule(id: u64, new: NewRule) -> ClassificationRule {
        new.into_rule(id, Utc::now())
    }

    #[test]
    fn test_no_rules_no_match() {
        let set = RuleSet::default();
        assert!(set
            .find_matching_rule(&Ticket::new("t", "anything", ""))
            .is_none());
    }

    #[test]
    fn test_most_recent_rule_wins() {
        let set = RuleSet::new(vec![
            rule(1, NewRule::keyword("refund", Category::Billing, Priority::Medium)),
            rule(2, NewRule::keyword("refund", Category::Complaint, Priority::High)),
        ]);

        let hit = set
            .find_matching_rule(&Ticket::new("t", "Refund please", ""))
            .unwrap();
        assert_eq!(hit.rule().id, 2);
        assert!(matches!(hit, RuleMatch::Classify(_)));
        assert_eq!(set.rules().map(|r| r.id).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[test]
    fn test_spam_rule_short_circuits() {
        let set = RuleSet::new(vec![
            rule(1, NewRule::keyword("invoice", Category::Billing, Priority::High)),
            rule(2, NewRule::spam(r"bitcoin\s+doubler", PatternType::Regex)),
        ]);

        let ticket = Ticket::new("t", "Invoice", "try our BITCOIN   doubler");
        assert!(matches!(
            set.find_matching_rule(&ticket),
            Some(RuleMatch::Spam(r)) if r.id == 2
        ));
    }

    #[test]
    fn test_matches_across_subject_body_boundary() {
        let set = RuleSet::new(vec![rule(
            1,
            NewRule::keyword("down now", Category::Technical, Priority::Critical),
        )]);
        let ticket = Ticket::new("t", "Site is down", "now what");
        assert!(set.find_matching_rule(&ticket).is_some());
    }

    #[test]
    fn test_uncompilable_rule_skipped() {
        let mut bad = rule(5, NewRule::keyword("x", Category::Bug, Priority::Low));
        bad.pattern_type = PatternType::Regex;
        bad.pattern = "([".to_string();

        let set = RuleSet::new(vec![
            bad,
            rule(1, NewRule::keyword("crash", Category::Bug, Priority::High)),
        ]);
        assert_eq!(set.len(), 1);
    }
}
