//! Triage Policy
//!
//! Operator-managed overrides that supersede the heuristic scorers.
//!
//! - [`ClassificationRule`]: keyword or regex pattern mapped to a fixed
//!   category/priority/assignee, or flagged as an automatic spam rule
//! - [`RuleSet`]: compiled rules in evaluation order; the first match wins
//! - [`AssignmentResolver`]: category to team routing with built-in defaults

pub mod assignment;
pub mod engine;
pub mod rule;

pub use assignment::{default_team, default_teams, AssignmentResolver, AssignmentRule};
pub use engine::{RuleMatch, RuleSet};
pub use rule::{ClassificationRule, NewRule, PatternType, RuleBook, RuleMatcher};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::assignment::{AssignmentResolver, AssignmentRule};
    pub use crate::engine::{RuleMatch, RuleSet};
    pub use crate::rule::{ClassificationRule, NewRule, PatternType};
}
