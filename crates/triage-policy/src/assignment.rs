//! Category to team assignment

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use triage_core::Category;

/// Stored routing rule for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRule {
    /// Unique key
    pub category: Category,

    pub team: String,

    /// Reserved for load-aware routing; never consulted by the resolver
    #[serde(default)]
    pub workload: u32,

    #[serde(default = "default_true")]
    pub active: bool,

    pub updated_at: DateTime<Utc>,
}

impl AssignmentRule {
    /// Active rule with an empty workload
    pub fn new(category: Category, team: impl Into<String>) -> Self {
        Self {
            category,
            team: team.into(),
            workload: 0,
            active: true,
            updated_at: Utc::now(),
        }
    }

    /// Set the active flag
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

fn default_true() -> bool {
    true
}

/// Built-in team for a category
pub fn default_team(category: Category) -> &'static str {
    match category {
        Category::Bug => "engineering",
        Category::FeatureRequest => "product",
        Category::Question => "support",
        Category::Complaint => "customer-success",
        Category::Billing => "billing-team",
        Category::Technical => "tech-support",
        Category::Account => "account-management",
        Category::Other => "support",
    }
}

/// The built-in mapping for every category
pub fn default_teams() -> BTreeMap<Category, String> {
    Category::ALL
        .into_iter()
        .map(|category| (category, default_team(category).to_string()))
        .collect()
}

/// Resolves a category to a team: the active stored rule first, then the
/// fallback mapping.
#[derive(Debug, Clone)]
pub struct AssignmentResolver {
    rules: HashMap<Category, AssignmentRule>,
    fallback: BTreeMap<Category, String>,
}

impl AssignmentResolver {
    /// Later rules for the same category replace earlier ones
    pub fn new(
        rules: impl IntoIterator<Item = AssignmentRule>,
        fallback: BTreeMap<Category, String>,
    ) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| (rule.category, rule))
            .collect();

        Self { rules, fallback }
    }

    /// Resolver over stored rules with the built-in fallback mapping
    pub fn with_builtin_defaults(rules: impl IntoIterator<Item = AssignmentRule>) -> Self {
        Self::new(rules, default_teams())
    }

    /// Team for `category`, if any
    pub fn resolve(&self, category: Category) -> Option<String> {
        match self.rules.get(&category) {
            Some(rule) if rule.active => Some(rule.team.clone()),
            _ => self.fallback.get(&category).cloned(),
        }
    }
}

impl Default for AssignmentResolver {
    fn default() -> Self {
        Self::with_builtin_defaults(Vec::new())
    }
}
