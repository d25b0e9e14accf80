//! Engine configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use triage_classifiers::Lexicon;
use triage_core::{Category, Error, Result};
use triage_policy::default_teams;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Phrase tables and priority weights for the heuristics
    #[serde(default)]
    pub lexicon: Lexicon,

    /// Fallback routing used when no active assignment rule exists. A
    /// category missing from this map and from the stored rules gets no
    /// assignee.
    #[serde(default = "default_teams")]
    pub default_teams: BTreeMap<Category, String>,

    /// Store the fallback routing as assignment rules when the store has none
    #[serde(default = "default_true")]
    pub seed_assignment_rules: bool,
}

impl EngineConfig {
    /// Load from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        self.lexicon.validate()?;
        if let Some((category, _)) = self
            .default_teams
            .iter()
            .find(|(_, team)| team.trim().is_empty())
        {
            return Err(Error::config(format!(
                "default team for '{}' must not be blank",
                category
            )));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            lexicon: Lexicon::default(),
            default_teams: default_teams(),
            seed_assignment_rules: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_yaml() {
        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.default_teams.len(), Category::ALL.len());
    }

    #[test]
    fn test_partial_team_map_replaces_defaults() {
        let yaml = r#"
default_teams:
  bug: platform
seed_assignment_rules: false
lexicon:
  priority_weights:
    baseline: 40
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.default_teams.len(), 1);
        assert_eq!(config.default_teams[&Category::Bug], "platform");
        assert!(!config.seed_assignment_rules);
        assert_eq!(config.lexicon.priority_weights.baseline, 40);
    }

    #[test]
    fn test_blank_team_rejected() {
        let yaml = "default_teams:\n  bug: \"  \"\n";
        assert!(matches!(
            EngineConfig::from_yaml(yaml),
            Err(Error::Config(_))
        ));
    }
}
