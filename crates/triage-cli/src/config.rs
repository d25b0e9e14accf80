//! CLI configuration

use crate::cli::Cli;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use triage_classifiers::Lexicon;
use triage_engine::EngineConfig;

/// Configuration file contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Directory holding the record store
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Separate lexicon file; replaces `engine.lexicon` when set
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,

    /// Engine configuration
    #[serde(default)]
    pub engine: EngineConfig,
}

impl CliConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, cli: &Cli) -> anyhow::Result<Self> {
        // Missing file means defaults
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(dir) = &cli.data_dir {
            config.data_dir = dir.clone();
        }

        if let Some(path) = &cli.lexicon {
            config.lexicon_path = Some(path.clone());
        }

        if let Some(path) = &config.lexicon_path {
            config.engine.lexicon = Lexicon::from_file(path)
                .with_context(|| format!("Failed to load lexicon {}", path.display()))?;
        }

        config.engine.validate()?;

        Ok(config)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            lexicon_path: None,
            engine: EngineConfig::default(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./triage-data")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use triage_core::Category;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["triage"];
        argv.extend_from_slice(args);
        argv.push("stats");
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CliConfig::load(&dir.path().join("absent.yaml"), &cli(&[])).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("./triage-data"));
        assert!(config.engine.seed_assignment_rules);
        assert_eq!(config.engine.default_teams[&Category::Bug], "engineering");
    }

    #[test]
    fn test_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.yaml");
        std::fs::write(
            &path,
            r#"
data_dir: /var/lib/triage
engine:
  default_teams:
    bug: platform
  lexicon:
    spam_phrases: ["jackpot"]
"#,
        )
        .unwrap();

        let config = CliConfig::load(&path, &cli(&[])).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/triage"));
        assert_eq!(config.engine.default_teams[&Category::Bug], "platform");
        assert_eq!(config.engine.lexicon.spam_phrases, vec!["jackpot".to_string()]);

        let overridden = CliConfig::load(&path, &cli(&["--data-dir", "/tmp/other"])).unwrap();
        assert_eq!(overridden.data_dir, PathBuf::from("/tmp/other"));
    }

    #[test]
    fn test_lexicon_file_replaces_inline_lexicon() {
        let dir = tempfile::tempdir().unwrap();
        let lexicon = dir.path().join("lexicon.yaml");
        std::fs::write(&lexicon, "spam_phrases: [\"miracle cure\"]\n").unwrap();

        let lexicon_arg = lexicon.to_string_lossy().to_string();
        let config = CliConfig::load(
            &dir.path().join("absent.yaml"),
            &cli(&["--lexicon", lexicon_arg.as_str()]),
        )
        .unwrap();

        assert_eq!(
            config.engine.lexicon.spam_phrases,
            vec!["miracle cure".to_string()]
        );
    }

    #[test]
    fn test_bad_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triage.yaml");
        std::fs::write(&path, "engine: [not, a, map]\n").unwrap();

        assert!(CliConfig::load(&path, &cli(&[])).is_err());
    }
}
