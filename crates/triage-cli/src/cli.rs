//! Command-line definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use triage_core::{Category, Priority};
use triage_policy::PatternType;

/// Default number of rows returned by `list`
pub const DEFAULT_LIMIT: usize = 20;

#[derive(Parser, Debug)]
#[command(name = "triage")]
#[command(about = "Support ticket classification engine", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "triage.yaml", env = "TRIAGE_CONFIG")]
    pub config: PathBuf,

    /// Directory holding the record store
    #[arg(short, long, env = "TRIAGE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Lexicon YAML file replacing the configured lexicon
    #[arg(short, long)]
    pub lexicon: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a ticket, or show its existing classification
    Classify(TicketArgs),

    /// Recompute an unreviewed classification against current rules
    Reclassify(TicketArgs),

    /// Show the stored classification for a ticket
    Show {
        ticket_id: String,
    },

    /// Record a human review
    Review {
        ticket_id: String,

        #[arg(long)]
        category: Option<Category>,

        #[arg(long)]
        priority: Option<Priority>,

        /// Team to route the ticket to
        #[arg(long = "assign")]
        assigned_to: Option<String>,
    },

    /// List stored classifications
    List(ListArgs),

    /// Manage classification rules
    #[command(subcommand)]
    Rules(RulesCommand),

    /// Manage category routing
    #[command(subcommand)]
    Assign(AssignCommand),

    /// Aggregate counts over all classifications
    Stats,

    /// Review history for a ticket
    History {
        ticket_id: String,
    },

    /// Verify the review history hash chain
    Verify,
}

/// Ticket input, either inline or from a YAML/JSON file
#[derive(Args, Debug)]
pub struct TicketArgs {
    /// Ticket id; generated when omitted
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long, required_unless_present = "file", conflicts_with = "file")]
    pub subject: Option<String>,

    #[arg(long, default_value = "", conflicts_with = "file")]
    pub body: String,

    /// Sender address
    #[arg(long, default_value = "", conflicts_with = "file")]
    pub from: String,

    /// Tag to attach; repeatable
    #[arg(long = "tag", conflicts_with = "file")]
    pub tags: Vec<String>,

    /// Read the ticket from a YAML or JSON file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Which projection `list` prints. Without a filter, unreviewed tickets
/// are listed.
#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(long, conflicts_with_all = ["priority", "assignee", "spam"])]
    pub category: Option<Category>,

    #[arg(long, conflicts_with_all = ["assignee", "spam"])]
    pub priority: Option<Priority>,

    #[arg(long, conflicts_with = "spam")]
    pub assignee: Option<String>,

    /// Spam tickets, highest spam score first
    #[arg(long)]
    pub spam: bool,

    #[arg(long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    /// Add an override rule; it is evaluated before existing rules
    Add {
        #[arg(long)]
        pattern: String,

        #[arg(long, default_value_t = PatternType::Keyword)]
        pattern_type: PatternType,

        #[arg(long, required_unless_present = "spam")]
        category: Option<Category>,

        #[arg(long, required_unless_present = "spam")]
        priority: Option<Priority>,

        /// Team for matching tickets
        #[arg(long = "assign")]
        assigned_to: Option<String>,

        /// Classify matching tickets as spam
        #[arg(long, conflicts_with_all = ["category", "priority", "assigned_to"])]
        spam: bool,
    },

    /// List rules in evaluation order
    List,

    /// Delete a rule; unknown ids are ignored
    Delete { id: u64 },

    /// Add every rule from a YAML rule book, in file order
    Import { file: PathBuf },
}

#[derive(Subcommand, Debug)]
pub enum AssignCommand {
    /// Route a category to a team
    Set {
        category: Category,
        team: String,

        /// Store the rule disabled so the default mapping applies
        #[arg(long)]
        inactive: bool,
    },

    /// List stored routing rules
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_classify_inline() {
        let cli = Cli::try_parse_from([
            "triage", "classify", "--subject", "Login broken", "--body", "help", "--tag", "web",
        ])
        .unwrap();

        match cli.command {
            Command::Classify(args) => {
                assert_eq!(args.subject.as_deref(), Some("Login broken"));
                assert_eq!(args.body, "help");
                assert_eq!(args.tags, vec!["web".to_string()]);
                assert!(args.id.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_classify_requires_subject_or_file() {
        assert!(Cli::try_parse_from(["triage", "classify"]).is_err());
        assert!(Cli::try_parse_from(["triage", "classify", "--file", "t.yaml"]).is_ok());
        assert!(Cli::try_parse_from([
            "triage", "classify", "--file", "t.yaml", "--subject", "x"
        ])
        .is_err());
    }

    #[test]
    fn test_parse_review_enums() {
        let cli = Cli::try_parse_from([
            "triage", "review", "T-1", "--category", "feature_request", "--priority", "high",
        ])
        .unwrap();

        match cli.command {
            Command::Review {
                ticket_id,
                category,
                priority,
                assigned_to,
            } => {
                assert_eq!(ticket_id, "T-1");
                assert_eq!(category, Some(Category::FeatureRequest));
                assert_eq!(priority, Some(Priority::High));
                assert!(assigned_to.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }

        assert!(Cli::try_parse_from(["triage", "review", "T-1", "--category", "spam"]).is_err());
    }

    #[test]
    fn test_parse_spam_rule() {
        let cli = Cli::try_parse_from([
            "triage", "rules", "add", "--pattern", "bitcoin", "--spam",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Rules(RulesCommand::Add { spam: true, .. })
        ));

        assert!(Cli::try_parse_from(["triage", "rules", "add", "--pattern", "x"]).is_err());
    }

    #[test]
    fn test_list_filters_are_exclusive() {
        assert!(Cli::try_parse_from(["triage", "list", "--spam", "--priority", "low"]).is_err());

        let cli = Cli::try_parse_from(["triage", "list", "--priority", "low", "--limit", "5"])
            .unwrap();
        match cli.command {
            Command::List(args) => {
                assert_eq!(args.priority, Some(Priority::Low));
                assert_eq!(args.limit, 5);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
