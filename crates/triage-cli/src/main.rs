//! Triage CLI
//!
//! Classifies support tickets and administers rules, routing and reviews
//! against a file-backed record store. Every command prints JSON.

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use triage_core::{ReviewUpdate, Ticket};
use triage_engine::ClassificationEngine;
use triage_policy::{NewRule, RuleBook};
use triage_storage::{FileStore, RecordStore};

mod cli;
mod config;

use cli::{AssignCommand, Cli, Command, ListArgs, RulesCommand, TicketArgs};
use config::CliConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);
    triage_telemetry::describe_metrics();

    let config = CliConfig::load(&cli.config, &cli)?;
    info!(data_dir = %config.data_dir.display(), "Configuration loaded");

    let store: Arc<dyn RecordStore> = Arc::new(
        FileStore::open(&config.data_dir)
            .await
            .with_context(|| format!("Failed to open store at {}", config.data_dir.display()))?,
    );
    let engine = ClassificationEngine::open(store, config.engine)
        .await
        .context("Failed to open classification engine")?;

    run(&engine, cli.command).await
}

async fn run(engine: &ClassificationEngine, command: Command) -> Result<()> {
    match command {
        Command::Classify(args) => {
            let ticket = read_ticket(args)?;
            print_json(&engine.classify(&ticket).await?)
        }
        Command::Reclassify(args) => {
            if args.id.is_none() && args.file.is_none() {
                anyhow::bail!("reclassify needs --id or --file");
            }
            let ticket = read_ticket(args)?;
            print_json(&engine.reclassify(&ticket).await?)
        }
        Command::Show { ticket_id } => {
            let classification = engine
                .get_classification(&ticket_id)
                .await?
                .ok_or_else(|| triage_core::Error::not_found("classification", ticket_id))?;
            print_json(&classification)
        }
        Command::Review {
            ticket_id,
            category,
            priority,
            assigned_to,
        } => {
            let update = ReviewUpdate {
                category,
                priority,
                assigned_to,
            };
            print_json(&engine.review(&ticket_id, update).await?)
        }
        Command::List(args) => list(engine, args).await,
        Command::Rules(command) => rules(engine, command).await,
        Command::Assign(command) => assign(engine, command).await,
        Command::Stats => print_json(&engine.get_stats().await?),
        Command::History { ticket_id } => print_json(&engine.history(&ticket_id).await?),
        Command::Verify => {
            let report = engine.verify_history().await?;
            print_json(&report)?;
            if !report.is_intact() {
                anyhow::bail!("review history failed verification");
            }
            Ok(())
        }
    }
}

async fn list(engine: &ClassificationEngine, args: ListArgs) -> Result<()> {
    let limit = args.limit;
    let rows = if let Some(category) = args.category {
        engine.list_by_category(category, limit).await?
    } else if let Some(priority) = args.priority {
        engine.list_by_priority(priority, limit).await?
    } else if let Some(team) = &args.assignee {
        engine.list_by_assignee(team, limit).await?
    } else if args.spam {
        engine.get_spam_tickets(limit).await?
    } else {
        engine.get_unreviewed(limit).await?
    };
    print_json(&rows)
}

async fn rules(engine: &ClassificationEngine, command: RulesCommand) -> Result<()> {
    match command {
        RulesCommand::Add {
            pattern,
            pattern_type,
            category,
            priority,
            assigned_to,
            spam,
        } => {
            let rule = match (spam, category, priority) {
                (true, _, _) => NewRule::spam(pattern, pattern_type),
                (false, Some(category), Some(priority)) => NewRule {
                    pattern,
                    pattern_type,
                    category,
                    priority,
                    assigned_to,
                    auto_spam: false,
                },
                _ => anyhow::bail!("--category and --priority are required unless --spam"),
            };
            print_json(&engine.add_classification_rule(rule).await?)
        }
        RulesCommand::List => print_json(&engine.list_classification_rules()),
        RulesCommand::Delete { id } => {
            let removed = engine.delete_classification_rule(id).await?;
            print_json(&serde_json::json!({ "id": id, "removed": removed }))
        }
        RulesCommand::Import { file } => {
            let book = RuleBook::from_file(&file)
                .with_context(|| format!("Failed to load rule book {}", file.display()))?;
            let mut added = Vec::with_capacity(book.rules.len());
            for rule in book.rules {
                added.push(engine.add_classification_rule(rule).await?);
            }
            info!(count = added.len(), "Rule book imported");
            print_json(&added)
        }
    }
}

async fn assign(engine: &ClassificationEngine, command: AssignCommand) -> Result<()> {
    match command {
        AssignCommand::Set {
            category,
            team,
            inactive,
        } => print_json(
            &engine
                .update_assignment_rule(category, &team, !inactive)
                .await?,
        ),
        AssignCommand::List => print_json(&engine.get_assignment_rules().await?),
    }
}

/// Build the ticket from a file or inline arguments
fn read_ticket(args: TicketArgs) -> Result<Ticket> {
    let mut ticket = match &args.file {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read ticket {}", path.display()))?;
            // YAML parsing also accepts JSON documents
            serde_yaml::from_str::<Ticket>(&content)
                .with_context(|| format!("Failed to parse ticket {}", path.display()))?
        }
        None => {
            let mut ticket = Ticket::new(
                String::new(),
                args.subject.clone().unwrap_or_default(),
                args.body.clone(),
            )
            .with_from(args.from.clone());
            for tag in &args.tags {
                ticket = ticket.with_tag(tag.clone());
            }
            ticket
        }
    };

    if let Some(id) = args.id {
        ticket.id = id;
    }
    if ticket.id.trim().is_empty() {
        ticket.id = format!("tkt_{}", uuid::Uuid::new_v4().simple());
    }

    Ok(ticket)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Initialize tracing/logging. Logs go to stderr so stdout stays JSON.
fn init_tracing(verbose: bool, json: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("triage=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("triage=info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket_args(argv: &[&str]) -> TicketArgs {
        let mut full = vec!["triage", "classify"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Classify(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_inline_ticket_gets_generated_id() {
        let ticket = read_ticket(ticket_args(&["--subject", "Refund", "--tag", "vip"])).unwrap();
        assert!(ticket.id.starts_with("tkt_"));
        assert_eq!(ticket.subject, "Refund");
        assert!(ticket.tags.contains("vip"));
    }

    #[test]
    fn test_ticket_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticket.json");
        std::fs::write(
            &path,
            r#"{"id": "T-100", "subject": "Invoice", "body": "wrong amount"}"#,
        )
        .unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let ticket = read_ticket(ticket_args(&["--file", path_arg.as_str()])).unwrap();
        assert_eq!(ticket.id, "T-100");
        assert_eq!(ticket.body, "wrong amount");
    }

    #[test]
    fn test_explicit_id_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ticket.yaml");
        std::fs::write(&path, "id: T-1\nsubject: Hello\n").unwrap();

        let path_arg = path.to_string_lossy().to_string();
        let ticket =
            read_ticket(ticket_args(&["--file", path_arg.as_str(), "--id", "T-2"])).unwrap();
        assert_eq!(ticket.id, "T-2");
    }
}
