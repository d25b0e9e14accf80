//! Triage Engine
//!
//! The classification orchestrator. For each ticket it consults the stored
//! override rules, falls back to heuristic scoring, routes the result to a
//! team and persists it through a [`triage_storage::RecordStore`].
//!
//! Provides:
//! - [`ClassificationEngine`]: classify, review, rule and assignment admin
//! - Read-only queries and aggregate statistics
//! - [`EngineConfig`] for lexicon and routing configuration

pub mod config;
pub mod engine;
mod locks;
pub mod queries;
pub mod records;

pub use config::EngineConfig;
pub use engine::ClassificationEngine;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::EngineConfig;
    pub use crate::engine::ClassificationEngine;
    pub use triage_core::{
        Category, ClassificationStats, Priority, ReviewUpdate, Ticket, TicketClassification,
    };
    pub use triage_policy::{AssignmentRule, ClassificationRule, NewRule, PatternType};
}
