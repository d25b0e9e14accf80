//! Triage Core
//!
//! Core types and error handling shared across the triage crates.
//!
//! This crate provides:
//! - The inbound [`Ticket`] and the derived [`TicketClassification`]
//! - The fixed [`Category`] and [`Priority`] enumerations
//! - Review updates and aggregate statistics
//! - The error taxonomy used by every layer

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    Category, ClassificationStats, Priority, ReviewUpdate, Ticket, TicketClassification,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{Category, Priority, ReviewUpdate, Ticket, TicketClassification};
}
