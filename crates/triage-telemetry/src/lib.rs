//! Triage Telemetry
//!
//! Audit and monitoring for the triage engine.
//!
//! Provides:
//! - A hash-chained, write-once review history
//! - Classification counters and latency metrics

pub mod history;
pub mod metrics;

pub use history::{compute_hash, verify_chain, ChainVerification, HistoryAction, HistoryChain, HistoryEntry};
pub use metrics::{describe_metrics, ClassificationSource, MetricsCollector, MetricsSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::history::{HistoryChain, HistoryEntry};
    pub use crate::metrics::{ClassificationSource, MetricsCollector};
}
