//! Metrics collection and reporting
//!
//! [`MetricsCollector`] keeps in-process counters that callers can snapshot.
//! Every record call also goes to the `metrics` facade so an installed
//! recorder sees the same events.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Which path produced a classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationSource {
    /// An auto-spam rule matched
    SpamRule,
    /// A classification rule matched
    Rule,
    /// Heuristic scoring
    Heuristic,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpamRule => "spam_rule",
            Self::Rule => "rule",
            Self::Heuristic => "heuristic",
        }
    }
}

/// Register metric descriptions with the installed recorder
pub fn describe_metrics() {
    ::metrics::describe_counter!(
        "triage_classifications_total",
        "Total number of new classifications by source"
    );
    ::metrics::describe_counter!(
        "triage_cache_hits_total",
        "Classify calls answered from an existing record"
    );
    ::metrics::describe_counter!("triage_reviews_total", "Total number of human reviews");
    ::metrics::describe_histogram!(
        "triage_scoring_latency_us",
        "Heuristic scoring latency in microseconds"
    );
}

/// Metrics collector for classification activity
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    classifications: AtomicU64,
    rule_matches: AtomicU64,
    spam_flagged: AtomicU64,
    cache_hits: AtomicU64,
    reviews: AtomicU64,
    heuristic_runs: AtomicU64,
    scoring_latency_us: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                classifications: AtomicU64::new(0),
                rule_matches: AtomicU64::new(0),
                spam_flagged: AtomicU64::new(0),
                cache_hits: AtomicU64::new(0),
                reviews: AtomicU64::new(0),
                heuristic_runs: AtomicU64::new(0),
                scoring_latency_us: AtomicU64::new(0),
            }),
        }
    }

    /// Record a newly persisted classification
    pub fn record_classification(&self, source: ClassificationSource, is_spam: bool) {
        self.inner.classifications.fetch_add(1, Ordering::Relaxed);
        if source != ClassificationSource::Heuristic {
            self.inner.rule_matches.fetch_add(1, Ordering::Relaxed);
        }
        if is_spam {
            self.inner.spam_flagged.fetch_add(1, Ordering::Relaxed);
        }
        ::metrics::counter!("triage_classifications_total", "source" => source.as_str())
            .increment(1);
    }

    /// Record one heuristic evaluation and its latency
    pub fn record_scoring_latency(&self, latency_us: u64) {
        self.inner.heuristic_runs.fetch_add(1, Ordering::Relaxed);
        self.inner
            .scoring_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);
        ::metrics::histogram!("triage_scoring_latency_us").record(latency_us as f64);
    }

    /// Record a classify call that returned an existing record
    pub fn record_cache_hit(&self) {
        self.inner.cache_hits.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("triage_cache_hits_total").increment(1);
    }

    /// Record a human review
    pub fn record_review(&self) {
        self.inner.reviews.fetch_add(1, Ordering::Relaxed);
        ::metrics::counter!("triage_reviews_total").increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            classifications: self.inner.classifications.load(Ordering::Relaxed),
            rule_matches: self.inner.rule_matches.load(Ordering::Relaxed),
            spam_flagged: self.inner.spam_flagged.load(Ordering::Relaxed),
            cache_hits: self.inner.cache_hits.load(Ordering::Relaxed),
            reviews: self.inner.reviews.load(Ordering::Relaxed),
            heuristic_runs: self.inner.heuristic_runs.load(Ordering::Relaxed),
            scoring_latency_us: self.inner.scoring_latency_us.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub classifications: u64,
    pub rule_matches: u64,
    pub spam_flagged: u64,
    pub cache_hits: u64,
    pub reviews: u64,
    pub heuristic_runs: u64,
    pub scoring_latency_us: u64,
}

impl MetricsSnapshot {
    /// Average heuristic scoring latency
    pub fn avg_scoring_latency_us(&self) -> u64 {
        if self.heuristic_runs == 0 {
            0
        } else {
            self.scoring_latency_us / self.heuristic_runs
        }
    }

    /// Share of new classifications decided by a stored rule
    pub fn rule_hit_rate(&self) -> f64 {
        if self.classifications == 0 {
            0.0
        } else {
            self.rule_matches as f64 / self.classifications as f64
        }
    }

    /// Share of new classifications flagged as spam
    pub fn spam_rate(&self) -> f64 {
        if self.classifications == 0 {
            0.0
        } else {
            self.spam_flagged as f64 / self.classifications as f64
        }
    }
}
