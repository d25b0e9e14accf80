//! Record store trait

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use triage_core::{Error, Result};

/// A stored record
pub type Record = serde_json::Value;

/// Options for an ordered scan
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanOptions {
    /// Exclusive cursor: only keys past this one in scan direction
    pub after: Option<String>,

    /// Maximum records to return
    pub limit: Option<usize>,

    /// Scan from the highest key down
    pub reverse: bool,
}

impl ScanOptions {
    /// Scan the whole collection in key order
    pub fn new() -> Self {
        Self::default()
    }

    /// Set limit
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after `key`
    pub fn after(mut self, key: impl Into<String>) -> Self {
        self.after = Some(key.into());
        self
    }

    /// Scan in descending key order
    pub fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }
}

/// Keyed record store shared by every engine collection.
///
/// Implementations must tolerate concurrent readers and writers; writes to
/// the same key are last-write-wins.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch one record
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>>;

    /// Insert or replace one record
    async fn upsert(&self, collection: &str, key: &str, record: Record) -> Result<()>;

    /// Remove one record; returns whether it existed
    async fn delete(&self, collection: &str, key: &str) -> Result<bool>;

    /// Records in key order
    async fn scan(&self, collection: &str, options: &ScanOptions) -> Result<Vec<(String, Record)>>;

    /// Backend name for logging
    fn name(&self) -> &str;
}

/// Collection names become file names, so keep them to a safe alphabet
pub(crate) fn validate_collection(collection: &str) -> Result<()> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(Error::storage(format!(
            "invalid collection name '{}'",
            collection
        )))
    }
}

/// Apply scan options to one collection map
pub(crate) fn scan_map(map: &BTreeMap<String, Record>, options: &ScanOptions) -> Vec<(String, Record)> {
    let limit = options.limit.unwrap_or(usize::MAX);
    let cursor = options.after.clone();

    let entries: Box<dyn Iterator<Item = (&String, &Record)>> = match (options.reverse, cursor) {
        (false, None) => Box::new(map.iter()),
        (false, Some(key)) => Box::new(map.range((Bound::Excluded(key), Bound::Unbounded))),
        (true, None) => Box::new(map.iter().rev()),
        (true, Some(key)) => Box::new(
            map.range((Bound::Unbounded, Bound::Excluded(key)))
                .rev(),
        ),
    };

    entries
        .take(limit)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
