//! In-memory record store

use crate::store::{scan_map, validate_collection, Record, RecordStore, ScanOptions};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use triage_core::Result;

/// Record store backed by ordered maps in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a collection
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .and_then(|records| records.get(key))
            .cloned())
    }

    async fn upsert(&self, collection: &str, key: &str, record: Record) -> Result<()> {
        validate_collection(collection)?;
        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .insert(key.to_string(), record);
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        Ok(self
            .collections
            .write()
            .get_mut(collection)
            .and_then(|records| records.remove(key))
            .is_some())
    }

    async fn scan(&self, collection: &str, options: &ScanOptions) -> Result<Vec<(String, Record)>> {
        Ok(self
            .collections
            .read()
            .get(collection)
            .map(|records| scan_map(records, options))
            .unwrap_or_default())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryStore::new();

        assert!(store.get("rules", "1").await.unwrap().is_none());

        store.upsert("rules", "1", json!({"pattern": "a"})).await.unwrap();
        store.upsert("rules", "1", json!({"pattern": "b"})).await.unwrap();
        assert_eq!(
            store.get("rules", "1").await.unwrap(),
            Some(json!({"pattern": "b"}))
        );
        assert_eq!(store.len("rules"), 1);

        assert!(store.delete("rules", "1").await.unwrap());
        assert!(!store.delete("rules", "1").await.unwrap());
        assert!(!store.delete("missing", "1").await.unwrap());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        store.upsert("a", "k", json!(1)).await.unwrap();
        store.upsert("b", "k", json!(2)).await.unwrap();

        let a = store.scan("a", &ScanOptions::new()).await.unwrap();
        assert_eq!(a, vec![("k".to_string(), json!(1))]);
        assert!(store.scan("c", &ScanOptions::new()).await.unwrap().is_empty());
    }
}
