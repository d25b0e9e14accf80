//! Typed view over one collection

use crate::store::{RecordStore, ScanOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use triage_core::{Error, Result};

/// Serializes `T` in and out of a named collection
pub struct Collection<T> {
    store: Arc<dyn RecordStore>,
    name: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            name: self.name,
            _record: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn RecordStore>, name: &'static str) -> Self {
        Self {
            store,
            name,
            _record: PhantomData,
        }
    }

    /// Collection name
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub async fn get(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(self.name, key).await? {
            Some(record) => self.decode(key, record).map(Some),
            None => Ok(None),
        }
    }

    pub async fn put(&self, key: &str, value: &T) -> Result<()> {
        let record = serde_json::to_value(value)?;
        self.store.upsert(self.name, key, record).await
    }

    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.store.delete(self.name, key).await
    }

    /// Decoded records in key order
    pub async fn scan(&self, options: &ScanOptions) -> Result<Vec<(String, T)>> {
        self.store
            .scan(self.name, options)
            .await?
            .into_iter()
            .map(|(key, record)| {
                let value = self.decode(&key, record)?;
                Ok((key, value))
            })
            .collect()
    }

    /// Every record, in key order
    pub async fn all(&self) -> Result<Vec<T>> {
        Ok(self
            .scan(&ScanOptions::new())
            .await?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    fn decode(&self, key: &str, record: serde_json::Value) -> Result<T> {
        serde_json::from_value(record).map_err(|e| {
            Error::storage(format!("Corrupt record {}/{}: {}", self.name, key, e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        let notes: Collection<Note> = Collection::new(store, "notes");

        notes.put("b", &Note { text: "second".into() }).await.unwrap();
        notes.put("a", &Note { text: "first".into() }).await.unwrap();

        let all = notes.all().await.unwrap();
        assert_eq!(all[0].text, "first");
        assert_eq!(all[1].text, "second");
        assert_eq!(
            notes.get("a").await.unwrap(),
            Some(Note { text: "first".into() })
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_storage_error() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryStore::new());
        store
            .upsert("notes", "x", serde_json::json!({"wrong": 1}))
            .await
            .unwrap();

        let notes: Collection<Note> = Collection::new(store, "notes");
        assert!(matches!(notes.get("x").await, Err(Error::Storage(_))));
    }
}
