//! JSON file record store
//!
//! Each collection lives in `<dir>/<collection>.json` as a single JSON
//! object keyed by record key. Collections are loaded on first use and
//! rewritten in full on every mutation via a temp file and rename, so a
//! crash leaves either the old or the new document.

use crate::store::{scan_map, validate_collection, Record, RecordStore, ScanOptions};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use triage_core::{Error, Result};

type Collections = HashMap<String, BTreeMap<String, Record>>;

/// Record store persisting each collection as a JSON document
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    collections: Mutex<Collections>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::storage(format!("Failed to create data dir {}: {}", dir.display(), e))
        })?;

        info!("File store opened at {:?}", dir);

        Ok(Self {
            dir,
            collections: Mutex::new(HashMap::new()),
        })
    }

    /// Root directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    /// Load a collection into the cache if it is not there yet
    async fn load<'a>(
        &self,
        cache: &'a mut Collections,
        collection: &str,
    ) -> Result<&'a mut BTreeMap<String, Record>> {
        validate_collection(collection)?;

        if !cache.contains_key(collection) {
            let path = self.path_for(collection);
            let records = match tokio::fs::read(&path).await {
                Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                    Error::storage(format!("Corrupt collection file {}: {}", path.display(), e))
                })?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
                Err(e) => {
                    return Err(Error::storage(format!(
                        "Failed to read {}: {}",
                        path.display(),
                        e
                    )))
                }
            };
            debug!(collection, "Loaded collection from disk");
            cache.insert(collection.to_string(), records);
        }

        cache
            .get_mut(collection)
            .ok_or_else(|| Error::internal("collection vanished from cache"))
    }

    /// Rewrite a collection document
    async fn persist(&self, collection: &str, records: &BTreeMap<String, Record>) -> Result<()> {
        let path = self.path_for(collection);
        let tmp = self.dir.join(format!(".{}.json.tmp", collection));

        let bytes = serde_json::to_vec_pretty(records)?;
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| Error::storage(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::storage(format!("Failed to replace {}: {}", path.display(), e)))?;

        Ok(())
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>> {
        let mut cache = self.collections.lock().await;
        let records = self.load(&mut cache, collection).await?;
        Ok(records.get(key).cloned())
    }

    async fn upsert(&self, collection: &str, key: &str, record: Record) -> Result<()> {
        let mut cache = self.collections.lock().await;
        let records = self.load(&mut cache, collection).await?;

        let previous = records.insert(key.to_string(), record);
        if let Err(e) = self.persist(collection, records).await {
            // keep the cache in step with the disk
            match previous {
                Some(old) => records.insert(key.to_string(), old),
                None => records.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool> {
        let mut cache = self.collections.lock().await;
        let records = self.load(&mut cache, collection).await?;

        let Some(old) = records.remove(key) else {
            return Ok(false);
        };
        if let Err(e) = self.persist(collection, records).await {
            records.insert(key.to_string(), old);
            return Err(e);
        }
        Ok(true)
    }

    async fn scan(&self, collection: &str, options: &ScanOptions) -> Result<Vec<(String, Record)>> {
        let mut cache = self.collections.lock().await;
        let records = self.load(&mut cache, collection).await?;
        Ok(scan_map(records, options))
    }

    fn name(&self) -> &str {
        "file"
    }
}
