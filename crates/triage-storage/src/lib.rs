//! Triage Storage
//!
//! The keyed record store the engine persists through. Records are JSON
//! values grouped into named collections and kept in key order.
//!
//! Provides:
//! - The [`RecordStore`] trait: get, upsert, delete and ordered scans
//! - [`MemoryStore`] for tests and embedding
//! - [`FileStore`], one JSON document per collection on disk
//! - [`Collection`], a typed view over one collection

pub mod collection;
pub mod file;
pub mod memory;
pub mod store;

pub use collection::Collection;
pub use file::FileStore;
pub use memory::MemoryStore;
pub use store::{Record, RecordStore, ScanOptions};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::collection::Collection;
    pub use crate::store::{RecordStore, ScanOptions};
    pub use crate::{FileStore, MemoryStore};
}
