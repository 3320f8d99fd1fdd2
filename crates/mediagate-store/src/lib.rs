//! # Mediagate Store
//!
//! Object storage collaborators for the Mediagate edge.
//!
//! This crate provides:
//! - **ObjectStore trait**: get-by-key with an optional byte range
//! - **Range resolution**: clamping requested ranges to the object size
//! - **Backends**: in-memory, local bucket directory, remote HTTP bucket
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Mediagate Edge                 │
//! ├─────────────────────────────────────────────┤
//! │            ObjectStore Trait                │
//! ├──────────────┬──────────────┬───────────────┤
//! │ MemoryStore  │   FsStore    │   HttpStore   │
//! ├──────────────┴──────────────┴───────────────┤
//! │       RAM  /  bucket directory  /  HTTP     │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use mediagate_store::{ByteRange, GetOptions, ObjectStore, FsObjectStore};
//!
//! let store = FsObjectStore::open("/srv/media").await?;
//! let object = store.get("clip.mp4", GetOptions::range(ByteRange::with_length(0, 1024))).await?;
//! ```

pub mod error;
pub mod fs;
pub mod http;
pub mod memory;
pub mod object;
pub mod range;

pub use error::{Result, StoreError};
pub use fs::FsObjectStore;
pub use http::{HttpObjectStore, HttpStoreConfig};
pub use memory::MemoryObjectStore;
pub use object::{HttpMetadata, ObjectBody, StoredObject};
pub use range::{ByteRange, GetOptions, ServedRange};

use async_trait::async_trait;

/// Trait for object storage backends
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read an object, or the requested slice of it.
    ///
    /// Returns `Ok(None)` when no object exists under `key`.
    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<StoredObject>>;
}
