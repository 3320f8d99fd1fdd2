//! In-memory object store for testing and development

use crate::{GetOptions, HttpMetadata, ObjectBody, ObjectStore, Result, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Clone)]
struct Entry {
    data: Bytes,
    http_metadata: HttpMetadata,
}

/// An in-memory object store
#[derive(Clone, Default)]
pub struct MemoryObjectStore {
    objects: Arc<DashMap<String, Entry>>,
}

impl MemoryObjectStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            objects: Arc::new(DashMap::new()),
        }
    }

    /// Store an object, replacing any previous value under `key`
    pub fn put(&self, key: impl Into<String>, data: impl Into<Bytes>, http_metadata: HttpMetadata) {
        self.objects.insert(
            key.into(),
            Entry {
                data: data.into(),
                http_metadata,
            },
        );
    }

    /// Remove an object
    pub fn remove(&self, key: &str) -> bool {
        self.objects.remove(key).is_some()
    }

    /// Get the number of objects stored
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str, options: GetOptions) -> Result<Option<StoredObject>> {
        // Clone out of the map so no shard lock is held across the response
        let Some(entry) = self.objects.get(key).map(|e| e.value().clone()) else {
            return Ok(None);
        };

        let size = entry.data.len() as u64;
        let (range, data) = match options.range {
            Some(requested) => {
                let served = requested.resolve(size)?;
                let start = served.offset as usize;
                let end = start + served.length as usize;
                (Some(served), entry.data.slice(start..end))
            }
            None => (None, entry.data),
        };

        Ok(Some(StoredObject {
            key: key.to_string(),
            size,
            http_metadata: entry.http_metadata,
            range,
            body: ObjectBody::from_bytes(data),
        }))
    }
}
