/*!
 * In-memory object store for testing.
 *
 * - `MemoryStore::new()` - Keeps every object it receives
 * - `MemoryStore::failing()` - Rejects every upload
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::errors::StorageError;
use crate::storage::ObjectStore;

/// An object captured by the memory store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Store that keeps uploads in memory; clones share the same objects
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: Arc<Mutex<Vec<StoredObject>>>,
    fail: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects every upload
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Objects stored so far, in upload order
    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().clone()
    }

    /// Number of successful uploads
    pub fn put_count(&self) -> usize {
        self.objects.lock().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::ApiError {
                status_code: 503,
                message: "Mock storage unavailable".to_string(),
            });
        }

        self.objects.lock().push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            bytes,
            content_type: content_type.to_string(),
        });
        Ok(())
    }
}
