use async_trait::async_trait;
use log::debug;
use std::path::PathBuf;

use crate::errors::StorageError;
use crate::file_utils::FileManager;
use crate::storage::ObjectStore;

/// Stores objects as files at `{root}/{bucket}/{key}`
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// File path an object is written to
    pub fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let bucket_dir = FileManager::join_key(&self.root, bucket).map_err(|e| StorageError::RequestFailed(e.to_string()))?;
        FileManager::join_key(bucket_dir, key).map_err(|e| StorageError::RequestFailed(e.to_string()))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, _content_type: &str) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        debug!("Writing {} bytes to {:?}", bytes.len(), path);
        tokio::fs::write(&path, bytes).await?;
        Ok(())
    }
}
