/*!
 * Object storage for finished exports.
 *
 * - `local`: files below a root directory
 * - `http`: PUT uploads to an object-storage service
 * - `memory`: in-process store for tests
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::app_config::{StorageBackend, StorageConfig};
use crate::errors::StorageError;
use crate::file_utils::export_file_name;

pub mod http;
pub mod local;
pub mod memory;

pub use http::HttpStore;
pub use local::LocalStore;
pub use memory::MemoryStore;

/// Destination for finished documents
#[async_trait]
pub trait ObjectStore: Send + Sync + Debug {
    /// Store `bytes` under `bucket`/`key`, replacing any previous object
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError>;
}

/// Characters of the export id appended to every key
const EXPORT_TAG_CHARS: usize = 8;

/// Storage key `{project_id}/{stem}_{timestamp}_{export_tag}.{extension}`.
///
/// The bucket is not part of the key. The export id keeps keys of exports
/// started in the same millisecond apart, so a stored object is never replaced.
pub fn storage_key(project_id: &str, title: &str, at: DateTime<Utc>, export_id: &Uuid, extension: &str) -> String {
    let id = export_id.simple().to_string();
    let tag = &id[..EXPORT_TAG_CHARS];
    format!("{}/{}", project_id, export_file_name(title, at, tag, extension))
}

/// Public URL of a stored key
pub fn public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}

/// Create the store selected by the configuration
pub fn from_config(config: &StorageConfig) -> Arc<dyn ObjectStore> {
    match config.backend {
        StorageBackend::Local => Arc::new(LocalStore::new(PathBuf::from(&config.local_root))),
        StorageBackend::Http => Arc::new(HttpStore::new(
            &config.endpoint,
            &config.api_key,
            Duration::from_secs(config.timeout_secs),
        )),
    }
}
