use async_trait::async_trait;
use log::{debug, error};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use crate::errors::StorageError;
use crate::storage::ObjectStore;

/// Uploads objects with `PUT {endpoint}/{bucket}/{key}`
#[derive(Debug, Clone)]
pub struct HttpStore {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl HttpStore {
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: Client::builder().timeout(timeout).build().unwrap_or_default(),
        }
    }

    /// Upload URL of an object
    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, bucket, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for HttpStore {
    async fn put(&self, bucket: &str, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<(), StorageError> {
        let url = self.object_url(bucket, key);
        debug!("Uploading {} bytes to {}", bytes.len(), url);

        let mut request = self.client.put(&url).header(CONTENT_TYPE, content_type).body(bytes);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::RequestFailed(format!("{}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Storage API error ({}): {}", status, error_text);
            return Err(StorageError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_objectUrl_shouldJoinEndpointBucketAndKey() {
        let store = HttpStore::new("https://storage.example.com/", "", Duration::from_secs(1));
        assert_eq!(
            store.object_url("reports", "exports/p1/a.pdf"),
            "https://storage.example.com/reports/exports/p1/a.pdf"
        );
    }

    #[tokio::test]
    async fn test_put_withUnreachableEndpoint_shouldFail() {
        let store = HttpStore::new("http://127.0.0.1:9", "token", Duration::from_secs(2));

        let result = store.put("b", "k", vec![1, 2, 3], "application/pdf").await;

        assert!(matches!(result, Err(StorageError::RequestFailed(_))));
    }
}
