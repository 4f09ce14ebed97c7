/*!
 * Attachment retrieval.
 *
 * `HttpFetcher` downloads `http`/`https` URLs with reqwest and reads
 * `file://` URLs or bare paths from the local filesystem. Every source gets
 * exactly one attempt.
 */

use async_trait::async_trait;
use bytes::Bytes;
use log::debug;
use reqwest::Client;
use std::fmt::Debug;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::errors::AttachmentError;

/// Source of attachment bytes
#[async_trait]
pub trait AttachmentFetcher: Send + Sync + Debug {
    /// Retrieve the bytes behind `url`
    async fn fetch(&self, url: &str) -> Result<Bytes, AttachmentError>;
}

/// Fetcher for remote and local attachment locations
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

/// Where an attachment location points to
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Remote(Url),
    Local(PathBuf),
}

fn parse_location(raw: &str) -> Result<Location, AttachmentError> {
    match Url::parse(raw) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(Location::Remote(url)),
            "file" => url
                .to_file_path()
                .map(Location::Local)
                .map_err(|_| AttachmentError::Fetch(format!("Invalid file URL: {}", raw))),
            scheme => Err(AttachmentError::Fetch(format!("Unsupported URL scheme: {}", scheme))),
        },
        // Not a URL at all, treat it as a path
        Err(url::ParseError::RelativeUrlWithoutBase) => Ok(Location::Local(PathBuf::from(raw))),
        Err(e) => Err(AttachmentError::Fetch(format!("Invalid attachment URL {}: {}", raw, e))),
    }
}

impl HttpFetcher {
    /// Create a fetcher whose HTTP requests time out after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
        }
    }
}

#[async_trait]
impl AttachmentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AttachmentError> {
        match parse_location(url)? {
            Location::Remote(url) => {
                debug!("Downloading attachment from {}", url);
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| AttachmentError::Fetch(format!("{}: {}", url, e)))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(AttachmentError::Status(status.as_u16()));
                }

                response
                    .bytes()
                    .await
                    .map_err(|e| AttachmentError::Fetch(format!("{}: {}", url, e)))
            }
            Location::Local(path) => {
                debug!("Reading attachment from {:?}", path);
                tokio::fs::read(&path)
                    .await
                    .map(Bytes::from)
                    .map_err(|e| AttachmentError::Fetch(format!("{:?}: {}", path, e)))
            }
        }
    }
}
