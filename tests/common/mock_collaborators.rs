/*!
 * Mock collaborators for testing
 *
 * The generator and storage mocks live in the library
 * (`providers::mock`, `storage::memory`). This module adds an attachment
 * fetcher serving fixture bytes so no test touches the network.
 */

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chapterpress::errors::AttachmentError;
use chapterpress::export::AttachmentFetcher;

/// Serves registered bytes per URL; unknown URLs answer 404
#[derive(Debug, Clone, Default)]
pub struct FixtureFetcher {
    responses: Arc<HashMap<String, Bytes>>,
    delays: Arc<HashMap<String, Duration>>,
    requested: Arc<Mutex<Vec<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetcher serving `(url, bytes)` pairs
    pub fn serving(entries: Vec<(&str, Vec<u8>)>) -> Self {
        Self {
            responses: Arc::new(
                entries
                    .into_iter()
                    .map(|(url, bytes)| (url.to_string(), Bytes::from(bytes)))
                    .collect(),
            ),
            ..Self::default()
        }
    }

    /// Answer `url` only after `delay`
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        let mut delays = (*self.delays).clone();
        delays.insert(url.to_string(), delay);
        self.delays = Arc::new(delays);
        self
    }

    /// Highest number of fetches that were running at the same time
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// URLs requested so far, in request order
    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().clone()
    }
}

#[async_trait]
impl AttachmentFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, AttachmentError> {
        self.requested.lock().push(url.to_string());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);

        match self.delays.get(url) {
            Some(delay) => tokio::time::sleep(*delay).await,
            None => tokio::task::yield_now().await,
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.responses
            .get(url)
            .cloned()
            .ok_or(AttachmentError::Status(404))
    }
}
