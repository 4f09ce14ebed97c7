/*!
 * Mock text generator for testing.
 *
 * - `MockGenerator::working()` - Always succeeds with a canned abstract
 * - `MockGenerator::failing()` - Always fails with an API error
 * - `MockGenerator::empty()` - Succeeds with an empty body
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::{Generation, GenerationParams, TextGenerator};

/// Behavior mode for the mock generator
#[derive(Debug, Clone, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with the given text
    Working(String),
    /// Always fails with an error
    Failing,
    /// Returns an empty response
    Empty,
}

/// Mock generator that records every prompt it receives
#[derive(Debug, Clone)]
pub struct MockGenerator {
    behavior: MockBehavior,
    request_count: Arc<AtomicUsize>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    /// Create a new mock with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working(
            "This report examines the problem in depth. It reviews prior work, \
             describes the method used and discusses the results obtained."
                .to_string(),
        ))
    }

    /// Create a mock that always returns `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new(MockBehavior::Working(text.into()))
    }

    /// Create a mock that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Number of generate calls received
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<Generation, ProviderError> {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());

        match &self.behavior {
            MockBehavior::Working(text) => Ok(Generation { content: text.clone() }),
            MockBehavior::Failing => Err(ProviderError::ApiError {
                status_code: 503,
                message: "Mock provider unavailable".to_string(),
            }),
            MockBehavior::Empty => Ok(Generation { content: String::new() }),
        }
    }
}
