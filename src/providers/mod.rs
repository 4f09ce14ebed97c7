/*!
 * Text-generation provider implementations.
 *
 * This module contains client implementations for the LLM providers used to
 * write report abstracts:
 * - Ollama: Local LLM server
 * - Anthropic: Anthropic API integration
 *
 * `ProviderRouter` exposes the configured clients behind the single
 * `TextGenerator` seam used by the export pipeline.
 */

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use crate::app_config::{GenerationConfig, GenerationProvider};
use crate::errors::ProviderError;

pub mod anthropic;
pub mod mock;
pub mod ollama;

use anthropic::{Anthropic, AnthropicRequest};
use ollama::{GenerationRequest, Ollama};

/// Parameters of a generation call. Fixed by configuration, never per call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    /// Provider that should serve the call
    pub provider: GenerationProvider,
    /// Model name
    pub model: String,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

impl GenerationParams {
    /// Build the parameters for the active provider of a configuration
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            provider: config.provider,
            model: config.get_model(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Text returned by a provider
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    /// The generated text
    pub content: String,
}

/// Common trait for text-generation collaborators
///
/// Implementations must be usable from concurrent export requests.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Generate a completion for `prompt`
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Generation, ProviderError>;
}

/// Provider implementation variants
#[derive(Debug)]
enum ProviderClient {
    /// Ollama LLM service
    Ollama {
        /// Client instance
        client: Ollama,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },
}

/// Dispatches generation calls to the client configured for the requested provider
#[derive(Debug)]
pub struct ProviderRouter {
    clients: Vec<(GenerationProvider, ProviderClient)>,
}

impl ProviderRouter {
    /// Create clients for every provider listed in the configuration
    pub fn from_config(config: &GenerationConfig) -> Self {
        let mut clients = Vec::new();

        for provider in [GenerationProvider::Ollama, GenerationProvider::Anthropic] {
            if config.get_provider_config(&provider).is_none() && provider != config.provider {
                continue;
            }

            let endpoint = config.get_endpoint(&provider);
            let timeout = Duration::from_secs(config.get_timeout_secs(&provider));

            let client = match provider {
                GenerationProvider::Ollama => ProviderClient::Ollama {
                    client: Ollama::new(endpoint, timeout),
                },
                GenerationProvider::Anthropic => ProviderClient::Anthropic {
                    client: Anthropic::new(config.get_api_key(&provider), endpoint, timeout),
                },
            };
            clients.push((provider, client));
        }

        Self { clients }
    }

    fn client_for(&self, provider: GenerationProvider) -> Option<&ProviderClient> {
        self.clients
            .iter()
            .find(|(kind, _)| *kind == provider)
            .map(|(_, client)| client)
    }
}

#[async_trait]
impl TextGenerator for ProviderRouter {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<Generation, ProviderError> {
        let client = self
            .client_for(params.provider)
            .ok_or_else(|| ProviderError::NotConfigured(params.provider.display_name().to_string()))?;

        let content = match client {
            ProviderClient::Ollama { client } => {
                let request = GenerationRequest::new(&params.model, prompt)
                    .temperature(params.temperature)
                    .num_predict(params.max_tokens);
                let response = client.generate(request).await?;
                response.response
            }
            ProviderClient::Anthropic { client } => {
                let request = AnthropicRequest::new(&params.model, params.max_tokens)
                    .temperature(params.temperature)
                    .add_message("user", prompt);
                let response = client.complete(request).await?;
                Anthropic::extract_text_from_response(&response)
            }
        };

        Ok(Generation { content })
    }
}
