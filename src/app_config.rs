use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::Path;

use crate::export::pdf::PageLayout;
use crate::file_utils::FileManager;

/// Application configuration module
/// This module handles loading, validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Project store settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Text-generation settings for the abstract
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Object-storage settings for the final artifact
    #[serde(default)]
    pub storage: StorageConfig,

    /// Export pipeline settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Text-generation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GenerationProvider {
    // @provider: Ollama
    #[default]
    Ollama,
    // @provider: Anthropic
    Anthropic,
}

impl GenerationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Ollama => "Ollama",
            Self::Anthropic => "Anthropic",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Ollama => "ollama".to_string(),
            Self::Anthropic => "anthropic".to_string(),
        }
    }
}

impl std::fmt::Display for GenerationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: GenerationProvider) -> Self {
        match provider_type {
            GenerationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            GenerationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
            },
        }
    }
}

/// Text-generation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Provider used for the abstract
    #[serde(default)]
    pub provider: GenerationProvider,

    /// Available providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Token cap for the abstract response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            provider: GenerationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(GenerationProvider::Ollama),
                ProviderConfig::new(GenerationProvider::Anthropic),
            ],
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

impl GenerationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        self.get_provider_config(&self.provider)
    }

    /// Get a specific provider configuration by type
    pub fn get_provider_config(&self, provider_type: &GenerationProvider) -> Option<&ProviderConfig> {
        let provider_str = provider_type.to_lowercase_string();
        self.available_providers
            .iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            GenerationProvider::Ollama => default_ollama_model(),
            GenerationProvider::Anthropic => default_anthropic_model(),
        }
    }

    /// Get the API key for a provider
    pub fn get_api_key(&self, provider: &GenerationProvider) -> String {
        self.get_provider_config(provider)
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for a provider
    pub fn get_endpoint(&self, provider: &GenerationProvider) -> String {
        if let Some(provider_config) = self.get_provider_config(provider) {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match provider {
            GenerationProvider::Ollama => default_ollama_endpoint(),
            GenerationProvider::Anthropic => default_anthropic_endpoint(),
        }
    }

    /// Get the request timeout for a provider
    pub fn get_timeout_secs(&self, provider: &GenerationProvider) -> u64 {
        self.get_provider_config(provider)
            .map(|p| p.timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

/// Where the final artifact is stored
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Files under a local directory
    #[default]
    Local,
    /// HTTP object-storage service accepting PUT uploads
    Http,
}

/// Object-storage configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct StorageConfig {
    // @field: Backend kind
    #[serde(default)]
    pub backend: StorageBackend,

    // @field: Bucket name
    #[serde(default = "default_bucket")]
    pub bucket: String,

    // @field: Public base URL the storage key is appended to
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,

    // @field: Upload endpoint (http backend)
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Bearer token (http backend)
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Root directory (local backend)
    #[serde(default = "default_local_root")]
    pub local_root: String,

    // @field: Upload timeout seconds
    #[serde(default = "default_storage_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            bucket: default_bucket(),
            public_base_url: default_public_base_url(),
            endpoint: String::new(),
            api_key: String::new(),
            local_root: default_local_root(),
            timeout_secs: default_storage_timeout_secs(),
        }
    }
}

/// Export pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ExportConfig {
    /// Maximum number of attachment downloads in flight
    #[serde(default = "default_attachment_concurrency")]
    pub attachment_concurrency: usize,

    /// Timeout for a single attachment download
    #[serde(default = "default_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Page geometry of the paginated format
    #[serde(default)]
    pub page: PageLayout,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            attachment_concurrency: default_attachment_concurrency(),
            fetch_timeout_secs: default_timeout_secs(),
            page: PageLayout::default(),
        }
    }
}

/// Project store configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DatabaseConfig {
    /// SQLite file path; the platform data directory is used when absent
    #[serde(default)]
    pub path: Option<String>,
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to the `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_anthropic_timeout_secs() -> u64 {
    120
}

fn default_storage_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

fn default_attachment_concurrency() -> usize {
    3
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}

fn default_bucket() -> String {
    "exports".to_string()
}

fn default_public_base_url() -> String {
    "http://localhost:8080/exports".to_string()
}

fn default_local_root() -> String {
    "storage".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.generation.provider == GenerationProvider::Anthropic
            && self.generation.get_api_key(&GenerationProvider::Anthropic).is_empty()
        {
            return Err(anyhow!("Generation API key is required for Anthropic provider"));
        }

        if self.export.attachment_concurrency == 0 {
            return Err(anyhow!("export.attachment_concurrency must be at least 1"));
        }

        if self.storage.bucket.trim().is_empty() {
            return Err(anyhow!("storage.bucket must not be empty"));
        }

        if self.storage.public_base_url.trim().is_empty() {
            return Err(anyhow!("storage.public_base_url must not be empty"));
        }

        if self.storage.backend == StorageBackend::Http && self.storage.endpoint.trim().is_empty() {
            return Err(anyhow!("storage.endpoint is required for the http backend"));
        }

        self.export.page.validate()?;

        Ok(())
    }

    /// Load the configuration file, writing a default one when it does not exist
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if FileManager::file_exists(path) {
            let content = FileManager::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?;
            return Ok(config);
        }

        warn!("Config file not found at {:?}, creating default config.", path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        FileManager::write_bytes(path, config_json.as_bytes())
            .with_context(|| format!("Failed to write default config to file: {:?}", path))?;

        Ok(config)
    }
}
