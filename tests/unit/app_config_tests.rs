/*!
 * Tests for application configuration functionality
 */

use chapterpress::app_config::{Config, GenerationProvider, LogLevel, StorageBackend};

use crate::common;

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.generation.provider, GenerationProvider::Ollama);
    assert_eq!(config.generation.max_tokens, 1024);
    assert!((config.generation.temperature - 0.7).abs() < f32::EPSILON);
    assert_eq!(config.export.attachment_concurrency, 3);
    assert_eq!(config.export.page.page_width, 595.0);
    assert_eq!(config.export.page.page_height, 842.0);
    assert_eq!(config.storage.backend, StorageBackend::Local);
    assert_eq!(config.storage.bucket, "exports");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    // Hosted provider without a key
    config.generation.provider = GenerationProvider::Anthropic;
    assert!(config.validate().is_err());
    config.generation.provider = GenerationProvider::Ollama;

    config.export.attachment_concurrency = 0;
    assert!(config.validate().is_err());
    config.export.attachment_concurrency = 2;

    config.storage.backend = StorageBackend::Http;
    assert!(config.validate().is_err());
    config.storage.endpoint = "https://storage.example.com".to_string();
    assert!(config.validate().is_ok());

    config.export.page.margin_left = 600.0;
    assert!(config.validate().is_err());
}

/// Test partial JSON falls back to defaults
#[test]
fn test_configDeserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "storage": { "backend": "http", "endpoint": "https://s.example.com", "bucket": "reports" },
        "export": { "page": { "font_size": 12.0 } },
        "log_level": "debug"
    }"#;

    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.storage.backend, StorageBackend::Http);
    assert_eq!(config.storage.bucket, "reports");
    assert_eq!(config.export.page.font_size, 12.0);
    assert_eq!(config.export.page.margin_top, 72.0);
    assert_eq!(config.export.attachment_concurrency, 3);
    assert_eq!(config.log_level, LogLevel::Debug);
}

/// Test that a missing file is created with defaults and read back
#[test]
fn test_loadOrCreate_withMissingFile_shouldWriteDefaults() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("chapterpress.json");

    let created = Config::load_or_create(&path).unwrap();
    assert!(path.exists());

    let reloaded = Config::load_or_create(&path).unwrap();
    assert_eq!(reloaded.storage.bucket, created.storage.bucket);
    assert_eq!(reloaded.export.page, created.export.page);
}

/// Test that a broken file is reported instead of overwritten
#[test]
fn test_loadOrCreate_withInvalidJson_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = common::create_test_file(temp_dir.path(), "broken.json", b"{ not json").unwrap();

    assert!(Config::load_or_create(&path).is_err());
    assert_eq!(std::fs::read(&path).unwrap(), b"{ not json");
}
