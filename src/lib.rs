/*!
 * # chapterpress - academic report export engine
 *
 * A Rust library that turns a stored report project (chapters, references
 * and attachment documents) into a finished deliverable.
 *
 * ## Features
 *
 * - Format A: a paginated PDF rendered with explicit pagination, with
 *   attachment PDFs merged in front of the body
 * - Format B: a DOCX document with one native section per part
 * - Optional abstract written by a text-generation provider:
 *   - Ollama (local LLM)
 *   - Anthropic API
 * - Inline Markdown emphasis and LaTeX math normalization
 * - Upload of the finished document to local or HTTP object storage
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: SQLite project store
 * - `export`: The export pipeline:
 *   - `export::inline`: Inline text normalization
 *   - `export::abstract_writer`: Abstract generation
 *   - `export::pdf`: Paginated renderer and binary merge engine
 *   - `export::docx`: Structured document builder
 *   - `export::orchestrator`: End-to-end export service
 * - `providers`: Client implementations for text-generation providers
 * - `storage`: Object storage backends
 * - `file_utils`: File system and file-name utilities
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod database;
pub mod errors;
pub mod export;
pub mod file_utils;
pub mod providers;
pub mod storage;

// Re-export main types for easier usage
pub use app_config::Config;
pub use database::{ProjectStore, Repository};
pub use errors::{AppError, AttachmentError, ExportError, ProviderError, StorageError};
pub use export::{ExportFormat, ExportOptions, ExportRequest, ExportResponse, ExportService};
pub use storage::ObjectStore;
