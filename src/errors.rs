/*!
 * Error types for the chapterpress application.
 *
 * This module contains custom error types for the different collaborators of
 * the export pipeline, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur when working with text-generation provider APIs
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Error when making an API request fails
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Error when parsing an API response fails
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Error returned by the API itself
    #[error("API responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
    },

    /// Error establishing or maintaining a connection
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Error with authentication
    #[error("Authentication error: {0}")]
    AuthenticationError(String),

    /// No client is configured for the requested provider
    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

/// Errors raised by an object-storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    /// The upload request could not be sent
    #[error("Storage request failed: {0}")]
    RequestFailed(String),

    /// The storage service rejected the upload
    #[error("Storage responded with error: {status_code} - {message}")]
    ApiError {
        /// HTTP status code
        status_code: u16,
        /// Error body returned by the service
        message: String,
    },

    /// Local filesystem failure
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors for a single attachment. These are recovered locally by the merge step.
#[derive(Error, Debug)]
pub enum AttachmentError {
    /// The attachment bytes could not be retrieved
    #[error("Failed to fetch attachment: {0}")]
    Fetch(String),

    /// The attachment source answered with a non-success status
    #[error("Attachment source responded with status {0}")]
    Status(u16),

    /// The bytes are not a readable PDF document
    #[error("Failed to decode attachment: {0}")]
    Decode(String),

    /// The document decoded but holds no pages
    #[error("Attachment has no pages")]
    Empty,
}

/// Errors that abort an export
#[derive(Error, Debug)]
pub enum ExportError {
    /// The requested project does not exist
    #[error("Project not found: {0}")]
    ProjectNotFound(String),

    /// The relational store failed
    #[error("Store error: {0}")]
    Store(#[from] anyhow::Error),

    /// The abstract was requested but could not be generated
    #[error("Abstract generation failed: {0}")]
    Abstract(#[from] ProviderError),

    /// The paginated body could not be produced
    #[error("PDF error: {0}")]
    Pdf(String),

    /// The structured document could not be packaged
    #[error("DOCX error: {0}")]
    Docx(String),

    /// The final upload failed
    #[error("Upload failed: {0}")]
    Storage(#[from] StorageError),
}

impl ExportError {
    /// HTTP-style status code reported to the caller for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            Self::ProjectNotFound(_) => 404,
            Self::Abstract(_) | Self::Storage(_) => 502,
            Self::Store(_) | Self::Pdf(_) | Self::Docx(_) => 500,
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a provider
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Error from the export pipeline
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
