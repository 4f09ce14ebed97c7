/*!
 * Inbound export request and outbound response types.
 */

use serde::{Deserialize, Serialize};

/// Deliverable format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExportFormat {
    /// Merged paginated PDF
    #[serde(rename = "A", alias = "pdf")]
    Pdf,
    /// Flow-based DOCX
    #[serde(rename = "B", alias = "docx")]
    Docx,
}

impl ExportFormat {
    /// MIME type of the produced bytes
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Docx => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        }
    }

    /// File extension without the dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pdf => write!(f, "A"),
            Self::Docx => write!(f, "B"),
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "a" | "pdf" => Ok(Self::Pdf),
            "b" | "docx" => Ok(Self::Docx),
            _ => Err(anyhow::anyhow!("Invalid export format: {} (expected A or B)", s)),
        }
    }
}

/// Section switches chosen by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Generate and include the abstract
    #[serde(rename = "includeAbstract")]
    pub include_abstract: bool,
    /// Include the table of contents
    #[serde(rename = "includeTOC")]
    pub include_toc: bool,
    /// Stamp page numbers on the rendered body (format A only)
    #[serde(rename = "includePageNumbers")]
    pub include_page_numbers: bool,
}

/// One export job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    pub project_id: String,
    /// Requesting user, only used for logging
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(rename = "type")]
    pub format: ExportFormat,
    /// Attachment ids in the order their pages should appear
    #[serde(default)]
    pub ordered_doc_ids: Vec<String>,
    #[serde(default)]
    pub options: ExportOptions,
}

impl ExportRequest {
    /// Request with no attachments and default options
    pub fn new(project_id: impl Into<String>, format: ExportFormat) -> Self {
        Self {
            project_id: project_id.into(),
            user_id: None,
            format,
            ordered_doc_ids: Vec::new(),
            options: ExportOptions::default(),
        }
    }
}

/// Result of one export, serialized as the outbound JSON body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExportResponse {
    /// The document was built and uploaded
    Success {
        success: bool,
        #[serde(rename = "fileUrl")]
        file_url: String,
    },
    /// The export failed; nothing was stored
    Failure {
        error: String,
        #[serde(skip)]
        status: u16,
    },
}

impl ExportResponse {
    pub fn success(file_url: impl Into<String>) -> Self {
        Self::Success {
            success: true,
            file_url: file_url.into(),
        }
    }

    pub fn failure(error: impl Into<String>, status: u16) -> Self {
        Self::Failure {
            error: error.into(),
            status,
        }
    }

    /// Whether the export produced a document
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// HTTP-style status code of the response
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Success { .. } => 200,
            Self::Failure { status, .. } => *status,
        }
    }

    /// URL of the stored document on success
    pub fn file_url(&self) -> Option<&str> {
        match self {
            Self::Success { file_url, .. } => Some(file_url),
            Self::Failure { .. } => None,
        }
    }
}
