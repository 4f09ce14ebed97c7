/*!
 * Report export pipeline.
 *
 * - `request`: inbound request and outbound response types
 * - `inline`: Markdown/LaTeX normalization into styled runs
 * - `markup`: line classification of chapter Markdown
 * - `content`: format-neutral report content and section planning
 * - `abstract_writer`: abstract generation through a text generator
 * - `fetch`: attachment retrieval
 * - `pdf`: paginated renderer and binary merge engine
 * - `docx`: structured document builder
 * - `orchestrator`: end-to-end export service
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ExportError;

pub mod abstract_writer;
pub mod content;
pub mod docx;
pub mod fetch;
pub mod inline;
pub mod markup;
pub mod orchestrator;
pub mod pdf;
pub mod request;

pub use abstract_writer::AbstractWriter;
pub use content::{ReportContent, SectionKind};
pub use docx::DocxExporter;
pub use fetch::{AttachmentFetcher, HttpFetcher};
pub use inline::{parse_runs, substitute_math, NormalizedLine, StyledRun};
pub use orchestrator::ExportService;
pub use pdf::PdfExporter;
pub use request::{ExportFormat, ExportOptions, ExportRequest, ExportResponse};

/// A finished document ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltDocument {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub extension: &'static str,
}

/// Turns report content into one output format
#[async_trait]
pub trait DocumentBuilder: Send + Sync + Debug {
    /// Build the complete document. Nothing is uploaded here.
    async fn build(&self, content: &ReportContent, options: &ExportOptions) -> Result<BuiltDocument, ExportError>;
}
