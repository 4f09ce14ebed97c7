/*!
 * Structured format (DOCX).
 *
 * - `model`: sections and blocks built from report content
 * - `package`: WordprocessingML zip packaging
 */

use async_trait::async_trait;
use log::debug;

use crate::errors::ExportError;
use crate::export::content::ReportContent;
use crate::export::pdf::PageLayout;
use crate::export::request::{ExportFormat, ExportOptions};
use crate::export::{BuiltDocument, DocumentBuilder};

pub mod model;
pub mod package;

pub use model::{build_sections, Block, Section, StructuredDocument};

/// Builds the structured document. Page size and margins follow the page layout.
#[derive(Debug, Clone, Default)]
pub struct DocxExporter {
    layout: PageLayout,
}

impl DocxExporter {
    pub fn new(layout: PageLayout) -> Self {
        Self { layout }
    }
}

#[async_trait]
impl DocumentBuilder for DocxExporter {
    async fn build(&self, content: &ReportContent, options: &ExportOptions) -> Result<BuiltDocument, ExportError> {
        let document = build_sections(content, options);
        debug!("Structured document has {} sections", document.sections.len());

        let bytes = package::write_package(&document, &content.document_info(), &self.layout)?;

        Ok(BuiltDocument {
            bytes,
            content_type: ExportFormat::Docx.content_type(),
            extension: ExportFormat::Docx.extension(),
        })
    }
}
