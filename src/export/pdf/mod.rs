/*!
 * Paginated format (PDF).
 *
 * - `layout`: page geometry
 * - `metrics`: font widths and text encoding
 * - `render`: pagination state machine
 * - `writer`: lopdf serialization of rendered pages
 * - `merge`: attachment loading and page-tree merging
 */

use async_trait::async_trait;
use log::info;
use std::sync::Arc;

use crate::errors::ExportError;
use crate::export::content::ReportContent;
use crate::export::fetch::AttachmentFetcher;
use crate::export::request::{ExportFormat, ExportOptions};
use crate::export::{BuiltDocument, DocumentBuilder};

pub mod layout;
pub mod merge;
pub mod metrics;
pub mod render;
pub mod writer;

pub use layout::PageLayout;
pub use merge::{merge_documents, resolve_attachments, MergeReport};
pub use render::{render_body, PageRenderer, RenderedPage};

/// Builds the merged PDF: attachment pages first, rendered body last
#[derive(Debug, Clone)]
pub struct PdfExporter {
    fetcher: Arc<dyn AttachmentFetcher>,
    layout: PageLayout,
    attachment_concurrency: usize,
}

impl PdfExporter {
    pub fn new(fetcher: Arc<dyn AttachmentFetcher>, layout: PageLayout, attachment_concurrency: usize) -> Self {
        Self {
            fetcher,
            layout,
            attachment_concurrency,
        }
    }
}

#[async_trait]
impl DocumentBuilder for PdfExporter {
    async fn build(&self, content: &ReportContent, options: &ExportOptions) -> Result<BuiltDocument, ExportError> {
        let pages = render_body(content, options, &self.layout);
        let body = writer::write_pages(&pages, &self.layout)?;

        let attachments = resolve_attachments(&content.ordered_doc_ids, &content.assets);
        let (mut documents, report) =
            merge::load_attachments(self.fetcher.as_ref(), &attachments, self.attachment_concurrency).await;

        info!(
            "Rendered {} body pages; attachments: {} requested, {} merged, {} skipped",
            pages.len(),
            report.requested,
            report.merged,
            report.skipped()
        );

        documents.push(body);
        let mut merged = merge_documents(documents)?;
        writer::set_document_info(&mut merged, &content.document_info());

        Ok(BuiltDocument {
            bytes: writer::save_document(merged)?,
            content_type: ExportFormat::Pdf.content_type(),
            extension: ExportFormat::Pdf.extension(),
        })
    }
}
