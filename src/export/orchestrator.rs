/*!
 * Export orchestrator.
 *
 * One call to `ExportService::export` loads the project, optionally writes
 * the abstract, dispatches on the requested format, uploads the finished
 * document and reports the public URL. Every failure is caught here once and
 * turned into a failure response. The upload happens only after the whole
 * document was built.
 */

use log::{debug, error, info};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::app_config::Config;
use crate::database::ProjectStore;
use crate::errors::ExportError;
use crate::export::abstract_writer::AbstractWriter;
use crate::export::content::ReportContent;
use crate::export::docx::DocxExporter;
use crate::export::fetch::{AttachmentFetcher, HttpFetcher};
use crate::export::pdf::PdfExporter;
use crate::export::request::{ExportFormat, ExportRequest, ExportResponse};
use crate::export::DocumentBuilder;
use crate::providers::{GenerationParams, ProviderRouter, TextGenerator};
use crate::storage::{self, public_url, storage_key, ObjectStore};

/// Runs exports end to end. Holds no per-export state.
#[derive(Debug, Clone)]
pub struct ExportService {
    store: Arc<dyn ProjectStore>,
    abstract_writer: AbstractWriter,
    pdf: PdfExporter,
    docx: DocxExporter,
    storage: Arc<dyn ObjectStore>,
    bucket: String,
    public_base_url: String,
}

impl ExportService {
    /// Assemble a service from explicit collaborators
    pub fn new(
        config: &Config,
        store: Arc<dyn ProjectStore>,
        generator: Arc<dyn TextGenerator>,
        fetcher: Arc<dyn AttachmentFetcher>,
        storage: Arc<dyn ObjectStore>,
    ) -> Self {
        let layout = config.export.page.clone();
        Self {
            store,
            abstract_writer: AbstractWriter::new(generator, GenerationParams::from_config(&config.generation)),
            pdf: PdfExporter::new(fetcher, layout.clone(), config.export.attachment_concurrency),
            docx: DocxExporter::new(layout),
            storage,
            bucket: config.storage.bucket.clone(),
            public_base_url: config.storage.public_base_url.clone(),
        }
    }

    /// Assemble a service with the network collaborators the configuration selects
    pub fn from_config(config: &Config, store: Arc<dyn ProjectStore>) -> Self {
        let generator = Arc::new(ProviderRouter::from_config(&config.generation));
        let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(config.export.fetch_timeout_secs)));
        Self::new(config, store, generator, fetcher, storage::from_config(&config.storage))
    }

    /// Run one export and describe its outcome
    pub async fn export(&self, request: &ExportRequest) -> ExportResponse {
        let export_id = Uuid::new_v4();
        let started = Instant::now();
        info!(
            "[{}] Exporting project {} as format {} for user {}",
            export_id,
            request.project_id,
            request.format,
            request.user_id.as_deref().unwrap_or("-")
        );

        match self.run(&export_id, request).await {
            Ok(file_url) => {
                info!("[{}] Export stored at {} in {:?}", export_id, file_url, started.elapsed());
                ExportResponse::success(file_url)
            }
            Err(e) => {
                error!("[{}] Export failed: {}", export_id, e);
                ExportResponse::failure(e.to_string(), e.status_code())
            }
        }
    }

    async fn run(&self, export_id: &Uuid, request: &ExportRequest) -> Result<String, ExportError> {
        let mut content = self.load_content(request).await?;
        debug!(
            "[{}] Loaded {} chapters, {} references, {} assets",
            export_id,
            content.chapters.len(),
            content.references.len(),
            content.assets.len()
        );

        if request.options.include_abstract {
            content.abstract_text = Some(self.abstract_writer.generate(&content.chapters).await?);
        }

        let builder: &dyn DocumentBuilder = match request.format {
            ExportFormat::Pdf => &self.pdf,
            ExportFormat::Docx => &self.docx,
        };
        let document = builder.build(&content, &request.options).await?;
        debug!("[{}] Built {} bytes of {}", export_id, document.bytes.len(), document.content_type);

        let key = storage_key(
            &request.project_id,
            &content.project.title,
            content.created,
            export_id,
            document.extension,
        );
        self.storage
            .put(&self.bucket, &key, document.bytes, document.content_type)
            .await?;

        Ok(public_url(&self.public_base_url, &key))
    }

    async fn load_content(&self, request: &ExportRequest) -> Result<ReportContent, ExportError> {
        let project = self
            .store
            .get_project(&request.project_id)
            .await?
            .ok_or_else(|| ExportError::ProjectNotFound(request.project_id.clone()))?;
        let chapters = self.store.get_chapters(&request.project_id).await?;
        let references = self.store.get_references(&request.project_id).await?;

        let mut content = ReportContent::new(project, chapters, references);

        // Attachments only exist in the paginated format
        if request.format == ExportFormat::Pdf && !request.ordered_doc_ids.is_empty() {
            content.assets = self
                .store
                .get_assets(&request.project_id, &request.ordered_doc_ids)
                .await?;
            content.ordered_doc_ids = request.ordered_doc_ids.clone();
        }

        Ok(content)
    }
}
