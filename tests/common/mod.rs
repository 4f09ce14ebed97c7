/*!
 * Common test utilities for the chapterpress test suite
 */

use anyhow::Result;
use lopdf::{dictionary, Dictionary, Document, Object, Stream};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use chapterpress::app_config::Config;
use chapterpress::database::{AttachmentAsset, Chapter, Project, ProjectBundle, Reference, Repository};
use chapterpress::export::ExportService;
use chapterpress::providers::mock::MockGenerator;
use chapterpress::storage::MemoryStore;

pub mod mock_collaborators;

use mock_collaborators::FixtureFetcher;

/// Route library logs to the test output; `RUST_LOG=debug` shows export traces
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &[u8]) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Serialized PDF whose pages carry a `Label` entry, one page per label
pub fn labeled_pdf(labels: &[&str]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let kids: Vec<Object> = labels
        .iter()
        .map(|label| {
            let content_id = doc.add_object(Stream::new(Dictionary::new(), b"BT /F1 12 Tf 50 50 Td (x) Tj ET".to_vec()));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Label" => Object::string_literal(*label),
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("fixture PDF should serialize");
    bytes
}

/// `Label` entries of the pages of a PDF, in page order; `None` for unlabeled pages
pub fn page_labels(bytes: &[u8]) -> Vec<Option<String>> {
    let doc = Document::load_mem(bytes).expect("output should be a valid PDF");
    doc.get_pages()
        .into_values()
        .map(|id| match doc.get_dictionary(id).ok().and_then(|d| d.get(b"Label").ok()) {
            Some(Object::String(label, _)) => Some(String::from_utf8_lossy(label).to_string()),
            _ => None,
        })
        .collect()
}

/// Two-chapter project with references and three attachment assets
pub fn sample_bundle() -> ProjectBundle {
    ProjectBundle {
        project: Project {
            id: "p1".to_string(),
            title: "Soil Erosion in Upland Farms".to_string(),
            department: Some("Agronomy".to_string()),
            author: Some("R. Diaz".to_string()),
        },
        chapters: vec![
            Chapter::new(
                2,
                "Method",
                "### Sampling\nSamples were taken with $\\frac{1}{2}$ m spacing.\n- dry season\n- wet season",
            ),
            Chapter::new(1, "Introduction", "Erosion is a **serious** problem.\n\nIt affects *yield*."),
        ],
        references: vec![
            Reference::new(2, "Roe, R. (2021). Field methods."),
            Reference::new(1, "Doe, J. (2020). Soil science."),
        ],
        assets: vec![
            AttachmentAsset::new("a1", "p1", "mem://a1"),
            AttachmentAsset::new("a2", "p1", "mem://a2"),
            AttachmentAsset::new("gone", "p1", "mem://gone"),
        ],
    }
}

/// In-memory repository holding `bundle`
pub async fn seeded_repository(bundle: ProjectBundle) -> Arc<Repository> {
    let repo = Repository::new_in_memory().expect("in-memory database should open");
    repo.import_project(bundle).await.expect("import should succeed");
    Arc::new(repo)
}

/// Service wired to mock collaborators
pub struct TestHarness {
    pub service: ExportService,
    pub generator: MockGenerator,
    pub fetcher: FixtureFetcher,
    pub storage: MemoryStore,
}

impl TestHarness {
    pub async fn new(generator: MockGenerator, fetcher: FixtureFetcher) -> Self {
        Self::with_storage(generator, fetcher, MemoryStore::new()).await
    }

    pub async fn with_storage(generator: MockGenerator, fetcher: FixtureFetcher, storage: MemoryStore) -> Self {
        init_logging();
        let store = seeded_repository(sample_bundle()).await;
        let service = ExportService::new(
            &Config::default(),
            store,
            Arc::new(generator.clone()),
            Arc::new(fetcher.clone()),
            Arc::new(storage.clone()),
        );
        Self {
            service,
            generator,
            fetcher,
            storage,
        }
    }

    /// Bytes of the only stored object
    pub fn stored_bytes(&self) -> Vec<u8> {
        let objects = self.storage.objects();
        assert_eq!(objects.len(), 1, "exactly one object should be stored");
        objects[0].bytes.clone()
    }
}

/// Strings drawn with `Tj` on each page, in page order, decoded as WinAnsi
pub fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    use encoding_rs::WINDOWS_1252;
    use lopdf::content::Content;

    let doc = Document::load_mem(bytes).expect("output should be a valid PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let raw = doc.get_page_content(id).unwrap_or_default();
            let content = Content::decode(&raw).unwrap_or(Content { operations: Vec::new() });
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(text, _)) => Some(WINDOWS_1252.decode(text).0.into_owned()),
                    _ => None,
                })
                .collect()
        })
        .collect()
}
