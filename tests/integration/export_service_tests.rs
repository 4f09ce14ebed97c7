/*!
 * Orchestration tests: failure handling, gating and the wire format
 */

use std::sync::Arc;

use chapterpress::app_config::Config;
use chapterpress::database::{Chapter, Project, ProjectBundle};
use chapterpress::export::{ExportFormat, ExportRequest, ExportResponse, ExportService};
use chapterpress::providers::mock::MockGenerator;
use chapterpress::storage::MemoryStore;

use crate::common::mock_collaborators::FixtureFetcher;
use crate::common::{labeled_pdf, page_texts, seeded_repository, TestHarness};

#[tokio::test]
async fn test_export_withFailingAbstract_shouldNotFetchOrUpload() {
    let fetcher = FixtureFetcher::serving(vec![("mem://a1", labeled_pdf(&["a1-p1"]))]);
    let harness = TestHarness::new(MockGenerator::failing(), fetcher).await;
    let mut request = ExportRequest::new("p1", ExportFormat::Pdf);
    request.ordered_doc_ids = vec!["a1".to_string()];
    request.options.include_abstract = true;

    let response = harness.service.export(&request).await;

    assert!(!response.is_success());
    assert_eq!(response.status_code(), 502);
    assert_eq!(harness.storage.put_count(), 0);
    assert!(harness.fetcher.requested().is_empty());
}

#[tokio::test]
async fn test_export_withEmptyAbstract_shouldFail() {
    let harness = TestHarness::new(MockGenerator::with_text("   \n "), FixtureFetcher::new()).await;
    let mut request = ExportRequest::new("p1", ExportFormat::Docx);
    request.options.include_abstract = true;

    let response = harness.service.export(&request).await;

    assert_eq!(response.status_code(), 502);
    assert_eq!(harness.storage.put_count(), 0);
}

#[tokio::test]
async fn test_export_withUnknownProject_shouldSerializeErrorBody() {
    let harness = TestHarness::new(MockGenerator::working(), FixtureFetcher::new()).await;

    let response = harness.service.export(&ExportRequest::new("missing", ExportFormat::Pdf)).await;

    assert_eq!(response.status_code(), 404);
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json, serde_json::json!({ "error": "Project not found: missing" }));
}

#[tokio::test]
async fn test_export_withFailingStorage_shouldReportFailure() {
    let harness = TestHarness::with_storage(MockGenerator::working(), FixtureFetcher::new(), MemoryStore::failing()).await;

    let response = harness.service.export(&ExportRequest::new("p1", ExportFormat::Pdf)).await;

    assert!(matches!(response, ExportResponse::Failure { status: 502, .. }));
}

#[tokio::test]
async fn test_export_fromWireRequest_shouldSucceed() {
    let fetcher = FixtureFetcher::serving(vec![("mem://a2", labeled_pdf(&["a2-p1"]))]);
    let harness = TestHarness::new(MockGenerator::working(), fetcher).await;
    let request: ExportRequest = serde_json::from_str(
        r#"{
            "projectId": "p1",
            "userId": "u-7",
            "type": "A",
            "orderedDocIds": ["a2"],
            "options": { "includeAbstract": true, "includeTOC": false, "includePageNumbers": true }
        }"#,
    )
    .unwrap();

    let response = harness.service.export(&request).await;

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], true);
    assert!(json["fileUrl"].as_str().unwrap().starts_with("http://localhost:8080/exports/p1/"));
    // Attachment, abstract, two chapters, references
    assert_eq!(page_texts(&harness.stored_bytes()).len(), 5);
}

#[tokio::test]
async fn test_export_withoutReferences_shouldOmitReferencesSection() {
    let store = seeded_repository(ProjectBundle {
        project: Project::new("bare", "Bare Report"),
        chapters: vec![Chapter::new(1, "Only", "Just one chapter.")],
        references: Vec::new(),
        assets: Vec::new(),
    })
    .await;
    let storage = MemoryStore::new();
    let service = ExportService::new(
        &Config::default(),
        store,
        Arc::new(MockGenerator::working()),
        Arc::new(FixtureFetcher::new()),
        Arc::new(storage.clone()),
    );

    let response = service.export(&ExportRequest::new("bare", ExportFormat::Pdf)).await;

    assert!(response.is_success());
    let pages = page_texts(&storage.objects()[0].bytes);
    assert_eq!(pages.len(), 1);
    assert!(!pages[0].contains(&"REFERENCES".to_string()));
}

#[tokio::test]
async fn test_export_withoutChapters_shouldStillProduceDocument() {
    let store = seeded_repository(ProjectBundle {
        project: Project::new("empty", "   "),
        chapters: Vec::new(),
        references: Vec::new(),
        assets: Vec::new(),
    })
    .await;
    let storage = MemoryStore::new();
    let service = ExportService::new(
        &Config::default(),
        store,
        Arc::new(MockGenerator::working()),
        Arc::new(FixtureFetcher::new()),
        Arc::new(storage.clone()),
    );

    let response = service.export(&ExportRequest::new("empty", ExportFormat::Pdf)).await;

    assert!(response.is_success());
    let object = &storage.objects()[0];
    assert!(object.key.starts_with("empty/untitled_"));
    assert_eq!(page_texts(&object.bytes).len(), 1);
}

#[tokio::test]
async fn test_export_runConcurrently_shouldStoreUnderDistinctKeys() {
    let harness = TestHarness::new(MockGenerator::working(), FixtureFetcher::new()).await;
    let plain = ExportRequest::new("p1", ExportFormat::Pdf);
    let mut with_toc = ExportRequest::new("p1", ExportFormat::Pdf);
    with_toc.options.include_toc = true;

    let (first, second) = tokio::join!(harness.service.export(&plain), harness.service.export(&with_toc));

    assert!(first.is_success() && second.is_success());
    assert_ne!(first.file_url(), second.file_url());
    let objects = harness.storage.objects();
    assert_eq!(objects.len(), 2);
    assert_ne!(objects[0].key, objects[1].key);
    // Both stored documents are still intact: the table of contents adds a page
    let mut page_counts: Vec<usize> = objects.iter().map(|o| page_texts(&o.bytes).len()).collect();
    page_counts.sort();
    assert_eq!(page_counts, vec![3, 4]);
}
