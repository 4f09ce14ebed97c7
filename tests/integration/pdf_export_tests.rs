/*!
 * End-to-end tests of the paginated format: rendering, attachment merging
 * and upload
 */

use std::time::Duration;

use chapterpress::app_config::Config;
use chapterpress::export::{ExportFormat, ExportRequest};
use chapterpress::providers::mock::MockGenerator;

use crate::common::mock_collaborators::FixtureFetcher;
use crate::common::{labeled_pdf, page_labels, page_texts, TestHarness};

fn fixture_fetcher() -> FixtureFetcher {
    FixtureFetcher::serving(vec![
        ("mem://a1", labeled_pdf(&["a1-p1", "a1-p2"])),
        ("mem://a2", labeled_pdf(&["a2-p1"])),
    ])
}

fn pdf_request(doc_ids: &[&str]) -> ExportRequest {
    let mut request = ExportRequest::new("p1", ExportFormat::Pdf);
    request.ordered_doc_ids = doc_ids.iter().map(|id| id.to_string()).collect();
    request
}

#[tokio::test]
async fn test_pdfExport_withAttachments_shouldPlaceThemBeforeBodyInCallerOrder() {
    let harness = TestHarness::new(MockGenerator::working(), fixture_fetcher()).await;

    let response = harness.service.export(&pdf_request(&["a2", "a1"])).await;

    assert!(response.is_success(), "export failed: {:?}", response);
    let labels = page_labels(&harness.stored_bytes());
    // Two chapters and the references, one page each
    assert_eq!(labels.len(), 3 + 3);
    assert_eq!(
        labels[..3].to_vec(),
        vec![
            Some("a2-p1".to_string()),
            Some("a1-p1".to_string()),
            Some("a1-p2".to_string())
        ]
    );
    assert!(labels[3..].iter().all(Option::is_none));
}

#[tokio::test]
async fn test_pdfExport_withMissingAttachments_shouldSkipThemAndSucceed() {
    let harness = TestHarness::new(MockGenerator::working(), fixture_fetcher()).await;

    // "unknown" has no asset; "gone" has one but its URL cannot be fetched
    let response = harness.service.export(&pdf_request(&["unknown", "a1", "gone"])).await;

    assert!(response.is_success());
    let labels = page_labels(&harness.stored_bytes());
    assert_eq!(labels[0].as_deref(), Some("a1-p1"));
    assert_eq!(labels[1].as_deref(), Some("a1-p2"));
    assert_eq!(labels.len(), 2 + 3);

    let mut requested = harness.fetcher.requested();
    requested.sort();
    assert_eq!(requested, vec!["mem://a1", "mem://gone"]);
}

#[tokio::test]
async fn test_pdfExport_withDuplicateAttachment_shouldRepeatItsPages() {
    let harness = TestHarness::new(MockGenerator::working(), fixture_fetcher()).await;

    let response = harness.service.export(&pdf_request(&["a2", "a2"])).await;

    assert!(response.is_success());
    let labels = page_labels(&harness.stored_bytes());
    assert_eq!(labels[0].as_deref(), Some("a2-p1"));
    assert_eq!(labels[1].as_deref(), Some("a2-p1"));
}

#[tokio::test]
async fn test_pdfExport_withAllSections_shouldRenderFiveSectionsInOrder() {
    let harness = TestHarness::new(MockGenerator::with_text("A short abstract."), FixtureFetcher::new()).await;
    let mut request = pdf_request(&[]);
    request.options.include_abstract = true;
    request.options.include_toc = true;

    let response = harness.service.export(&request).await;

    assert!(response.is_success());
    let pages = page_texts(&harness.stored_bytes());
    assert_eq!(pages.len(), 5);
    assert_eq!(pages[0][0], "ABSTRACT");
    assert_eq!(pages[1][0], "TABLE OF CONTENTS");
    assert_eq!(pages[1][1..], ["CHAPTER 1: INTRODUCTION", "CHAPTER 2: METHOD"]);
    assert_eq!(pages[2][0], "CHAPTER 1: INTRODUCTION");
    assert_eq!(pages[3][0], "CHAPTER 2: METHOD");
    assert_eq!(pages[4][0], "REFERENCES");
    assert!(pages[4].contains(&"1. Doe, J. (2020). Soil science.".to_string()));
    assert_eq!(harness.generator.request_count(), 1);
}

#[tokio::test]
async fn test_pdfExport_withoutOptionalSections_shouldOmitThem() {
    let harness = TestHarness::new(MockGenerator::working(), FixtureFetcher::new()).await;

    let response = harness.service.export(&pdf_request(&[])).await;

    assert!(response.is_success());
    let pages = page_texts(&harness.stored_bytes());
    let all_text: Vec<&String> = pages.iter().flatten().collect();
    assert!(!all_text.iter().any(|t| t.as_str() == "ABSTRACT"));
    assert!(!all_text.iter().any(|t| t.as_str() == "TABLE OF CONTENTS"));
    assert_eq!(harness.generator.request_count(), 0);
}

#[tokio::test]
async fn test_pdfExport_withPageNumbers_shouldCountBodyPagesOnly() {
    let harness = TestHarness::new(MockGenerator::working(), fixture_fetcher()).await;
    let mut request = pdf_request(&["a1"]);
    request.options.include_page_numbers = true;

    let response = harness.service.export(&request).await;

    assert!(response.is_success());
    let pages = page_texts(&harness.stored_bytes());
    // Attachment pages keep their own content
    assert_eq!(pages[0], vec!["x"]);
    let footers: Vec<&str> = pages[2..].iter().map(|texts| texts.last().unwrap().as_str()).collect();
    assert_eq!(footers, vec!["1", "2", "3"]);
}

#[tokio::test]
async fn test_pdfExport_shouldSubstituteMathAndBullets() {
    let harness = TestHarness::new(MockGenerator::working(), FixtureFetcher::new()).await;

    harness.service.export(&pdf_request(&[])).await;

    let pages = page_texts(&harness.stored_bytes());
    let method: String = pages[1].concat();
    assert!(method.contains("(1/2)"));
    assert!(!method.contains("\\frac"));
    assert!(pages[1].contains(&"• dry season".to_string()));
    assert!(pages[1].contains(&"• wet season".to_string()));
}

#[tokio::test]
async fn test_pdfExport_withSlowFirstAttachment_shouldKeepCallerOrderWithinBound() {
    let fetcher = fixture_fetcher().with_delay("mem://a1", Duration::from_millis(150));
    let harness = TestHarness::new(MockGenerator::working(), fetcher).await;

    let response = harness.service.export(&pdf_request(&["a1", "a2", "a2", "a1", "a2"])).await;

    assert!(response.is_success(), "export failed: {:?}", response);
    let labels: Vec<String> = page_labels(&harness.stored_bytes()).into_iter().flatten().collect();
    assert_eq!(
        labels,
        vec!["a1-p1", "a1-p2", "a2-p1", "a2-p1", "a1-p1", "a1-p2", "a2-p1"]
    );
    assert_eq!(harness.fetcher.requested().len(), 5);
    let limit = Config::default().export.attachment_concurrency;
    assert!(harness.fetcher.max_in_flight() <= limit);
    assert!(harness.fetcher.max_in_flight() > 1, "fetches should overlap");
}
