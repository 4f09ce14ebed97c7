/*!
 * End-to-end tests of the structured format
 */

use std::io::{Cursor, Read};

use chapterpress::export::{ExportFormat, ExportRequest};
use chapterpress::providers::mock::MockGenerator;

use crate::common::mock_collaborators::FixtureFetcher;
use crate::common::{labeled_pdf, TestHarness};

/// Read one part of a stored package
fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("output should be a zip archive");
    let mut part = String::new();
    archive
        .by_name(name)
        .expect("part should exist")
        .read_to_string(&mut part)
        .expect("part should be UTF-8");
    part
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("{:?} not found in document", needle))
}

#[tokio::test]
async fn test_docxExport_withAllSections_shouldEmitFiveNativeSectionsInOrder() {
    let harness = TestHarness::new(
        MockGenerator::with_text("First abstract paragraph.\n\nSecond abstract paragraph."),
        FixtureFetcher::new(),
    )
    .await;
    let mut request = ExportRequest::new("p1", ExportFormat::Docx);
    request.options.include_abstract = true;
    request.options.include_toc = true;

    let response = harness.service.export(&request).await;

    assert!(response.is_success(), "export failed: {:?}", response);
    let document = read_part(&harness.stored_bytes(), "word/document.xml");

    assert_eq!(document.matches("<w:sectPr>").count(), 5);
    assert_eq!(document.matches(r#"<w:type w:val="nextPage"/>"#).count(), 5);

    let headings = [
        ">ABSTRACT<",
        ">TABLE OF CONTENTS<",
        ">CHAPTER 1: INTRODUCTION<",
        ">CHAPTER 2: METHOD<",
        ">REFERENCES<",
    ];
    let positions: Vec<usize> = headings
        .iter()
        .map(|heading| document.rfind(heading).expect("heading should be present"))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "positions: {:?}", positions);

    assert!(document.contains("Second abstract paragraph."));
    assert!(position(&document, "1. Doe, J. (2020). Soil science.") < position(&document, "2. Roe, R. (2021). Field methods."));
}

#[tokio::test]
async fn test_docxExport_shouldKeepRunStylesAndSubHeadings() {
    let harness = TestHarness::new(MockGenerator::working(), FixtureFetcher::new()).await;

    let response = harness.service.export(&ExportRequest::new("p1", ExportFormat::Docx)).await;

    assert!(response.is_success());
    let document = read_part(&harness.stored_bytes(), "word/document.xml");

    assert!(document.contains(r#"<w:rPr><w:b/></w:rPr><w:t xml:space="preserve">serious</w:t>"#));
    assert!(document.contains(r#"<w:rPr><w:i/></w:rPr><w:t xml:space="preserve">yield</w:t>"#));
    assert!(document.contains(r#"<w:pStyle w:val="Heading2"/>"#));
    assert!(document.contains("(1/2)"));
    assert!(!document.contains("**"));
    assert!(!document.contains("<w:br"));
    assert!(!document.contains(">ABSTRACT<"));
    assert!(!document.contains(">TABLE OF CONTENTS<"));
}

#[tokio::test]
async fn test_docxExport_shouldIgnoreAttachments() {
    let fetcher = FixtureFetcher::serving(vec![("mem://a1", labeled_pdf(&["a1-p1"]))]);
    let harness = TestHarness::new(MockGenerator::working(), fetcher).await;
    let mut request = ExportRequest::new("p1", ExportFormat::Docx);
    request.ordered_doc_ids = vec!["a1".to_string()];

    let response = harness.service.export(&request).await;

    assert!(response.is_success());
    assert!(harness.fetcher.requested().is_empty());
}

#[tokio::test]
async fn test_docxExport_shouldWriteMetadataAndContentType() {
    let harness = TestHarness::new(MockGenerator::working(), FixtureFetcher::new()).await;

    let response = harness.service.export(&ExportRequest::new("p1", ExportFormat::Docx)).await;

    let objects = harness.storage.objects();
    assert_eq!(
        objects[0].content_type,
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
    );
    assert!(objects[0].key.starts_with("p1/Soil_Erosion_in_Upland_Farms_"));
    assert!(response.file_url().unwrap().ends_with(".docx"));

    let core = read_part(&objects[0].bytes, "docProps/core.xml");
    assert!(core.contains("<dc:title>Soil Erosion in Upland Farms</dc:title>"));
    assert!(core.contains("<dc:creator>R. Diaz</dc:creator>"));
    assert!(core.contains("<dc:subject>Agronomy</dc:subject>"));
}
