/*!
 * Tests for the pagination state machine and body rendering
 */

use chapterpress::database::{Chapter, Project, Reference};
use chapterpress::export::content::{Align, ReportContent};
use chapterpress::export::inline::{NormalizedLine, StyledRun};
use chapterpress::export::pdf::metrics::text_width;
use chapterpress::export::pdf::render::{wrap_text, LineRecord};
use chapterpress::export::pdf::{render_body, PageLayout, PageRenderer, RenderedPage};
use chapterpress::export::ExportOptions;

fn line_width(line: &LineRecord, size: f32) -> f32 {
    line.runs.iter().map(|r| text_width(&r.text, r.bold, size)).sum()
}

fn assert_within_page(pages: &[RenderedPage], layout: &PageLayout) {
    for page in pages {
        for line in &page.lines {
            let top = line.y - line.size;
            assert!(top >= layout.margin_top - 1e-3, "line above top margin on page {}", page.number);
            assert!(
                top + layout.line_height(line.size) <= layout.bottom_limit() + 1e-3,
                "line crosses bottom margin on page {}",
                page.number
            );
            assert!(line.x >= layout.margin_left - 1e-3);
        }
    }
}

fn long_report(layout_chapters: usize) -> ReportContent {
    let paragraph = "The field survey measured runoff, sediment load and crop cover across every plot. ".repeat(12);
    let chapters = (1..=layout_chapters as u32)
        .map(|n| {
            let body = format!(
                "### Section {n}\n{p}\n\n- first item {p}\n1. numbered {p}\n| a | b |\n|---|---|\n| 1 | 2 |\n\n{p}",
                n = n,
                p = paragraph
            );
            Chapter::new(n, format!("Chapter title {}", n), body)
        })
        .collect();
    let references = (1..=40).map(|n| Reference::new(n, format!("Author {} (2020). Title.", n))).collect();
    ReportContent::new(Project::new("p", "Long report"), chapters, references)
}

#[test]
fn test_renderBody_withLongReport_shouldKeepEveryLineInsideMargins() {
    let layout = PageLayout::default();
    let options = ExportOptions {
        include_abstract: false,
        include_toc: true,
        include_page_numbers: true,
    };

    let pages = render_body(&long_report(6), &options, &layout);

    assert!(pages.len() > 8);
    assert_within_page(&pages, &layout);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(page.footer.as_deref(), Some((i + 1).to_string().as_str()));
        assert!(!page.lines.is_empty(), "page {} is blank", page.number);
    }
}

#[test]
fn test_renderBody_withSmallPage_shouldStillFitLines() {
    let layout = PageLayout {
        page_width: 300.0,
        page_height: 300.0,
        margin_top: 30.0,
        margin_bottom: 30.0,
        margin_left: 30.0,
        margin_right: 30.0,
        ..PageLayout::default()
    };

    let pages = render_body(&long_report(2), &ExportOptions::default(), &layout);

    assert_within_page(&pages, &layout);
    let max_width = layout.content_width();
    for page in &pages {
        for line in &page.lines {
            // Word spacing is excluded from the natural width
            assert!(line_width(line, line.size) <= max_width + 0.05, "line too wide: {:?}", line.runs);
        }
    }
}

#[test]
fn test_renderer_withSectionBreaks_shouldNeverEmitEmptyPages() {
    let layout = PageLayout::default();
    let mut renderer = PageRenderer::new(&layout, false);

    renderer.emit_section_break();
    renderer.emit_paragraph(&NormalizedLine::from_runs(vec![StyledRun::plain("one")]), 11.0, Align::Left);
    renderer.emit_section_break();
    renderer.emit_section_break();
    renderer.emit_gap(20.0);
    renderer.emit_paragraph(&NormalizedLine::from_runs(vec![StyledRun::plain("two")]), 11.0, Align::Left);

    let pages = renderer.finish();

    assert_eq!(pages.len(), 2);
    assert!(pages.iter().all(|p| p.lines.len() == 1));
    // The gap at the top of page two was dropped
    assert_eq!(pages[1].lines[0].y, pages[0].lines[0].y);
}

#[test]
fn test_wrapText_shouldNeverSplitWords() {
    let text = "antidisestablishmentarianism is a long word in a narrow column";

    let lines = wrap_text(text, false, 11.0, 60.0);

    let rebuilt: Vec<String> = lines
        .iter()
        .map(|l| l.runs.iter().map(|r| r.text.as_str()).collect::<String>())
        .collect();
    assert_eq!(rebuilt.join(" "), text);
    assert_eq!(rebuilt[0], "antidisestablishmentarianism");
}
