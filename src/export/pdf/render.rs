/*!
 * Pagination state machine for the paginated format.
 *
 * `PageRenderer` owns the cursor and the list of closed pages. It is a
 * per-export value passed by `&mut`, so pagination can be tested without
 * producing any PDF bytes.
 */

use crate::export::content::{
    abstract_paragraphs, chapter_heading, parse_chapter_content, table_row_line, Align, ContentBlock,
    PlannedSection, ReportContent, ABSTRACT_HEADING, CONTENTS_HEADING, REFERENCES_HEADING,
};
use crate::export::inline::{NormalizedLine, StyledRun};
use crate::export::pdf::layout::PageLayout;
use crate::export::pdf::metrics::text_width;
use crate::export::request::ExportOptions;

/// Tolerance for float comparisons against the line width
const WIDTH_EPSILON: f32 = 0.01;

/// One wrapped line before placement
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub runs: Vec<StyledRun>,
    /// Natural width at the size it was wrapped for
    pub width: f32,
    /// Number of inter-word spaces, used for justification
    pub spaces: usize,
}

/// A line placed on a page. `y` is the baseline measured from the top edge.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRecord {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub runs: Vec<StyledRun>,
    /// Extra space added to every space character
    pub word_spacing: f32,
}

/// A closed page of the rendered body
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPage {
    /// 1-based ordinal within the rendered body
    pub number: u32,
    pub lines: Vec<LineRecord>,
    /// Page-number text, when page numbers are enabled
    pub footer: Option<String>,
}

/// Explicit pagination state
#[derive(Debug)]
pub struct PageRenderer<'a> {
    layout: &'a PageLayout,
    number_pages: bool,
    cursor_y: f32,
    page_number: u32,
    current: Vec<LineRecord>,
    pages: Vec<RenderedPage>,
}

impl<'a> PageRenderer<'a> {
    pub fn new(layout: &'a PageLayout, number_pages: bool) -> Self {
        Self {
            layout,
            number_pages,
            cursor_y: layout.margin_top,
            page_number: 0,
            current: Vec::new(),
            pages: Vec::new(),
        }
    }

    /// Top of the next line, measured from the top edge
    pub fn cursor_y(&self) -> f32 {
        self.cursor_y
    }

    /// Pages closed so far
    pub fn pages(&self) -> &[RenderedPage] {
        &self.pages
    }

    fn close_page(&mut self) {
        if self.current.is_empty() {
            self.cursor_y = self.layout.margin_top;
            return;
        }

        self.page_number += 1;
        let footer = self.number_pages.then(|| self.page_number.to_string());
        self.pages.push(RenderedPage {
            number: self.page_number,
            lines: std::mem::take(&mut self.current),
            footer,
        });
        self.cursor_y = self.layout.margin_top;
    }

    /// Place one line, closing the page first when it would cross the bottom margin
    pub fn emit_line(&mut self, line: TextLine, size: f32, align: Align) {
        let line_height = self.layout.line_height(size);
        if self.cursor_y + line_height > self.layout.bottom_limit() {
            self.close_page();
        }

        let free = (self.layout.content_width() - line.width).max(0.0);
        let (x, word_spacing) = match align {
            Align::Left => (self.layout.margin_left, 0.0),
            Align::Center => (self.layout.margin_left + free / 2.0, 0.0),
            Align::Justify if line.spaces > 0 => (self.layout.margin_left, free / line.spaces as f32),
            Align::Justify => (self.layout.margin_left, 0.0),
        };

        self.current.push(LineRecord {
            x,
            y: self.cursor_y + size,
            size,
            runs: line.runs,
            word_spacing,
        });
        self.cursor_y += line_height;
    }

    /// Vertical spacing. Ignored at the top of a page; closes the page when it would overflow.
    pub fn emit_gap(&mut self, height: f32) {
        if self.current.is_empty() {
            return;
        }
        if self.cursor_y + height > self.layout.bottom_limit() {
            self.close_page();
        } else {
            self.cursor_y += height;
        }
    }

    /// Start the next section on a fresh page. Never emits an empty page.
    pub fn emit_section_break(&mut self) {
        self.close_page();
    }

    /// Wrap and place a paragraph. Justified paragraphs keep their last line flush left.
    pub fn emit_paragraph(&mut self, line: &NormalizedLine, size: f32, align: Align) {
        let wrapped = wrap_runs(&line.runs, size, self.layout.content_width());
        let count = wrapped.len();
        for (i, text_line) in wrapped.into_iter().enumerate() {
            let effective = match align {
                Align::Justify if i + 1 == count => Align::Left,
                other => other,
            };
            self.emit_line(text_line, size, effective);
        }
    }

    /// Close the last page and return every page. An empty body still yields one page.
    pub fn finish(mut self) -> Vec<RenderedPage> {
        self.close_page();
        if self.pages.is_empty() {
            self.pages.push(RenderedPage {
                number: 1,
                lines: Vec::new(),
                footer: self.number_pages.then(|| "1".to_string()),
            });
        }
        self.pages
    }
}

/// A word made of one or more styled pieces
#[derive(Debug, Default)]
struct Word {
    pieces: Vec<StyledRun>,
    /// Bold flag of the whitespace that preceded the word
    space_bold: bool,
}

fn split_words(runs: &[StyledRun]) -> Vec<Word> {
    let mut words: Vec<Word> = Vec::new();
    let mut current = Word::default();
    let mut pending_space_bold = false;

    for run in runs {
        let mut piece = String::new();
        for c in run.text.chars() {
            if c.is_whitespace() {
                if !piece.is_empty() {
                    current.pieces.push(StyledRun::new(std::mem::take(&mut piece), run.bold, run.italic));
                }
                if !current.pieces.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
                pending_space_bold = run.bold;
            } else {
                if current.pieces.is_empty() && piece.is_empty() {
                    current.space_bold = pending_space_bold;
                }
                piece.push(c);
            }
        }
        if !piece.is_empty() {
            current.pieces.push(StyledRun::new(piece, run.bold, run.italic));
        }
    }

    if !current.pieces.is_empty() {
        words.push(current);
    }
    words
}

fn pieces_width(pieces: &[StyledRun], size: f32) -> f32 {
    pieces.iter().map(|p| text_width(&p.text, p.bold, size)).sum()
}

fn finish_line(parts: Vec<StyledRun>, width: f32, spaces: usize) -> TextLine {
    TextLine {
        runs: NormalizedLine::from_runs(parts).runs,
        width,
        spaces,
    }
}

/// Break styled runs into lines no wider than `max_width` at word boundaries.
///
/// Runs of whitespace collapse to one space. A word wider than the line is
/// placed alone on its own line and never split.
pub fn wrap_runs(runs: &[StyledRun], size: f32, max_width: f32) -> Vec<TextLine> {
    let mut lines = Vec::new();
    let mut parts: Vec<StyledRun> = Vec::new();
    let mut width = 0.0;
    let mut spaces = 0;

    for word in split_words(runs) {
        let word_width = pieces_width(&word.pieces, size);

        if parts.is_empty() {
            width = word_width;
            parts.extend(word.pieces);
            continue;
        }

        let space_width = text_width(" ", word.space_bold, size);
        if width + space_width + word_width <= max_width + WIDTH_EPSILON {
            let italic = parts.last().is_some_and(|p| p.italic) && word.pieces.first().is_some_and(|p| p.italic);
            parts.push(StyledRun::new(" ", word.space_bold, italic));
            parts.extend(word.pieces);
            width += space_width + word_width;
            spaces += 1;
        } else {
            lines.push(finish_line(std::mem::take(&mut parts), width, spaces));
            width = word_width;
            spaces = 0;
            parts.extend(word.pieces);
        }
    }

    if !parts.is_empty() {
        lines.push(finish_line(parts, width, spaces));
    }
    lines
}

/// Wrap a single-style string
pub fn wrap_text(text: &str, bold: bool, size: f32, max_width: f32) -> Vec<TextLine> {
    wrap_runs(&[StyledRun::new(text, bold, false)], size, max_width)
}

fn emit_section_heading(renderer: &mut PageRenderer<'_>, layout: &PageLayout, text: &str) {
    for line in wrap_text(text, true, layout.heading_size, layout.content_width()) {
        renderer.emit_line(line, layout.heading_size, Align::Center);
    }
    renderer.emit_gap(layout.line_height(layout.font_size));
}

/// Paginate the body sections of a report
pub fn render_body(content: &ReportContent, options: &ExportOptions, layout: &PageLayout) -> Vec<RenderedPage> {
    let mut renderer = PageRenderer::new(layout, options.include_page_numbers);
    let body = layout.font_size;
    let paragraph_gap = layout.line_height(body) * 0.5;

    for section in content.section_plan(options) {
        match section {
            PlannedSection::Abstract(text) => {
                emit_section_heading(&mut renderer, layout, ABSTRACT_HEADING);
                for paragraph in abstract_paragraphs(text) {
                    renderer.emit_paragraph(&paragraph, body, Align::Justify);
                    renderer.emit_gap(paragraph_gap);
                }
            }
            PlannedSection::Contents => {
                emit_section_heading(&mut renderer, layout, CONTENTS_HEADING);
                for entry in content.toc_lines() {
                    let line = NormalizedLine::from_runs(vec![StyledRun::plain(entry)]);
                    renderer.emit_paragraph(&line, body, Align::Left);
                }
            }
            PlannedSection::Chapter(chapter) => {
                emit_section_heading(&mut renderer, layout, &chapter_heading(chapter));
                for block in parse_chapter_content(&chapter.content) {
                    match block {
                        ContentBlock::SubHeading(line) => {
                            renderer.emit_paragraph(&line, body, Align::Left);
                        }
                        ContentBlock::Paragraph(line) => {
                            renderer.emit_paragraph(&line, body, Align::Justify);
                        }
                        ContentBlock::Table(rows) => {
                            for row in rows {
                                renderer.emit_paragraph(&table_row_line(&row), body, Align::Left);
                            }
                        }
                    }
                    renderer.emit_gap(paragraph_gap);
                }
            }
            PlannedSection::References => {
                emit_section_heading(&mut renderer, layout, REFERENCES_HEADING);
                for line in content.reference_lines() {
                    renderer.emit_paragraph(&line, body, Align::Left);
                    renderer.emit_gap(paragraph_gap);
                }
            }
        }
        renderer.emit_section_break();
    }

    renderer.finish()
}
