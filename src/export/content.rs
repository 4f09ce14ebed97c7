/*!
 * Format-neutral report content.
 *
 * `ReportContent` is the immutable bundle handed to a document builder.
 * It decides which sections exist and turns chapter Markdown into blocks,
 * so both formats agree on structure and differ only in presentation.
 */

use chrono::{DateTime, Utc};

use crate::database::{AttachmentAsset, Chapter, Project, Reference};
use crate::export::inline::{parse_runs, NormalizedLine, StyledRun};
use crate::export::markup::{classify_line, strip_images, strip_markup_symbols, LineKind};
use crate::export::request::ExportOptions;

pub const ABSTRACT_HEADING: &str = "ABSTRACT";
pub const CONTENTS_HEADING: &str = "TABLE OF CONTENTS";
pub const REFERENCES_HEADING: &str = "REFERENCES";

/// Horizontal alignment of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Justify,
}

/// Section kinds in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Abstract,
    Contents,
    Chapter(u32),
    References,
}

/// A section scheduled for output together with its source data
#[derive(Debug, Clone, Copy)]
pub enum PlannedSection<'a> {
    Abstract(&'a str),
    Contents,
    Chapter(&'a Chapter),
    References,
}

impl PlannedSection<'_> {
    pub fn kind(&self) -> SectionKind {
        match self {
            Self::Abstract(_) => SectionKind::Abstract,
            Self::Contents => SectionKind::Contents,
            Self::Chapter(chapter) => SectionKind::Chapter(chapter.chapter_number),
            Self::References => SectionKind::References,
        }
    }
}

/// A block of chapter content after line classification
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    /// Bold sub-heading from a `#` line
    SubHeading(NormalizedLine),
    /// Paragraph, list item or quote
    Paragraph(NormalizedLine),
    /// Pipe table, header row first
    Table(Vec<Vec<NormalizedLine>>),
}

/// Document metadata shared by both formats
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentInfo {
    pub title: String,
    pub author: Option<String>,
    /// The owning department
    pub subject: Option<String>,
    pub created: DateTime<Utc>,
}

/// Everything a builder needs to produce one document
#[derive(Debug, Clone)]
pub struct ReportContent {
    pub project: Project,
    /// Sorted by chapter number
    pub chapters: Vec<Chapter>,
    /// Sorted by order number
    pub references: Vec<Reference>,
    /// Trimmed abstract text, present only when it was requested
    pub abstract_text: Option<String>,
    /// Caller's attachment order
    pub ordered_doc_ids: Vec<String>,
    /// Assets found for `ordered_doc_ids`, in store order
    pub assets: Vec<AttachmentAsset>,
    pub created: DateTime<Utc>,
}

impl ReportContent {
    /// Content with no abstract and no attachments
    pub fn new(project: Project, chapters: Vec<Chapter>, references: Vec<Reference>) -> Self {
        Self {
            project,
            chapters,
            references,
            abstract_text: None,
            ordered_doc_ids: Vec::new(),
            assets: Vec::new(),
            created: Utc::now(),
        }
    }

    /// Sections to emit, in order, for the given options
    pub fn section_plan(&self, options: &ExportOptions) -> Vec<PlannedSection<'_>> {
        let mut plan = Vec::with_capacity(self.chapters.len() + 3);

        if options.include_abstract {
            if let Some(text) = self.abstract_text.as_deref() {
                plan.push(PlannedSection::Abstract(text));
            }
        }
        if options.include_toc {
            plan.push(PlannedSection::Contents);
        }
        plan.extend(self.chapters.iter().map(PlannedSection::Chapter));
        if !self.references.is_empty() {
            plan.push(PlannedSection::References);
        }

        plan
    }

    /// One line per chapter for the table of contents
    pub fn toc_lines(&self) -> Vec<String> {
        self.chapters.iter().map(chapter_heading).collect()
    }

    /// `"{n}. text"` for every reference, numbered from 1
    pub fn reference_lines(&self) -> Vec<NormalizedLine> {
        self.references
            .iter()
            .enumerate()
            .map(|(i, reference)| {
                parse_runs(&reference.reference_text, false).with_prefix(&format!("{}. ", i + 1))
            })
            .collect()
    }

    /// Metadata for the document properties
    pub fn document_info(&self) -> DocumentInfo {
        DocumentInfo {
            title: self.project.title.clone(),
            author: self.project.author.clone(),
            subject: self.project.department.clone(),
            created: self.created,
        }
    }
}

/// Upper-cased chapter heading `CHAPTER {n}: {TITLE}`
pub fn chapter_heading(chapter: &Chapter) -> String {
    format!("CHAPTER {}: {}", chapter.chapter_number, chapter.title.trim()).to_uppercase()
}

/// Non-blank paragraphs of an abstract
pub fn abstract_paragraphs(text: &str) -> Vec<NormalizedLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| parse_runs(line, false))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Shallowest `#` level rendered as a bold sub-heading; shallower headings are plain paragraphs
pub const SUB_HEADING_LEVEL: usize = 3;

fn flush_table(rows: &mut Vec<Vec<NormalizedLine>>, blocks: &mut Vec<ContentBlock>) {
    if !rows.is_empty() {
        blocks.push(ContentBlock::Table(std::mem::take(rows)));
    }
}

/// Classify chapter Markdown into blocks. Images are dropped and empty lines produce nothing.
pub fn parse_chapter_content(content: &str) -> Vec<ContentBlock> {
    let content = strip_images(content);
    let mut blocks = Vec::new();
    let mut table: Vec<Vec<NormalizedLine>> = Vec::new();

    for line in content.lines() {
        let block = match classify_line(line) {
            LineKind::TableRow(cells) => {
                table.push(
                    cells
                        .into_iter()
                        .map(|cell| parse_runs(&strip_markup_symbols(cell), false))
                        .collect(),
                );
                continue;
            }
            LineKind::TableSeparator => continue,
            LineKind::Blank => {
                flush_table(&mut table, &mut blocks);
                continue;
            }
            LineKind::Heading { level, text } if level >= SUB_HEADING_LEVEL => {
                ContentBlock::SubHeading(parse_runs(&strip_markup_symbols(text), true))
            }
            LineKind::Heading { text, .. } => ContentBlock::Paragraph(parse_runs(&strip_markup_symbols(text), false)),
            LineKind::Bullet(text) => {
                ContentBlock::Paragraph(parse_runs(&strip_markup_symbols(text), false).with_prefix("• "))
            }
            LineKind::Numbered { number, text } => ContentBlock::Paragraph(
                parse_runs(&strip_markup_symbols(text), false).with_prefix(&format!("{}. ", number)),
            ),
            LineKind::Quote(text) | LineKind::Text(text) => {
                ContentBlock::Paragraph(parse_runs(&strip_markup_symbols(text), false))
            }
        };

        flush_table(&mut table, &mut blocks);
        match &block {
            ContentBlock::SubHeading(line) | ContentBlock::Paragraph(line) if line.is_empty() => {}
            _ => blocks.push(block),
        }
    }

    flush_table(&mut table, &mut blocks);
    blocks
}

/// Join table cells into one line separated by `" | "`
pub fn table_row_line(cells: &[NormalizedLine]) -> NormalizedLine {
    let mut runs = Vec::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            runs.push(StyledRun::plain(" | "));
        }
        runs.extend(cell.runs.iter().cloned());
    }
    NormalizedLine::from_runs(runs)
}
