/*!
 * Section and block model of the structured format.
 *
 * The model carries structure only. Pagination is left to the word
 * processor, every section simply starts on a new page.
 */

use crate::export::content::{
    abstract_paragraphs, chapter_heading, parse_chapter_content, Align, ContentBlock, PlannedSection, ReportContent,
    SectionKind, ABSTRACT_HEADING, CONTENTS_HEADING, REFERENCES_HEADING,
};
use crate::export::inline::{NormalizedLine, StyledRun};
use crate::export::request::ExportOptions;

/// A block inside a section
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        text: String,
        /// 1 for section headings, 2 for sub-headings
        level: u8,
        align: Align,
        bold: bool,
    },
    Paragraph {
        runs: Vec<StyledRun>,
        align: Align,
    },
    /// Rows of cells, each cell a list of runs
    Table { rows: Vec<Vec<Vec<StyledRun>>> },
}

impl Block {
    fn section_heading(text: impl Into<String>) -> Self {
        Block::Heading {
            text: text.into(),
            level: 1,
            align: Align::Center,
            bold: true,
        }
    }

    fn paragraph(line: NormalizedLine, align: Align) -> Self {
        Block::Paragraph { runs: line.runs, align }
    }
}

/// One native section of the output document
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub blocks: Vec<Block>,
}

/// The whole document as an ordered list of sections
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredDocument {
    pub sections: Vec<Section>,
}

impl StructuredDocument {
    pub fn section_kinds(&self) -> Vec<SectionKind> {
        self.sections.iter().map(|s| s.kind).collect()
    }
}

fn chapter_blocks(content: &str) -> impl Iterator<Item = Block> + '_ {
    parse_chapter_content(content).into_iter().map(|block| match block {
        ContentBlock::SubHeading(line) => Block::Heading {
            text: line.plain,
            level: 2,
            align: Align::Left,
            bold: true,
        },
        ContentBlock::Paragraph(line) => Block::paragraph(line, Align::Justify),
        ContentBlock::Table(rows) => Block::Table {
            rows: rows
                .into_iter()
                .map(|cells| cells.into_iter().map(|cell| cell.runs).collect())
                .collect(),
        },
    })
}

/// Lay out the report as sections, gated by the export options
pub fn build_sections(content: &ReportContent, options: &ExportOptions) -> StructuredDocument {
    let sections = content
        .section_plan(options)
        .into_iter()
        .map(|planned| {
            let mut blocks = Vec::new();
            match planned {
                PlannedSection::Abstract(text) => {
                    blocks.push(Block::section_heading(ABSTRACT_HEADING));
                    blocks.extend(
                        abstract_paragraphs(text)
                            .into_iter()
                            .map(|line| Block::paragraph(line, Align::Justify)),
                    );
                }
                PlannedSection::Contents => {
                    blocks.push(Block::section_heading(CONTENTS_HEADING));
                    blocks.extend(content.toc_lines().into_iter().map(|line| Block::Paragraph {
                        runs: vec![StyledRun::plain(line)],
                        align: Align::Left,
                    }));
                }
                PlannedSection::Chapter(chapter) => {
                    blocks.push(Block::section_heading(chapter_heading(chapter)));
                    blocks.extend(chapter_blocks(&chapter.content));
                }
                PlannedSection::References => {
                    blocks.push(Block::section_heading(REFERENCES_HEADING));
                    blocks.extend(
                        content
                            .reference_lines()
                            .into_iter()
                            .map(|line| Block::paragraph(line, Align::Left)),
                    );
                }
            }
            Section {
                kind: planned.kind(),
                blocks,
            }
        })
        .collect();

    StructuredDocument { sections }
}
