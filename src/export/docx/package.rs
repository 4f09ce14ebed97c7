/*!
 * WordprocessingML packaging.
 *
 * Writes the minimal OPC package a word processor needs: content types,
 * package and document relationships, styles, core properties and the
 * document body. Every section ends in its own `w:sectPr` of type
 * `nextPage`, the last one as the final child of `w:body`.
 */

use quick_xml::escape::escape;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::ExportError;
use crate::export::content::{Align, DocumentInfo};
use crate::export::docx::model::{Block, Section, StructuredDocument};
use crate::export::inline::StyledRun;
use crate::export::pdf::PageLayout;

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const CONTENT_TYPES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const DOCUMENT_RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Times New Roman" w:hAnsi="Times New Roman" w:cs="Times New Roman"/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:rPrDefault><w:pPrDefault><w:pPr><w:spacing w:after="120" w:line="360" w:lineRule="auto"/></w:pPr></w:pPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="240" w:after="240"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="28"/><w:szCs w:val="28"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:spacing w:before="200" w:after="120"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="24"/><w:szCs w:val="24"/></w:rPr></w:style><w:style w:type="table" w:styleId="TableGrid"><w:name w:val="Table Grid"/><w:tblPr><w:tblBorders><w:top w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:left w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:bottom w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:right w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideH w:val="single" w:sz="4" w:space="0" w:color="auto"/><w:insideV w:val="single" w:sz="4" w:space="0" w:color="auto"/></w:tblBorders></w:tblPr></w:style></w:styles>"#;

/// Points to twentieths of a point
fn twips(points: f32) -> i64 {
    (points * 20.0).round() as i64
}

fn justification(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Justify => "both",
    }
}

fn section_properties(layout: &PageLayout) -> String {
    format!(
        r#"<w:sectPr><w:type w:val="nextPage"/><w:pgSz w:w="{}" w:h="{}"/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#,
        twips(layout.page_width),
        twips(layout.page_height),
        twips(layout.margin_top),
        twips(layout.margin_right),
        twips(layout.margin_bottom),
        twips(layout.margin_left),
    )
}

fn write_run(run: &StyledRun, out: &mut String) {
    out.push_str("<w:r>");
    if run.bold || run.italic {
        out.push_str("<w:rPr>");
        if run.bold {
            out.push_str("<w:b/>");
        }
        if run.italic {
            out.push_str("<w:i/>");
        }
        out.push_str("</w:rPr>");
    }
    out.push_str(r#"<w:t xml:space="preserve">"#);
    out.push_str(&escape(run.text.as_str()));
    out.push_str("</w:t></w:r>");
}

fn write_paragraph(style: Option<&str>, align: Align, runs: &[StyledRun], section_end: Option<&str>, out: &mut String) {
    out.push_str("<w:p><w:pPr>");
    if let Some(style) = style {
        out.push_str(&format!(r#"<w:pStyle w:val="{}"/>"#, style));
    }
    out.push_str(&format!(r#"<w:jc w:val="{}"/>"#, justification(align)));
    if let Some(properties) = section_end {
        out.push_str(properties);
    }
    out.push_str("</w:pPr>");
    for run in runs {
        write_run(run, out);
    }
    out.push_str("</w:p>");
}

fn write_table(rows: &[Vec<Vec<StyledRun>>], layout: &PageLayout, out: &mut String) {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0).max(1);
    let column_width = twips(layout.content_width()) / columns as i64;

    out.push_str(r#"<w:tbl><w:tblPr><w:tblStyle w:val="TableGrid"/><w:tblW w:w="0" w:type="auto"/></w:tblPr><w:tblGrid>"#);
    for _ in 0..columns {
        out.push_str(&format!(r#"<w:gridCol w:w="{}"/>"#, column_width));
    }
    out.push_str("</w:tblGrid>");

    for row in rows {
        out.push_str("<w:tr>");
        for i in 0..columns {
            out.push_str(&format!(r#"<w:tc><w:tcPr><w:tcW w:w="{}" w:type="dxa"/></w:tcPr>"#, column_width));
            // Short rows are padded, a cell always holds one paragraph
            let runs = row.get(i).map(Vec::as_slice).unwrap_or(&[]);
            write_paragraph(None, Align::Left, runs, None, out);
            out.push_str("</w:tc>");
        }
        out.push_str("</w:tr>");
    }
    out.push_str("</w:tbl>");
}

fn write_block(block: &Block, layout: &PageLayout, section_end: Option<&str>, out: &mut String) {
    match block {
        Block::Heading {
            text,
            level,
            align,
            bold,
        } => {
            let style = format!("Heading{}", level);
            let run = StyledRun::new(text.as_str(), *bold, false);
            write_paragraph(Some(&style), *align, std::slice::from_ref(&run), section_end, out);
        }
        Block::Paragraph { runs, align } => write_paragraph(None, *align, runs, section_end, out),
        Block::Table { rows } => write_table(rows, layout, out),
    }
}

fn write_section(section: &Section, layout: &PageLayout, last: bool, out: &mut String) {
    let properties = section_properties(layout);
    let count = section.blocks.len();

    for (i, block) in section.blocks.iter().enumerate() {
        let closes_section = !last && i + 1 == count && !matches!(block, Block::Table { .. });
        let end = if closes_section { Some(properties.as_str()) } else { None };
        write_block(block, layout, end, out);
    }

    // A section ending in a table (or holding nothing) needs a carrier paragraph
    let needs_carrier = matches!(section.blocks.last(), None | Some(Block::Table { .. }));
    if !last && needs_carrier {
        write_paragraph(None, Align::Left, &[], Some(&properties), out);
    }
}

/// Serialize the body part `word/document.xml`
pub fn document_xml(document: &StructuredDocument, layout: &PageLayout) -> String {
    let mut out = String::with_capacity(4096);
    out.push_str(XML_DECLARATION);
    out.push_str(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>"#,
    );

    let count = document.sections.len();
    for (i, section) in document.sections.iter().enumerate() {
        write_section(section, layout, i + 1 == count, &mut out);
    }

    out.push_str(&section_properties(layout));
    out.push_str("</w:body></w:document>");
    out
}

/// Serialize the core properties part `docProps/core.xml`
pub fn core_properties_xml(info: &DocumentInfo) -> String {
    let mut out = String::new();
    out.push_str(XML_DECLARATION);
    out.push_str(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    );
    out.push_str(&format!("<dc:title>{}</dc:title>", escape(info.title.as_str())));
    if let Some(subject) = &info.subject {
        out.push_str(&format!("<dc:subject>{}</dc:subject>", escape(subject.as_str())));
    }
    if let Some(author) = &info.author {
        out.push_str(&format!("<dc:creator>{}</dc:creator>", escape(author.as_str())));
    }
    let created = info.created.format("%Y-%m-%dT%H:%M:%SZ");
    out.push_str(&format!(
        r#"<dcterms:created xsi:type="dcterms:W3CDTF">{0}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{0}</dcterms:modified>"#,
        created
    ));
    out.push_str("</cp:coreProperties>");
    out
}

fn zip_error(e: zip::result::ZipError) -> ExportError {
    ExportError::Docx(format!("Failed to write package: {}", e))
}

/// Write the complete package into memory
pub fn write_package(document: &StructuredDocument, info: &DocumentInfo, layout: &PageLayout) -> Result<Vec<u8>, ExportError> {
    let parts: [(&str, String); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES_XML.to_string()),
        ("_rels/.rels", PACKAGE_RELS_XML.to_string()),
        ("word/document.xml", document_xml(document, layout)),
        ("word/styles.xml", STYLES_XML.to_string()),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS_XML.to_string()),
        ("docProps/core.xml", core_properties_xml(info)),
    ];

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (name, body) in parts {
        zip.start_file(name, deflated).map_err(zip_error)?;
        zip.write_all(body.as_bytes())
            .map_err(|e| ExportError::Docx(format!("Failed to write {}: {}", name, e)))?;
    }

    let cursor = zip.finish().map_err(zip_error)?;
    Ok(cursor.into_inner())
}
