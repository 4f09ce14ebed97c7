/*!
 * Serialization of rendered pages into a PDF document with lopdf.
 */

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::errors::ExportError;
use crate::export::content::DocumentInfo;
use crate::export::pdf::layout::PageLayout;
use crate::export::pdf::metrics::{encode_run, text_width, FontFace};
use crate::export::pdf::render::{LineRecord, RenderedPage};

/// Producer written into the document information dictionary
const PRODUCER: &str = concat!("chapterpress ", env!("CARGO_PKG_VERSION"));

fn font_dictionary(face: FontFace) -> Dictionary {
    let mut font = dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
    };
    if face.uses_win_ansi() {
        font.set("Encoding", "WinAnsiEncoding");
    }
    font
}

fn line_operations(line: &LineRecord, page_height: f32, operations: &mut Vec<Operation>) {
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tw", vec![line.word_spacing.into()]));
    operations.push(Operation::new("Td", vec![line.x.into(), (page_height - line.y).into()]));

    for run in &line.runs {
        for segment in encode_run(&run.text, run.bold, run.italic) {
            operations.push(Operation::new(
                "Tf",
                vec![segment.face.resource_name().into(), line.size.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(segment.bytes, StringFormat::Literal)],
            ));
        }
    }

    operations.push(Operation::new("ET", vec![]));
}

fn footer_operations(footer: &str, layout: &PageLayout, operations: &mut Vec<Operation>) {
    let size = layout.font_size;
    let x = (layout.page_width - text_width(footer, false, size)) / 2.0;
    operations.push(Operation::new("BT", vec![]));
    operations.push(Operation::new("Tw", vec![0.0f32.into()]));
    operations.push(Operation::new("Td", vec![x.into(), layout.footer_baseline.into()]));
    for segment in encode_run(footer, false, false) {
        operations.push(Operation::new("Tf", vec![segment.face.resource_name().into(), size.into()]));
        operations.push(Operation::new(
            "Tj",
            vec![Object::String(segment.bytes, StringFormat::Literal)],
        ));
    }
    operations.push(Operation::new("ET", vec![]));
}

fn page_content(page: &RenderedPage, layout: &PageLayout) -> Result<Vec<u8>, ExportError> {
    let mut operations = Vec::new();
    for line in &page.lines {
        line_operations(line, layout.page_height, &mut operations);
    }
    if let Some(footer) = &page.footer {
        footer_operations(footer, layout, &mut operations);
    }

    Content { operations }
        .encode()
        .map_err(|e| ExportError::Pdf(format!("Failed to encode page {}: {}", page.number, e)))
}

/// Build a standalone document holding the rendered pages.
///
/// Fonts, resources and the media box live on the page-tree root and are
/// inherited by every page.
pub fn write_pages(pages: &[RenderedPage], layout: &PageLayout) -> Result<Document, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut fonts = Dictionary::new();
    for face in FontFace::ALL {
        let font_id = doc.add_object(font_dictionary(face));
        fonts.set(face.resource_name(), font_id);
    }
    let resources_id = doc.add_object(dictionary! { "Font" => fonts });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), page_content(page, layout)?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                layout.page_width.into(),
                layout.page_height.into(),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// Encode a text string, falling back to UTF-16BE for non-ASCII text
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

/// Attach the information dictionary to a finished document
pub fn set_document_info(doc: &mut Document, info: &DocumentInfo) -> ObjectId {
    let mut dict = dictionary! {
        "Title" => text_string(&info.title),
        "Producer" => text_string(PRODUCER),
        "CreationDate" => text_string(&info.created.format("D:%Y%m%d%H%M%SZ").to_string()),
    };
    if let Some(author) = &info.author {
        dict.set("Author", text_string(author));
    }
    if let Some(subject) = &info.subject {
        dict.set("Subject", text_string(subject));
    }

    let info_id = doc.add_object(dict);
    doc.trailer.set("Info", info_id);
    info_id
}

/// Compress and serialize a document
pub fn save_document(mut doc: Document) -> Result<Vec<u8>, ExportError> {
    doc.compress();
    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ExportError::Pdf(format!("Failed to serialize document: {}", e)))?;
    Ok(bytes)
}
