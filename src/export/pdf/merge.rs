/*!
 * Binary merge engine for the paginated format.
 *
 * Attachments are fetched concurrently but joined in caller order, decoded
 * with lopdf and merged page by page in front of the rendered body. A single
 * failing attachment is logged and skipped, never fatal.
 */

use futures::stream::{self, StreamExt};
use log::{debug, warn};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap};

use crate::database::AttachmentAsset;
use crate::errors::{AttachmentError, ExportError};
use crate::export::fetch::AttachmentFetcher;

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Outcome of loading the attachments of one export
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Attachments scheduled after id resolution
    pub requested: usize,
    /// Attachments decoded successfully
    pub merged: usize,
    /// Attachments skipped, with the reason
    pub failures: Vec<(String, AttachmentError)>,
}

impl MergeReport {
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// Map the caller's id order onto known assets.
///
/// Unknown ids are dropped with a warning. Repeated ids are kept.
pub fn resolve_attachments<'a>(ordered_ids: &[String], assets: &'a [AttachmentAsset]) -> Vec<&'a AttachmentAsset> {
    let by_id: HashMap<&str, &AttachmentAsset> = assets.iter().map(|a| (a.id.as_str(), a)).collect();

    ordered_ids
        .iter()
        .filter_map(|id| {
            let asset = by_id.get(id.as_str()).copied();
            if asset.is_none() {
                warn!("Attachment {} not found, skipping", id);
            }
            asset
        })
        .collect()
}

/// Decode fetched bytes into a document with at least one page
pub fn decode_attachment(bytes: &[u8]) -> Result<Document, AttachmentError> {
    let doc = Document::load_mem(bytes).map_err(|e| AttachmentError::Decode(e.to_string()))?;

    if doc.is_encrypted() {
        return Err(AttachmentError::Decode("document is encrypted".to_string()));
    }
    if doc.get_pages().is_empty() {
        return Err(AttachmentError::Empty);
    }

    Ok(doc)
}

/// Fetch and decode attachments with at most `concurrency` downloads in flight.
///
/// The returned documents keep the order of `attachments`.
pub async fn load_attachments(
    fetcher: &dyn AttachmentFetcher,
    attachments: &[&AttachmentAsset],
    concurrency: usize,
) -> (Vec<Document>, MergeReport) {
    let items: Vec<(String, String)> = attachments
        .iter()
        .map(|asset| (asset.id.clone(), asset.file_url.clone()))
        .collect();

    let results: Vec<(String, Result<Document, AttachmentError>)> = stream::iter(items)
        .map(|(id, url)| async move {
            let result = match fetcher.fetch(&url).await {
                Ok(bytes) => decode_attachment(&bytes),
                Err(e) => Err(e),
            };
            (id, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut report = MergeReport {
        requested: attachments.len(),
        ..MergeReport::default()
    };
    let mut documents = Vec::with_capacity(results.len());

    for (id, result) in results {
        match result {
            Ok(doc) => {
                debug!("Attachment {} decoded with {} pages", id, doc.get_pages().len());
                report.merged += 1;
                documents.push(doc);
            }
            Err(e) => {
                warn!("Skipping attachment {}: {}", id, e);
                report.failures.push((id, e));
            }
        }
    }

    (documents, report)
}

fn dictionary_type(object: &Object) -> Option<&[u8]> {
    let dict = match object {
        Object::Dictionary(dict) => dict,
        Object::Stream(stream) => &stream.dict,
        _ => return None,
    };
    dict.get(b"Type").and_then(Object::as_name).ok()
}

fn parent_dictionary<'a>(doc: &'a Document, dict: &Dictionary) -> Option<&'a Dictionary> {
    let parent_id = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    doc.get_dictionary(parent_id).ok()
}

/// Copy attributes the page inherits from the page tree onto the page itself
fn flatten_inherited(doc: &Document, page: &mut Dictionary) {
    for key in INHERITABLE_KEYS {
        if page.has(key) {
            continue;
        }

        // Bounded walk up the tree in case of a cyclic Parent chain
        let mut ancestor = parent_dictionary(doc, page);
        let mut depth = 0;
        while let Some(node) = ancestor {
            if let Ok(value) = node.get(key) {
                page.set(key.to_vec(), value.clone());
                break;
            }
            depth += 1;
            if depth > 64 {
                break;
            }
            ancestor = parent_dictionary(doc, node);
        }
    }
}

/// Merge documents into one, keeping document order and each document's page order.
pub fn merge_documents(documents: Vec<Document>) -> Result<Document, ExportError> {
    let mut max_id = 1;
    let mut pages: Vec<(ObjectId, Dictionary)> = Vec::new();
    let mut objects: BTreeMap<ObjectId, Object> = BTreeMap::new();

    for mut doc in documents {
        doc.renumber_objects_with(max_id);
        max_id = doc.max_id + 1;

        for page_id in doc.get_pages().into_values() {
            let mut page = doc
                .get_dictionary(page_id)
                .map_err(|e| ExportError::Pdf(format!("Unreadable page {:?}: {}", page_id, e)))?
                .clone();
            flatten_inherited(&doc, &mut page);
            pages.push((page_id, page));
        }

        for (id, object) in doc.objects {
            match dictionary_type(&object) {
                Some(b"Catalog") | Some(b"Pages") | Some(b"Page") | Some(b"Outlines") | Some(b"Outline") => {}
                _ => {
                    objects.insert(id, object);
                }
            }
        }
    }

    if pages.is_empty() {
        return Err(ExportError::Pdf("No pages to merge".to_string()));
    }

    let mut output = Document::with_version("1.5");
    output.max_id = max_id;
    output.objects = objects;

    let pages_id = output.new_object_id();
    let mut kids = Vec::with_capacity(pages.len());
    for (page_id, mut page) in pages {
        page.set("Parent", pages_id);
        output.objects.insert(page_id, Object::Dictionary(page));
        kids.push(Object::Reference(page_id));
    }

    let mut tree = Dictionary::new();
    tree.set("Type", "Pages");
    tree.set("Count", kids.len() as i64);
    tree.set("Kids", kids);
    output.objects.insert(pages_id, Object::Dictionary(tree));

    let mut catalog = Dictionary::new();
    catalog.set("Type", "Catalog");
    catalog.set("Pages", pages_id);
    let catalog_id = output.add_object(catalog);
    output.trailer.set("Root", catalog_id);

    Ok(output)
}
