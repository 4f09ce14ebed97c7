/*!
 * Database entity models.
 *
 * These structures map directly to database tables and are also the
 * read-only inputs of an export.
 */

use serde::{Deserialize, Serialize};

/// A report project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier
    pub id: String,
    /// Report title
    pub title: String,
    /// Owning department, written into document metadata
    #[serde(default)]
    pub department: Option<String>,
    /// Author name, written into document metadata
    #[serde(default)]
    pub author: Option<String>,
}

impl Project {
    /// Create a project without metadata
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            department: None,
            author: None,
        }
    }
}

/// One chapter of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number, the sort key of a project's chapters
    pub chapter_number: u32,
    /// Chapter title
    pub title: String,
    /// Chapter body in lightweight Markdown
    #[serde(default)]
    pub content: String,
}

impl Chapter {
    pub fn new(chapter_number: u32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            chapter_number,
            title: title.into(),
            content: content.into(),
        }
    }
}

/// One bibliography entry of a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Position in the reference list
    pub order_number: u32,
    /// Formatted citation text
    pub reference_text: String,
}

impl Reference {
    pub fn new(order_number: u32, reference_text: impl Into<String>) -> Self {
        Self {
            order_number,
            reference_text: reference_text.into(),
        }
    }
}

/// An uploaded document that can be prepended to a paginated export
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentAsset {
    /// Asset identifier referenced by `orderedDocIds`
    pub id: String,
    /// Owning project, filled in on import when omitted
    #[serde(default)]
    pub project_id: String,
    /// Fetchable location of the document bytes
    pub file_url: String,
}

impl AttachmentAsset {
    pub fn new(id: impl Into<String>, project_id: impl Into<String>, file_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            project_id: project_id.into(),
            file_url: file_url.into(),
        }
    }
}

/// A project together with its children, as read from an import file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectBundle {
    /// Project row
    #[serde(flatten)]
    pub project: Project,
    /// Chapters in any order
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    /// References in any order
    #[serde(default)]
    pub references: Vec<Reference>,
    /// Attachment assets
    #[serde(default)]
    pub assets: Vec<AttachmentAsset>,
}
