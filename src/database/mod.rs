/*!
 * Database module for persistent storage of report projects.
 *
 * This module provides SQLite-based persistence for:
 * - Projects with their document metadata
 * - Chapters and references, read back in sort order
 * - Attachment assets referenced by paginated exports
 */

use anyhow::Result;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

pub use connection::DatabaseConnection;
pub use models::{AttachmentAsset, Chapter, Project, ProjectBundle, Reference};
pub use repository::Repository;

/// Read access to the relational store an export draws from
#[async_trait]
pub trait ProjectStore: Send + Sync + Debug {
    /// Load a project, `None` when it does not exist
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>>;

    /// Chapters ordered by chapter number
    async fn get_chapters(&self, project_id: &str) -> Result<Vec<Chapter>>;

    /// References ordered by order number
    async fn get_references(&self, project_id: &str) -> Result<Vec<Reference>>;

    /// Assets of the project whose id is in `ids`, in any order
    async fn get_assets(&self, project_id: &str, ids: &[String]) -> Result<Vec<AttachmentAsset>>;
}
