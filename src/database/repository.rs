/*!
 * Repository layer for database operations.
 *
 * This module provides a high-level API for all database operations,
 * abstracting away the SQL details and providing type-safe access.
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use rusqlite::{params, params_from_iter, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{AttachmentAsset, Chapter, Project, ProjectBundle, Reference};
use super::ProjectStore;

/// Repository for database operations
#[derive(Debug, Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Import Operations
    // =========================================================================

    /// Store a project with all of its children, replacing any previous copy
    pub async fn import_project(&self, bundle: ProjectBundle) -> Result<()> {
        let project_id = bundle.project.id.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.db
            .transaction_async(move |tx| {
                let project = &bundle.project;

                tx.execute("DELETE FROM projects WHERE id = ?1", [&project.id])?;
                tx.execute(
                    r#"
                    INSERT INTO projects (id, title, department, author, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![project.id, project.title, project.department, project.author, now],
                )?;

                for chapter in &bundle.chapters {
                    tx.execute(
                        r#"
                        INSERT INTO chapters (project_id, chapter_number, title, content)
                        VALUES (?1, ?2, ?3, ?4)
                        "#,
                        params![project.id, chapter.chapter_number, chapter.title, chapter.content],
                    )?;
                }

                for reference in &bundle.references {
                    tx.execute(
                        r#"
                        INSERT INTO project_references (project_id, order_number, reference_text)
                        VALUES (?1, ?2, ?3)
                        "#,
                        params![project.id, reference.order_number, reference.reference_text],
                    )?;
                }

                for asset in &bundle.assets {
                    tx.execute(
                        "INSERT OR REPLACE INTO assets (id, project_id, file_url) VALUES (?1, ?2, ?3)",
                        params![asset.id, project.id, asset.file_url],
                    )?;
                }

                Ok(())
            })
            .await
            .with_context(|| format!("Failed to import project {}", project_id))?;

        debug!("Imported project {}", project_id);
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for Repository {
    async fn get_project(&self, project_id: &str) -> Result<Option<Project>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                let result = conn
                    .query_row(
                        "SELECT id, title, department, author FROM projects WHERE id = ?1",
                        [&project_id],
                        |row| {
                            Ok(Project {
                                id: row.get(0)?,
                                title: row.get(1)?,
                                department: row.get(2)?,
                                author: row.get(3)?,
                            })
                        },
                    )
                    .optional()?;

                Ok(result)
            })
            .await
    }

    async fn get_chapters(&self, project_id: &str) -> Result<Vec<Chapter>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT chapter_number, title, content
                    FROM chapters
                    WHERE project_id = ?1
                    ORDER BY chapter_number, id
                    "#,
                )?;

                let chapters = stmt
                    .query_map([&project_id], |row| {
                        Ok(Chapter {
                            chapter_number: row.get(0)?,
                            title: row.get(1)?,
                            content: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(chapters)
            })
            .await
    }

    async fn get_references(&self, project_id: &str) -> Result<Vec<Reference>> {
        let project_id = project_id.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    r#"
                    SELECT order_number, reference_text
                    FROM project_references
                    WHERE project_id = ?1
                    ORDER BY order_number, id
                    "#,
                )?;

                let references = stmt
                    .query_map([&project_id], |row| {
                        Ok(Reference {
                            order_number: row.get(0)?,
                            reference_text: row.get(1)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(references)
            })
            .await
    }

    async fn get_assets(&self, project_id: &str, ids: &[String]) -> Result<Vec<AttachmentAsset>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let project_id = project_id.to_string();
        let ids = ids.to_vec();

        self.db
            .execute_async(move |conn| {
                let placeholders = (0..ids.len())
                    .map(|i| format!("?{}", i + 2))
                    .collect::<Vec<_>>()
                    .join(", ");
                let sql = format!(
                    "SELECT id, project_id, file_url FROM assets WHERE project_id = ?1 AND id IN ({})",
                    placeholders
                );

                let mut stmt = conn.prepare(&sql)?;
                let values = std::iter::once(project_id).chain(ids);
                let assets = stmt
                    .query_map(params_from_iter(values), |row| {
                        Ok(AttachmentAsset {
                            id: row.get(0)?,
                            project_id: row.get(1)?,
                            file_url: row.get(2)?,
                        })
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;

                Ok(assets)
            })
            .await
    }
}
