//! Notebook document repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist whole-document snapshots as JSON under a stable document id.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Saves never regress a document: a snapshot older than the stored
//!   version is ignored.
//! - Read paths reject undecodable persisted state instead of masking it.
//! - `name`/`theory` columns mirror the JSON content for listing only.

use crate::db::migrations::latest_version;
use crate::db::{self, DbError};
use crate::model::document::NotebookModel;
use crate::model::ids::{DocumentId, TheoryId};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(DocumentId),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    Serialization(serde_json::Error),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "document not found: {id}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "document repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::Serialization(err) => write!(f, "document (de)serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted document data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::NotFound(_) | Self::UninitializedConnection { .. } | Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// A persisted document snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub version: u64,
    pub model: NotebookModel,
}

/// Listing row for a persisted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    pub id: DocumentId,
    pub name: String,
    pub theory: Option<TheoryId>,
    pub version: u64,
    /// Unix epoch milliseconds.
    pub updated_at: i64,
}

/// Repository interface for document snapshots.
pub trait DocumentRepository {
    /// Upserts a snapshot. Returns `false` when a newer version is stored.
    fn save_document(&self, id: DocumentId, model: &NotebookModel, version: u64)
        -> RepoResult<bool>;
    fn load_document(&self, id: DocumentId) -> RepoResult<Option<StoredDocument>>;
    /// Most recently updated first.
    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>>;
    fn delete_document(&self, id: DocumentId) -> RepoResult<()>;
}

/// SQLite-backed document repository owning its connection.
pub struct SqliteDocumentRepository {
    conn: Mutex<Connection>,
}

impl SqliteDocumentRepository {
    /// Wraps a connection opened through `db::open_db*`.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a file-backed store with migrations applied.
    pub fn open(path: impl AsRef<std::path::Path>) -> RepoResult<Self> {
        Self::try_new(db::open_db(path)?)
    }

    /// Opens a private in-memory store with migrations applied.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(db::open_db_in_memory()?)
    }
}

impl DocumentRepository for SqliteDocumentRepository {
    fn save_document(
        &self,
        id: DocumentId,
        model: &NotebookModel,
        version: u64,
    ) -> RepoResult<bool> {
        let content = serde_json::to_string(model)?;
        let version = version_to_db(version)?;
        let changed = self.conn.lock().execute(
            "INSERT INTO documents (doc_id, name, theory, content, version)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(doc_id) DO UPDATE SET
                name = excluded.name,
                theory = excluded.theory,
                content = excluded.content,
                version = excluded.version,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE excluded.version >= documents.version;",
            params![
                id.to_string(),
                model.name.as_str(),
                model.theory.as_ref().map(TheoryId::as_str),
                content,
                version,
            ],
        )?;
        Ok(changed > 0)
    }

    fn load_document(&self, id: DocumentId) -> RepoResult<Option<StoredDocument>> {
        let conn = self.conn.lock();
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT content, version FROM documents WHERE doc_id = ?1;",
                [id.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((content, version)) = row else {
            return Ok(None);
        };
        let model: NotebookModel = serde_json::from_str(&content)?;
        Ok(Some(StoredDocument {
            id,
            version: version_from_db(version)?,
            model,
        }))
    }

    fn list_documents(&self) -> RepoResult<Vec<DocumentSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT doc_id, name, theory, version, updated_at
             FROM documents
             ORDER BY updated_at DESC, doc_id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            documents.push(parse_summary_row(row)?);
        }
        Ok(documents)
    }

    fn delete_document(&self, id: DocumentId) -> RepoResult<()> {
        let changed = self
            .conn
            .lock()
            .execute("DELETE FROM documents WHERE doc_id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_summary_row(row: &Row<'_>) -> RepoResult<DocumentSummary> {
    let id_text: String = row.get("doc_id")?;
    let id = id_text.parse::<DocumentId>().map_err(|_| {
        RepoError::InvalidData(format!("invalid document id `{id_text}` in documents.doc_id"))
    })?;
    Ok(DocumentSummary {
        id,
        name: row.get("name")?,
        theory: row.get::<_, Option<String>>("theory")?.map(TheoryId::new),
        version: version_from_db(row.get("version")?)?,
        updated_at: row.get("updated_at")?,
    })
}

fn version_to_db(version: u64) -> RepoResult<i64> {
    i64::try_from(version)
        .map_err(|_| RepoError::InvalidData(format!("document version {version} overflows")))
}

fn version_from_db(version: i64) -> RepoResult<u64> {
    u64::try_from(version)
        .map_err(|_| RepoError::InvalidData(format!("negative document version {version}")))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = db::migrations::current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{DocumentRepository, RepoError, SqliteDocumentRepository};
    use crate::model::document::NotebookModel;
    use crate::model::ids::{DocumentId, TheoryId};
    use rusqlite::Connection;

    #[test]
    fn rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let err = SqliteDocumentRepository::try_new(conn).err().expect("must fail");
        assert!(matches!(
            err,
            RepoError::UninitializedConnection {
                actual_version: 0,
                ..
            }
        ));
    }

    #[test]
    fn save_is_version_guarded() {
        let repo = SqliteDocumentRepository::open_in_memory().unwrap();
        let id = DocumentId::new();

        assert!(repo.save_document(id, &NotebookModel::new("v2"), 2).unwrap());
        assert!(!repo.save_document(id, &NotebookModel::new("v1"), 1).unwrap());

        let stored = repo.load_document(id).unwrap().expect("stored");
        assert_eq!(stored.model.name, "v2");
        assert_eq!(stored.version, 2);
    }

    #[test]
    fn list_mirrors_name_and_theory() {
        let repo = SqliteDocumentRepository::open_in_memory().unwrap();
        let id = DocumentId::new();
        let model = NotebookModel::new("Olog").with_theory(Some(TheoryId::new("simple-olog")));
        repo.save_document(id, &model, 0).unwrap();

        let listed = repo.list_documents().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
        assert_eq!(listed[0].name, "Olog");
        assert_eq!(listed[0].theory, Some(TheoryId::new("simple-olog")));
    }

    #[test]
    fn delete_missing_document_is_not_found() {
        let repo = SqliteDocumentRepository::open_in_memory().unwrap();
        let id = DocumentId::new();
        assert!(matches!(repo.delete_document(id), Err(RepoError::NotFound(missing)) if missing == id));
        assert!(repo.load_document(id).unwrap().is_none());
    }
}
