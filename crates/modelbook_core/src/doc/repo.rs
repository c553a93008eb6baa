//! Registry of open documents with write-through persistence.
//!
//! # Responsibility
//! - Hand out one shared `DocHandle` per open document id.
//! - Persist every published snapshot through a `DocumentRepository`.
//!
//! # Invariants
//! - At most one live handle per document id inside one `DocRepo`.
//! - Persistence failures are logged and never roll back a published
//!   snapshot; the next successful save catches the store up.

use crate::doc::handle::{DocHandle, Subscription};
use crate::model::document::NotebookModel;
use crate::model::ids::DocumentId;
use crate::repo::document_repo::{DocumentRepository, DocumentSummary, RepoError};
use log::{debug, error, info};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub type DocResult<T> = Result<T, DocError>;

/// Error for document lookup and lifecycle operations.
#[derive(Debug)]
pub enum DocError {
    Repo(RepoError),
    NotFound(DocumentId),
}

impl Display for DocError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "document not found: {id}"),
        }
    }
}

impl Error for DocError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::NotFound(_) => None,
        }
    }
}

impl From<RepoError> for DocError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            other => Self::Repo(other),
        }
    }
}

struct OpenDoc {
    handle: DocHandle,
    _persist: Subscription,
}

/// Opens, creates and tracks documents backed by a repository.
pub struct DocRepo<R> {
    store: Arc<R>,
    open: Mutex<BTreeMap<DocumentId, OpenDoc>>,
}

impl<R> DocRepo<R>
where
    R: DocumentRepository + Send + Sync + 'static,
{
    pub fn new(store: R) -> Self {
        Self {
            store: Arc::new(store),
            open: Mutex::new(BTreeMap::new()),
        }
    }

    /// Creates and persists a new document, returning its live handle.
    pub fn create(&self, init: NotebookModel) -> DocResult<DocHandle> {
        let id = DocumentId::new();
        self.store.save_document(id, &init, 0)?;
        info!("event=doc_create module=doc status=ok doc_id={id}");
        Ok(self.attach(DocHandle::new(id, init)))
    }

    /// Returns the live handle for `id`, loading it from the store if needed.
    pub fn open(&self, id: DocumentId) -> DocResult<DocHandle> {
        if let Some(open) = self.open.lock().get(&id) {
            return Ok(open.handle.clone());
        }
        let stored = self.store.load_document(id)?.ok_or(DocError::NotFound(id))?;
        info!(
            "event=doc_open module=doc status=ok doc_id={id} version={}",
            stored.version
        );
        Ok(self.attach(DocHandle::with_version(id, stored.model, stored.version)))
    }

    /// Stops tracking `id`. Outstanding handle clones stay usable but are no
    /// longer persisted.
    pub fn close(&self, id: DocumentId) -> bool {
        self.open.lock().remove(&id).is_some()
    }

    pub fn is_open(&self, id: DocumentId) -> bool {
        self.open.lock().contains_key(&id)
    }

    pub fn list(&self) -> DocResult<Vec<DocumentSummary>> {
        Ok(self.store.list_documents()?)
    }

    /// Closes and deletes `id` from the store.
    pub fn delete(&self, id: DocumentId) -> DocResult<()> {
        self.close(id);
        self.store.delete_document(id)?;
        info!("event=doc_delete module=doc status=ok doc_id={id}");
        Ok(())
    }

    fn attach(&self, handle: DocHandle) -> DocHandle {
        let mut open = self.open.lock();
        if let Some(existing) = open.get(&handle.id()) {
            return existing.handle.clone();
        }
        let store = Arc::clone(&self.store);
        let persist = handle.subscribe(move |event| {
            match store.save_document(event.doc_id, &event.current, event.version) {
                Ok(true) => {}
                Ok(false) => debug!(
                    "event=doc_persist module=doc status=skip reason=stale_version doc_id={} version={}",
                    event.doc_id, event.version
                ),
                Err(err) => error!(
                    "event=doc_persist module=doc status=error doc_id={} version={} error={}",
                    event.doc_id, event.version, err
                ),
            }
        });
        open.insert(
            handle.id(),
            OpenDoc {
                handle: handle.clone(),
                _persist: persist,
            },
        );
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::{DocError, DocRepo};
    use crate::model::document::NotebookModel;
    use crate::model::ids::DocumentId;
    use crate::repo::document_repo::SqliteDocumentRepository;

    fn repo() -> DocRepo<SqliteDocumentRepository> {
        DocRepo::new(SqliteDocumentRepository::open_in_memory().unwrap())
    }

    #[test]
    fn changes_are_written_through() {
        let docs = repo();
        let handle = docs.create(NotebookModel::new("draft")).unwrap();
        handle.change(|model| model.name = "final".to_string());

        let listed = docs.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, "final");
        assert_eq!(listed[0].version, 1);
    }

    #[test]
    fn open_returns_shared_handle() {
        let docs = repo();
        let id = docs.create(NotebookModel::new("a")).unwrap().id();

        let first = docs.open(id).unwrap();
        let second = docs.open(id).unwrap();
        first.change(|model| model.name = "b".to_string());
        assert_eq!(second.model().name, "b");
    }

    #[test]
    fn reopen_after_close_loads_latest_version() {
        let docs = repo();
        let handle = docs.create(NotebookModel::new("a")).unwrap();
        handle.change(|model| model.name = "b".to_string());
        assert!(docs.close(handle.id()));

        let reopened = docs.open(handle.id()).unwrap();
        assert_eq!(reopened.version(), 1);
        assert_eq!(reopened.model().name, "b");
    }

    #[test]
    fn open_unknown_and_delete() {
        let docs = repo();
        let missing = DocumentId::new();
        assert!(matches!(docs.open(missing), Err(DocError::NotFound(id)) if id == missing));

        let id = docs.create(NotebookModel::new("gone")).unwrap().id();
        docs.delete(id).unwrap();
        assert!(!docs.is_open(id));
        assert!(matches!(docs.delete(id), Err(DocError::NotFound(_))));
    }

    #[test]
    fn closed_handles_stop_persisting() {
        let store = SqliteDocumentRepository::open_in_memory().unwrap();
        let docs = DocRepo::new(store);
        let handle = docs.create(NotebookModel::new("a")).unwrap();
        docs.close(handle.id());
        handle.change(|model| model.name = "unsaved".to_string());
        assert_eq!(handle.listener_count(), 0);

        let reopened = docs.open(handle.id()).unwrap();
        assert_eq!(reopened.model().name, "a");
    }
}
