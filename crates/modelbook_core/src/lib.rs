//! Core of the model notebook editor.
//!
//! A model is a notebook of cells, each either rich text or a formal
//! judgment (an object or morphism declaration) typed against a theory.
//! This crate owns the document value, the derived name index, judgment
//! editor dispatch, cell construction and persistence.

pub mod config;
pub mod db;
pub mod doc;
pub mod indexed_map;
pub mod logging;
pub mod model;
pub mod notebook;
pub mod repo;
pub mod service;
pub mod theory;
pub mod validate;

pub use config::{ConfigError, CoreConfig};
pub use doc::{ChangeOrigin, DocError, DocEvent, DocHandle, DocRepo, DocSnapshot, Subscription};
pub use indexed_map::IndexedMap;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::checks::{Endpoint, ModelIssue};
pub use model::context::{ModelContext, ObjectNameMap};
pub use model::document::{ModelNotebook, NotebookModel};
pub use model::editor::{
    JudgmentEdit, JudgmentView, MorphismEdit, MorphismView, ObjectEdit, ObjectView, RefView,
    TypeView,
};
pub use model::ids::{CellId, DocumentId, EntityId, IdParseError, TheoryId, TypeRef};
pub use model::judgment::{ModelJudgment, MorphismDecl, ObjectDecl};
pub use notebook::cell::Cell;
pub use notebook::cells::Notebook;
pub use notebook::constructor::{ModifierKey, Shortcut};
pub use notebook::editor::{CellAction, CellView, EditError};
pub use repo::document_repo::{
    DocumentRepository, DocumentSummary, RepoError, RepoResult, SqliteDocumentRepository,
    StoredDocument,
};
pub use service::model_session::{InsertOption, ModelSession, NotebookView, SessionError};
pub use theory::catalog::{CatalogError, TheoryCatalog};
pub use theory::meta::{TheoryMeta, TypeMeta, TypeTag};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
