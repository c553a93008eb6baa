//! Model editor session over one live notebook document.
//!
//! # Responsibility
//! - Wire a document handle to its name index projection, theory resolution,
//!   constructor registry and notebook editor.
//! - Provide the entry points a rendering layer calls: render, insert, edit,
//!   structural actions, diagnostics.
//!
//! # Invariants
//! - Every write goes through `DocHandle::change`, one atomic change per
//!   user operation.
//! - Everything derived (names, theory, options, views) is computed from the
//!   latest snapshot, so remote edits between calls are picked up.
//! - Each session owns its own projection; sessions never share lookup state.

use crate::doc::handle::DocHandle;
use crate::doc::repo::{DocRepo, DocResult};
use crate::model::checks::{ModelCheck, ModelIssue};
use crate::model::constructors::ConstructorRegistry;
use crate::model::context::{ModelContext, ObjectNameMap};
use crate::model::document::ModelNotebook;
use crate::model::editor::{JudgmentEdit, JudgmentView, ModelCellEditor};
use crate::model::ids::{CellId, DocumentId, TheoryId};
use crate::model::projection::NameIndexProjection;
use crate::notebook::constructor::{ModifierKey, Shortcut};
use crate::notebook::editor::{CellAction, CellView, ChangeFn, EditError, NotebookEditor};
use crate::repo::document_repo::DocumentRepository;
use crate::theory::catalog::TheoryCatalog;
use crate::theory::meta::TheoryMeta;
use crate::validate::Validate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Edit(EditError),
    /// Selecting a theory the local catalog does not know.
    UnknownTheory(TheoryId),
    UnknownOption { index: usize, available: usize },
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Edit(err) => write!(f, "{err}"),
            Self::UnknownTheory(id) => write!(f, "unknown theory: {id}"),
            Self::UnknownOption { index, available } => {
                write!(f, "insert option {index} out of range ({available} available)")
            }
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Edit(err) => Some(err),
            Self::UnknownTheory(_) | Self::UnknownOption { .. } => None,
        }
    }
}

impl From<EditError> for SessionError {
    fn from(value: EditError) -> Self {
        Self::Edit(value)
    }
}

/// One entry of the insert-cell menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOption {
    pub index: usize,
    pub name: String,
    pub description: Option<String>,
    pub shortcut: Option<Shortcut>,
}

/// Rendered notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookView {
    pub doc_id: DocumentId,
    pub version: u64,
    pub name: String,
    pub theory: Option<TheoryId>,
    /// Display name of the theory, if the catalog knows it.
    pub theory_name: Option<String>,
    pub active: Option<CellId>,
    pub cells: Vec<CellView<JudgmentView>>,
}

pub struct ModelSession {
    handle: DocHandle,
    catalog: Arc<TheoryCatalog>,
    names: NameIndexProjection,
    editor: NotebookEditor,
    registry: ConstructorRegistry,
}

impl ModelSession {
    pub fn new(handle: DocHandle, catalog: Arc<TheoryCatalog>, modifier: ModifierKey) -> Self {
        let names = NameIndexProjection::attach(&handle);
        info!(
            "event=session_open module=session status=ok doc_id={} version={}",
            handle.id(),
            handle.version()
        );
        Self {
            handle,
            catalog,
            names,
            editor: NotebookEditor::new(),
            registry: ConstructorRegistry::new(modifier),
        }
    }

    /// Opens document `id` from `docs` and starts a session on it.
    pub fn open<R>(
        docs: &DocRepo<R>,
        id: DocumentId,
        catalog: Arc<TheoryCatalog>,
        modifier: ModifierKey,
    ) -> DocResult<Self>
    where
        R: DocumentRepository + Send + Sync + 'static,
    {
        Ok(Self::new(docs.open(id)?, catalog, modifier))
    }

    pub fn handle(&self) -> &DocHandle {
        &self.handle
    }

    pub fn id(&self) -> DocumentId {
        self.handle.id()
    }

    /// Theory the document currently refers to, if the catalog knows it.
    pub fn theory(&self) -> Option<Arc<TheoryMeta>> {
        self.catalog.resolve(self.handle.model().theory.as_ref())
    }

    pub fn name_index(&self) -> Arc<ObjectNameMap> {
        self.names.names()
    }

    /// Ambient lookup context for judgment editors.
    pub fn context(&self) -> ModelContext {
        ModelContext::new(self.names.names(), self.theory())
    }

    pub fn active(&self) -> Option<CellId> {
        self.editor.active()
    }

    pub fn activate(&mut self, id: Option<CellId>) {
        self.editor.activate(id);
    }

    pub fn set_name(&self, name: impl Into<String>) {
        let name = name.into();
        self.handle.change(move |model| model.name = name);
    }

    /// Selects a theory from the catalog, or clears it.
    pub fn set_theory(&mut self, theory: Option<TheoryId>) -> Result<(), SessionError> {
        if let Some(id) = &theory {
            if self.catalog.get(id).is_none() {
                return Err(SessionError::UnknownTheory(id.clone()));
            }
        }
        info!(
            "event=theory_select module=session status=ok doc_id={} theory_id={}",
            self.handle.id(),
            theory.as_ref().map_or("none", TheoryId::as_str)
        );
        self.handle.change(move |model| model.theory = theory);
        Ok(())
    }

    /// Insert options under the current theory.
    pub fn insert_options(&mut self) -> Vec<InsertOption> {
        let theory = self.theory();
        self.registry
            .constructors(theory.as_deref())
            .iter()
            .enumerate()
            .map(|(index, constructor)| InsertOption {
                index,
                name: constructor.name.clone(),
                description: constructor.description.clone(),
                shortcut: constructor.shortcut.clone(),
            })
            .collect()
    }

    /// Constructs a cell from insert option `option` and inserts it at
    /// `position` (appended if `None`). The new cell becomes active.
    pub fn insert_cell(
        &mut self,
        option: usize,
        position: Option<usize>,
    ) -> Result<CellId, SessionError> {
        let theory = self.theory();
        let options = self.registry.constructors(theory.as_deref());
        let constructor = options.get(option).ok_or(SessionError::UnknownOption {
            index: option,
            available: options.len(),
        })?;

        let cell = constructor.construct();
        let id = cell.id();
        self.handle.change(move |model| {
            let index = position.unwrap_or(model.notebook.len());
            model.notebook.insert(index, cell);
        });
        self.editor.activate(Some(id));
        info!(
            "event=cell_insert module=session status=ok doc_id={} cell_id={} option={}",
            self.handle.id(),
            id,
            option
        );
        Ok(id)
    }

    /// Removes cell `id`. Returns whether it was present.
    pub fn delete_cell(&mut self, id: CellId) -> bool {
        let mut removed = false;
        self.handle.change(|model| removed = model.notebook.remove(id).is_some());
        if self.editor.active() == Some(id) {
            self.editor.activate(None);
        }
        removed
    }

    /// Moves cell `id` to `index` (clamped). Returns whether it was present.
    pub fn move_cell(&self, id: CellId, index: usize) -> bool {
        let mut moved = false;
        self.handle.change(|model| moved = model.notebook.move_to(id, index));
        moved
    }

    pub fn render(&self) -> NotebookView {
        let snapshot = self.handle.snapshot();
        let theory = self.catalog.resolve(snapshot.model.theory.as_ref());
        let context = ModelContext::new(self.names.names(), theory.clone());
        let editor = ModelCellEditor::new(&context);
        let cells = with_notebook_lens(&self.handle, |change| {
            self.editor.render(&snapshot.model.notebook, change, &editor)
        });
        NotebookView {
            doc_id: self.handle.id(),
            version: snapshot.version,
            name: snapshot.model.name.clone(),
            theory: snapshot.model.theory.clone(),
            theory_name: theory.map(|theory| theory.name.clone()),
            active: self.editor.active(),
            cells,
        }
    }

    /// Applies `edit` to the formal cell `id`.
    pub fn edit_cell(&mut self, id: CellId, edit: JudgmentEdit) -> Result<(), SessionError> {
        let model = self.handle.model();
        let context = self.context();
        let editor = ModelCellEditor::new(&context);
        let notebook_editor = &mut self.editor;
        with_notebook_lens(&self.handle, |change| {
            notebook_editor.edit_formal(&model.notebook, change, &editor, id, edit)
        })?;
        Ok(())
    }

    pub fn edit_rich_text(&self, id: CellId, content: impl Into<String>) -> Result<(), SessionError> {
        let model = self.handle.model();
        let content = content.into();
        with_notebook_lens(&self.handle, |change| {
            self.editor
                .edit_rich_text(&model.notebook, change, id, content)
        })?;
        Ok(())
    }

    pub fn apply_action(&mut self, id: CellId, action: CellAction) {
        let notebook_editor = &mut self.editor;
        with_notebook_lens(&self.handle, |change| {
            notebook_editor.apply_action(change, id, action)
        });
    }

    /// Advisory issues: unset or dangling endpoints, undeclared types.
    pub fn diagnostics(&self) -> Vec<ModelIssue> {
        let model = self.handle.model();
        let names = self.names.names();
        let theory = self.catalog.resolve(model.theory.as_ref());
        ModelCheck {
            model: &model,
            names: &names,
            theory: theory.as_deref(),
        }
        .iter_invalid()
        .collect()
    }
}

/// Lens on the notebook of `handle`: each call is one atomic change.
fn with_notebook_lens<R>(handle: &DocHandle, f: impl FnOnce(ChangeFn<'_, ModelNotebook>) -> R) -> R {
    let change = |g: &mut dyn FnMut(&mut ModelNotebook)| {
        handle.change(|model| g(&mut model.notebook));
    };
    f(&change)
}
