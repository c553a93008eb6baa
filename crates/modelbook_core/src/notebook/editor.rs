//! Generic notebook editor and the formal-cell editor contract.
//!
//! # Responsibility
//! - Render every cell of a notebook into a view model.
//! - Delegate formal cells to a content-specific `FormalCellEditor` without
//!   knowing the content's shape.
//! - Apply structural cell actions (activate, delete, create, move).
//!
//! # Invariants
//! - All writes go through the `change` lens handed in by the caller; the
//!   editor never mutates a snapshot directly.
//! - Cells and the active cell are tracked by `CellId`, resolved against the
//!   notebook current at the moment a change is applied.

use crate::model::ids::CellId;
use crate::notebook::cell::{new_rich_text_cell, Cell};
use crate::notebook::cells::Notebook;
use log::debug;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Scoped mutation callback: applies an in-place transformation to `T`.
///
/// Every lens ultimately commits through the document's single atomic
/// change entry point.
pub type ChangeFn<'a, T> = &'a dyn Fn(&mut dyn FnMut(&mut T));

/// Structural action a cell editor may request of its notebook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellAction {
    ActivateAbove,
    ActivateBelow,
    /// Delete the cell and activate the one above.
    DeleteBackward,
    /// Delete the cell and activate the one that takes its place.
    DeleteForward,
    /// Insert an empty text cell below and activate it.
    CreateBelow,
    MoveUp,
    MoveDown,
}

/// Action queue handed to a cell editor. The notebook editor drains it after
/// the cell editor returns.
#[derive(Debug, Default)]
pub struct CellActions {
    queued: RefCell<Vec<CellAction>>,
}

impl CellActions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self, action: CellAction) {
        self.queued.borrow_mut().push(action);
    }

    pub fn activate_above(&self) {
        self.request(CellAction::ActivateAbove);
    }

    pub fn activate_below(&self) {
        self.request(CellAction::ActivateBelow);
    }

    pub fn delete_backward(&self) {
        self.request(CellAction::DeleteBackward);
    }

    pub fn delete_forward(&self) {
        self.request(CellAction::DeleteForward);
    }

    pub fn create_below(&self) {
        self.request(CellAction::CreateBelow);
    }

    fn drain(&self) -> Vec<CellAction> {
        std::mem::take(&mut *self.queued.borrow_mut())
    }
}

/// What a formal cell editor receives: content, a lens to change it, whether
/// the cell is active, and the action queue.
pub struct CellProps<'a, T> {
    pub content: &'a T,
    pub change: ChangeFn<'a, T>,
    pub is_active: bool,
    pub actions: &'a CellActions,
}

/// Errors raised while editing a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The cell is not in the current notebook (possibly removed remotely).
    CellNotFound(CellId),
    /// The edit targets formal content but the cell is not formal.
    NotFormal(CellId),
    /// The edit targets rich text but the cell is not rich text.
    NotRichText(CellId),
    /// The edit kind does not match the content's variant.
    VariantMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

impl Display for EditError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CellNotFound(id) => write!(f, "cell not found: {id}"),
            Self::NotFormal(id) => write!(f, "cell is not formal: {id}"),
            Self::NotRichText(id) => write!(f, "cell is not rich text: {id}"),
            Self::VariantMismatch { expected, found } => {
                write!(f, "edit targets `{expected}` content but cell holds `{found}`")
            }
        }
    }
}

impl Error for EditError {}

/// Editor for the formal content `T` of a notebook's cells.
pub trait FormalCellEditor<T> {
    type View;
    type Edit;

    fn render(&self, props: &CellProps<'_, T>) -> Self::View;

    fn edit(&self, props: &CellProps<'_, T>, edit: Self::Edit) -> Result<(), EditError>;
}

/// Rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellView<V> {
    RichText {
        id: CellId,
        content: String,
        is_active: bool,
    },
    Formal {
        id: CellId,
        view: V,
        is_active: bool,
    },
    /// Cell this build cannot interpret; the host shows a placeholder.
    Unrecognized { id: CellId, tag: Option<String> },
}

impl<V> CellView<V> {
    pub fn id(&self) -> CellId {
        match self {
            Self::RichText { id, .. } | Self::Formal { id, .. } | Self::Unrecognized { id, .. } => {
                *id
            }
        }
    }
}

/// Notebook-level editor state: only the active cell.
#[derive(Debug, Clone, Default)]
pub struct NotebookEditor {
    active: Option<CellId>,
}

impl NotebookEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<CellId> {
        self.active
    }

    pub fn activate(&mut self, id: Option<CellId>) {
        self.active = id;
    }

    /// Renders every cell, delegating formal cells to `editor`.
    pub fn render<T, E: FormalCellEditor<T>>(
        &self,
        notebook: &Notebook<T>,
        change_notebook: ChangeFn<'_, Notebook<T>>,
        editor: &E,
    ) -> Vec<CellView<E::View>> {
        let actions = CellActions::new();
        notebook
            .cells
            .iter()
            .map(|cell| {
                let is_active = self.active == Some(cell.id());
                match cell {
                    Cell::RichText(text) => CellView::RichText {
                        id: text.id,
                        content: text.content.clone(),
                        is_active,
                    },
                    Cell::Formal(formal) => {
                        let view = with_formal_lens(change_notebook, formal.id, |change| {
                            editor.render(&CellProps {
                                content: &formal.content,
                                change,
                                is_active,
                                actions: &actions,
                            })
                        });
                        CellView::Formal {
                            id: formal.id,
                            view,
                            is_active,
                        }
                    }
                    Cell::Unrecognized(unrecognized) => CellView::Unrecognized {
                        id: unrecognized.id,
                        tag: unrecognized.tag().map(str::to_string),
                    },
                }
            })
            .collect()
    }

    /// Applies `edit` to the formal cell `id` and then any actions the cell
    /// editor requested.
    pub fn edit_formal<T, E: FormalCellEditor<T>>(
        &mut self,
        notebook: &Notebook<T>,
        change_notebook: ChangeFn<'_, Notebook<T>>,
        editor: &E,
        id: CellId,
        edit: E::Edit,
    ) -> Result<(), EditError> {
        let cell = notebook.cell(id).ok_or(EditError::CellNotFound(id))?;
        let content = cell.formal().ok_or(EditError::NotFormal(id))?;
        let actions = CellActions::new();
        let is_active = self.active == Some(id);
        with_formal_lens(change_notebook, id, |change| {
            editor.edit(
                &CellProps {
                    content,
                    change,
                    is_active,
                    actions: &actions,
                },
                edit,
            )
        })?;
        for action in actions.drain() {
            self.apply_action(change_notebook, id, action);
        }
        Ok(())
    }

    /// Replaces the text of a rich-text cell.
    pub fn edit_rich_text<T>(
        &self,
        notebook: &Notebook<T>,
        change_notebook: ChangeFn<'_, Notebook<T>>,
        id: CellId,
        content: String,
    ) -> Result<(), EditError> {
        match notebook.cell(id) {
            Some(Cell::RichText(_)) => {}
            Some(_) => return Err(EditError::NotRichText(id)),
            None => return Err(EditError::CellNotFound(id)),
        }
        let mut content = Some(content);
        change_notebook(&mut |notebook: &mut Notebook<T>| {
            if let (Some(Cell::RichText(text)), Some(value)) = (notebook.cell_mut(id), content.take()) {
                text.content = value;
            }
        });
        Ok(())
    }

    /// Applies one structural action relative to cell `id`. Unknown ids are
    /// ignored: the cell may already have been removed.
    pub fn apply_action<T>(
        &mut self,
        change_notebook: ChangeFn<'_, Notebook<T>>,
        id: CellId,
        action: CellAction,
    ) {
        let mut next_active = self.active;
        change_notebook(&mut |notebook: &mut Notebook<T>| {
            let Some(index) = notebook.position(id) else {
                debug!("event=cell_action module=notebook status=skip reason=cell_missing");
                return;
            };
            match action {
                CellAction::ActivateAbove => {
                    if index > 0 {
                        next_active = Some(notebook.cells[index - 1].id());
                    }
                }
                CellAction::ActivateBelow => {
                    if let Some(cell) = notebook.cells.get(index + 1) {
                        next_active = Some(cell.id());
                    }
                }
                CellAction::DeleteBackward => {
                    notebook.cells.remove(index);
                    next_active = index
                        .checked_sub(1)
                        .and_then(|above| notebook.cells.get(above))
                        .map(Cell::id);
                }
                CellAction::DeleteForward => {
                    notebook.cells.remove(index);
                    next_active = notebook.cells.get(index).map(Cell::id);
                }
                CellAction::CreateBelow => {
                    next_active = Some(notebook.insert(index + 1, new_rich_text_cell()));
                }
                CellAction::MoveUp => {
                    if index > 0 {
                        notebook.cells.swap(index, index - 1);
                    }
                }
                CellAction::MoveDown => {
                    if index + 1 < notebook.cells.len() {
                        notebook.cells.swap(index, index + 1);
                    }
                }
            }
        });
        self.active = next_active;
    }
}

/// Narrows a lens on `S` to the part of `S` selected by `project` and hands
/// the narrowed lens to `f`.
///
/// Invoking the narrowed lens invokes `change` once, running the
/// transformation in place on the projected part. If the projection finds
/// nothing in the value being changed, the change is a no-op.
pub fn with_narrowed_lens<S, T, R>(
    change: ChangeFn<'_, S>,
    project: impl Fn(&mut S) -> Option<&mut T>,
    f: impl FnOnce(ChangeFn<'_, T>) -> R,
) -> R
where
    S: ?Sized,
    T: ?Sized,
{
    let narrowed = |g: &mut dyn FnMut(&mut T)| {
        change(&mut |whole: &mut S| match project(whole) {
            Some(part) => g(part),
            None => debug!("event=cell_change module=notebook status=skip reason=target_missing"),
        });
    };
    f(&narrowed)
}

/// Narrows a notebook lens to the formal content of cell `id`.
fn with_formal_lens<T, R>(
    change_notebook: ChangeFn<'_, Notebook<T>>,
    id: CellId,
    f: impl FnOnce(ChangeFn<'_, T>) -> R,
) -> R {
    with_narrowed_lens(
        change_notebook,
        move |notebook: &mut Notebook<T>| notebook.cell_mut(id).and_then(Cell::formal_mut),
        f,
    )
}
