//! Ordered cell sequence of a notebook.
//!
//! # Invariants
//! - Order is user-controlled and meaningful.
//! - Cells are addressed by `CellId`, never by a position captured earlier:
//!   positions shift under concurrent inserts, deletes and moves.

use crate::model::ids::CellId;
use crate::notebook::cell::Cell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A notebook: an ordered sequence of cells with formal content `T`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: DeserializeOwned"))]
pub struct Notebook<T> {
    #[serde(default = "Vec::new")]
    pub cells: Vec<Cell<T>>,
}

impl<T> Default for Notebook<T> {
    fn default() -> Self {
        Self { cells: Vec::new() }
    }
}

impl<T> Notebook<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn position(&self, id: CellId) -> Option<usize> {
        self.cells.iter().position(|cell| cell.id() == id)
    }

    pub fn cell(&self, id: CellId) -> Option<&Cell<T>> {
        self.cells.iter().find(|cell| cell.id() == id)
    }

    pub fn cell_mut(&mut self, id: CellId) -> Option<&mut Cell<T>> {
        self.cells.iter_mut().find(|cell| cell.id() == id)
    }

    /// Inserts a cell at `index`, clamped to the end of the sequence.
    pub fn insert(&mut self, index: usize, cell: Cell<T>) -> CellId {
        let id = cell.id();
        let index = index.min(self.cells.len());
        self.cells.insert(index, cell);
        id
    }

    pub fn push(&mut self, cell: Cell<T>) -> CellId {
        let id = cell.id();
        self.cells.push(cell);
        id
    }

    /// Removes a cell by id. Returns `None` when it is already gone.
    pub fn remove(&mut self, id: CellId) -> Option<Cell<T>> {
        let index = self.position(id)?;
        Some(self.cells.remove(index))
    }

    /// Moves a cell to `index` (clamped). Returns `false` when the id is absent.
    pub fn move_to(&mut self, id: CellId, index: usize) -> bool {
        let Some(from) = self.position(id) else {
            return false;
        };
        let cell = self.cells.remove(from);
        let to = index.min(self.cells.len());
        self.cells.insert(to, cell);
        true
    }

    /// Formal contents in sequence order.
    pub fn formal_contents(&self) -> impl Iterator<Item = &T> {
        self.cells.iter().filter_map(Cell::formal)
    }
}

#[cfg(test)]
mod tests {
    use super::Notebook;
    use crate::notebook::cell::{new_formal_cell, new_rich_text_cell, Cell};

    fn ids(notebook: &Notebook<u32>) -> Vec<String> {
        notebook.cells.iter().map(|c| c.id().to_string()).collect()
    }

    #[test]
    fn insert_clamps_index_and_keeps_order() {
        let mut notebook = Notebook::<u32>::new();
        let a = notebook.push(new_formal_cell(1));
        let c = notebook.insert(99, new_formal_cell(3));
        let b = notebook.insert(1, new_formal_cell(2));

        assert_eq!(notebook.position(a), Some(0));
        assert_eq!(notebook.position(b), Some(1));
        assert_eq!(notebook.position(c), Some(2));
        assert_eq!(notebook.formal_contents().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn move_and_remove_address_by_id() {
        let mut notebook = Notebook::<u32>::new();
        let a = notebook.push(new_formal_cell(1));
        let b = notebook.push(new_rich_text_cell());
        let c = notebook.push(new_formal_cell(3));

        assert!(notebook.move_to(c, 0));
        assert_eq!(notebook.position(c), Some(0));
        assert_eq!(notebook.position(a), Some(1));

        let removed = notebook.remove(b).expect("cell present");
        assert!(matches!(removed, Cell::RichText(_)));
        assert_eq!(notebook.remove(b), None);
        assert!(!notebook.move_to(b, 0));
        assert_eq!(ids(&notebook).len(), 2);
    }

    #[test]
    fn missing_cells_field_decodes_as_empty() {
        let notebook: Notebook<u32> = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(notebook.is_empty());
    }
}
