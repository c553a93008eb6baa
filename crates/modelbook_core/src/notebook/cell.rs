//! Notebook cells and their persisted wire format.
//!
//! # Responsibility
//! - Define the cell sum type shared by every notebook kind.
//! - Decode persisted cells leniently so one bad cell cannot sink a notebook.
//!
//! # Invariants
//! - Wire tags are `rich-text` and `formal`; renaming them breaks documents.
//! - A cell whose tag or content cannot be decoded is kept verbatim as
//!   `Cell::Unrecognized` and re-encoded unchanged.
//! - Cells persisted without an `id` get a fresh one on read.

use crate::model::ids::CellId;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Free-form text cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RichTextCell {
    pub id: CellId,
    pub content: String,
}

/// Cell holding formal content, e.g. a model judgment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalCell<T> {
    pub id: CellId,
    pub content: T,
}

/// Persisted cell this build cannot interpret. Never rendered, never edited,
/// but preserved so saving does not discard a collaborator's data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedCell {
    pub id: CellId,
    pub raw: serde_json::Value,
}

impl UnrecognizedCell {
    /// Wire tag found on the raw cell, if any.
    pub fn tag(&self) -> Option<&str> {
        self.raw.get("tag").and_then(serde_json::Value::as_str)
    }
}

/// A cell in a notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell<T> {
    RichText(RichTextCell),
    Formal(FormalCell<T>),
    Unrecognized(UnrecognizedCell),
}

impl<T> Cell<T> {
    pub fn id(&self) -> CellId {
        match self {
            Self::RichText(cell) => cell.id,
            Self::Formal(cell) => cell.id,
            Self::Unrecognized(cell) => cell.id,
        }
    }

    pub fn formal(&self) -> Option<&T> {
        match self {
            Self::Formal(cell) => Some(&cell.content),
            _ => None,
        }
    }

    pub fn formal_mut(&mut self) -> Option<&mut T> {
        match self {
            Self::Formal(cell) => Some(&mut cell.content),
            _ => None,
        }
    }

    /// Wire tag of the cell; unrecognized cells report their raw tag.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::RichText(_) => Some("rich-text"),
            Self::Formal(_) => Some("formal"),
            Self::Unrecognized(cell) => cell.tag(),
        }
    }
}

/// Creates an empty rich-text cell with a fresh id.
pub fn new_rich_text_cell<T>() -> Cell<T> {
    Cell::RichText(RichTextCell {
        id: CellId::new(),
        content: String::new(),
    })
}

/// Wraps formal content in a new cell with a fresh id.
pub fn new_formal_cell<T>(content: T) -> Cell<T> {
    Cell::Formal(FormalCell {
        id: CellId::new(),
        content,
    })
}

#[derive(Deserialize)]
#[serde(tag = "tag", rename_all = "kebab-case")]
enum WireCell<T> {
    RichText {
        #[serde(default)]
        id: CellId,
        #[serde(default)]
        content: String,
    },
    Formal {
        #[serde(default)]
        id: CellId,
        content: T,
    },
}

#[derive(Serialize)]
#[serde(tag = "tag", rename_all = "kebab-case")]
enum WireCellRef<'a, T> {
    RichText { id: &'a CellId, content: &'a str },
    Formal { id: &'a CellId, content: &'a T },
}

impl<T: Serialize> Serialize for Cell<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire: WireCellRef<'_, T> = match self {
            Self::RichText(cell) => WireCellRef::RichText {
                id: &cell.id,
                content: cell.content.as_str(),
            },
            Self::Formal(cell) => WireCellRef::Formal {
                id: &cell.id,
                content: &cell.content,
            },
            Self::Unrecognized(cell) => return cell.raw.serialize(serializer),
        };
        wire.serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Cell<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        match WireCell::<T>::deserialize(&raw) {
            Ok(WireCell::RichText { id, content }) => Ok(Self::RichText(RichTextCell { id, content })),
            Ok(WireCell::Formal { id, content }) => Ok(Self::Formal(FormalCell { id, content })),
            Err(err) => {
                let id = raw
                    .get("id")
                    .and_then(serde_json::Value::as_str)
                    .and_then(|value| value.parse::<CellId>().ok())
                    .unwrap_or_default();
                warn!(
                    "event=cell_decode module=notebook status=skip cell_id={} error={}",
                    id, err
                );
                Ok(Self::Unrecognized(UnrecognizedCell { id, raw }))
            }
        }
    }
}
