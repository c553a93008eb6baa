//! Model notebooks: judgments, their document, and the editors over them.
//!
//! # Responsibility
//! - Define identities, judgments and the root document value.
//! - Derive the object name index and model diagnostics from snapshots.
//! - Dispatch formal cells to judgment editors and list insertion options.
//!
//! # Invariants
//! - Every declaration is identified by a stable `EntityId`.
//! - References between declarations are weak: plain ids, never owned.

pub mod checks;
pub mod constructors;
pub mod context;
pub mod document;
pub mod editor;
pub mod ids;
pub mod judgment;
pub mod projection;
