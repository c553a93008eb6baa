//! Live documents: versioned snapshots, change events and persistence.
//!
//! # Responsibility
//! - Own the single atomic change entry point for a notebook document.
//! - Track open documents and write their snapshots through to storage.
//!
//! # See also
//! - `crate::repo::document_repo` for the storage contract.

pub mod handle;
pub mod repo;

pub use handle::{ChangeOrigin, DocEvent, DocHandle, DocSnapshot, Subscription};
pub use repo::{DocError, DocRepo, DocResult};
