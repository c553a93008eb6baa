//! Theories: externally supplied catalogs of declarable judgment types.
//!
//! # Responsibility
//! - Declare and validate theory metadata.
//! - Hold the catalog of known theories and resolve a document's theory id.
//!
//! # Invariants
//! - Theory semantics are opaque here; only declared type kinds matter.

pub mod catalog;
pub mod meta;
