//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define document-oriented data access contracts.
//! - Isolate SQLite query details from document and session orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod document_repo;
