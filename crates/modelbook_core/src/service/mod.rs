//! Use-case services over live documents.
//!
//! # Responsibility
//! - Provide stable entry points for callers (FFI, CLI) that hide the wiring
//!   of document, projection, theory and editor layers.
//!
//! # Invariants
//! - Services never bypass the document change entry point.

pub mod model_session;
