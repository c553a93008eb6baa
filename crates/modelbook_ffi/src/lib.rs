//! Flutter-facing bindings for the model notebook core.

pub mod api;
