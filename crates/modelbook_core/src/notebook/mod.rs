//! Generic notebooks: ordered cells of rich text or formal content.
//!
//! # Responsibility
//! - Own the cell sequence and its wire format independently of what the
//!   formal content is.
//! - Define the contract between a notebook editor and formal cell editors.

pub mod cell;
pub mod cells;
pub mod constructor;
pub mod editor;
