//! Ambient context shared by every judgment editor of one notebook.
//!
//! # Responsibility
//! - Carry the current object name index and resolved theory to editors so
//!   no editor has to thread them through its own inputs.
//!
//! # Invariants
//! - Cloning is cheap: both parts are shared, immutable snapshots.
//! - A lookup of an absent id yields `None`; the caller decides how to
//!   present an unresolved reference.

use crate::indexed_map::IndexedMap;
use crate::model::ids::EntityId;
use crate::theory::meta::TheoryMeta;
use std::sync::Arc;

/// Object name index: object id to display name, in notebook order.
pub type ObjectNameMap = IndexedMap<EntityId, String>;

#[derive(Debug, Clone, Default)]
pub struct ModelContext {
    names: Arc<ObjectNameMap>,
    theory: Option<Arc<TheoryMeta>>,
}

impl ModelContext {
    pub fn new(names: Arc<ObjectNameMap>, theory: Option<Arc<TheoryMeta>>) -> Self {
        Self { names, theory }
    }

    pub fn names(&self) -> &ObjectNameMap {
        &self.names
    }

    pub fn theory(&self) -> Option<&TheoryMeta> {
        self.theory.as_deref()
    }

    /// Display name of object `id`, if it is declared in the notebook.
    pub fn object_name(&self, id: EntityId) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    /// Objects with exactly this name, in notebook order.
    pub fn objects_named(&self, name: &str) -> &[EntityId] {
        self.names.keys_for(name)
    }
}
