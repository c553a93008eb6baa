//! Catalog of known theories and theory resolution.
//!
//! # Invariants
//! - Every registered theory passed `TheoryMeta::validate`.
//! - Theory ids are unique; listing order is registration order.
//! - Resolving an unset or unknown id yields `None`, never an error.

use crate::model::ids::TheoryId;
use crate::theory::meta::{TheoryMeta, TheoryValidationError};
use log::debug;
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::Arc;

const BUILTIN_THEORIES_JSON: &str = include_str!("builtin_theories.json");

/// Catalog registration and loading errors.
#[derive(Debug)]
pub enum CatalogError {
    InvalidTheory(TheoryValidationError),
    DuplicateTheoryId(TheoryId),
    Parse(serde_json::Error),
    Io(std::io::Error),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTheory(err) => write!(f, "invalid theory: {err}"),
            Self::DuplicateTheoryId(id) => write!(f, "theory id already registered: {id}"),
            Self::Parse(err) => write!(f, "invalid theory catalog json: {err}"),
            Self::Io(err) => write!(f, "failed to read theory catalog: {err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTheory(err) => Some(err),
            Self::DuplicateTheoryId(_) => None,
            Self::Parse(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<TheoryValidationError> for CatalogError {
    fn from(value: TheoryValidationError) -> Self {
        Self::InvalidTheory(value)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Read-only list of theories a notebook may select.
#[derive(Debug, Clone, Default)]
pub struct TheoryCatalog {
    entries: BTreeMap<TheoryId, Arc<TheoryMeta>>,
    order: Vec<TheoryId>,
}

impl TheoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog shipped with the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json_str(BUILTIN_THEORIES_JSON)
    }

    /// Parses a JSON array of theories and registers each in order.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let theories: Vec<TheoryMeta> = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for theory in theories {
            catalog.register(theory)?;
        }
        Ok(catalog)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Registers one theory after validation.
    pub fn register(&mut self, theory: TheoryMeta) -> Result<(), CatalogError> {
        theory.validate()?;
        if self.entries.contains_key(&theory.id) {
            return Err(CatalogError::DuplicateTheoryId(theory.id));
        }
        self.order.push(theory.id.clone());
        self.entries.insert(theory.id.clone(), Arc::new(theory));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &TheoryId) -> Option<Arc<TheoryMeta>> {
        self.entries.get(id).cloned()
    }

    /// Theories in registration order.
    pub fn theories(&self) -> impl Iterator<Item = &Arc<TheoryMeta>> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Selects the theory a document refers to.
    ///
    /// An unset id or an id unknown to this catalog (e.g. set by a
    /// collaborator with a newer catalog) resolves to "no theory".
    pub fn resolve(&self, id: Option<&TheoryId>) -> Option<Arc<TheoryMeta>> {
        let id = id?;
        let theory = self.get(id);
        if theory.is_none() {
            debug!(
                "event=theory_resolve module=theory status=skip reason=unknown_theory theory_id={}",
                id
            );
        }
        theory
    }
}
