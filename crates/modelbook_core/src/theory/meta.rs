//! Theory metadata declaration and validation.

use crate::model::ids::{TheoryId, TypeRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Which kind of judgment a declared type produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeTag {
    /// Produces object declarations.
    ObType,
    /// Produces morphism declarations.
    MorType,
}

/// One declarable type of a theory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeMeta {
    pub id: TypeRef,
    pub tag: TypeTag,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Base key chord without the platform modifier, e.g. `["O"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<Vec<String>>,
}

/// Opaque description of a logic: its id, display name and declarable types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TheoryMeta {
    pub id: TheoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeMeta>,
}

impl TheoryMeta {
    /// Looks up a declared type by id.
    pub fn type_meta(&self, id: &TypeRef) -> Option<&TypeMeta> {
        self.types.iter().find(|typ| &typ.id == id)
    }

    /// Whether `id` is declared with the given tag.
    pub fn declares(&self, id: &TypeRef, tag: TypeTag) -> bool {
        self.type_meta(id).is_some_and(|typ| typ.tag == tag)
    }

    /// Validates declaration-level invariants.
    pub fn validate(&self) -> Result<(), TheoryValidationError> {
        let id = self.id.as_str();
        if id.trim().is_empty() {
            return Err(TheoryValidationError::EmptyId);
        }
        if !is_valid_theory_id(id) {
            return Err(TheoryValidationError::InvalidId(id.to_string()));
        }
        if self.name.trim().is_empty() {
            return Err(TheoryValidationError::EmptyName);
        }

        let mut dedup = BTreeSet::<&str>::new();
        for typ in &self.types {
            let type_id = typ.id.as_str();
            if type_id.trim().is_empty() {
                return Err(TheoryValidationError::EmptyTypeId);
            }
            if !dedup.insert(type_id) {
                return Err(TheoryValidationError::DuplicateTypeId(type_id.to_string()));
            }
            if typ.name.trim().is_empty() {
                return Err(TheoryValidationError::EmptyTypeName(type_id.to_string()));
            }
            if let Some(keys) = &typ.shortcut {
                if keys.is_empty() || keys.iter().any(|key| key.trim().is_empty()) {
                    return Err(TheoryValidationError::InvalidShortcut(type_id.to_string()));
                }
            }
        }
        Ok(())
    }
}

fn is_valid_theory_id(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    if !first.is_ascii_lowercase() && !first.is_ascii_digit() {
        return false;
    }

    let mut prev_separator = false;
    for c in chars {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            prev_separator = false;
            continue;
        }
        if c == '.' || c == '_' || c == '-' {
            if prev_separator {
                return false;
            }
            prev_separator = true;
            continue;
        }
        return false;
    }
    !prev_separator
}

/// Theory metadata validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TheoryValidationError {
    EmptyId,
    InvalidId(String),
    EmptyName,
    EmptyTypeId,
    DuplicateTypeId(String),
    EmptyTypeName(String),
    InvalidShortcut(String),
}

impl Display for TheoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "theory id must not be empty"),
            Self::InvalidId(value) => write!(f, "theory id is invalid: {value}"),
            Self::EmptyName => write!(f, "theory name must not be empty"),
            Self::EmptyTypeId => write!(f, "type id must not be empty"),
            Self::DuplicateTypeId(value) => write!(f, "type id declared twice: {value}"),
            Self::EmptyTypeName(value) => write!(f, "type name must not be empty: {value}"),
            Self::InvalidShortcut(value) => {
                write!(f, "type shortcut must list non-blank keys: {value}")
            }
        }
    }
}

impl Error for TheoryValidationError {}
