//! Stable identifiers used across the notebook model.
//!
//! # Responsibility
//! - Give every declaration, cell and document an opaque, globally unique id.
//! - Keep theory and type references as plain string keys into a catalog.
//!
//! # Invariants
//! - UUID-backed ids are minted once and never derived from position or name.
//! - A nil UUID is never minted; parsing one is rejected.
//! - Theory/type references carry no ownership and may fail to resolve.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Parse error for UUID-backed identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdParseError {
    /// Input is not a hyphenated/simple UUID string.
    Malformed(String),
    /// Input parsed as the nil UUID.
    Nil,
}

impl Display for IdParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "malformed id `{value}`"),
            Self::Nil => write!(f, "nil uuid is not a valid id"),
        }
    }
}

impl std::error::Error for IdParseError {}

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "Uuid", into = "Uuid")]
        pub struct $name(Uuid);

        impl $name {
            /// Mints a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID, rejecting the nil value.
            pub fn from_uuid(uuid: Uuid) -> Result<Self, IdParseError> {
                if uuid.is_nil() {
                    return Err(IdParseError::Nil);
                }
                Ok(Self(uuid))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                Display::fmt(&self.0, f)
            }
        }

        impl TryFrom<Uuid> for $name {
            type Error = IdParseError;

            fn try_from(uuid: Uuid) -> Result<Self, Self::Error> {
                Self::from_uuid(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                let uuid = Uuid::parse_str(value.trim())
                    .map_err(|_| IdParseError::Malformed(value.to_string()))?;
                Self::from_uuid(uuid)
            }
        }
    };
}

uuid_id!(
    /// Identity of a declared object or morphism.
    ///
    /// The sole means of cross-referencing declarations. Never reused after
    /// the owning cell is deleted.
    EntityId
);

uuid_id!(
    /// Identity of a notebook cell, independent of any judgment it holds.
    CellId
);

uuid_id!(
    /// Identity of a persisted notebook document.
    DocumentId
);

/// Identifier of a theory (logic) in the catalog, e.g. `simple-olog`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TheoryId(String);

impl TheoryId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TheoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Reference to a type declared by a theory (object type or morphism type).
///
/// Weak: the active theory may not declare it, in which case the judgment is
/// rendered with an unresolved-type placeholder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeRef(String);

impl TypeRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TypeRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityId, IdParseError, TheoryId};

    #[test]
    fn minted_ids_are_unique() {
        assert_ne!(EntityId::new(), EntityId::new());
    }

    #[test]
    fn parses_display_form() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().expect("round trip parse");
        assert_eq!(parsed, id);
    }

    #[test]
    fn rejects_nil_and_garbage() {
        let nil = "00000000-0000-0000-0000-000000000000".parse::<EntityId>();
        assert_eq!(nil.unwrap_err(), IdParseError::Nil);
        assert!(matches!(
            "not-a-uuid".parse::<EntityId>(),
            Err(IdParseError::Malformed(_))
        ));
    }

    #[test]
    fn serde_uses_the_string_form_and_rejects_nil() {
        let id = EntityId::new();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!(id.to_string()));
        assert_eq!(serde_json::from_value::<EntityId>(json).unwrap(), id);

        let nil = serde_json::json!("00000000-0000-0000-0000-000000000000");
        let err = serde_json::from_value::<EntityId>(nil).unwrap_err();
        assert!(err.to_string().contains("nil"));
    }

    #[test]
    fn theory_id_serializes_as_plain_string() {
        let json = serde_json::to_value(TheoryId::new("simple-olog")).unwrap();
        assert_eq!(json, serde_json::json!("simple-olog"));
    }
}
