//! Formal judgments declared in a model notebook.
//!
//! # Responsibility
//! - Define object and morphism declarations and their closed sum type.
//! - Provide constructors that mint fresh declaration identities.
//!
//! # Invariants
//! - `id` is immutable for the lifetime of a declaration.
//! - `dom`/`cod` are weak references: they may be unset or dangling.
//! - The `tag` discriminator is closed (`object` | `morphism`).

use crate::model::ids::{EntityId, TypeRef};
use serde::{Deserialize, Serialize};

/// Declaration of an object in the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDecl {
    pub id: EntityId,
    pub name: String,
    /// Serialized as `obType` to match the persisted document layout.
    #[serde(rename = "obType")]
    pub ob_type: TypeRef,
}

/// Declaration of a morphism between two objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MorphismDecl {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "morType")]
    pub mor_type: TypeRef,
    /// Domain object, by identity. Not guaranteed to resolve.
    #[serde(default)]
    pub dom: Option<EntityId>,
    /// Codomain object, by identity. Not guaranteed to resolve.
    #[serde(default)]
    pub cod: Option<EntityId>,
}

/// Content of a formal cell in a model notebook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum ModelJudgment {
    Object(ObjectDecl),
    Morphism(MorphismDecl),
}

impl ModelJudgment {
    /// Identity of the declaration, whichever variant it is.
    pub fn id(&self) -> EntityId {
        match self {
            Self::Object(object) => object.id,
            Self::Morphism(morphism) => morphism.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Object(object) => object.name.as_str(),
            Self::Morphism(morphism) => morphism.name.as_str(),
        }
    }

    /// Stable wire tag of the variant.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Morphism(_) => "morphism",
        }
    }

    pub fn as_object(&self) -> Option<&ObjectDecl> {
        match self {
            Self::Object(object) => Some(object),
            Self::Morphism(_) => None,
        }
    }

    pub fn as_morphism(&self) -> Option<&MorphismDecl> {
        match self {
            Self::Morphism(morphism) => Some(morphism),
            Self::Object(_) => None,
        }
    }
}

/// Creates an unnamed object declaration of the given type with a fresh id.
pub fn new_object_decl(ob_type: TypeRef) -> ObjectDecl {
    ObjectDecl {
        id: EntityId::new(),
        name: String::new(),
        ob_type,
    }
}

/// Creates an unnamed morphism declaration of the given type with a fresh id
/// and unset endpoints.
pub fn new_morphism_decl(mor_type: TypeRef) -> MorphismDecl {
    MorphismDecl {
        id: EntityId::new(),
        name: String::new(),
        mor_type,
        dom: None,
        cod: None,
    }
}

#[cfg(test)]
mod tests {
    use super::{new_morphism_decl, new_object_decl, ModelJudgment};
    use crate::model::ids::TypeRef;

    #[test]
    fn constructors_mint_distinct_ids_and_empty_names() {
        let a = new_object_decl(TypeRef::new("Type"));
        let b = new_object_decl(TypeRef::new("Type"));
        assert_ne!(a.id, b.id);
        assert!(a.name.is_empty());

        let m = new_morphism_decl(TypeRef::new("Aspect"));
        assert_eq!(m.dom, None);
        assert_eq!(m.cod, None);
    }

    #[test]
    fn judgment_wire_format_uses_tag_and_camel_case_types() {
        let object = new_object_decl(TypeRef::new("Type"));
        let json = serde_json::to_value(ModelJudgment::Object(object.clone())).unwrap();
        assert_eq!(json["tag"], "object");
        assert_eq!(json["obType"], "Type");
        assert_eq!(json["id"], object.id.to_string());

        let morphism = new_morphism_decl(TypeRef::new("Aspect"));
        let json = serde_json::to_value(ModelJudgment::Morphism(morphism)).unwrap();
        assert_eq!(json["tag"], "morphism");
        assert_eq!(json["morType"], "Aspect");
        assert!(json["dom"].is_null());
    }

    #[test]
    fn morphism_without_endpoint_fields_deserializes_as_unset() {
        let value = serde_json::json!({
            "tag": "morphism",
            "id": "11111111-2222-4333-8444-555555555555",
            "name": "f",
            "morType": "Aspect"
        });
        let judgment: ModelJudgment = serde_json::from_value(value).unwrap();
        let morphism = judgment.as_morphism().expect("morphism variant");
        assert_eq!(morphism.dom, None);
        assert_eq!(morphism.cod, None);
    }
}
