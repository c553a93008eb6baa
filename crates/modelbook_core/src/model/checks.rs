//! Diagnostics over a model notebook.
//!
//! # Responsibility
//! - Report unset and dangling morphism endpoints.
//! - Report declarations whose type the resolved theory does not declare.
//!
//! # Invariants
//! - Diagnostics never block editing; they are advisory only.
//! - Issues are reported in notebook order.
//! - Without a theory, type references are not checked.

use crate::model::context::ObjectNameMap;
use crate::model::document::NotebookModel;
use crate::model::ids::{EntityId, TypeRef};
use crate::model::judgment::ModelJudgment;
use crate::theory::meta::{TheoryMeta, TypeTag};
use crate::validate::Validate;
use std::fmt::{Display, Formatter};

/// Which end of a morphism an issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Dom,
    Cod,
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Dom => f.write_str("domain"),
            Self::Cod => f.write_str("codomain"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelIssue {
    UnsetEndpoint {
        morphism: EntityId,
        endpoint: Endpoint,
    },
    /// The endpoint refers to an object not declared in the notebook.
    DanglingEndpoint {
        morphism: EntityId,
        endpoint: Endpoint,
        target: EntityId,
    },
    UnknownObType {
        object: EntityId,
        ob_type: TypeRef,
    },
    UnknownMorType {
        morphism: EntityId,
        mor_type: TypeRef,
    },
}

impl ModelIssue {
    /// Declaration the issue is attached to.
    pub fn subject(&self) -> EntityId {
        match self {
            Self::UnsetEndpoint { morphism, .. }
            | Self::DanglingEndpoint { morphism, .. }
            | Self::UnknownMorType { morphism, .. } => *morphism,
            Self::UnknownObType { object, .. } => *object,
        }
    }
}

impl Display for ModelIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsetEndpoint { morphism, endpoint } => {
                write!(f, "morphism {morphism} has no {endpoint}")
            }
            Self::DanglingEndpoint {
                morphism,
                endpoint,
                target,
            } => write!(f, "{endpoint} of morphism {morphism} refers to missing object {target}"),
            Self::UnknownObType { object, ob_type } => {
                write!(f, "object {object} has undeclared type `{ob_type}`")
            }
            Self::UnknownMorType { morphism, mor_type } => {
                write!(f, "morphism {morphism} has undeclared type `{mor_type}`")
            }
        }
    }
}

impl std::error::Error for ModelIssue {}

/// A notebook checked against its name index and resolved theory.
pub struct ModelCheck<'a> {
    pub model: &'a NotebookModel,
    pub names: &'a ObjectNameMap,
    pub theory: Option<&'a TheoryMeta>,
}

impl Validate for ModelCheck<'_> {
    type ValidationError = ModelIssue;

    fn iter_invalid(&self) -> impl Iterator<Item = ModelIssue> {
        self.model
            .notebook
            .formal_contents()
            .flat_map(|judgment| self.judgment_issues(judgment))
    }
}

impl ModelCheck<'_> {
    fn judgment_issues(&self, judgment: &ModelJudgment) -> Vec<ModelIssue> {
        let mut issues = Vec::new();
        match judgment {
            ModelJudgment::Object(object) => {
                if let Some(theory) = self.theory {
                    if !theory.declares(&object.ob_type, TypeTag::ObType) {
                        issues.push(ModelIssue::UnknownObType {
                            object: object.id,
                            ob_type: object.ob_type.clone(),
                        });
                    }
                }
            }
            ModelJudgment::Morphism(morphism) => {
                if let Some(theory) = self.theory {
                    if !theory.declares(&morphism.mor_type, TypeTag::MorType) {
                        issues.push(ModelIssue::UnknownMorType {
                            morphism: morphism.id,
                            mor_type: morphism.mor_type.clone(),
                        });
                    }
                }
                for (endpoint, target) in [(Endpoint::Dom, morphism.dom), (Endpoint::Cod, morphism.cod)]
                {
                    match target {
                        None => issues.push(ModelIssue::UnsetEndpoint {
                            morphism: morphism.id,
                            endpoint,
                        }),
                        Some(target) if !self.names.contains_key(&target) => {
                            issues.push(ModelIssue::DanglingEndpoint {
                                morphism: morphism.id,
                                endpoint,
                                target,
                            })
                        }
                        Some(_) => {}
                    }
                }
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::{Endpoint, ModelCheck, ModelIssue};
    use crate::model::document::NotebookModel;
    use crate::model::ids::{EntityId, TheoryId, TypeRef};
    use crate::model::judgment::{new_morphism_decl, new_object_decl, ModelJudgment};
    use crate::model::projection::object_name_map;
    use crate::notebook::cell::new_formal_cell;
    use crate::theory::catalog::TheoryCatalog;
    use crate::validate::Validate;

    #[test]
    fn complete_model_is_valid() {
        let object = new_object_decl(TypeRef::new("Type"));
        let mut morphism = new_morphism_decl(TypeRef::new("Aspect"));
        morphism.dom = Some(object.id);
        morphism.cod = Some(object.id);
        let mut model = NotebookModel::new("m").with_theory(Some(TheoryId::new("simple-olog")));
        model.notebook.push(new_formal_cell(ModelJudgment::Object(object)));
        model.notebook.push(new_formal_cell(ModelJudgment::Morphism(morphism)));

        let catalog = TheoryCatalog::builtin().unwrap();
        let theory = catalog.resolve(model.theory.as_ref());
        let names = object_name_map(&model.notebook);
        let check = ModelCheck {
            model: &model,
            names: &names,
            theory: theory.as_deref(),
        };
        assert!(check.validate().is_ok());
    }

    #[test]
    fn reports_unset_dangling_and_unknown_types_in_order() {
        let object = new_object_decl(TypeRef::new("Nonsense"));
        let ghost = EntityId::new();
        let mut morphism = new_morphism_decl(TypeRef::new("Aspect"));
        morphism.cod = Some(ghost);
        let morphism_id = morphism.id;
        let object_id = object.id;
        let mut model = NotebookModel::new("m");
        model.notebook.push(new_formal_cell(ModelJudgment::Object(object)));
        model.notebook.push(new_formal_cell(ModelJudgment::Morphism(morphism)));

        let catalog = TheoryCatalog::builtin().unwrap();
        let theory = catalog.get(&TheoryId::new("simple-olog"));
        let names = object_name_map(&model.notebook);
        let check = ModelCheck {
            model: &model,
            names: &names,
            theory: theory.as_deref(),
        };
        let issues: Vec<_> = check.iter_invalid().collect();
        assert_eq!(
            issues,
            vec![
                ModelIssue::UnknownObType {
                    object: object_id,
                    ob_type: TypeRef::new("Nonsense"),
                },
                ModelIssue::UnsetEndpoint {
                    morphism: morphism_id,
                    endpoint: Endpoint::Dom,
                },
                ModelIssue::DanglingEndpoint {
                    morphism: morphism_id,
                    endpoint: Endpoint::Cod,
                    target: ghost,
                },
            ]
        );
        assert_eq!(issues[2].subject(), morphism_id);
    }

    #[test]
    fn types_are_unchecked_without_theory() {
        let mut model = NotebookModel::new("m");
        model.notebook.push(new_formal_cell(ModelJudgment::Object(new_object_decl(
            TypeRef::new("Anything"),
        ))));
        let names = object_name_map(&model.notebook);
        let check = ModelCheck {
            model: &model,
            names: &names,
            theory: None,
        };
        assert!(check.validate().is_ok());
    }
}
