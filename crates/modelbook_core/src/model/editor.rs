//! Judgment editors: dispatch from a model judgment to its variant editor.
//!
//! # Responsibility
//! - Route every formal cell of a model notebook to exactly one of the
//!   object or morphism editors by matching on the judgment variant.
//! - Narrow the cell's change lens to the matched variant before handing it
//!   to that editor.
//! - Present weak references (`dom`, `cod`, declared types) as resolved or
//!   unresolved through the ambient `ModelContext`.
//!
//! # Invariants
//! - Dispatch is an exhaustive `match`; adding a judgment variant requires a
//!   new arm here.
//! - A narrowed lens edits the declaration in place; it never copies the
//!   declaration out and back.
//! - Unresolved references render as placeholders, never as errors.

use crate::model::context::ModelContext;
use crate::model::ids::{EntityId, TypeRef};
use crate::model::judgment::{ModelJudgment, MorphismDecl, ObjectDecl};
use crate::notebook::editor::{
    with_narrowed_lens, CellProps, ChangeFn, EditError, FormalCellEditor,
};
use crate::theory::meta::TypeTag;

/// Declared type of a judgment as the active theory knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeView {
    pub id: TypeRef,
    /// Display name from the theory; `None` when the theory does not
    /// declare this type (or no theory is active).
    pub name: Option<String>,
}

/// A weak reference to an object, as seen through the name index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefView {
    Unset,
    Resolved { id: EntityId, name: String },
    /// The referenced object is not declared in the notebook (yet).
    Dangling { id: EntityId },
}

impl RefView {
    pub fn id(&self) -> Option<EntityId> {
        match self {
            Self::Unset => None,
            Self::Resolved { id, .. } | Self::Dangling { id } => Some(*id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectView {
    pub id: EntityId,
    pub name: String,
    pub ob_type: TypeView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MorphismView {
    pub id: EntityId,
    pub name: String,
    pub mor_type: TypeView,
    pub dom: RefView,
    pub cod: RefView,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgmentView {
    Object(ObjectView),
    Morphism(MorphismView),
}

impl JudgmentView {
    pub fn id(&self) -> EntityId {
        match self {
            Self::Object(view) => view.id,
            Self::Morphism(view) => view.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectEdit {
    SetName(String),
    SetObType(TypeRef),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MorphismEdit {
    SetName(String),
    SetMorType(TypeRef),
    SetDom(Option<EntityId>),
    SetCod(Option<EntityId>),
    /// Points `dom` at the first object with this name; clears it when no
    /// object has the name.
    SetDomByName(String),
    SetCodByName(String),
}

/// Edit addressed to a formal cell of a model notebook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JudgmentEdit {
    Object(ObjectEdit),
    Morphism(MorphismEdit),
}

impl JudgmentEdit {
    /// Tag of the judgment variant this edit applies to.
    pub fn target_tag(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Morphism(_) => "morphism",
        }
    }
}

/// Editor for object declarations.
pub struct ObjectCellEditor<'a> {
    context: &'a ModelContext,
}

impl<'a> ObjectCellEditor<'a> {
    pub fn new(context: &'a ModelContext) -> Self {
        Self { context }
    }
}

impl FormalCellEditor<ObjectDecl> for ObjectCellEditor<'_> {
    type View = ObjectView;
    type Edit = ObjectEdit;

    fn render(&self, props: &CellProps<'_, ObjectDecl>) -> ObjectView {
        let object = props.content;
        ObjectView {
            id: object.id,
            name: object.name.clone(),
            ob_type: type_view(self.context, &object.ob_type, TypeTag::ObType),
        }
    }

    fn edit(&self, props: &CellProps<'_, ObjectDecl>, edit: ObjectEdit) -> Result<(), EditError> {
        let mut edit = Some(edit);
        (props.change)(&mut |object: &mut ObjectDecl| match edit.take() {
            Some(ObjectEdit::SetName(name)) => object.name = name,
            Some(ObjectEdit::SetObType(ob_type)) => object.ob_type = ob_type,
            None => {}
        });
        Ok(())
    }
}

/// Editor for morphism declarations.
pub struct MorphismCellEditor<'a> {
    context: &'a ModelContext,
}

impl<'a> MorphismCellEditor<'a> {
    pub fn new(context: &'a ModelContext) -> Self {
        Self { context }
    }

    fn resolve(&self, reference: Option<EntityId>) -> RefView {
        match reference {
            None => RefView::Unset,
            Some(id) => match self.context.object_name(id) {
                Some(name) => RefView::Resolved {
                    id,
                    name: name.to_string(),
                },
                None => RefView::Dangling { id },
            },
        }
    }

    fn lookup(&self, name: &str) -> Option<EntityId> {
        self.context.objects_named(name).first().copied()
    }
}

impl FormalCellEditor<MorphismDecl> for MorphismCellEditor<'_> {
    type View = MorphismView;
    type Edit = MorphismEdit;

    fn render(&self, props: &CellProps<'_, MorphismDecl>) -> MorphismView {
        let morphism = props.content;
        MorphismView {
            id: morphism.id,
            name: morphism.name.clone(),
            mor_type: type_view(self.context, &morphism.mor_type, TypeTag::MorType),
            dom: self.resolve(morphism.dom),
            cod: self.resolve(morphism.cod),
        }
    }

    fn edit(
        &self,
        props: &CellProps<'_, MorphismDecl>,
        edit: MorphismEdit,
    ) -> Result<(), EditError> {
        // Names resolve against the index the cell was rendered with.
        let edit = match edit {
            MorphismEdit::SetDomByName(name) => MorphismEdit::SetDom(self.lookup(&name)),
            MorphismEdit::SetCodByName(name) => MorphismEdit::SetCod(self.lookup(&name)),
            other => other,
        };
        let mut edit = Some(edit);
        (props.change)(&mut |morphism: &mut MorphismDecl| match edit.take() {
            Some(MorphismEdit::SetName(name)) => morphism.name = name,
            Some(MorphismEdit::SetMorType(mor_type)) => morphism.mor_type = mor_type,
            Some(MorphismEdit::SetDom(dom)) => morphism.dom = dom,
            Some(MorphismEdit::SetCod(cod)) => morphism.cod = cod,
            Some(MorphismEdit::SetDomByName(_) | MorphismEdit::SetCodByName(_)) | None => {}
        });
        Ok(())
    }
}

/// Formal cell editor for model notebooks: dispatches on the judgment
/// variant.
pub struct ModelCellEditor<'a> {
    context: &'a ModelContext,
}

impl<'a> ModelCellEditor<'a> {
    pub fn new(context: &'a ModelContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &ModelContext {
        self.context
    }
}

impl FormalCellEditor<ModelJudgment> for ModelCellEditor<'_> {
    type View = JudgmentView;
    type Edit = JudgmentEdit;

    fn render(&self, props: &CellProps<'_, ModelJudgment>) -> JudgmentView {
        match props.content {
            ModelJudgment::Object(object) => with_object_lens(props.change, |change| {
                let editor = ObjectCellEditor::new(self.context);
                JudgmentView::Object(editor.render(&narrow_props(props, object, change)))
            }),
            ModelJudgment::Morphism(morphism) => with_morphism_lens(props.change, |change| {
                let editor = MorphismCellEditor::new(self.context);
                JudgmentView::Morphism(editor.render(&narrow_props(props, morphism, change)))
            }),
        }
    }

    fn edit(
        &self,
        props: &CellProps<'_, ModelJudgment>,
        edit: JudgmentEdit,
    ) -> Result<(), EditError> {
        match (props.content, edit) {
            (ModelJudgment::Object(object), JudgmentEdit::Object(edit)) => {
                with_object_lens(props.change, |change| {
                    ObjectCellEditor::new(self.context)
                        .edit(&narrow_props(props, object, change), edit)
                })
            }
            (ModelJudgment::Morphism(morphism), JudgmentEdit::Morphism(edit)) => {
                with_morphism_lens(props.change, |change| {
                    MorphismCellEditor::new(self.context)
                        .edit(&narrow_props(props, morphism, change), edit)
                })
            }
            (content, edit) => Err(EditError::VariantMismatch {
                expected: edit.target_tag(),
                found: content.tag(),
            }),
        }
    }
}

fn narrow_props<'a, S, T>(
    props: &CellProps<'a, S>,
    content: &'a T,
    change: ChangeFn<'a, T>,
) -> CellProps<'a, T> {
    CellProps {
        content,
        change,
        is_active: props.is_active,
        actions: props.actions,
    }
}

fn with_object_lens<R>(
    change: ChangeFn<'_, ModelJudgment>,
    f: impl FnOnce(ChangeFn<'_, ObjectDecl>) -> R,
) -> R {
    with_narrowed_lens(
        change,
        |judgment: &mut ModelJudgment| match judgment {
            ModelJudgment::Object(object) => Some(object),
            ModelJudgment::Morphism(_) => None,
        },
        f,
    )
}

fn with_morphism_lens<R>(
    change: ChangeFn<'_, ModelJudgment>,
    f: impl FnOnce(ChangeFn<'_, MorphismDecl>) -> R,
) -> R {
    with_narrowed_lens(
        change,
        |judgment: &mut ModelJudgment| match judgment {
            ModelJudgment::Morphism(morphism) => Some(morphism),
            ModelJudgment::Object(_) => None,
        },
        f,
    )
}

fn type_view(context: &ModelContext, id: &TypeRef, tag: TypeTag) -> TypeView {
    let name = context
        .theory()
        .and_then(|theory| theory.type_meta(id))
        .filter(|typ| typ.tag == tag)
        .map(|typ| typ.name.clone());
    TypeView {
        id: id.clone(),
        name,
    }
}

#[cfg(test)]
mod tests {
    use super::{
        JudgmentEdit, JudgmentView, ModelCellEditor, MorphismEdit, ObjectEdit, RefView, TypeView,
    };
    use crate::model::context::{ModelContext, ObjectNameMap};
    use crate::model::ids::{EntityId, TheoryId, TypeRef};
    use crate::model::judgment::{new_morphism_decl, new_object_decl, ModelJudgment};
    use crate::notebook::editor::{CellActions, CellProps, EditError, FormalCellEditor};
    use crate::theory::catalog::TheoryCatalog;
    use std::cell::RefCell;
    use std::sync::Arc;

    fn context(names: &[(EntityId, &str)]) -> ModelContext {
        let names: ObjectNameMap = names
            .iter()
            .map(|(id, name)| (*id, name.to_string()))
            .collect();
        let catalog = TheoryCatalog::builtin().unwrap();
        ModelContext::new(Arc::new(names), catalog.get(&TheoryId::new("simple-olog")))
    }

    /// Runs `f` with props over a judgment held in a `RefCell`, so edits made
    /// through the lens are visible afterwards.
    fn with_props<R>(
        judgment: &RefCell<ModelJudgment>,
        f: impl FnOnce(&CellProps<'_, ModelJudgment>) -> R,
    ) -> R {
        let content = judgment.borrow().clone();
        let actions = CellActions::new();
        let change = |g: &mut dyn FnMut(&mut ModelJudgment)| g(&mut *judgment.borrow_mut());
        f(&CellProps {
            content: &content,
            change: &change,
            is_active: false,
            actions: &actions,
        })
    }

    #[test]
    fn each_variant_renders_through_its_own_editor() {
        let object = new_object_decl(TypeRef::new("Type"));
        let morphism = new_morphism_decl(TypeRef::new("Aspect"));
        let context = context(&[]);
        let editor = ModelCellEditor::new(&context);

        let object_view = with_props(&RefCell::new(ModelJudgment::Object(object.clone())), |props| {
            editor.render(props)
        });
        let morphism_view =
            with_props(&RefCell::new(ModelJudgment::Morphism(morphism.clone())), |props| {
                editor.render(props)
            });

        match object_view {
            JudgmentView::Object(view) => {
                assert_eq!(view.id, object.id);
                assert_eq!(view.ob_type.name.as_deref(), Some("Type"));
            }
            other => panic!("object rendered as {other:?}"),
        }
        match morphism_view {
            JudgmentView::Morphism(view) => {
                assert_eq!(view.id, morphism.id);
                assert_eq!(view.dom, RefView::Unset);
            }
            other => panic!("morphism rendered as {other:?}"),
        }
    }

    #[test]
    fn narrowed_edit_changes_only_the_target_field() {
        let object = new_object_decl(TypeRef::new("Type"));
        let id = object.id;
        let cell = RefCell::new(ModelJudgment::Object(object));
        let context = context(&[]);
        let editor = ModelCellEditor::new(&context);

        with_props(&cell, |props| {
            editor.edit(props, JudgmentEdit::Object(ObjectEdit::SetName("person".into())))
        })
        .unwrap();

        let judgment = cell.borrow();
        let object = judgment.as_object().expect("still an object");
        assert_eq!(object.id, id);
        assert_eq!(object.name, "person");
        assert_eq!(object.ob_type, TypeRef::new("Type"));
    }

    #[test]
    fn mismatched_edit_is_rejected() {
        let cell = RefCell::new(ModelJudgment::Object(new_object_decl(TypeRef::new("Type"))));
        let before = cell.borrow().clone();
        let context = context(&[]);
        let editor = ModelCellEditor::new(&context);

        let err = with_props(&cell, |props| {
            editor.edit(props, JudgmentEdit::Morphism(MorphismEdit::SetDom(None)))
        })
        .unwrap_err();

        assert_eq!(
            err,
            EditError::VariantMismatch {
                expected: "morphism",
                found: "object"
            }
        );
        assert_eq!(*cell.borrow(), before);
    }

    #[test]
    fn references_resolve_or_dangle() {
        let known = EntityId::new();
        let ghost = EntityId::new();
        let mut morphism = new_morphism_decl(TypeRef::new("Aspect"));
        morphism.dom = Some(known);
        morphism.cod = Some(ghost);
        let context = context(&[(known, "person")]);
        let editor = ModelCellEditor::new(&context);

        let view = with_props(&RefCell::new(ModelJudgment::Morphism(morphism)), |props| {
            editor.render(props)
        });
        let JudgmentView::Morphism(view) = view else {
            panic!("expected morphism view");
        };
        assert_eq!(
            view.dom,
            RefView::Resolved {
                id: known,
                name: "person".into()
            }
        );
        assert_eq!(view.cod, RefView::Dangling { id: ghost });
        assert_eq!(view.cod.id(), Some(ghost));
    }

    #[test]
    fn endpoint_by_name_uses_first_match_and_clears_on_unknown() {
        let (first, second) = (EntityId::new(), EntityId::new());
        let context = context(&[(first, "x"), (second, "x")]);
        let editor = ModelCellEditor::new(&context);
        let mut morphism = new_morphism_decl(TypeRef::new("Aspect"));
        morphism.cod = Some(second);
        let cell = RefCell::new(ModelJudgment::Morphism(morphism));

        with_props(&cell, |props| {
            editor.edit(props, JudgmentEdit::Morphism(MorphismEdit::SetDomByName("x".into())))
        })
        .unwrap();
        with_props(&cell, |props| {
            editor.edit(props, JudgmentEdit::Morphism(MorphismEdit::SetCodByName("y".into())))
        })
        .unwrap();

        let judgment = cell.borrow();
        let morphism = judgment.as_morphism().unwrap();
        assert_eq!(morphism.dom, Some(first));
        assert_eq!(morphism.cod, None);
    }

    #[test]
    fn type_unknown_to_theory_renders_placeholder() {
        let context = context(&[]);
        let editor = ModelCellEditor::new(&context);
        // Declared by the theory, but as a morphism type.
        let object = new_object_decl(TypeRef::new("Aspect"));

        let view = with_props(&RefCell::new(ModelJudgment::Object(object)), |props| {
            editor.render(props)
        });
        let JudgmentView::Object(view) = view else {
            panic!("expected object view");
        };
        assert_eq!(
            view.ob_type,
            TypeView {
                id: TypeRef::new("Aspect"),
                name: None
            }
        );
    }
}
