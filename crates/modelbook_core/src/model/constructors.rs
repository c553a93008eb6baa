//! Cell constructor registry for model notebooks.
//!
//! # Responsibility
//! - List the insertion options for a notebook under its active theory:
//!   a fixed text option, then one option per declared type.
//! - Recompute the list only when the active theory changes.
//!
//! # Invariants
//! - With no theory, the list holds exactly the text option.
//! - An option built from an `ob_type` constructs object declarations and
//!   one built from a `mor_type` constructs morphism declarations.
//! - Shortcuts carry the platform modifier as their first key.

use crate::model::ids::TheoryId;
use crate::model::judgment::{new_morphism_decl, new_object_decl, ModelJudgment};
use crate::notebook::cell::{new_formal_cell, new_rich_text_cell};
use crate::notebook::constructor::{CellConstructor, ModifierKey, Shortcut};
use crate::theory::meta::{TheoryMeta, TypeTag};
use log::debug;
use std::sync::Arc;

pub type ModelCellConstructor = CellConstructor<ModelJudgment>;

/// Builds the insertion options for `theory`.
pub fn model_cell_constructors(
    theory: Option<&TheoryMeta>,
    modifier: ModifierKey,
) -> Vec<ModelCellConstructor> {
    let mut result = vec![ModelCellConstructor::new("Text", new_rich_text_cell)
        .with_shortcut(Some(Shortcut::with_modifier(modifier, &["T"])))];

    for typ in theory.map_or(&[][..], |theory| theory.types.as_slice()) {
        let id = typ.id.clone();
        let constructor = match typ.tag {
            TypeTag::ObType => ModelCellConstructor::new(typ.name.clone(), move || {
                new_formal_cell(ModelJudgment::Object(new_object_decl(id.clone())))
            }),
            TypeTag::MorType => ModelCellConstructor::new(typ.name.clone(), move || {
                new_formal_cell(ModelJudgment::Morphism(new_morphism_decl(id.clone())))
            }),
        };
        result.push(
            constructor
                .with_description(typ.description.clone())
                .with_shortcut(
                    typ.shortcut
                        .as_deref()
                        .map(|keys| Shortcut::with_modifier(modifier, keys)),
                ),
        );
    }
    result
}

/// Memoized insertion options, keyed by the active theory's id.
#[derive(Debug)]
pub struct ConstructorRegistry {
    modifier: ModifierKey,
    cached: Option<(Option<TheoryId>, Arc<Vec<ModelCellConstructor>>)>,
    builds: u64,
}

impl ConstructorRegistry {
    pub fn new(modifier: ModifierKey) -> Self {
        Self {
            modifier,
            cached: None,
            builds: 0,
        }
    }

    pub fn modifier(&self) -> ModifierKey {
        self.modifier
    }

    /// Options for `theory`, rebuilt only if the theory id differs from the
    /// previous call.
    pub fn constructors(&mut self, theory: Option<&TheoryMeta>) -> Arc<Vec<ModelCellConstructor>> {
        let key = theory.map(|theory| theory.id.clone());
        if let Some((cached_key, options)) = &self.cached {
            if *cached_key == key {
                return Arc::clone(options);
            }
        }

        let options = Arc::new(model_cell_constructors(theory, self.modifier));
        self.builds += 1;
        debug!(
            "event=constructor_registry module=model status=ok theory_id={} options={}",
            key.as_ref().map_or("none", TheoryId::as_str),
            options.len()
        );
        self.cached = Some((key, Arc::clone(&options)));
        options
    }

    /// How many times the option list has been built.
    pub fn build_count(&self) -> u64 {
        self.builds
    }
}

#[cfg(test)]
mod tests {
    use super::{model_cell_constructors, ConstructorRegistry};
    use crate::model::ids::TheoryId;
    use crate::model::judgment::ModelJudgment;
    use crate::notebook::cell::Cell;
    use crate::notebook::constructor::ModifierKey;
    use crate::theory::catalog::TheoryCatalog;
    use crate::theory::meta::TypeTag;

    #[test]
    fn without_theory_only_text_is_offered() {
        let options = model_cell_constructors(None, ModifierKey::Alt);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].name, "Text");
        assert_eq!(options[0].shortcut.as_ref().map(ToString::to_string), Some("Alt+T".into()));
        assert!(matches!(options[0].construct(), Cell::RichText(_)));
    }

    #[test]
    fn one_option_per_type_with_matching_judgment() {
        let catalog = TheoryCatalog::builtin().unwrap();
        let theory = catalog.get(&TheoryId::new("simple-schema")).unwrap();
        let options = model_cell_constructors(Some(&*theory), ModifierKey::Control);

        assert_eq!(options.len(), theory.types.len() + 1);
        for (typ, option) in theory.types.iter().zip(&options[1..]) {
            assert_eq!(option.name, typ.name);
            assert_eq!(option.shortcut.as_ref().unwrap().keys()[0], "Control");
            let cell = option.construct();
            let judgment = cell.formal().expect("formal cell");
            match (typ.tag, judgment) {
                (TypeTag::ObType, ModelJudgment::Object(object)) => {
                    assert_eq!(object.ob_type, typ.id)
                }
                (TypeTag::MorType, ModelJudgment::Morphism(morphism)) => {
                    assert_eq!(morphism.mor_type, typ.id)
                }
                (tag, judgment) => panic!("{tag:?} constructed {}", judgment.tag()),
            }
        }
    }

    #[test]
    fn each_construction_mints_fresh_ids() {
        let catalog = TheoryCatalog::builtin().unwrap();
        let theory = catalog.get(&TheoryId::new("simple-olog")).unwrap();
        let options = model_cell_constructors(Some(&*theory), ModifierKey::Alt);
        let first = options[1].construct();
        let second = options[1].construct();
        assert_ne!(first.id(), second.id());
        assert_ne!(first.formal().unwrap().id(), second.formal().unwrap().id());
    }

    #[test]
    fn registry_rebuilds_only_on_theory_change() {
        let catalog = TheoryCatalog::builtin().unwrap();
        let olog = catalog.get(&TheoryId::new("simple-olog"));
        let mut registry = ConstructorRegistry::new(ModifierKey::Alt);

        assert_eq!(registry.constructors(None).len(), 1);
        assert_eq!(registry.constructors(None).len(), 1);
        assert_eq!(registry.build_count(), 1);

        assert_eq!(registry.constructors(olog.as_deref()).len(), 3);
        assert_eq!(registry.constructors(olog.as_deref()).len(), 3);
        assert_eq!(registry.build_count(), 2);
    }
}
