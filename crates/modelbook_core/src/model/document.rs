//! Root document value of a model notebook.
//!
//! # Invariants
//! - Field names (`name`, `theory`, `notebook.cells`) are the durable
//!   persisted layout; renaming them is a breaking schema change.
//! - `theory` is a weak reference into the theory catalog.

use crate::model::ids::TheoryId;
use crate::model::judgment::{ModelJudgment, ObjectDecl};
use crate::notebook::cells::Notebook;
use serde::{Deserialize, Serialize};

/// Notebook of model judgments.
pub type ModelNotebook = Notebook<ModelJudgment>;

/// A model: a named notebook of judgments typed against an optional theory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotebookModel {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory: Option<TheoryId>,
    #[serde(default)]
    pub notebook: ModelNotebook,
}

impl NotebookModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            theory: None,
            notebook: Notebook::new(),
        }
    }

    pub fn with_theory(mut self, theory: Option<TheoryId>) -> Self {
        self.theory = theory;
        self
    }

    /// Object declarations in notebook order.
    pub fn object_decls(&self) -> impl Iterator<Item = &ObjectDecl> {
        self.notebook
            .formal_contents()
            .filter_map(ModelJudgment::as_object)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::NotebookModel;
    use crate::model::ids::TheoryId;

    #[test]
    fn decodes_persisted_layout() {
        let json = r#"{
            "name": "Family",
            "theory": "simple-olog",
            "notebook": { "cells": [
                { "tag": "rich-text", "content": "People and parents" },
                { "tag": "formal", "content": {
                    "tag": "object",
                    "id": "11111111-2222-4333-8444-555555555555",
                    "name": "person",
                    "obType": "Type"
                } },
                { "tag": "formal", "content": {
                    "tag": "morphism",
                    "id": "21111111-2222-4333-8444-555555555555",
                    "name": "has mother",
                    "morType": "Aspect",
                    "dom": "11111111-2222-4333-8444-555555555555",
                    "cod": "11111111-2222-4333-8444-555555555555"
                } }
            ] }
        }"#;
        let model = NotebookModel::from_json(json).unwrap();
        assert_eq!(model.name, "Family");
        assert_eq!(model.theory, Some(TheoryId::new("simple-olog")));
        assert_eq!(model.notebook.len(), 3);
        assert_eq!(
            model.object_decls().map(|o| o.name.as_str()).collect::<Vec<_>>(),
            vec!["person"]
        );
    }

    #[test]
    fn absent_theory_is_omitted_on_write() {
        let model = NotebookModel::new("Empty");
        let json: serde_json::Value = serde_json::from_str(&model.to_json().unwrap()).unwrap();
        assert!(json.get("theory").is_none());
        assert_eq!(json["notebook"]["cells"], serde_json::json!([]));
    }
}
