//! Cell insertion options offered by a notebook.

use crate::notebook::cell::Cell;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

/// Platform modifier key prefixed onto every insertion shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModifierKey {
    Control,
    Alt,
}

impl ModifierKey {
    /// Modifier for the host platform: Control on macOS, Alt elsewhere.
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::Control
        } else {
            Self::Alt
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Control => "Control",
            Self::Alt => "Alt",
        }
    }

    /// Parses a config value (`control` | `alt`, case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "control" | "ctrl" => Some(Self::Control),
            "alt" | "option" => Some(Self::Alt),
            _ => None,
        }
    }
}

/// Key chord, e.g. `["Alt", "T"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcut(Vec<String>);

impl Shortcut {
    /// Prefixes `modifier` onto the base keys.
    pub fn with_modifier<S: AsRef<str>>(modifier: ModifierKey, keys: &[S]) -> Self {
        let mut chord = Vec::with_capacity(keys.len() + 1);
        chord.push(modifier.as_str().to_string());
        chord.extend(keys.iter().map(|key| key.as_ref().to_string()));
        Self(chord)
    }

    pub fn keys(&self) -> &[String] {
        &self.0
    }
}

impl Display for Shortcut {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.join("+"))
    }
}

type ConstructFn<T> = Arc<dyn Fn() -> Cell<T> + Send + Sync>;

/// One entry of the notebook's "insert cell" menu.
pub struct CellConstructor<T> {
    pub name: String,
    pub description: Option<String>,
    pub shortcut: Option<Shortcut>,
    construct: ConstructFn<T>,
}

impl<T> CellConstructor<T> {
    pub fn new(
        name: impl Into<String>,
        construct: impl Fn() -> Cell<T> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            description: None,
            shortcut: None,
            construct: Arc::new(construct),
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_shortcut(mut self, shortcut: Option<Shortcut>) -> Self {
        self.shortcut = shortcut;
        self
    }

    /// Builds a fresh cell. Every call mints new identities.
    pub fn construct(&self) -> Cell<T> {
        (self.construct)()
    }
}

impl<T> Clone for CellConstructor<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            description: self.description.clone(),
            shortcut: self.shortcut.clone(),
            construct: Arc::clone(&self.construct),
        }
    }
}

impl<T> Debug for CellConstructor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CellConstructor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("shortcut", &self.shortcut)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{CellConstructor, ModifierKey, Shortcut};
    use crate::notebook::cell::new_rich_text_cell;

    #[test]
    fn shortcut_prefixes_modifier() {
        let shortcut = Shortcut::with_modifier(ModifierKey::Alt, &["O"]);
        assert_eq!(shortcut.keys(), ["Alt".to_string(), "O".to_string()]);
        assert_eq!(shortcut.to_string(), "Alt+O");
    }

    #[test]
    fn parses_modifier_config_values() {
        assert_eq!(ModifierKey::parse(" Control "), Some(ModifierKey::Control));
        assert_eq!(ModifierKey::parse("alt"), Some(ModifierKey::Alt));
        assert_eq!(ModifierKey::parse("hyper"), None);
    }

    #[test]
    fn construct_mints_fresh_cells() {
        let constructor = CellConstructor::<u32>::new("Text", new_rich_text_cell);
        assert_ne!(constructor.construct().id(), constructor.construct().id());
    }
}
