//! Core configuration loaded from TOML.
//!
//! # Responsibility
//! - Describe where logs and documents live, which theory catalog to load and
//!   which shortcut modifier to use.
//! - Build the catalog and document store a configuration names.
//!
//! # Invariants
//! - Unknown keys are rejected, so typos fail loudly.
//! - Every key is optional; an empty file yields the defaults.

use crate::logging::default_log_level;
use crate::notebook::constructor::ModifierKey;
use crate::repo::document_repo::{RepoResult, SqliteDocumentRepository};
use crate::theory::catalog::{CatalogError, TheoryCatalog};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    InvalidValue { key: &'static str, value: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { key, value } => {
                write!(f, "invalid value `{value}` for config key `{key}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoreConfig {
    #[serde(default = "default_level")]
    pub log_level: String,
    /// Absolute directory for rolling log files; logging stays off if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// SQLite document store; in-memory if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<PathBuf>,
    /// JSON theory catalog; the builtin catalog if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theory_catalog: Option<PathBuf>,
    /// `control` or `alt`; the host default if unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut_modifier: Option<String>,
}

fn default_level() -> String {
    default_log_level().to_string()
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_level(),
            log_dir: None,
            db_path: None,
            theory_catalog: None,
            shortcut_modifier: None,
        }
    }
}

impl CoreConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.modifier()?;
        Ok(config)
    }

    /// Shortcut modifier: the configured one, else the host default.
    pub fn modifier(&self) -> Result<ModifierKey, ConfigError> {
        match &self.shortcut_modifier {
            None => Ok(ModifierKey::host()),
            Some(value) => ModifierKey::parse(value).ok_or_else(|| ConfigError::InvalidValue {
                key: "shortcut_modifier",
                value: value.clone(),
            }),
        }
    }

    pub fn catalog(&self) -> Result<TheoryCatalog, CatalogError> {
        match &self.theory_catalog {
            Some(path) => TheoryCatalog::load(path),
            None => TheoryCatalog::builtin(),
        }
    }

    pub fn open_store(&self) -> RepoResult<SqliteDocumentRepository> {
        match &self.db_path {
            Some(path) => SqliteDocumentRepository::open(path),
            None => SqliteDocumentRepository::open_in_memory(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};
    use crate::logging::default_log_level;
    use crate::notebook::constructor::ModifierKey;
    use std::io::Write;

    #[test]
    fn empty_config_uses_defaults() {
        let config = CoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.log_level, default_log_level());
        assert_eq!(config.modifier().unwrap(), ModifierKey::host());
        assert_eq!(config.catalog().unwrap().len(), 3);
    }

    #[test]
    fn reads_all_keys() {
        let config = CoreConfig::from_toml_str(
            r#"
            log_level = "warn"
            log_dir = "/var/log/modelbook"
            db_path = "/tmp/notebooks.db"
            shortcut_modifier = "Control"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.db_path.as_deref(), Some(std::path::Path::new("/tmp/notebooks.db")));
        assert_eq!(config.modifier().unwrap(), ModifierKey::Control);
    }

    #[test]
    fn rejects_unknown_keys_and_bad_modifier() {
        assert!(matches!(
            CoreConfig::from_toml_str("colour = \"blue\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            CoreConfig::from_toml_str("shortcut_modifier = \"hyper\""),
            Err(ConfigError::InvalidValue { key: "shortcut_modifier", .. })
        ));
    }

    #[test]
    fn loads_from_file_and_reports_missing_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "shortcut_modifier = \"alt\"").unwrap();
        let config = CoreConfig::load(file.path()).unwrap();
        assert_eq!(config.modifier().unwrap(), ModifierKey::Alt);

        let missing = file.path().with_extension("missing");
        assert!(matches!(CoreConfig::load(&missing), Err(ConfigError::Io { .. })));
    }
}
