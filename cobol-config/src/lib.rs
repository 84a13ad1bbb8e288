//! Configuration for the COBOL language server
//!
//! Settings are resolved from layers, later layers winning key by key:
//!
//! 1. `defaults/cobol.default.toml`, compiled into the binary
//! 2. a user TOML file (`--config`), required or optional
//! 3. `COBOL_LSP_*` environment variables, `__` separating sections
//!    (`COBOL_LSP_LOGGING__FILTER=debug`); list keys take comma-separated values
//! 4. single-key overrides from the command line
//!
//! Lists are replaced, never merged: a user file that sets `documents.language_ids` defines
//! the whole accepted set.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, Source, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/cobol.default.toml");
const ENV_PREFIX: &str = "COBOL_LSP";
const LIST_KEYS: [&str; 2] = ["documents.language_ids", "completion.keywords"];

/// Top-level configuration consumed by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct CobolConfig {
    pub documents: DocumentsConfig,
    pub logging: LoggingConfig,
    pub completion: CompletionConfig,
}

/// Which documents the server analyzes.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    pub language_ids: Vec<String>,
}

impl DocumentsConfig {
    pub fn accepts_language(&self, language_id: &str) -> bool {
        self.language_ids.iter().any(|id| id == language_id)
    }

    /// Extensions are checked against the same identifier set.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.accepts_language(extension)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionConfig {
    pub keywords: Vec<String>,
}

/// Builds a [`CobolConfig`] from the embedded defaults plus whatever layers are added.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let defaults = File::from_str(DEFAULT_TOML, FileFormat::Toml);
        Self {
            builder: Config::builder().add_source(defaults),
        }
    }

    fn layer<T>(mut self, source: T) -> Self
    where
        T: Source + Send + Sync + 'static,
    {
        self.builder = self.builder.add_source(source);
        self
    }

    fn toml_file(path: &Path, required: bool) -> File<config::FileSourceFile, FileFormat> {
        File::from(path).format(FileFormat::Toml).required(required)
    }

    /// Layer a TOML file that must exist.
    pub fn with_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(Self::toml_file(path.as_ref(), true))
    }

    /// Layer a TOML file if it exists.
    pub fn with_optional_file(self, path: impl AsRef<Path>) -> Self {
        self.layer(Self::toml_file(path.as_ref(), false))
    }

    /// Layer `COBOL_LSP_*` variables from the process environment.
    pub fn with_env(self) -> Self {
        self.layer(environment())
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<CobolConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

fn environment() -> Environment {
    LIST_KEYS.iter().fold(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .list_separator(","),
        |env, key| env.with_list_parse_key(key),
    )
}

pub fn load_defaults() -> Result<CobolConfig, ConfigError> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(
            config.documents.language_ids,
            vec!["cobol", "cbl", "cob", "COBOL"]
        );
        assert_eq!(config.logging.filter, "info");
        assert!(config.completion.keywords.iter().any(|k| k == "PERFORM"));
    }

    #[test]
    fn language_ids_match_exactly() {
        let config = load_defaults().unwrap();
        assert!(config.documents.accepts_language("cobol"));
        assert!(config.documents.accepts_language("COBOL"));
        assert!(!config.documents.accepts_language("Cobol"));
        assert!(config.documents.accepts_extension("cbl"));
        assert!(!config.documents.accepts_extension("CBL"));
        assert!(!config.documents.accepts_extension("txt"));
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("logging.filter", "cobol_lsp=debug")
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.logging.filter, "cobol_lsp=debug");
    }

    #[test]
    fn user_file_replaces_lists() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[documents]\nlanguage_ids = [\"cobol\", \"cpy\"]").unwrap();

        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert_eq!(config.documents.language_ids, vec!["cobol", "cpy"]);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn environment_layer_overrides_file_values() {
        let vars = config::Map::from([
            ("COBOL_LSP_LOGGING__FILTER".to_string(), "warn".to_string()),
            (
                "COBOL_LSP_DOCUMENTS__LANGUAGE_IDS".to_string(),
                "cobol,cpy".to_string(),
            ),
        ]);
        let config = Loader::new()
            .layer(environment().source(Some(vars)))
            .build()
            .unwrap();
        assert_eq!(config.logging.filter, "warn");
        assert_eq!(config.documents.language_ids, vec!["cobol", "cpy"]);
    }

    #[test]
    fn package_metadata_is_inherited_from_the_workspace() {
        assert_eq!(env!("CARGO_PKG_LICENSE"), "MIT");
        assert_eq!(env!("CARGO_PKG_AUTHORS"), "cobol-ls contributors");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = Loader::new().with_file("/nonexistent/cobol-lsp.toml").build();
        assert!(result.is_err());

        let config = Loader::new()
            .with_optional_file("/nonexistent/cobol-lsp.toml")
            .build()
            .unwrap();
        assert_eq!(config.logging.filter, "info");
    }
}
