//! Configuration loader, typed ingestion settings and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + the legacy
//! `OBSIDIAN_VAULT_PATH` variable + `APP_*` env vars (nested keys split on
//! `__`, e.g. `APP_EMBEDDING__MODEL`). Paths are expanded for `~` and
//! `${VAR}` after extraction.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::loader::LoaderConfig;
use crate::splitter::SplitterConfig;

pub const DEFAULT_PERSIST_DIR: &str = "vault_index";
pub const DEFAULT_TABLE: &str = "documents";
pub const DEFAULT_EMBEDDING_MODEL: &str = "nomic-embed-text";
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment
            .merge(Env::raw().only(&["OBSIDIAN_VAULT_PATH"]).map(|_| "vault_path".into()))
            .merge(Env::prefixed("APP_").split("__"));

        Ok(Self { figment })
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    /// Layer explicit overrides (usually command-line flags) on top.
    pub fn merge<T: Serialize>(self, overrides: T) -> Self {
        Self { figment: self.figment.merge(Serialized::defaults(overrides)) }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Extract and validate the settings for one ingestion run.
    pub fn settings(&self) -> Result<IngestSettings> {
        let vault: Option<String> = self.figment.extract_inner("vault_path").ok();
        if vault.as_deref().map_or(true, |v| v.trim().is_empty()) {
            return Err(Error::InvalidConfig(
                "vault_path is not set (config.toml, APP_VAULT_PATH or OBSIDIAN_VAULT_PATH)".to_string(),
            ));
        }
        let settings: IngestSettings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        let settings = settings.expanded();
        settings.validate()?;
        Ok(settings)
    }
}

/// Everything one ingestion run needs, read once at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    pub vault_path: PathBuf,
    #[serde(default = "default_persist_dir")]
    pub persist_dir: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub splitter: SplitterConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

impl IngestSettings {
    /// Settings with defaults for everything but the vault root.
    pub fn with_vault(vault_path: impl Into<PathBuf>) -> Self {
        Self {
            vault_path: vault_path.into(),
            persist_dir: default_persist_dir(),
            table: default_table(),
            loader: LoaderConfig::default(),
            splitter: SplitterConfig::default(),
            embedding: EmbeddingConfig::default(),
            store: StoreConfig::default(),
        }
    }

    fn expanded(mut self) -> Self {
        self.vault_path = expand_path(self.vault_path.to_string_lossy());
        self.persist_dir = expand_path(self.persist_dir.to_string_lossy());
        self
    }

    fn validate(&self) -> Result<()> {
        if self.table.trim().is_empty() {
            return Err(Error::InvalidConfig("table name must not be empty".to_string()));
        }
        if self.embedding.model.trim().is_empty() {
            return Err(Error::InvalidConfig("embedding.model must not be empty".to_string()));
        }
        if self.store.batch_size == 0 {
            return Err(Error::InvalidConfig("store.batch_size must be at least 1".to_string()));
        }
        self.splitter.validate()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub batch_size: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { batch_size: 1000 }
    }
}

fn default_persist_dir() -> PathBuf { PathBuf::from(DEFAULT_PERSIST_DIR) }

fn default_table() -> String { DEFAULT_TABLE.to_string() }

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}
