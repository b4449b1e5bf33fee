use crate::storage::DEFAULT_STORAGE_KEY;
use camino::{Utf8Path, Utf8PathBuf};
use config::{Config, Environment, File};
use serde::Deserialize;

pub use config::ConfigError;

/// Settings used by [`RecipeStore::from_config`](crate::RecipeStore::from_config).
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Directory holding the persisted `<storage_key>.json` documents.
    /// Without it the store lives in memory only.
    #[serde(default)]
    pub storage_dir: Option<Utf8PathBuf>,
    /// Key the recipe array is stored under
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
    /// Directory of bundled JSON/YAML recipe fixtures loaded at startup
    #[serde(default)]
    pub fixtures_dir: Option<Utf8PathBuf>,
    /// Whether mutations are written to storage
    #[serde(default = "default_persist")]
    pub persist: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            storage_dir: None,
            storage_key: default_storage_key(),
            fixtures_dir: None,
            persist: default_persist(),
        }
    }
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_persist() -> bool {
    true
}

impl StoreConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_STORE__ prefix
    /// 2. recipe-store.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_STORE__STORAGE_DIR
    pub fn load() -> Result<Self, ConfigError> {
        build(File::with_name("recipe-store").required(false))
    }

    /// Like [`load`](Self::load), reading the file at `path` instead.
    pub fn load_from(path: &Utf8Path) -> Result<Self, ConfigError> {
        build(File::from(path.as_std_path()).required(true))
    }
}

fn build<S>(file: S) -> Result<StoreConfig, ConfigError>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = Config::builder()
        .add_source(file)
        .add_source(
            Environment::with_prefix("RECIPE_STORE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
