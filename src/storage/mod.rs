//! Persistence for the recipe store.
//!
//! Storage is a small key/value adapter: each key holds one JSON document.
//! [`Persistence`] writes the full recipe array under its key on every
//! mutation (overwrite, not append) and keeps favorites under a sibling
//! `<key>-favorites` key.

mod file;
mod fixtures;
mod memory;

pub use file::JsonFileStorage;
pub use fixtures::{load_fixtures, merge_recipes};
pub use memory::MemoryStorage;

use crate::model::{validate, Recipe, RecipeId};
use log::{debug, warn};
use thiserror::Error;

/// Key recipes are stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "recipes";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to access storage: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to encode or decode JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Failed to decode YAML fixture: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to read fixture directory: {0}")]
    GlobError(#[from] glob::GlobError),

    #[error("Failed to create glob pattern: {0}")]
    PatternError(#[from] glob::PatternError),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A key/value backend holding JSON documents.
pub trait RecipeStorage: Send + Sync {
    /// Returns the document stored under `key`, or `None` if nothing was
    /// written yet.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replaces the document stored under `key`.
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// State read back from storage at startup.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StoredState {
    pub recipes: Vec<Recipe>,
    pub favorites: Vec<RecipeId>,
}

/// Reads and writes the recipe collection through a [`RecipeStorage`].
pub struct Persistence {
    storage: Box<dyn RecipeStorage>,
    key: String,
}

impl Persistence {
    pub fn new(storage: impl RecipeStorage + 'static, key: impl Into<String>) -> Self {
        Persistence {
            storage: Box::new(storage),
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn favorites_key(&self) -> String {
        format!("{}-favorites", self.key)
    }

    /// Loads the stored recipes and favorites.
    ///
    /// Missing documents read as empty. Records that fail validation are
    /// skipped.
    pub fn load(&self) -> Result<StoredState, StorageError> {
        let recipes = match self.storage.read(&self.key)? {
            Some(json) => clean_records(serde_json::from_str(&json)?, &self.key),
            None => Vec::new(),
        };
        let favorites = match self.storage.read(&self.favorites_key())? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };

        debug!(
            "Loaded {} recipes and {} favorites from `{}`",
            recipes.len(),
            favorites.len(),
            self.key
        );
        Ok(StoredState { recipes, favorites })
    }

    /// Writes the full recipe array and favorites list.
    pub fn save<'a>(
        &self,
        recipes: &[Recipe],
        favorites: impl IntoIterator<Item = &'a RecipeId>,
    ) -> Result<(), StorageError> {
        let favorites: Vec<RecipeId> = favorites.into_iter().copied().collect();
        self.storage
            .write(&self.key, &serde_json::to_string(recipes)?)?;
        self.storage
            .write(&self.favorites_key(), &serde_json::to_string(&favorites)?)?;
        Ok(())
    }
}

impl std::fmt::Debug for Persistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persistence").field("key", &self.key).finish()
    }
}

/// Normalizes loaded records and drops the ones the store would reject.
///
/// Summary-only records get their description from `summary`.
pub(crate) fn clean_records(records: Vec<Recipe>, source: &str) -> Vec<Recipe> {
    records
        .into_iter()
        .filter_map(|mut recipe| {
            recipe.normalize();
            if recipe.description.is_empty() {
                if let Some(summary) = &recipe.summary {
                    recipe.description = summary.clone();
                }
            }

            match validate(&recipe) {
                Ok(()) => Some(recipe),
                Err(e) => {
                    warn!("Skipping recipe {} from `{}`: {}", recipe.id(), source, e);
                    None
                }
            }
        })
        .collect()
}
