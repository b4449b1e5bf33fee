//! UniFFI bindings for cross-platform support (iOS, Android).
//!
//! This module provides FFI-safe types and functions for use with UniFFI.
//! Store state is converted to plain records; change notifications are
//! delivered through the foreign-implemented [`StoreListener`] trait.

use crate::config::{ConfigError, StoreConfig};
use crate::model::{Difficulty, NewRecipe, Recipe, RecipeId, RecipeUpdate};
use crate::storage::{load_fixtures, JsonFileStorage, StorageError};
use crate::store::{RecipeStore, Snapshot, StoreError, SubscriptionId};
use camino::Utf8PathBuf;
use std::sync::Arc;

/// FFI-safe error type that wraps all possible errors.
#[derive(Debug, uniffi::Error, thiserror::Error)]
pub enum RecipeStoreError {
    #[error("Recipe not found: {message}")]
    NotFound { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl From<StoreError> for RecipeStoreError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => RecipeStoreError::NotFound {
                message: format!("No recipe with id {id}"),
            },
            StoreError::InvalidInput(e) => RecipeStoreError::InvalidInput {
                message: e.to_string(),
            },
            StoreError::Storage(e) => e.into(),
        }
    }
}

impl From<ConfigError> for RecipeStoreError {
    fn from(e: ConfigError) -> Self {
        RecipeStoreError::Config {
            message: e.to_string(),
        }
    }
}

impl From<StorageError> for RecipeStoreError {
    fn from(e: StorageError) -> Self {
        RecipeStoreError::Storage {
            message: e.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum)]
pub enum FfiDifficulty {
    Easy,
    Medium,
    Hard,
}

impl From<Difficulty> for FfiDifficulty {
    fn from(d: Difficulty) -> Self {
        match d {
            Difficulty::Easy => FfiDifficulty::Easy,
            Difficulty::Medium => FfiDifficulty::Medium,
            Difficulty::Hard => FfiDifficulty::Hard,
        }
    }
}

impl From<FfiDifficulty> for Difficulty {
    fn from(d: FfiDifficulty) -> Self {
        match d {
            FfiDifficulty::Easy => Difficulty::Easy,
            FfiDifficulty::Medium => Difficulty::Medium,
            FfiDifficulty::Hard => Difficulty::Hard,
        }
    }
}

/// FFI-safe representation of a recipe.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRecipe {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    /// Image URL, with the default image filled in when none was set
    pub image: String,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<u32>,
    pub difficulty: Option<FfiDifficulty>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl From<&Recipe> for FfiRecipe {
    fn from(r: &Recipe) -> Self {
        FfiRecipe {
            id: r.id().as_u64(),
            title: r.title.clone(),
            description: r.description.clone(),
            summary: r.summary.clone(),
            image: r.image_or_default().to_string(),
            prep_time: r.prep_time.clone(),
            cook_time: r.cook_time.clone(),
            servings: r.servings,
            difficulty: r.difficulty.map(Into::into),
            ingredients: r.ingredients.clone(),
            instructions: r.instructions.clone(),
        }
    }
}

/// Input for creating a recipe across the FFI boundary.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewRecipe {
    pub title: String,
    pub description: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<u32>,
    pub difficulty: Option<FfiDifficulty>,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

impl From<FfiNewRecipe> for NewRecipe {
    fn from(r: FfiNewRecipe) -> Self {
        NewRecipe {
            title: r.title,
            description: r.description,
            summary: r.summary,
            image: r.image,
            prep_time: r.prep_time,
            cook_time: r.cook_time,
            servings: r.servings,
            difficulty: r.difficulty.map(Into::into),
            ingredients: r.ingredients,
            instructions: r.instructions,
        }
    }
}

/// A partial edit. Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, uniffi::Record)]
pub struct FfiRecipeUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub prep_time: Option<String>,
    pub cook_time: Option<String>,
    pub servings: Option<u32>,
    pub difficulty: Option<FfiDifficulty>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
}

impl From<FfiRecipeUpdate> for RecipeUpdate {
    fn from(u: FfiRecipeUpdate) -> Self {
        RecipeUpdate {
            title: u.title,
            description: u.description,
            summary: u.summary,
            image: u.image,
            prep_time: u.prep_time,
            cook_time: u.cook_time,
            servings: u.servings,
            difficulty: u.difficulty.map(Into::into),
            ingredients: u.ingredients,
            instructions: u.instructions,
        }
    }
}

/// FFI-safe representation of a store snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSnapshot {
    pub version: u64,
    pub recipes: Vec<FfiRecipe>,
    /// Favorite recipe ids in ascending order
    pub favorites: Vec<u64>,
    pub search_term: String,
    pub filtered_recipes: Vec<FfiRecipe>,
}

impl From<&Snapshot> for FfiSnapshot {
    fn from(s: &Snapshot) -> Self {
        FfiSnapshot {
            version: s.version(),
            recipes: s.recipes().iter().map(FfiRecipe::from).collect(),
            favorites: s.favorites().iter().map(|id| id.as_u64()).collect(),
            search_term: s.search_term().to_string(),
            filtered_recipes: s.filtered_recipes().iter().map(FfiRecipe::from).collect(),
        }
    }
}

/// Implemented by the host application to be told about store changes.
#[uniffi::export(with_foreign)]
pub trait StoreListener: Send + Sync {
    fn on_change(&self, snapshot: FfiSnapshot);
}

/// FFI-safe handle to a recipe store.
#[derive(uniffi::Object)]
pub struct FfiRecipeStore {
    inner: RecipeStore,
}

#[uniffi::export]
impl FfiRecipeStore {
    /// Creates an empty in-memory store.
    #[uniffi::constructor]
    pub fn new() -> Arc<Self> {
        Arc::new(FfiRecipeStore {
            inner: RecipeStore::new(),
        })
    }

    /// Opens a store persisted under `storage_dir`, merged with the
    /// fixtures found in `fixtures_dir`.
    #[uniffi::constructor]
    pub fn open(
        storage_dir: String,
        storage_key: String,
        fixtures_dir: Option<String>,
    ) -> Result<Arc<Self>, RecipeStoreError> {
        let fixtures = match fixtures_dir {
            Some(dir) => load_fixtures(&Utf8PathBuf::from(dir))?,
            None => Vec::new(),
        };
        let inner = RecipeStore::open(JsonFileStorage::new(storage_dir), storage_key, fixtures)?;
        Ok(Arc::new(FfiRecipeStore { inner }))
    }

    /// Opens a store from `recipe-store.toml` and `RECIPE_STORE__*`
    /// environment variables.
    #[uniffi::constructor]
    pub fn from_config() -> Result<Arc<Self>, RecipeStoreError> {
        let config = StoreConfig::load()?;
        let inner = RecipeStore::from_config(&config)?;
        Ok(Arc::new(FfiRecipeStore { inner }))
    }

    /// Returns the current state of the store.
    pub fn snapshot(&self) -> FfiSnapshot {
        FfiSnapshot::from(&*self.inner.snapshot())
    }

    /// Returns a recipe by id.
    pub fn get_recipe(&self, id: u64) -> Option<FfiRecipe> {
        self.inner.get(RecipeId(id)).as_ref().map(FfiRecipe::from)
    }

    pub fn add_recipe(&self, recipe: FfiNewRecipe) -> Result<FfiRecipe, RecipeStoreError> {
        let added = self.inner.add_recipe(recipe.into())?;
        Ok(FfiRecipe::from(&added))
    }

    pub fn update_recipe(
        &self,
        id: u64,
        update: FfiRecipeUpdate,
    ) -> Result<FfiRecipe, RecipeStoreError> {
        let updated = self.inner.update_recipe(RecipeId(id), update.into())?;
        Ok(FfiRecipe::from(&updated))
    }

    pub fn delete_recipe(&self, id: u64) -> Result<(), RecipeStoreError> {
        self.inner.delete_recipe(RecipeId(id))?;
        Ok(())
    }

    pub fn add_favorite(&self, id: u64) -> Result<(), RecipeStoreError> {
        Ok(self.inner.add_favorite(RecipeId(id))?)
    }

    pub fn remove_favorite(&self, id: u64) -> Result<(), RecipeStoreError> {
        Ok(self.inner.remove_favorite(RecipeId(id))?)
    }

    /// Flips the favorite mark and returns the new value.
    pub fn toggle_favorite(&self, id: u64) -> Result<bool, RecipeStoreError> {
        Ok(self.inner.toggle_favorite(RecipeId(id))?)
    }

    pub fn set_search_term(&self, term: String) {
        self.inner.set_search_term(term);
    }

    /// Registers `listener` and returns the id to unsubscribe it with.
    pub fn subscribe(&self, listener: Arc<dyn StoreListener>) -> u64 {
        self.inner
            .subscribe(move |snapshot| listener.on_change(FfiSnapshot::from(&**snapshot)))
            .detach()
            .as_u64()
    }

    /// Returns false if no listener was registered under `id`.
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.inner.unsubscribe(SubscriptionId::from(id))
    }

    /// Writes the current state to storage.
    pub fn flush(&self) -> Result<(), RecipeStoreError> {
        Ok(self.inner.flush()?)
    }
}
