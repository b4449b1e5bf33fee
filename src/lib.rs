//! An observable, in-memory recipe store.
//!
//! The [`RecipeStore`] keeps an ordered collection of [`Recipe`]s, a set of
//! favorites and a search term, and derives the filtered view from them
//! after every mutation. Consumers render from [`Snapshot`]s and subscribe
//! to be told when a new one is committed. Storage is optional and
//! pluggable through [`RecipeStorage`].

pub mod config;
pub mod ffi;
pub mod model;
pub mod search;
pub mod storage;
pub mod store;

uniffi::setup_scaffolding!();

pub use crate::config::StoreConfig;
pub use model::*;
pub use search::{filter_recipes, matches_title};
pub use storage::{JsonFileStorage, MemoryStorage, RecipeStorage, StorageError};
pub use store::{RecipeStore, Snapshot, StoreError, Subscription, SubscriptionId};
