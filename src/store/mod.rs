//! The observable recipe store.
//!
//! [`RecipeStore`] owns the recipe collection, the favorites set and the
//! current search term. Every mutation builds a new [`Snapshot`] with the
//! filtered view recomputed, swaps it in, writes it through to storage if
//! one is attached, and then notifies subscribers.

mod id;
mod snapshot;
mod subscription;

pub use snapshot::Snapshot;
pub use subscription::{Listener, Subscription, SubscriptionId};

use crate::config::StoreConfig;
use crate::model::{validate, NewRecipe, Recipe, RecipeId, RecipeUpdate, ValidationError};
use crate::storage::{
    load_fixtures, merge_recipes, JsonFileStorage, Persistence, RecipeStorage, StorageError,
};
use id::IdGenerator;
use log::{debug, warn};
use parking_lot::{Mutex, ReentrantMutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use subscription::ListenerRegistry;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Recipe not found: {0}")]
    NotFound(RecipeId),

    #[error("Invalid recipe: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// An in-memory, observable collection of recipes.
///
/// The store is created once by the application root and shared by
/// reference (or `Arc`) with the views that render it. All operations run
/// synchronously. Mutations are serialized, and subscribers only ever see
/// fully applied states.
///
/// # Examples
///
/// ```
/// use recipe_store::{NewRecipe, RecipeStore};
///
/// let store = RecipeStore::new();
/// let soup = store.add_recipe(NewRecipe::new("Soup", "Warm broth"))?;
///
/// store.set_search_term("SOUP");
/// assert_eq!(store.snapshot().filtered_recipes().len(), 1);
///
/// store.delete_recipe(soup.id())?;
/// assert!(store.snapshot().is_empty());
/// # Ok::<(), recipe_store::StoreError>(())
/// ```
pub struct RecipeStore {
    state: RwLock<Arc<Snapshot>>,
    writer: ReentrantMutex<()>,
    listeners: Arc<Mutex<ListenerRegistry>>,
    // Committed states not yet announced, oldest first
    pending: Mutex<VecDeque<Arc<Snapshot>>>,
    notifying: AtomicBool,
    persistence: Option<Persistence>,
    ids: IdGenerator,
}

impl Default for RecipeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipeStore {
    /// Creates an empty store without persistence.
    pub fn new() -> Self {
        Self::with_recipes(Vec::new())
    }

    /// Creates a store seeded with `recipes`. Duplicate ids keep the first
    /// occurrence.
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        Self::from_state(merge_recipes(recipes, Vec::new()), Vec::new(), None)
    }

    /// Opens a store backed by `storage`.
    ///
    /// Stored recipes are read once and merged with `fixtures`; stored
    /// entries take precedence and come first. Every later mutation writes
    /// the full collection back under `key`.
    pub fn open(
        storage: impl RecipeStorage + 'static,
        key: impl Into<String>,
        fixtures: Vec<Recipe>,
    ) -> Result<Self, StoreError> {
        let persistence = Persistence::new(storage, key);
        let stored = persistence.load()?;
        let recipes = merge_recipes(stored.recipes, fixtures);
        Ok(Self::from_state(recipes, stored.favorites, Some(persistence)))
    }

    /// Builds a store as described by `config`.
    pub fn from_config(config: &StoreConfig) -> Result<Self, StoreError> {
        let fixtures = match &config.fixtures_dir {
            Some(dir) => load_fixtures(dir)?,
            None => Vec::new(),
        };

        match (&config.storage_dir, config.persist) {
            (Some(dir), true) => Self::open(
                JsonFileStorage::new(dir.clone()),
                config.storage_key.clone(),
                fixtures,
            ),
            _ => Ok(Self::with_recipes(fixtures)),
        }
    }

    fn from_state(
        recipes: Vec<Recipe>,
        favorites: Vec<RecipeId>,
        persistence: Option<Persistence>,
    ) -> Self {
        let ids = IdGenerator::new();
        for recipe in &recipes {
            ids.observe(recipe.id());
        }
        debug!("Recipe store ready with {} recipes", recipes.len());

        RecipeStore {
            state: RwLock::new(Arc::new(Snapshot::from_parts(recipes, favorites, String::new()))),
            writer: ReentrantMutex::new(()),
            listeners: Arc::new(Mutex::new(ListenerRegistry::default())),
            pending: Mutex::new(VecDeque::new()),
            notifying: AtomicBool::new(false),
            persistence,
            ids,
        }
    }

    /// Replaces the clock used to derive new ids (milliseconds).
    pub fn with_id_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        let ids = IdGenerator::with_clock(clock);
        for recipe in self.state.get_mut().recipes() {
            ids.observe(recipe.id());
        }
        self.ids = ids;
        self
    }

    /// Returns the current state. Later mutations never alter it.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.state.read())
    }

    pub fn get(&self, id: RecipeId) -> Option<Recipe> {
        self.state.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }

    /// Validates `recipe`, assigns it a fresh id and appends it.
    pub fn add_recipe(&self, recipe: NewRecipe) -> Result<Recipe, StoreError> {
        let mut recipe = recipe.into_recipe(RecipeId(0));
        validate(&recipe)?;

        self.mutate("add_recipe", |state| {
            recipe.set_id(self.ids.next());
            state.recipes_mut().push(recipe.clone());
            Ok((recipe, true))
        })
    }

    /// Merges the fields set in `update` into the recipe with `id`.
    pub fn update_recipe(&self, id: RecipeId, update: RecipeUpdate) -> Result<Recipe, StoreError> {
        self.mutate("update_recipe", |state| {
            let index = state.position(id).ok_or(StoreError::NotFound(id))?;
            let mut updated = state.recipes()[index].clone();
            update.apply_to(&mut updated);
            validate(&updated)?;

            let changed = updated != state.recipes()[index];
            state.recipes_mut()[index] = updated.clone();
            Ok((updated, changed))
        })
    }

    /// Replaces the stored recipe that has the same id as `recipe`.
    pub fn replace_recipe(&self, mut recipe: Recipe) -> Result<Recipe, StoreError> {
        recipe.normalize();
        validate(&recipe)?;

        self.mutate("replace_recipe", |state| {
            let id = recipe.id();
            let index = state.position(id).ok_or(StoreError::NotFound(id))?;
            let changed = recipe != state.recipes()[index];
            state.recipes_mut()[index] = recipe.clone();
            Ok((recipe, changed))
        })
    }

    /// Removes the recipe with `id`, along with its favorite mark.
    pub fn delete_recipe(&self, id: RecipeId) -> Result<Recipe, StoreError> {
        self.mutate("delete_recipe", |state| {
            let index = state.position(id).ok_or(StoreError::NotFound(id))?;
            let removed = state.recipes_mut().remove(index);
            state.favorites_mut().remove(&id);
            Ok((removed, true))
        })
    }

    /// Marks a recipe as favorite. Marking it twice is a no-op.
    pub fn add_favorite(&self, id: RecipeId) -> Result<(), StoreError> {
        self.mutate("add_favorite", |state| {
            if !state.contains(id) {
                return Err(StoreError::NotFound(id));
            }
            let changed = state.favorites_mut().insert(id);
            Ok(((), changed))
        })
    }

    /// Clears a recipe's favorite mark. Clearing it twice is a no-op.
    pub fn remove_favorite(&self, id: RecipeId) -> Result<(), StoreError> {
        self.mutate("remove_favorite", |state| {
            if !state.contains(id) {
                return Err(StoreError::NotFound(id));
            }
            let changed = state.favorites_mut().remove(&id);
            Ok(((), changed))
        })
    }

    /// Flips a recipe's favorite mark and returns the new value.
    pub fn toggle_favorite(&self, id: RecipeId) -> Result<bool, StoreError> {
        self.mutate("toggle_favorite", |state| {
            if !state.contains(id) {
                return Err(StoreError::NotFound(id));
            }
            let favorites = state.favorites_mut();
            let now_favorite = if favorites.remove(&id) {
                false
            } else {
                favorites.insert(id);
                true
            };
            Ok((now_favorite, true))
        })
    }

    /// Sets the search term and recomputes the filtered view.
    pub fn set_search_term(&self, term: impl Into<String>) {
        let term = term.into();
        let _writer = self.writer.lock();

        if self.state.read().search_term() == term {
            return;
        }
        let mut next = Snapshot::clone(&self.snapshot());
        next.set_search_term(term);
        self.commit("set_search_term", next);
    }

    /// Registers `listener` to be called after every committed mutation.
    ///
    /// Listeners run on the mutating thread, after the new state is visible
    /// through [`snapshot`](Self::snapshot). They may read the store,
    /// unsubscribe, or mutate the store again. A mutation made from a
    /// listener is announced once every listener has seen the current state,
    /// so each listener receives states in commit order.
    pub fn subscribe(
        &self,
        listener: impl Fn(&Arc<Snapshot>) + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.listeners.lock().insert(Arc::new(listener));
        Subscription::new(id, Arc::downgrade(&self.listeners))
    }

    /// Removes a listener by id. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.lock().remove(id)
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.lock().len()
    }

    /// Writes the current state to storage, reporting failures.
    ///
    /// Mutations write through on their own and only log failed writes;
    /// this is for callers that need to know the data reached storage.
    pub fn flush(&self) -> Result<(), StoreError> {
        let _writer = self.writer.lock();
        if let Some(persistence) = &self.persistence {
            let snapshot = self.snapshot();
            persistence.save(snapshot.recipes(), snapshot.favorites())?;
        }
        Ok(())
    }

    /// Applies `apply` to a copy of the current state and commits it.
    ///
    /// `apply` returns the operation's result and whether the state
    /// changed. Unchanged states are neither persisted nor announced.
    fn mutate<T>(
        &self,
        op: &str,
        apply: impl FnOnce(&mut Snapshot) -> Result<(T, bool), StoreError>,
    ) -> Result<T, StoreError> {
        let _writer = self.writer.lock();

        let mut next = Snapshot::clone(&self.snapshot());
        let (value, changed) = apply(&mut next)?;
        if changed {
            self.commit(op, next);
        }
        Ok(value)
    }

    // Callers hold the writer lock.
    fn commit(&self, op: &str, mut next: Snapshot) {
        next.bump_version();
        next.refresh();
        let next = Arc::new(next);
        *self.state.write() = Arc::clone(&next);
        debug!(
            "{op}: version {} ({} recipes, {} shown)",
            next.version(),
            next.len(),
            next.filtered_recipes().len()
        );

        self.persist(&next);
        self.notify(next);
    }

    fn persist(&self, snapshot: &Snapshot) {
        if let Some(persistence) = &self.persistence {
            if let Err(e) = persistence.save(snapshot.recipes(), snapshot.favorites()) {
                warn!("Failed to persist recipes to `{}`: {}", persistence.key(), e);
            }
        }
    }

    // Nested commits from inside a listener only enqueue; the outermost
    // call drains the queue.
    fn notify(&self, snapshot: Arc<Snapshot>) {
        self.pending.lock().push_back(snapshot);
        if self.notifying.swap(true, Ordering::Acquire) {
            return;
        }
        let _drain = DrainGuard(self);

        loop {
            let next = self.pending.lock().pop_front();
            let Some(snapshot) = next else { break };
            let listeners = self.listeners.lock().listeners();
            for listener in listeners {
                listener(&snapshot);
            }
        }
    }
}

/// Resets the notification queue even if a listener panics.
struct DrainGuard<'a>(&'a RecipeStore);

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.pending.lock().clear();
        self.0.notifying.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for RecipeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeStore")
            .field("snapshot", &self.snapshot())
            .field("persistence", &self.persistence)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use crate::storage::MemoryStorage;
    use std::sync::atomic::AtomicUsize;

    fn soup() -> NewRecipe {
        NewRecipe::new("Soup", "Warm broth")
    }

    fn counting_listener(store: &RecipeStore) -> (Arc<AtomicUsize>, Subscription) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let subscription = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        (calls, subscription)
    }

    struct FailingStorage;

    impl RecipeStorage for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::IoError(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn test_add_recipes_assigns_unique_ids() {
        let store = RecipeStore::new().with_id_clock(|| 42);
        for i in 0..20 {
            store
                .add_recipe(NewRecipe::new(format!("Recipe {i}"), "Test"))
                .unwrap();
        }

        let snapshot = store.snapshot();
        let mut ids: Vec<RecipeId> = snapshot.recipes().iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), 20);
        ids.dedup();
        assert_eq!(ids.len(), 20);
        assert_eq!(ids[0], RecipeId(42));
        assert_eq!(ids[19], RecipeId(61));
    }

    #[test]
    fn test_soup_scenario() {
        let store = RecipeStore::new();
        assert!(store.is_empty());

        let soup = store.add_recipe(soup()).unwrap();
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.recipes()[0].title, "Soup");
        assert_eq!(snapshot.recipes()[0].description, "Warm broth");

        store.set_search_term("soup");
        assert_eq!(store.snapshot().filtered_recipes(), &[soup.clone()][..]);

        store.set_search_term("bread");
        assert!(store.snapshot().filtered_recipes().is_empty());

        store.delete_recipe(soup.id()).unwrap();
        let snapshot = store.snapshot();
        assert!(snapshot.recipes().is_empty());
        assert!(snapshot.filtered_recipes().is_empty());
    }

    #[test]
    fn test_clearing_search_restores_full_list() {
        let store = RecipeStore::new();
        store.add_recipe(NewRecipe::new("pasta night", "Test")).unwrap();
        store.add_recipe(NewRecipe::new("Banana Bread", "Test")).unwrap();

        store.set_search_term("PASTA");
        assert_eq!(store.snapshot().filtered_recipes().len(), 1);
        assert_eq!(store.snapshot().filtered_recipes()[0].title, "pasta night");

        store.set_search_term("");
        let snapshot = store.snapshot();
        assert_eq!(snapshot.filtered_recipes(), snapshot.recipes());
    }

    #[test]
    fn test_new_recipes_respect_active_search() {
        let store = RecipeStore::new();
        store.set_search_term("bread");
        store.add_recipe(soup()).unwrap();
        store.add_recipe(NewRecipe::new("Rye Bread", "Dense")).unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.filtered_recipes().len(), 1);
        assert_eq!(snapshot.filtered_recipes()[0].title, "Rye Bread");
    }

    #[test]
    fn test_add_recipe_rejects_invalid_input() {
        let store = RecipeStore::new();
        let (calls, _subscription) = counting_listener(&store);

        let result = store.add_recipe(NewRecipe::new("", "Warm broth"));
        assert!(matches!(
            result,
            Err(StoreError::InvalidInput(ValidationError::EmptyField("title")))
        ));
        assert!(store.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_summary_does_not_stand_in_for_description() {
        let store = RecipeStore::new();
        let result = store.add_recipe(NewRecipe::new("Soup", "").with_summary("Hot"));
        assert!(matches!(
            result,
            Err(StoreError::InvalidInput(ValidationError::EmptyField("description")))
        ));

        let tea = store
            .add_recipe(NewRecipe::new("Tea", "Steeped").with_summary("Leaves"))
            .unwrap();
        let result = store.update_recipe(tea.id(), RecipeUpdate::new().description(""));
        assert!(matches!(
            result,
            Err(StoreError::InvalidInput(ValidationError::EmptyField("description")))
        ));
        assert_eq!(store.get(tea.id()).unwrap().description, "Steeped");
    }

    #[test]
    fn test_update_recipe_merges_fields() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup()).unwrap();

        let updated = store
            .update_recipe(
                soup.id(),
                RecipeUpdate::new()
                    .title("Tomato Soup")
                    .difficulty(Difficulty::Easy),
            )
            .unwrap();

        assert_eq!(updated.id(), soup.id());
        assert_eq!(updated.title, "Tomato Soup");
        assert_eq!(updated.description, "Warm broth");
        assert_eq!(store.get(soup.id()), Some(updated));
    }

    #[test]
    fn test_update_recipe_validates_merged_result() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup()).unwrap();

        let result = store.update_recipe(soup.id(), RecipeUpdate::new().ingredients(["water"]));
        assert!(matches!(
            result,
            Err(StoreError::InvalidInput(ValidationError::TooFewItems { .. }))
        ));
        assert_eq!(store.get(soup.id()), Some(soup));
    }

    #[test]
    fn test_deleted_recipe_cannot_be_updated() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup()).unwrap();
        store.delete_recipe(soup.id()).unwrap();

        let result = store.update_recipe(soup.id(), RecipeUpdate::new().title("Back"));
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == soup.id()));
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_recipe() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup().with_prep_time("5 mins")).unwrap();

        let mut edited = soup.clone();
        edited.title = "Miso Soup".to_string();
        edited.prep_time = None;
        store.replace_recipe(edited).unwrap();

        let stored = store.get(soup.id()).unwrap();
        assert_eq!(stored.title, "Miso Soup");
        assert!(stored.prep_time.is_none());
    }

    #[test]
    fn test_delete_cascades_to_favorites() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup()).unwrap();
        store.add_favorite(soup.id()).unwrap();
        assert!(store.snapshot().is_favorite(soup.id()));

        store.delete_recipe(soup.id()).unwrap();
        assert!(store.snapshot().favorites().is_empty());
    }

    #[test]
    fn test_favorites_are_idempotent() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup()).unwrap();
        let (calls, _subscription) = counting_listener(&store);

        store.add_favorite(soup.id()).unwrap();
        store.add_favorite(soup.id()).unwrap();
        assert_eq!(store.snapshot().favorites().len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.remove_favorite(soup.id()).unwrap();
        store.remove_favorite(soup.id()).unwrap();
        assert!(store.snapshot().favorites().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_favorite_unknown_recipe() {
        let store = RecipeStore::new();
        assert!(matches!(
            store.add_favorite(RecipeId(7)),
            Err(StoreError::NotFound(RecipeId(7)))
        ));
        assert!(matches!(
            store.remove_favorite(RecipeId(7)),
            Err(StoreError::NotFound(RecipeId(7)))
        ));
    }

    #[test]
    fn test_toggle_favorite() {
        let store = RecipeStore::new();
        let soup = store.add_recipe(soup()).unwrap();

        assert!(store.toggle_favorite(soup.id()).unwrap());
        assert_eq!(store.snapshot().favorite_recipes().len(), 1);
        assert!(!store.toggle_favorite(soup.id()).unwrap());
        assert!(store.snapshot().favorite_recipes().is_empty());
    }

    #[test]
    fn test_snapshots_are_not_changed_by_later_mutations() {
        let store = RecipeStore::new();
        store.add_recipe(soup()).unwrap();
        let before = store.snapshot();

        store.add_recipe(NewRecipe::new("Bread", "Crusty")).unwrap();
        store.set_search_term("bread");

        assert_eq!(before.len(), 1);
        assert_eq!(before.search_term(), "");
        assert_eq!(before.filtered_recipes().len(), 1);
        assert_eq!(store.snapshot().version(), before.version() + 2);
    }

    #[test]
    fn test_listeners_receive_new_snapshot() {
        let store = RecipeStore::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _subscription = store.subscribe(move |snapshot| {
            sink.lock()
                .push((snapshot.len(), snapshot.filtered_recipes().len()));
        });

        store.add_recipe(soup()).unwrap();
        store.set_search_term("bread");
        store.set_search_term("bread");

        assert_eq!(*seen.lock(), vec![(1, 1), (1, 0)]);
    }

    #[test]
    fn test_dropped_subscription_is_not_called() {
        let store = RecipeStore::new();
        let (calls, subscription) = counting_listener(&store);
        let (other_calls, _other) = counting_listener(&store);

        store.add_recipe(soup()).unwrap();
        drop(subscription);
        store.add_recipe(NewRecipe::new("Bread", "Crusty")).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(other_calls.load(Ordering::SeqCst), 2);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        let store = Arc::new(RecipeStore::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let own_id: Arc<Mutex<Option<SubscriptionId>>> = Arc::new(Mutex::new(None));

        let weak_store = Arc::downgrade(&store);
        let counter = Arc::clone(&calls);
        let id_slot = Arc::clone(&own_id);
        let id = store
            .subscribe(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                if let (Some(store), Some(id)) = (weak_store.upgrade(), *id_slot.lock()) {
                    store.unsubscribe(id);
                }
            })
            .detach();
        *own_id.lock() = Some(id);

        store.add_recipe(soup()).unwrap();
        store.add_recipe(NewRecipe::new("Bread", "Crusty")).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_listener_sees_committed_state() {
        let store = Arc::new(RecipeStore::new());
        let weak_store = Arc::downgrade(&store);
        let consistent = Arc::new(Mutex::new(true));
        let flag = Arc::clone(&consistent);

        store
            .subscribe(move |snapshot| {
                if let Some(store) = weak_store.upgrade() {
                    let current = store.snapshot();
                    if current.version() != snapshot.version() {
                        *flag.lock() = false;
                    }
                }
            })
            .detach();

        store.add_recipe(soup()).unwrap();
        store.set_search_term("so");
        assert!(*consistent.lock());
    }

    #[test]
    fn test_mutation_from_listener_keeps_commit_order() {
        let store = Arc::new(RecipeStore::new());
        let weak_store = Arc::downgrade(&store);
        store
            .subscribe(move |snapshot| {
                if snapshot.len() == 1 && snapshot.search_term().is_empty() {
                    if let Some(store) = weak_store.upgrade() {
                        store.set_search_term("zzz");
                    }
                }
            })
            .detach();

        let versions = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&versions);
        let _subscription = store.subscribe(move |snapshot| {
            sink.lock().push(snapshot.version());
        });

        store.add_recipe(soup()).unwrap();

        assert_eq!(*versions.lock(), vec![1, 2]);
        assert_eq!(store.snapshot().version(), 2);
        assert_eq!(store.snapshot().search_term(), "zzz");
    }

    #[test]
    fn test_open_merges_storage_and_fixtures() {
        let storage = MemoryStorage::new();
        storage
            .write(
                "recipes",
                r#"[{"id": 5, "title": "Local Soup", "description": "Mine"}]"#,
            )
            .unwrap();
        storage.write("recipes-favorites", "[5, 99]").unwrap();
        let fixtures = vec![
            NewRecipe::new("Fixture Soup", "Bundled").into_recipe(RecipeId(5)),
            NewRecipe::new("Bread", "Bundled").into_recipe(RecipeId(6)),
        ];

        let store = RecipeStore::open(storage, "recipes", fixtures)
            .unwrap()
            .with_id_clock(|| 1);
        let snapshot = store.snapshot();

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.recipes()[0].title, "Local Soup");
        assert_eq!(snapshot.recipes()[1].id(), RecipeId(6));
        assert_eq!(snapshot.favorites().len(), 1);

        // Loaded ids seed the generator
        let added = store.add_recipe(soup()).unwrap();
        assert_eq!(added.id(), RecipeId(7));
    }

    #[test]
    fn test_mutations_write_through() {
        let storage = MemoryStorage::new();
        let store = RecipeStore::open(storage.clone(), "recipes", Vec::new()).unwrap();

        let soup = store.add_recipe(soup()).unwrap();
        store.add_favorite(soup.id()).unwrap();

        let reopened = RecipeStore::open(storage, "recipes", Vec::new()).unwrap();
        let snapshot = reopened.snapshot();
        assert_eq!(snapshot.recipes(), &[soup.clone()][..]);
        assert!(snapshot.is_favorite(soup.id()));
    }

    #[test]
    fn test_failed_write_keeps_in_memory_state() {
        let store = RecipeStore::open(FailingStorage, "recipes", Vec::new()).unwrap();
        let (calls, _subscription) = counting_listener(&store);

        let soup = store.add_recipe(soup()).unwrap();

        assert_eq!(store.get(soup.id()), Some(soup));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(store.flush(), Err(StoreError::Storage(_))));
    }

    #[test]
    fn test_flush_without_storage_is_ok() {
        let store = RecipeStore::new();
        store.add_recipe(soup()).unwrap();
        assert!(store.flush().is_ok());
    }
}
