use crate::model::{Recipe, RecipeId};
use crate::search::filter_recipes;
use serde::Serialize;
use std::collections::BTreeSet;

/// An immutable, point-in-time view of the store.
///
/// Snapshots are shared behind an `Arc`. A mutation builds a new snapshot,
/// so one handed out earlier never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    version: u64,
    recipes: Vec<Recipe>,
    favorites: BTreeSet<RecipeId>,
    search_term: String,
    filtered_recipes: Vec<Recipe>,
}

impl Snapshot {
    /// Builds a consistent snapshot, dropping favorites that refer to
    /// recipes not in `recipes`.
    pub(crate) fn from_parts(
        recipes: Vec<Recipe>,
        favorites: impl IntoIterator<Item = RecipeId>,
        search_term: String,
    ) -> Self {
        let mut snapshot = Snapshot {
            version: 0,
            recipes,
            favorites: BTreeSet::new(),
            search_term,
            filtered_recipes: Vec::new(),
        };
        let favorites: BTreeSet<RecipeId> = favorites
            .into_iter()
            .filter(|id| snapshot.contains(*id))
            .collect();
        snapshot.favorites = favorites;
        snapshot.refresh();
        snapshot
    }

    /// Number of mutations applied since the store was created.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// All recipes in insertion order.
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    pub fn favorites(&self) -> &BTreeSet<RecipeId> {
        &self.favorites
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Recipes whose title matches the current search term.
    pub fn filtered_recipes(&self) -> &[Recipe] {
        &self.filtered_recipes
    }

    /// Favorited recipes, in insertion order.
    pub fn favorite_recipes(&self) -> Vec<&Recipe> {
        self.recipes
            .iter()
            .filter(|recipe| self.favorites.contains(&recipe.id()))
            .collect()
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|recipe| recipe.id() == id)
    }

    pub fn contains(&self, id: RecipeId) -> bool {
        self.position(id).is_some()
    }

    pub fn is_favorite(&self, id: RecipeId) -> bool {
        self.favorites.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub(crate) fn position(&self, id: RecipeId) -> Option<usize> {
        self.recipes.iter().position(|recipe| recipe.id() == id)
    }

    pub(crate) fn recipes_mut(&mut self) -> &mut Vec<Recipe> {
        &mut self.recipes
    }

    pub(crate) fn favorites_mut(&mut self) -> &mut BTreeSet<RecipeId> {
        &mut self.favorites
    }

    pub(crate) fn set_search_term(&mut self, term: String) {
        self.search_term = term;
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Recomputes the derived filtered view.
    pub(crate) fn refresh(&mut self) {
        self.filtered_recipes = filter_recipes(&self.recipes, &self.search_term);
    }
}
