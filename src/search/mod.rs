//! Title filtering used to derive the store's filtered view.
//!
//! Filtering is a linear scan with a case-insensitive substring test on
//! the recipe title. Matches keep their original relative order, and an
//! empty term matches every recipe.

use crate::model::Recipe;

/// Returns true if `recipe`'s title contains `term`, ignoring case.
pub fn matches_title(recipe: &Recipe, term: &str) -> bool {
    recipe.title.to_lowercase().contains(&term.to_lowercase())
}

/// Returns the recipes whose title matches `term`, in their original order.
pub fn filter_recipes(recipes: &[Recipe], term: &str) -> Vec<Recipe> {
    if term.is_empty() {
        return recipes.to_vec();
    }

    recipes
        .iter()
        .filter(|recipe| matches_title(recipe, term))
        .cloned()
        .collect()
}
