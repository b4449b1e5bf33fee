//! Recipe records and the inputs used to create and edit them.

mod draft;
mod recipe;
mod validate;

pub use draft::{NewRecipe, RecipeUpdate};
pub use recipe::{Difficulty, Recipe, RecipeId, UnknownDifficulty, DEFAULT_IMAGE_URL};
pub use validate::{validate, ValidationError, MIN_LIST_ITEMS};
