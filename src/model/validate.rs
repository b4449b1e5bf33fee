use super::recipe::Recipe;
use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Minimum number of entries in a non-empty ingredient or instruction list.
pub const MIN_LIST_ITEMS: usize = 2;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field `{0}` must not be empty")]
    EmptyField(&'static str),

    #[error("Servings must be a positive number, got {0}")]
    InvalidServings(u32),

    #[error("Field `{field}` needs at least {min} entries, found {found}")]
    TooFewItems {
        field: &'static str,
        min: usize,
        found: usize,
    },

    #[error("Entry {index} of `{field}` is empty")]
    EmptyItem { field: &'static str, index: usize },

    #[error("Invalid image URL: {0}")]
    InvalidImageUrl(String),
}

fn image_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("valid image URL pattern"))
}

/// Checks the invariants a stored recipe must satisfy.
///
/// Expects a normalized recipe (trimmed text, blank optionals dropped).
pub fn validate(recipe: &Recipe) -> Result<(), ValidationError> {
    if recipe.title.is_empty() {
        return Err(ValidationError::EmptyField("title"));
    }
    if recipe.description.is_empty() {
        return Err(ValidationError::EmptyField("description"));
    }
    if let Some(servings) = recipe.servings {
        if servings == 0 {
            return Err(ValidationError::InvalidServings(servings));
        }
    }
    validate_list("ingredients", &recipe.ingredients)?;
    validate_list("instructions", &recipe.instructions)?;

    if let Some(image) = &recipe.image {
        if !image_url_regex().is_match(image) {
            return Err(ValidationError::InvalidImageUrl(image.clone()));
        }
    }

    Ok(())
}

// An empty list means the field was not provided.
fn validate_list(field: &'static str, items: &[String]) -> Result<(), ValidationError> {
    if items.is_empty() {
        return Ok(());
    }
    if let Some(index) = items.iter().position(|item| item.trim().is_empty()) {
        return Err(ValidationError::EmptyItem { field, index });
    }
    if items.len() < MIN_LIST_ITEMS {
        return Err(ValidationError::TooFewItems {
            field,
            min: MIN_LIST_ITEMS,
            found: items.len(),
        });
    }
    Ok(())
}
