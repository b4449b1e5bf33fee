use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Image shown for recipes that were saved without one.
pub const DEFAULT_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1546069901-ba9599a7e63c?w=500&auto=format&fit=crop&q=60";

/// Unique identifier of a recipe within a store.
///
/// Ids are derived from the creation time in milliseconds and never change
/// once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeId(pub u64);

impl RecipeId {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RecipeId {
    fn from(id: u64) -> Self {
        RecipeId(id)
    }
}

/// How demanding a recipe is to prepare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown difficulty: {0}")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

/// A single recipe record.
///
/// `title` and `description` are always present. The remaining fields are
/// the extended metadata some collections carry (timings, servings,
/// ingredient and instruction lists).
///
/// The persisted JSON form uses camelCase field names. `steps` is accepted
/// as an alias of `instructions` when reading.
///
/// # Examples
///
/// ```
/// use recipe_store::{NewRecipe, RecipeStore};
///
/// let store = RecipeStore::new();
/// let recipe = store.add_recipe(NewRecipe::new("Soup", "Warm broth"))?;
/// assert_eq!(recipe.title, "Soup");
/// # Ok::<(), recipe_store::StoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    id: RecipeId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prep_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cook_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ingredients: Vec<String>,
    #[serde(default, alias = "steps", skip_serializing_if = "Vec::is_empty")]
    pub instructions: Vec<String>,
}

impl Recipe {
    pub(crate) fn new(id: RecipeId, title: String, description: String) -> Self {
        Recipe {
            id,
            title,
            description,
            summary: None,
            image: None,
            prep_time: None,
            cook_time: None,
            servings: None,
            difficulty: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn id(&self) -> RecipeId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: RecipeId) {
        self.id = id;
    }

    /// Returns the image URL, falling back to [`DEFAULT_IMAGE_URL`].
    pub fn image_or_default(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_IMAGE_URL)
    }

    /// Trims text fields and drops blank optional values.
    pub(crate) fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        self.description = self.description.trim().to_string();
        self.summary = non_blank(self.summary.take());
        self.image = non_blank(self.image.take());
        self.prep_time = non_blank(self.prep_time.take());
        self.cook_time = non_blank(self.cook_time.take());

        for item in self.ingredients.iter_mut().chain(self.instructions.iter_mut()) {
            *item = item.trim().to_string();
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
