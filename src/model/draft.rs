use super::recipe::{Difficulty, Recipe, RecipeId};
use serde::{Deserialize, Serialize};

/// Input for creating a recipe. The store assigns the id.
///
/// # Examples
///
/// ```
/// use recipe_store::{Difficulty, NewRecipe};
///
/// let draft = NewRecipe::new("Pancakes", "Fluffy breakfast pancakes")
///     .with_servings(4)
///     .with_difficulty(Difficulty::Easy)
///     .with_ingredients(["2 cups flour", "3 eggs"])
///     .with_instructions(["Mix", "Fry"]);
/// assert_eq!(draft.servings, Some(4));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecipe {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
}

impl NewRecipe {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        NewRecipe {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_prep_time(mut self, prep_time: impl Into<String>) -> Self {
        self.prep_time = Some(prep_time.into());
        self
    }

    pub fn with_cook_time(mut self, cook_time: impl Into<String>) -> Self {
        self.cook_time = Some(cook_time.into());
        self
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    pub(crate) fn into_recipe(self, id: RecipeId) -> Recipe {
        let mut recipe = Recipe::new(id, self.title, self.description);
        recipe.summary = self.summary;
        recipe.image = self.image;
        recipe.prep_time = self.prep_time;
        recipe.cook_time = self.cook_time;
        recipe.servings = self.servings;
        recipe.difficulty = self.difficulty;
        recipe.ingredients = self.ingredients;
        recipe.instructions = self.instructions;
        recipe.normalize();
        recipe
    }
}

/// A partial edit of an existing recipe.
///
/// Fields left as `None` keep their current value. List fields replace the
/// whole list when set. Clearing an optional scalar field is done with
/// [`RecipeStore::replace_recipe`](crate::RecipeStore::replace_recipe).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub prep_time: Option<String>,
    #[serde(default)]
    pub cook_time: Option<String>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub ingredients: Option<Vec<String>>,
    #[serde(default)]
    pub instructions: Option<Vec<String>>,
}

impl RecipeUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }

    pub fn difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = Some(difficulty);
        self
    }

    pub fn ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = Some(ingredients.into_iter().map(Into::into).collect());
        self
    }

    pub fn instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = Some(instructions.into_iter().map(Into::into).collect());
        self
    }

    /// Returns true when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == RecipeUpdate::default()
    }

    /// Merges the set fields into `recipe`. The id is never touched.
    pub(crate) fn apply_to(self, recipe: &mut Recipe) {
        if let Some(title) = self.title {
            recipe.title = title;
        }
        if let Some(description) = self.description {
            recipe.description = description;
        }
        if self.summary.is_some() {
            recipe.summary = self.summary;
        }
        if self.image.is_some() {
            recipe.image = self.image;
        }
        if self.prep_time.is_some() {
            recipe.prep_time = self.prep_time;
        }
        if self.cook_time.is_some() {
            recipe.cook_time = self.cook_time;
        }
        if self.servings.is_some() {
            recipe.servings = self.servings;
        }
        if self.difficulty.is_some() {
            recipe.difficulty = self.difficulty;
        }
        if let Some(ingredients) = self.ingredients {
            recipe.ingredients = ingredients;
        }
        if let Some(instructions) = self.instructions {
            recipe.instructions = instructions;
        }
        recipe.normalize();
    }
}
