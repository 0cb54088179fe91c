use async_trait::async_trait;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod types;

pub use types::{
    Ingredient, Instruction, NewRecipe, NewRecipeIngredient, RecipeIngredient, RecipeOrder,
    RecipeRecord, RecipeSummary, Unit,
};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The case-insensitive unique index on `recipes.recipe_name` rejected a write.
    #[error("recipe name already in use")]
    DuplicateRecipeName,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage capability the services run against.
///
/// Methods that write more than one row (`insert_recipe`, `replace_recipe`)
/// are atomic: either every row lands or none does.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Case-insensitive name lookup, optionally ignoring one recipe (the one being updated).
    async fn recipe_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool>;

    async fn insert_recipe(
        &self,
        recipe: NewRecipe,
        ingredients: Vec<NewRecipeIngredient>,
    ) -> StoreResult<RecipeRecord>;

    /// Overwrites the recipe fields and swaps all of its ingredient rows.
    /// Returns `None` when the recipe does not exist.
    async fn replace_recipe(
        &self,
        id: Uuid,
        recipe: NewRecipe,
        ingredients: Vec<NewRecipeIngredient>,
    ) -> StoreResult<Option<RecipeRecord>>;

    async fn get_recipe(&self, id: Uuid) -> StoreResult<Option<RecipeRecord>>;

    /// Returns `false` when nothing was deleted.
    async fn delete_recipe(&self, id: Uuid) -> StoreResult<bool>;

    /// One ordered page of recipes plus the total row count.
    async fn list_recipes(
        &self,
        order: RecipeOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<RecipeRecord>, i64)>;

    /// Summaries for whichever of `ids` exist, in no particular order.
    async fn recipe_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<RecipeSummary>>;

    async fn random_recipes(&self, count: i64, exclude: &[Uuid]) -> StoreResult<Vec<RecipeSummary>>;

    async fn find_ingredient(&self, id: Uuid) -> StoreResult<Option<Ingredient>>;

    async fn find_ingredient_by_name(&self, name: &str) -> StoreResult<Option<Ingredient>>;

    /// Inserts the ingredient, or returns the existing row with the same name.
    async fn insert_ingredient(&self, name: &str) -> StoreResult<Ingredient>;

    async fn find_unit(&self, id: Uuid) -> StoreResult<Option<Unit>>;

    async fn list_units(&self) -> StoreResult<Vec<Unit>>;
}
