use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dto::RecipeInput;
use crate::error::AppError;
use crate::ingredients::services::resolve_ingredients;
use crate::pagination::{paginate, Page, PageRequest};
use crate::state::AppState;
use crate::store::{NewRecipeIngredient, RecipeOrder, RecipeRecord, StoreError};

pub fn parse_recipe_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim()).map_err(|_| AppError::InvalidId)
}

fn write_failed(e: StoreError, name: &str) -> AppError {
    match e {
        StoreError::DuplicateRecipeName => AppError::DuplicateName(name.to_string()),
        other => AppError::Storage(other),
    }
}

async fn ensure_name_free(st: &AppState, name: &str, exclude: Option<Uuid>) -> Result<(), AppError> {
    if st.store.recipe_name_taken(name, exclude).await? {
        warn!(recipe_name = %name, "recipe name already in use");
        return Err(AppError::DuplicateName(name.to_string()));
    }
    Ok(())
}

async fn resolve_rows(st: &AppState, input: &RecipeInput) -> Result<Vec<NewRecipeIngredient>, AppError> {
    let saved = resolve_ingredients(st, &input.ingredients).await?.into_saved()?;
    Ok(saved.into_iter().map(Into::into).collect())
}

/// Ingredients are resolved before the recipe transaction starts, so a failed
/// ingredient never leaves a recipe behind.
pub async fn create_recipe(st: &AppState, input: RecipeInput) -> Result<RecipeRecord, AppError> {
    ensure_name_free(st, &input.recipe.recipe_name, None).await?;
    let rows = resolve_rows(st, &input).await?;

    let name = input.recipe.recipe_name.clone();
    let record = st
        .store
        .insert_recipe(input.recipe, rows)
        .await
        .map_err(|e| write_failed(e, &name))?;

    info!(recipe_id = %record.id, recipe_name = %record.recipe_name, "recipe created");
    Ok(record)
}

pub async fn get_recipe(st: &AppState, id: Uuid) -> Result<RecipeRecord, AppError> {
    st.store.get_recipe(id).await?.ok_or(AppError::NotFound)
}

pub async fn list_recipes(
    st: &AppState,
    req: PageRequest,
    order: RecipeOrder,
) -> Result<Page<RecipeRecord>, AppError> {
    let page = paginate(req, |limit, offset| st.store.list_recipes(order, limit, offset)).await?;
    debug!(page = page.page, per_page = page.per_page, total = page.total, "recipes listed");
    Ok(page)
}

/// Full replace: fields are overwritten and every ingredient row is recreated.
pub async fn update_recipe(
    st: &AppState,
    id: Uuid,
    input: RecipeInput,
) -> Result<RecipeRecord, AppError> {
    let existing = get_recipe(st, id).await?;
    if existing.recipe_name != input.recipe.recipe_name {
        ensure_name_free(st, &input.recipe.recipe_name, Some(id)).await?;
    }
    let rows = resolve_rows(st, &input).await?;

    let name = input.recipe.recipe_name.clone();
    let record = st
        .store
        .replace_recipe(id, input.recipe, rows)
        .await
        .map_err(|e| write_failed(e, &name))?
        .ok_or(AppError::NotFound)?;

    info!(recipe_id = %id, "recipe updated");
    Ok(record)
}

pub async fn delete_recipe(st: &AppState, id: Uuid) -> Result<(), AppError> {
    if !st.store.delete_recipe(id).await? {
        return Err(AppError::NotFound);
    }
    info!(recipe_id = %id, "recipe deleted");
    Ok(())
}
