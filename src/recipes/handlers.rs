use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::dto::{ListQuery, MessageResponse, RecipeRequest, RecipeResponse};
use super::services;
use crate::error::AppError;
use crate::pagination::{Page, PageRequest};
use crate::state::AppState;
use crate::validation::{Validate, ValidJson, ValidQuery};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", axum::routing::post(create_recipe))
        .route(
            "/recipes/:id",
            axum::routing::put(update_recipe).delete(delete_recipe),
        )
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    ValidQuery(q): ValidQuery<ListQuery>,
) -> Result<Json<Page<RecipeResponse>>, AppError> {
    let req = PageRequest::new(q.page, q.per_page, &state.config.pagination)
        .map_err(AppError::Validation)?;
    let page = services::list_recipes(&state, req, q.order).await?;
    Ok(Json(page.map(RecipeResponse::from)))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RecipeResponse>, AppError> {
    let id = services::parse_recipe_id(&id)?;
    let recipe = services::get_recipe(&state, id).await?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    ValidJson(payload): ValidJson<RecipeRequest>,
) -> Result<(StatusCode, [(header::HeaderName, String); 1], Json<RecipeResponse>), AppError> {
    let input = payload.validate().map_err(AppError::Validation)?;
    let recipe = services::create_recipe(&state, input).await?;
    let location = format!("/api/v1/recipes/{}", recipe.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(recipe.into()),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidJson(payload): ValidJson<RecipeRequest>,
) -> Result<Json<RecipeResponse>, AppError> {
    let id = services::parse_recipe_id(&id)?;
    let input = payload.validate().map_err(AppError::Validation)?;
    let recipe = services::update_recipe(&state, id, input).await?;
    Ok(Json(recipe.into()))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = services::parse_recipe_id(&id)?;
    services::delete_recipe(&state, id).await?;
    Ok(Json(MessageResponse {
        message: format!("recipe id {id} deleted"),
    }))
}
