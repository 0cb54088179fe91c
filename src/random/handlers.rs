use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use tracing::instrument;

use super::dto::{RandomRecipe, RandomRequest};
use super::services::select_random;
use crate::error::AppError;
use crate::state::AppState;
use crate::validation::optional_json;

pub fn routes() -> Router<AppState> {
    Router::new().route("/random", post(random_recipes))
}

/// POST /random { number?: 4, pin?: ["<uuid>", ...] }; the body may be empty.
#[instrument(skip(state, body))]
pub async fn random_recipes(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Vec<RandomRecipe>>, AppError> {
    let req: RandomRequest = optional_json(&body)?;
    let pins = req.pin.unwrap_or_default();
    let picked = select_random(&state, req.number, &pins).await?;
    Ok(Json(picked.into_iter().map(RandomRecipe::from).collect()))
}
