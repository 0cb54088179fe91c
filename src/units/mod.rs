use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use crate::store::Unit;

pub fn router() -> Router<AppState> {
    Router::new().route("/units", get(list_units))
}

#[derive(Debug, Serialize)]
pub struct UnitResponse {
    pub unit_id: Uuid,
    pub unit_name: String,
    pub abbreviation: Option<String>,
}

impl From<Unit> for UnitResponse {
    fn from(u: Unit) -> Self {
        Self {
            unit_id: u.id,
            unit_name: u.unit_name,
            abbreviation: u.abbreviation,
        }
    }
}

/// Measurement units are seeded by migration and read-only over HTTP.
#[instrument(skip(state))]
pub async fn list_units(State(state): State<AppState>) -> Result<Json<Vec<UnitResponse>>, AppError> {
    let units = state.store.list_units().await?;
    Ok(Json(units.into_iter().map(UnitResponse::from).collect()))
}
