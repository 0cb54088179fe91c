use std::collections::HashMap;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{AppError, FieldErrors};
use crate::state::AppState;
use crate::store::RecipeSummary;

/// Syntax check for every pin; duplicates collapse to their first occurrence.
pub fn parse_pins(raw: &[String]) -> Result<Vec<Uuid>, AppError> {
    let mut errors = FieldErrors::new();
    let mut ids: Vec<Uuid> = Vec::with_capacity(raw.len());
    for (i, value) in raw.iter().enumerate() {
        match Uuid::parse_str(value.trim()) {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => errors.add(format!("pin.{i}"), "Not a valid UUID."),
        }
    }
    errors.into_result()?;
    Ok(ids)
}

/// Requested size, falling back to the configured default when absent or not positive.
pub fn target_count(number: Option<i64>, default: i64) -> i64 {
    match number {
        Some(n) if n > 0 => n,
        _ => default,
    }
}

/// Pinned recipes first (in request order), then a random sample of the rest.
///
/// Pins are excluded from the random pool, so the result never repeats a recipe.
/// When storage holds fewer recipes than requested, everything available is returned.
pub async fn select_random(
    st: &AppState,
    number: Option<i64>,
    pins: &[String],
) -> Result<Vec<RecipeSummary>, AppError> {
    let pin_ids = parse_pins(pins)?;

    let mut found: HashMap<Uuid, RecipeSummary> = st
        .store
        .recipe_summaries(&pin_ids)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let missing: Vec<Uuid> = pin_ids
        .iter()
        .filter(|id| !found.contains_key(id))
        .copied()
        .collect();
    if !missing.is_empty() {
        warn!(?missing, "pinned recipes not found");
        return Err(AppError::InvalidReference(missing));
    }

    let count = target_count(number, st.config.default_random_recipes);
    let remaining = (count - pin_ids.len() as i64).max(0);
    let sampled = st.store.random_recipes(remaining, &pin_ids).await?;
    debug!(count, pinned = pin_ids.len(), sampled = sampled.len(), "random selection");

    let mut out: Vec<RecipeSummary> = pin_ids
        .iter()
        .filter_map(|id| found.remove(id))
        .collect();
    out.extend(sampled);
    Ok(out)
}
