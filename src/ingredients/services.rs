use std::collections::HashMap;

use tracing::{debug, error, warn};
use uuid::Uuid;

use super::dto::IngredientRef;
use crate::error::{AppError, FieldErrors};
use crate::state::AppState;
use crate::store::{Ingredient, NewRecipeIngredient, StoreResult, Unit};
use crate::validation::INGREDIENT_NAME_MAX;

pub const DEFAULT_AMOUNT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIngredient {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub amount: f64,
    pub unit_id: Uuid,
    pub unit_name: String,
}

impl From<ResolvedIngredient> for NewRecipeIngredient {
    fn from(r: ResolvedIngredient) -> Self {
        Self {
            ingredient_id: r.ingredient_id,
            unit_id: r.unit_id,
            amount: r.amount,
            ingredient_name: r.ingredient_name,
            unit_name: r.unit_name,
        }
    }
}

/// Outcome of resolving a batch: what made it and what did not.
#[derive(Debug, Default)]
pub struct Resolution {
    pub saved: Vec<ResolvedIngredient>,
    pub failed: Vec<String>,
}

impl Resolution {
    /// All-or-nothing view for callers about to attach the batch to a recipe.
    pub fn into_saved(self) -> Result<Vec<ResolvedIngredient>, AppError> {
        if self.failed.is_empty() {
            Ok(self.saved)
        } else {
            Err(AppError::IngredientsFailed(self.failed))
        }
    }
}

/// Lowercase and trim; errors carry the client-facing message.
pub fn normalize_name(raw: &str) -> Result<String, String> {
    let name = raw.trim().to_lowercase();
    if name.is_empty() {
        return Err("ingredient_name must not be empty.".into());
    }
    if name.chars().count() > INGREDIENT_NAME_MAX {
        return Err(format!(
            "ingredient_name must not exceed {INGREDIENT_NAME_MAX} characters."
        ));
    }
    Ok(name)
}

struct Checked {
    id: Option<Uuid>,
    name: String,
    amount: f64,
    unit: Unit,
}

/// Validates every reference before anything touches storage.
async fn check_refs(st: &AppState, refs: &[IngredientRef]) -> Result<Vec<Checked>, AppError> {
    let mut errors = FieldErrors::new();
    let mut units: HashMap<Uuid, Option<Unit>> = HashMap::new();
    let mut checked = Vec::with_capacity(refs.len());

    for (i, r) in refs.iter().enumerate() {
        let name = normalize_name(&r.ingredient_name)
            .map_err(|msg| errors.add(format!("ingredients.{i}.ingredient_name"), msg))
            .ok();

        let amount = r.amount.unwrap_or(DEFAULT_AMOUNT);
        if !amount.is_finite() || amount < 0.0 {
            errors.add(
                format!("ingredients.{i}.amount"),
                "amount must be a non-negative number.",
            );
        }

        let unit_id = r.unit_id.unwrap_or(st.config.default_unit_id);
        if !units.contains_key(&unit_id) {
            let found = st.store.find_unit(unit_id).await?;
            units.insert(unit_id, found);
        }
        let unit = units.get(&unit_id).cloned().flatten();
        if unit.is_none() {
            errors.add(format!("ingredients.{i}.unit_id"), "Unknown unit.");
        }

        if let (Some(name), Some(unit)) = (name, unit) {
            checked.push(Checked {
                id: r.ingredient_id,
                name,
                amount,
                unit,
            });
        }
    }

    errors.into_result()?;
    Ok(checked)
}

/// Id first, then exact normalized name, then insert.
async fn find_or_create(st: &AppState, id: Option<Uuid>, name: &str) -> StoreResult<Ingredient> {
    if let Some(id) = id {
        if let Some(existing) = st.store.find_ingredient(id).await? {
            debug!(ingredient_id = %id, "reusing ingredient by id");
            return Ok(existing);
        }
        warn!(ingredient_id = %id, "unknown ingredient id, falling back to name");
    }
    if let Some(existing) = st.store.find_ingredient_by_name(name).await? {
        debug!(ingredient_id = %existing.id, name, "reusing ingredient by name");
        return Ok(existing);
    }
    let created = st.store.insert_ingredient(name).await?;
    debug!(ingredient_id = %created.id, name, "ingredient created");
    Ok(created)
}

/// Resolves each reference to an ingredient row, in input order.
///
/// Invalid references fail the whole call with a validation error before any
/// write. Storage failures on one reference do not stop the others: they are
/// reported in [`Resolution::failed`].
pub async fn resolve_ingredients(
    st: &AppState,
    refs: &[IngredientRef],
) -> Result<Resolution, AppError> {
    let checked = check_refs(st, refs).await?;
    let mut resolution = Resolution::default();

    for c in checked {
        match find_or_create(st, c.id, &c.name).await {
            Ok(ingredient) => resolution.saved.push(ResolvedIngredient {
                ingredient_id: ingredient.id,
                ingredient_name: ingredient.ingredient_name,
                amount: c.amount,
                unit_id: c.unit.id,
                unit_name: c.unit.unit_name,
            }),
            Err(e) => {
                error!(error = ?e, name = %c.name, "failed to save ingredient");
                resolution.failed.push(c.name);
            }
        }
    }

    if !resolution.failed.is_empty() {
        warn!(failed = ?resolution.failed, "ingredient resolution incomplete");
    }
    Ok(resolution)
}
