use serde::Deserialize;
use uuid::Uuid;

/// Ingredient as sent inside a recipe body. An `ingredient_id` that no longer
/// exists is ignored and the name is used instead.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientRef {
    #[serde(default)]
    pub ingredient_id: Option<Uuid>,
    pub ingredient_name: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit_id: Option<Uuid>,
}

#[cfg(test)]
impl IngredientRef {
    pub fn named(name: &str) -> Self {
        Self {
            ingredient_id: None,
            ingredient_name: name.to_string(),
            amount: None,
            unit_id: None,
        }
    }
}
