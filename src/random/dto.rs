use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::store::RecipeSummary;

/// Body of `POST /random`; every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct RandomRequest {
    #[serde(default)]
    pub number: Option<i64>,
    #[serde(default)]
    pub pin: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct RandomRecipe {
    pub recipe_id: Uuid,
    pub recipe_name: String,
}

impl From<RecipeSummary> for RandomRecipe {
    fn from(s: RecipeSummary) -> Self {
        Self {
            recipe_id: s.id,
            recipe_name: s.recipe_name,
        }
    }
}
