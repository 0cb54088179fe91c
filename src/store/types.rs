use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One step of a recipe, stored inside the `instructions` jsonb column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub step_number: i64,
    pub instruction: String,
}

/// Recipe row together with its ingredient associations.
#[derive(Debug, Clone)]
pub struct RecipeRecord {
    pub id: Uuid,
    pub recipe_name: String,
    pub instructions: Vec<Instruction>,
    pub notes: Option<String>,
    pub ingredients: Vec<RecipeIngredient>,
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipeIngredient {
    pub recipe_id: Uuid,
    pub ingredient_id: Option<Uuid>, // NULL once the ingredient row is gone
    pub unit_id: Option<Uuid>,
    pub amount: f64,
    pub ingredient_name: String, // snapshot taken when the association was created
    pub unit_name: String,       // same
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub recipe_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub ingredient_name: String,
    pub type_id: Option<Uuid>, // ingredient_types has no behaviour yet
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Unit {
    pub id: Uuid,
    pub unit_name: String,
    pub abbreviation: Option<String>,
}

/// Recipe fields written on create and on full replace.
#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub recipe_name: String,
    pub instructions: Vec<Instruction>,
    pub notes: Option<String>,
}

/// Association row to insert; names are copied from the resolved ingredient and unit.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipeIngredient {
    pub ingredient_id: Uuid,
    pub unit_id: Uuid,
    pub amount: f64,
    pub ingredient_name: String,
    pub unit_name: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOrder {
    #[default]
    NameAsc,
    NameDesc,
}
