use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FieldErrors;
use crate::ingredients::dto::IngredientRef;
use crate::store::{Instruction, NewRecipe, RecipeIngredient, RecipeOrder, RecipeRecord};
use crate::validation::{
    int_or_numeric_string, required_text, Validate, NOTES_MAX, RECIPE_NAME_MAX,
};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InstructionInput {
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub step_number: i64,
    pub instruction: String,
}

/// Body of `POST /recipes` and `PUT /recipes/:id` (full replace).
#[derive(Debug, Deserialize)]
pub struct RecipeRequest {
    pub recipe_name: String,
    pub instructions: Vec<InstructionInput>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientRef>>,
}

#[derive(Debug)]
pub struct RecipeInput {
    pub recipe: NewRecipe,
    pub ingredients: Vec<IngredientRef>,
}

impl Validate for RecipeRequest {
    type Output = RecipeInput;

    fn validate(self) -> Result<RecipeInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let recipe_name = required_text(&mut errors, "recipe_name", &self.recipe_name, RECIPE_NAME_MAX);

        if self.instructions.is_empty() {
            errors.add("instructions", "instructions must contain at least one step.");
        }
        for (i, step) in self.instructions.iter().enumerate() {
            if step.step_number < 1 {
                errors.add(
                    format!("instructions.{i}.step_number"),
                    "step_number must be at least 1.",
                );
            }
            if step.instruction.trim().is_empty() {
                errors.add(
                    format!("instructions.{i}.instruction"),
                    "instruction must not be empty.",
                );
            }
        }

        if let Some(notes) = &self.notes {
            if notes.chars().count() > NOTES_MAX {
                errors.add("notes", format!("notes must not exceed {NOTES_MAX} characters."));
            }
        }

        match recipe_name {
            Some(recipe_name) if errors.is_empty() => Ok(RecipeInput {
                recipe: NewRecipe {
                    recipe_name,
                    instructions: self
                        .instructions
                        .into_iter()
                        .map(|s| Instruction {
                            step_number: s.step_number,
                            instruction: s.instruction,
                        })
                        .collect(),
                    notes: self.notes,
                },
                ingredients: self.ingredients.unwrap_or_default(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    #[serde(default)]
    pub order: RecipeOrder,
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientResponse {
    pub ingredient_id: Option<Uuid>,
    pub ingredient_name: String,
    pub amount: f64,
    pub unit_id: Option<Uuid>,
    pub unit_name: String,
}

#[derive(Debug, Serialize)]
pub struct RecipeResponse {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub instructions: Vec<Instruction>,
    pub notes: Option<String>,
    pub recipe_ingredients: Vec<RecipeIngredientResponse>,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(r: RecipeIngredient) -> Self {
        Self {
            ingredient_id: r.ingredient_id,
            ingredient_name: r.ingredient_name,
            amount: r.amount,
            unit_id: r.unit_id,
            unit_name: r.unit_name,
        }
    }
}

impl From<RecipeRecord> for RecipeResponse {
    fn from(r: RecipeRecord) -> Self {
        Self {
            recipe_id: r.id,
            recipe_name: r.recipe_name,
            instructions: r.instructions,
            notes: r.notes,
            recipe_ingredients: r.ingredients.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
