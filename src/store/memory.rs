//! In-process `RecipeStore` for tests, with switches to simulate backend failures.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use rand::seq::SliceRandom;
use uuid::Uuid;

use super::{
    Ingredient, NewRecipe, NewRecipeIngredient, RecipeIngredient, RecipeOrder, RecipeRecord,
    RecipeStore, RecipeSummary, StoreError, StoreResult, Unit,
};
use crate::config::SEEDED_DEFAULT_UNIT_ID;

#[derive(Default)]
struct Tables {
    recipes: Vec<RecipeRecord>,
    ingredients: Vec<Ingredient>,
    units: Vec<Unit>,
}

#[derive(Default)]
struct Faults {
    recipe_writes: bool,
    blind_name_check: bool,
    ingredient_names: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    faults: Mutex<Faults>,
}

impl MemoryStore {
    /// Store holding the same units the migration seeds.
    pub fn seeded() -> Self {
        let store = Self::default();
        {
            let mut tables = store.tables.lock().unwrap();
            tables.units = vec![
                unit(SEEDED_DEFAULT_UNIT_ID, "teaspoon", Some("tsp")),
                unit("3c7f1a52-2f7e-4a39-9a53-8d0a8cd1f0a1", "tablespoon", Some("tbsp")),
                unit("5b0e1f9c-6a77-4c0e-b5a4-0f1d2e3c4b5a", "gram", Some("g")),
            ];
        }
        store
    }

    /// Every recipe write (insert, replace, delete) fails with a backend error.
    pub fn fail_recipe_writes(&self, on: bool) {
        self.faults.lock().unwrap().recipe_writes = on;
    }

    /// `recipe_name_taken` always answers `false`, as if another request took the
    /// name between the check and the write. Writes still hit the name clash.
    pub fn blind_name_check(&self, on: bool) {
        self.faults.lock().unwrap().blind_name_check = on;
    }

    /// Inserting an ingredient with this (normalized) name fails.
    pub fn fail_ingredient(&self, name: &str) {
        self.faults
            .lock()
            .unwrap()
            .ingredient_names
            .insert(name.to_string());
    }

    pub fn ingredient_count(&self) -> usize {
        self.tables.lock().unwrap().ingredients.len()
    }

    pub fn recipe_ingredient_count(&self) -> usize {
        self.tables
            .lock()
            .unwrap()
            .recipes
            .iter()
            .map(|r| r.ingredients.len())
            .sum()
    }

    pub fn rename_ingredient(&self, id: Uuid, name: &str) {
        let mut tables = self.tables.lock().unwrap();
        if let Some(i) = tables.ingredients.iter_mut().find(|i| i.id == id) {
            i.ingredient_name = name.to_string();
        }
    }

    fn check_recipe_write(&self) -> StoreResult<()> {
        if self.faults.lock().unwrap().recipe_writes {
            return Err(StoreError::Backend(anyhow::anyhow!("simulated write failure")));
        }
        Ok(())
    }
}

fn unit(id: &str, name: &str, abbreviation: Option<&str>) -> Unit {
    Unit {
        id: Uuid::parse_str(id).unwrap(),
        unit_name: name.to_string(),
        abbreviation: abbreviation.map(str::to_string),
    }
}

fn name_clash(tables: &Tables, name: &str, exclude: Option<Uuid>) -> bool {
    let lowered = name.to_lowercase();
    tables
        .recipes
        .iter()
        .any(|r| Some(r.id) != exclude && r.recipe_name.to_lowercase() == lowered)
}

fn build_rows(recipe_id: Uuid, items: Vec<NewRecipeIngredient>) -> Vec<RecipeIngredient> {
    items
        .into_iter()
        .map(|item| RecipeIngredient {
            recipe_id,
            ingredient_id: Some(item.ingredient_id),
            unit_id: Some(item.unit_id),
            amount: item.amount,
            ingredient_name: item.ingredient_name,
            unit_name: item.unit_name,
        })
        .collect()
}

#[async_trait]
impl RecipeStore for MemoryStore {
    async fn recipe_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        if self.faults.lock().unwrap().blind_name_check {
            return Ok(false);
        }
        Ok(name_clash(&self.tables.lock().unwrap(), name, exclude))
    }

    async fn insert_recipe(
        &self,
        recipe: NewRecipe,
        ingredients: Vec<NewRecipeIngredient>,
    ) -> StoreResult<RecipeRecord> {
        self.check_recipe_write()?;
        let mut tables = self.tables.lock().unwrap();
        if name_clash(&tables, &recipe.recipe_name, None) {
            return Err(StoreError::DuplicateRecipeName);
        }
        let id = Uuid::new_v4();
        let record = RecipeRecord {
            id,
            recipe_name: recipe.recipe_name,
            instructions: recipe.instructions,
            notes: recipe.notes,
            ingredients: build_rows(id, ingredients),
        };
        tables.recipes.push(record.clone());
        Ok(record)
    }

    async fn replace_recipe(
        &self,
        id: Uuid,
        recipe: NewRecipe,
        ingredients: Vec<NewRecipeIngredient>,
    ) -> StoreResult<Option<RecipeRecord>> {
        self.check_recipe_write()?;
        let mut tables = self.tables.lock().unwrap();
        if name_clash(&tables, &recipe.recipe_name, Some(id)) {
            return Err(StoreError::DuplicateRecipeName);
        }
        let Some(existing) = tables.recipes.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        existing.recipe_name = recipe.recipe_name;
        existing.instructions = recipe.instructions;
        existing.notes = recipe.notes;
        existing.ingredients = build_rows(id, ingredients);
        Ok(Some(existing.clone()))
    }

    async fn get_recipe(&self, id: Uuid) -> StoreResult<Option<RecipeRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.recipes.iter().find(|r| r.id == id).cloned())
    }

    async fn delete_recipe(&self, id: Uuid) -> StoreResult<bool> {
        self.check_recipe_write()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.recipes.len();
        tables.recipes.retain(|r| r.id != id);
        Ok(tables.recipes.len() < before)
    }

    async fn list_recipes(
        &self,
        order: RecipeOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<RecipeRecord>, i64)> {
        let tables = self.tables.lock().unwrap();
        let mut all = tables.recipes.clone();
        all.sort_by(|a, b| match order {
            RecipeOrder::NameAsc => a.recipe_name.cmp(&b.recipe_name).then(a.id.cmp(&b.id)),
            RecipeOrder::NameDesc => b.recipe_name.cmp(&a.recipe_name).then(a.id.cmp(&b.id)),
        });
        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn recipe_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<RecipeSummary>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .recipes
            .iter()
            .filter(|r| ids.contains(&r.id))
            .map(|r| RecipeSummary {
                id: r.id,
                recipe_name: r.recipe_name.clone(),
            })
            .collect())
    }

    async fn random_recipes(&self, count: i64, exclude: &[Uuid]) -> StoreResult<Vec<RecipeSummary>> {
        let tables = self.tables.lock().unwrap();
        let pool: Vec<RecipeSummary> = tables
            .recipes
            .iter()
            .filter(|r| !exclude.contains(&r.id))
            .map(|r| RecipeSummary {
                id: r.id,
                recipe_name: r.recipe_name.clone(),
            })
            .collect();
        let mut rng = rand::thread_rng();
        Ok(pool
            .choose_multiple(&mut rng, count.max(0) as usize)
            .cloned()
            .collect())
    }

    async fn find_ingredient(&self, id: Uuid) -> StoreResult<Option<Ingredient>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.ingredients.iter().find(|i| i.id == id).cloned())
    }

    async fn find_ingredient_by_name(&self, name: &str) -> StoreResult<Option<Ingredient>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables
            .ingredients
            .iter()
            .find(|i| i.ingredient_name == name)
            .cloned())
    }

    async fn insert_ingredient(&self, name: &str) -> StoreResult<Ingredient> {
        if self.faults.lock().unwrap().ingredient_names.contains(name) {
            return Err(StoreError::Backend(anyhow::anyhow!(
                "simulated insert failure for {name}"
            )));
        }
        let mut tables = self.tables.lock().unwrap();
        if let Some(existing) = tables.ingredients.iter().find(|i| i.ingredient_name == name) {
            return Ok(existing.clone());
        }
        let ingredient = Ingredient {
            id: Uuid::new_v4(),
            ingredient_name: name.to_string(),
            type_id: None,
        };
        tables.ingredients.push(ingredient.clone());
        Ok(ingredient)
    }

    async fn find_unit(&self, id: Uuid) -> StoreResult<Option<Unit>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.units.iter().find(|u| u.id == id).cloned())
    }

    async fn list_units(&self) -> StoreResult<Vec<Unit>> {
        let mut units = self.tables.lock().unwrap().units.clone();
        units.sort_by(|a, b| a.unit_name.cmp(&b.unit_name));
        Ok(units)
    }
}
