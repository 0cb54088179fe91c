use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use super::{
    Ingredient, Instruction, NewRecipe, NewRecipeIngredient, RecipeIngredient, RecipeOrder,
    RecipeRecord, RecipeStore, RecipeSummary, StoreError, StoreResult, Unit,
};

const RECIPE_NAME_INDEX: &str = "uq_recipes_recipe_name_lower";

#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromRow)]
struct RecipeRow {
    id: Uuid,
    recipe_name: String,
    instructions: Json<Vec<Instruction>>,
    notes: Option<String>,
}

impl RecipeRow {
    fn into_record(self, ingredients: Vec<RecipeIngredient>) -> RecipeRecord {
        RecipeRecord {
            id: self.id,
            recipe_name: self.recipe_name,
            instructions: self.instructions.0,
            notes: self.notes,
            ingredients,
        }
    }
}

fn backend(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| StoreError::Backend(anyhow::Error::new(e).context(context))
}

/// Like [`backend`], but recognises the recipe-name unique index.
fn write_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() && db_err.constraint() == Some(RECIPE_NAME_INDEX) {
                return StoreError::DuplicateRecipeName;
            }
        }
        backend(context)(e)
    }
}

// ---- Transaction helpers ----

async fn insert_recipe_ingredients_tx(
    conn: &mut PgConnection,
    recipe_id: Uuid,
    items: &[NewRecipeIngredient],
) -> StoreResult<Vec<RecipeIngredient>> {
    let mut rows = Vec::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let row = sqlx::query_as::<_, RecipeIngredient>(
            r#"
            INSERT INTO recipe_ingredients
                (id, recipe_id, ingredient_id, unit_id, amount, ingredient_name, unit_name, position)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING recipe_id, ingredient_id, unit_id, amount, ingredient_name, unit_name
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(recipe_id)
        .bind(item.ingredient_id)
        .bind(item.unit_id)
        .bind(item.amount)
        .bind(&item.ingredient_name)
        .bind(&item.unit_name)
        .bind(position as i32)
        .fetch_one(&mut *conn)
        .await
        .map_err(backend("insert recipe ingredient"))?;
        rows.push(row);
    }
    Ok(rows)
}

impl PgStore {
    async fn ingredients_for(
        &self,
        recipe_ids: &[Uuid],
    ) -> StoreResult<HashMap<Uuid, Vec<RecipeIngredient>>> {
        if recipe_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = sqlx::query_as::<_, RecipeIngredient>(
            r#"
            SELECT recipe_id, ingredient_id, unit_id, amount, ingredient_name, unit_name
              FROM recipe_ingredients
             WHERE recipe_id = ANY($1)
             ORDER BY recipe_id, position
            "#,
        )
        .bind(recipe_ids)
        .fetch_all(&self.db)
        .await
        .map_err(backend("list recipe ingredients"))?;

        let mut by_recipe: HashMap<Uuid, Vec<RecipeIngredient>> = HashMap::new();
        for row in rows {
            by_recipe.entry(row.recipe_id).or_default().push(row);
        }
        Ok(by_recipe)
    }
}

#[async_trait]
impl RecipeStore for PgStore {
    async fn recipe_name_taken(&self, name: &str, exclude: Option<Uuid>) -> StoreResult<bool> {
        // `IS DISTINCT FROM` keeps the row when $2 is NULL
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                  FROM recipes
                 WHERE lower(recipe_name) = lower($1)
                   AND id IS DISTINCT FROM $2
            )
            "#,
        )
        .bind(name)
        .bind(exclude)
        .fetch_one(&self.db)
        .await
        .map_err(backend("check recipe name"))?;
        Ok(taken)
    }

    async fn insert_recipe(
        &self,
        recipe: NewRecipe,
        ingredients: Vec<NewRecipeIngredient>,
    ) -> StoreResult<RecipeRecord> {
        let mut tx = self.db.begin().await.map_err(backend("begin tx"))?;

        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            INSERT INTO recipes (id, recipe_name, instructions, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, recipe_name, instructions, notes
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&recipe.recipe_name)
        .bind(Json(&recipe.instructions))
        .bind(&recipe.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_error("insert recipe"))?;

        let rows = insert_recipe_ingredients_tx(&mut *tx, row.id, &ingredients).await?;
        tx.commit().await.map_err(backend("commit tx"))?;

        debug!(recipe_id = %row.id, ingredients = rows.len(), "recipe inserted");
        Ok(row.into_record(rows))
    }

    async fn replace_recipe(
        &self,
        id: Uuid,
        recipe: NewRecipe,
        ingredients: Vec<NewRecipeIngredient>,
    ) -> StoreResult<Option<RecipeRecord>> {
        let mut tx = self.db.begin().await.map_err(backend("begin tx"))?;

        let Some(row) = sqlx::query_as::<_, RecipeRow>(
            r#"
            UPDATE recipes
               SET recipe_name = $2, instructions = $3, notes = $4
             WHERE id = $1
            RETURNING id, recipe_name, instructions, notes
            "#,
        )
        .bind(id)
        .bind(&recipe.recipe_name)
        .bind(Json(&recipe.instructions))
        .bind(&recipe.notes)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_error("update recipe"))?
        else {
            return Ok(None);
        };

        let removed = sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(backend("clear recipe ingredients"))?
            .rows_affected();

        let rows = insert_recipe_ingredients_tx(&mut *tx, id, &ingredients).await?;
        tx.commit().await.map_err(backend("commit tx"))?;

        debug!(recipe_id = %id, removed, added = rows.len(), "recipe replaced");
        Ok(Some(row.into_record(rows)))
    }

    async fn get_recipe(&self, id: Uuid) -> StoreResult<Option<RecipeRecord>> {
        let row = sqlx::query_as::<_, RecipeRow>(
            r#"
            SELECT id, recipe_name, instructions, notes
              FROM recipes
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(backend("get recipe"))?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut ingredients = self.ingredients_for(&[row.id]).await?;
        let rows = ingredients.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_record(rows)))
    }

    async fn delete_recipe(&self, id: Uuid) -> StoreResult<bool> {
        // recipe_ingredients rows go with it (ON DELETE CASCADE)
        let deleted = sqlx::query("DELETE FROM recipes WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(backend("delete recipe"))?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn list_recipes(
        &self,
        order: RecipeOrder,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<RecipeRecord>, i64)> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes")
            .fetch_one(&self.db)
            .await
            .map_err(backend("count recipes"))?;

        let order_by = match order {
            RecipeOrder::NameAsc => "recipe_name ASC, id ASC",
            RecipeOrder::NameDesc => "recipe_name DESC, id ASC",
        };
        let sql = format!(
            "SELECT id, recipe_name, instructions, notes FROM recipes ORDER BY {order_by} LIMIT $1 OFFSET $2"
        );
        let rows = sqlx::query_as::<_, RecipeRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.db)
            .await
            .map_err(backend("list recipes"))?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut ingredients = self.ingredients_for(&ids).await?;
        let records = rows
            .into_iter()
            .map(|row| {
                let rows = ingredients.remove(&row.id).unwrap_or_default();
                row.into_record(rows)
            })
            .collect();
        Ok((records, total))
    }

    async fn recipe_summaries(&self, ids: &[Uuid]) -> StoreResult<Vec<RecipeSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, RecipeSummary>(
            "SELECT id, recipe_name FROM recipes WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
        .map_err(backend("get recipe summaries"))?;
        Ok(rows)
    }

    async fn random_recipes(&self, count: i64, exclude: &[Uuid]) -> StoreResult<Vec<RecipeSummary>> {
        if count <= 0 {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, RecipeSummary>(
            r#"
            SELECT id, recipe_name
              FROM recipes
             WHERE NOT (id = ANY($1))
             ORDER BY random()
             LIMIT $2
            "#,
        )
        .bind(exclude)
        .bind(count)
        .fetch_all(&self.db)
        .await
        .map_err(backend("sample random recipes"))?;
        Ok(rows)
    }

    async fn find_ingredient(&self, id: Uuid) -> StoreResult<Option<Ingredient>> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, ingredient_name, type_id FROM ingredients WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .map_err(backend("get ingredient"))
    }

    async fn find_ingredient_by_name(&self, name: &str) -> StoreResult<Option<Ingredient>> {
        sqlx::query_as::<_, Ingredient>(
            "SELECT id, ingredient_name, type_id FROM ingredients WHERE ingredient_name = $1",
        )
        .bind(name)
        .fetch_optional(&self.db)
        .await
        .map_err(backend("find ingredient by name"))
    }

    async fn insert_ingredient(&self, name: &str) -> StoreResult<Ingredient> {
        // the no-op update makes RETURNING yield the existing row on conflict
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (id, ingredient_name)
            VALUES ($1, $2)
            ON CONFLICT (ingredient_name)
            DO UPDATE SET ingredient_name = EXCLUDED.ingredient_name
            RETURNING id, ingredient_name, type_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_one(&self.db)
        .await
        .map_err(backend("insert ingredient"))
    }

    async fn find_unit(&self, id: Uuid) -> StoreResult<Option<Unit>> {
        sqlx::query_as::<_, Unit>("SELECT id, unit_name, abbreviation FROM units WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(backend("get unit"))
    }

    async fn list_units(&self) -> StoreResult<Vec<Unit>> {
        sqlx::query_as::<_, Unit>(
            "SELECT id, unit_name, abbreviation FROM units ORDER BY unit_name ASC",
        )
        .fetch_all(&self.db)
        .await
        .map_err(backend("list units"))
    }
}
