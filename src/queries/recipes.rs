use crate::models::{RecipeIngredientRow, RecipeRow};
use crate::validation::IngredientEntry;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

pub struct NewRecipe<'a> {
    pub name: &'a str,
    pub image: &'a str,
    pub text: &'a str,
    pub cooking_time: i64,
    pub created_at: i64,
}

pub struct RecipeUpdate<'a> {
    pub name: &'a str,
    /// None keeps the stored image
    pub image: Option<&'a str>,
    pub text: &'a str,
    pub cooking_time: i64,
}

/// Server-side listing filters, ANDed when combined
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeFilters {
    pub author: Option<i64>,
    pub favorited_by: Option<i64>,
    pub in_cart_of: Option<i64>,
}

/// Insert the recipe row and its join rows in one transaction.
pub async fn create_recipe(
    pool: &SqlitePool,
    author_id: i64,
    recipe: &NewRecipe<'_>,
    entries: &[IngredientEntry],
) -> sqlx::Result<i64> {
    let mut tx = pool.begin().await?;

    let result = sqlx::query(
        "INSERT INTO recipes (author_id, name, image, text, cooking_time, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(author_id)
    .bind(recipe.name)
    .bind(recipe.image)
    .bind(recipe.text)
    .bind(recipe.cooking_time)
    .bind(recipe.created_at)
    .execute(&mut *tx)
    .await?;
    let recipe_id = result.last_insert_rowid();

    insert_entries(&mut tx, recipe_id, entries).await?;

    tx.commit().await?;
    Ok(recipe_id)
}

/// Full replace of the ingredient list plus scalar column update, one
/// transaction: a concurrent reader never sees the recipe without join
/// rows.
pub async fn update_recipe(
    pool: &SqlitePool,
    recipe_id: i64,
    update: &RecipeUpdate<'_>,
    entries: &[IngredientEntry],
) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;

    match update.image {
        Some(image) => {
            sqlx::query(
                "UPDATE recipes SET name = ?, image = ?, text = ?, cooking_time = ? WHERE id = ?",
            )
            .bind(update.name)
            .bind(image)
            .bind(update.text)
            .bind(update.cooking_time)
            .bind(recipe_id)
            .execute(&mut *tx)
            .await?;
        }
        None => {
            sqlx::query("UPDATE recipes SET name = ?, text = ?, cooking_time = ? WHERE id = ?")
                .bind(update.name)
                .bind(update.text)
                .bind(update.cooking_time)
                .bind(recipe_id)
                .execute(&mut *tx)
                .await?;
        }
    }

    sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = ?")
        .bind(recipe_id)
        .execute(&mut *tx)
        .await?;

    insert_entries(&mut tx, recipe_id, entries).await?;

    tx.commit().await?;
    Ok(())
}

async fn insert_entries(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    recipe_id: i64,
    entries: &[IngredientEntry],
) -> sqlx::Result<()> {
    for entry in entries {
        sqlx::query(
            "INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount) VALUES (?, ?, ?)",
        )
        .bind(recipe_id)
        .bind(entry.ingredient_id)
        .bind(entry.amount)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn recipe_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<RecipeRow>> {
    sqlx::query_as::<_, RecipeRow>("SELECT * FROM recipes WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn delete_recipe(pool: &SqlitePool, id: i64) -> sqlx::Result<bool> {
    let result = sqlx::query("DELETE FROM recipes WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Join rows for one recipe, enriched with ingredient name and unit
pub async fn ingredients_for(
    pool: &SqlitePool,
    recipe_id: i64,
) -> sqlx::Result<Vec<RecipeIngredientRow>> {
    sqlx::query_as::<_, RecipeIngredientRow>(
        "SELECT i.id, i.name, i.measurement_unit, ri.amount
         FROM recipe_ingredients ri
         JOIN ingredients i ON i.id = ri.ingredient_id
         WHERE ri.recipe_id = ?
         ORDER BY ri.id",
    )
    .bind(recipe_id)
    .fetch_all(pool)
    .await
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, filters: &RecipeFilters) {
    if let Some(author) = filters.author {
        builder.push(" AND r.author_id = ").push_bind(author);
    }
    if let Some(user_id) = filters.favorited_by {
        builder
            .push(" AND EXISTS (SELECT 1 FROM favorites f WHERE f.recipe_id = r.id AND f.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
    if let Some(user_id) = filters.in_cart_of {
        builder
            .push(" AND EXISTS (SELECT 1 FROM shopping_cart c WHERE c.recipe_id = r.id AND c.user_id = ")
            .push_bind(user_id)
            .push(")");
    }
}

/// Filtered listing, newest first
pub async fn list_recipes(
    pool: &SqlitePool,
    filters: &RecipeFilters,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<RecipeRow>> {
    let mut builder = QueryBuilder::new("SELECT r.* FROM recipes r WHERE 1 = 1");
    push_filters(&mut builder, filters);
    builder
        .push(" ORDER BY r.created_at DESC, r.id DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    builder.build_query_as::<RecipeRow>().fetch_all(pool).await
}

pub async fn count_recipes(pool: &SqlitePool, filters: &RecipeFilters) -> sqlx::Result<i64> {
    let mut builder = QueryBuilder::new("SELECT COUNT(*) FROM recipes r WHERE 1 = 1");
    push_filters(&mut builder, filters);

    let row: (i64,) = builder.build_query_as().fetch_one(pool).await?;
    Ok(row.0)
}

/// An author's recipes for the enriched subscription profile, newest
/// first, optionally truncated.
pub async fn recipes_by_author(
    pool: &SqlitePool,
    author_id: i64,
    limit: Option<i64>,
) -> sqlx::Result<Vec<RecipeRow>> {
    match limit {
        Some(limit) => {
            sqlx::query_as::<_, RecipeRow>(
                "SELECT * FROM recipes WHERE author_id = ?
                 ORDER BY created_at DESC, id DESC LIMIT ?",
            )
            .bind(author_id)
            .bind(limit)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as::<_, RecipeRow>(
                "SELECT * FROM recipes WHERE author_id = ? ORDER BY created_at DESC, id DESC",
            )
            .bind(author_id)
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn count_by_author(pool: &SqlitePool, author_id: i64) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM recipes WHERE author_id = ?")
        .bind(author_id)
        .fetch_one(pool)
        .await
}
