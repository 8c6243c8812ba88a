use crate::models::IngredientRow;
use sqlx::SqlitePool;
use std::collections::HashSet;

/// Case-insensitive "starts with" search over ingredient names. No prefix
/// returns the whole reference set. Unpaginated.
///
/// SQLite's LIKE (and lower()) fold case for ASCII only, so the matching
/// happens here; the reference set is small and immutable.
pub async fn search(pool: &SqlitePool, prefix: Option<&str>) -> sqlx::Result<Vec<IngredientRow>> {
    let rows = sqlx::query_as::<_, IngredientRow>("SELECT * FROM ingredients ORDER BY name")
        .fetch_all(pool)
        .await?;

    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            let needle = prefix.to_lowercase();
            Ok(rows
                .into_iter()
                .filter(|row| row.name.to_lowercase().starts_with(&needle))
                .collect())
        }
        _ => Ok(rows),
    }
}

pub async fn ingredient_by_id(
    pool: &SqlitePool,
    id: i64,
) -> sqlx::Result<Option<IngredientRow>> {
    sqlx::query_as::<_, IngredientRow>("SELECT * FROM ingredients WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Which of the given ids actually exist, for validating submitted
/// ingredient references.
pub async fn existing_ids(pool: &SqlitePool, ids: &[i64]) -> sqlx::Result<HashSet<i64>> {
    if ids.is_empty() {
        return Ok(HashSet::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!("SELECT id FROM ingredients WHERE id IN ({placeholders})");

    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for id in ids {
        query = query.bind(id);
    }

    Ok(query.fetch_all(pool).await?.into_iter().collect())
}

/// Bulk-load reference data from the import CLI. One transaction; returns
/// the number of inserted rows.
pub async fn bulk_insert(pool: &SqlitePool, items: &[(String, String)]) -> sqlx::Result<u64> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for (name, measurement_unit) in items {
        let result = sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(name)
            .bind(measurement_unit)
            .execute(&mut *tx)
            .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

