//! Presence relations: favorite/cart rows keyed by `CollectionKind`, and
//! the directed subscription edge between users.
//!
//! `add` uses INSERT OR IGNORE so the UNIQUE constraint arbitrates
//! concurrent double-adds; the loser observes `false` and reports the
//! conflict.

use crate::models::CollectionKind;
use sqlx::SqlitePool;

pub async fn exists(
    pool: &SqlitePool,
    kind: CollectionKind,
    user_id: i64,
    recipe_id: i64,
) -> sqlx::Result<bool> {
    let sql = format!(
        "SELECT 1 FROM {} WHERE user_id = ? AND recipe_id = ?",
        kind.table()
    );
    let row = sqlx::query_scalar::<_, i64>(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

/// Returns false when the pair was already present.
pub async fn add(
    pool: &SqlitePool,
    kind: CollectionKind,
    user_id: i64,
    recipe_id: i64,
) -> sqlx::Result<bool> {
    let sql = format!(
        "INSERT OR IGNORE INTO {} (user_id, recipe_id) VALUES (?, ?)",
        kind.table()
    );
    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns false when there was nothing to remove.
pub async fn remove(
    pool: &SqlitePool,
    kind: CollectionKind,
    user_id: i64,
    recipe_id: i64,
) -> sqlx::Result<bool> {
    let sql = format!(
        "DELETE FROM {} WHERE user_id = ? AND recipe_id = ?",
        kind.table()
    );
    let result = sqlx::query(&sql)
        .bind(user_id)
        .bind(recipe_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_subscribed(
    pool: &SqlitePool,
    subscriber_id: i64,
    author_id: i64,
) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i64>(
        "SELECT 1 FROM subscriptions WHERE subscriber_id = ? AND author_id = ?",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}

/// Returns false when the edge already existed.
pub async fn add_subscription(
    pool: &SqlitePool,
    subscriber_id: i64,
    author_id: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO subscriptions (subscriber_id, author_id) VALUES (?, ?)",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns false when the edge was absent.
pub async fn remove_subscription(
    pool: &SqlitePool,
    subscriber_id: i64,
    author_id: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        "DELETE FROM subscriptions WHERE subscriber_id = ? AND author_id = ?",
    )
    .bind(subscriber_id)
    .bind(author_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}
