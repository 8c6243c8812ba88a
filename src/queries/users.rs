use crate::models::UserRow;
use sqlx::SqlitePool;

pub struct NewUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub password_hash: &'a str,
    pub created_at: i64,
}

pub async fn insert_user(pool: &SqlitePool, user: NewUser<'_>) -> sqlx::Result<i64> {
    let result = sqlx::query(
        "INSERT INTO users (email, username, first_name, last_name, password_hash, created_at)
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(user.email)
    .bind(user.username)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn email_taken(pool: &SqlitePool, email: &str) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn username_taken(pool: &SqlitePool, username: &str) -> sqlx::Result<bool> {
    let row = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn user_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn user_by_email(pool: &SqlitePool, email: &str) -> sqlx::Result<Option<UserRow>> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await
}

// Listing order follows the login identifier, matching profile listings
pub async fn list_users(pool: &SqlitePool, limit: i64, offset: i64) -> sqlx::Result<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY email LIMIT ? OFFSET ?")
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
}

pub async fn count_users(pool: &SqlitePool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    username: &str,
    first_name: &str,
    last_name: &str,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET username = ?, first_name = ?, last_name = ? WHERE id = ?")
        .bind(username)
        .bind(first_name)
        .bind(last_name)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_avatar(pool: &SqlitePool, id: i64, avatar: Option<&str>) -> sqlx::Result<()> {
    sqlx::query("UPDATE users SET avatar = ? WHERE id = ?")
        .bind(avatar)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Profiles the given user is subscribed to, paginated
pub async fn subscribed_authors(
    pool: &SqlitePool,
    subscriber_id: i64,
    limit: i64,
    offset: i64,
) -> sqlx::Result<Vec<UserRow>> {
    sqlx::query_as::<_, UserRow>(
        "SELECT u.* FROM users u
         JOIN subscriptions s ON s.author_id = u.id
         WHERE s.subscriber_id = ?
         ORDER BY u.email
         LIMIT ? OFFSET ?",
    )
    .bind(subscriber_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}

pub async fn count_subscribed_authors(
    pool: &SqlitePool,
    subscriber_id: i64,
) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?")
        .bind(subscriber_id)
        .fetch_one(pool)
        .await
}
