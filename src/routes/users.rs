use super::AppState;
use super::dto::{self, UserProfile};
use crate::auth::{AuthUser, MaybeUser, hash_password};
use crate::error::AppError;
use crate::media;
use crate::pagination::{PageParams, Paginated};
use crate::queries::users;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("valid username regex"));

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterPayload {
    #[validate(email(message = "Enter a valid email address."))]
    pub email: String,
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters."),
        regex(path = *USERNAME_RE, message = "Enter a valid username.")
    )]
    pub username: String,
    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Last name must be 1-150 characters."))]
    pub last_name: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters."))]
    pub password: String,
}

/// POST /api/users - registration
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    payload.validate()?;

    if users::email_taken(&state.pool, &payload.email).await? {
        return Err(AppError::validation(
            "email",
            "A user with that email already exists.",
        ));
    }
    if users::username_taken(&state.pool, &payload.username).await? {
        return Err(AppError::validation(
            "username",
            "A user with that username already exists.",
        ));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))?;

    let id = users::insert_user(
        &state.pool,
        users::NewUser {
            email: &payload.email,
            username: &payload.username,
            first_name: &payload.first_name,
            last_name: &payload.last_name,
            password_hash: &password_hash,
            created_at: Utc::now().timestamp(),
        },
    )
    .await?;

    tracing::info!(user_id = id, "User registered");

    let user = users::user_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Internal("registered user vanished".to_string()))?;
    let profile = dto::user_profile(&state, &user, None).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/users - paginated listing, anonymous-readable
pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<UserProfile>>, AppError> {
    let count = users::count_users(&state.pool).await?;
    let rows = users::list_users(&state.pool, page.limit(), page.offset()).await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in &rows {
        results.push(dto::user_profile(&state, row, viewer.user_id()).await?);
    }

    Ok(Json(Paginated { count, results }))
}

/// GET /api/users/{id}
pub async fn detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let user = users::user_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let profile = dto::user_profile(&state, &user, viewer.user_id()).await?;
    Ok(Json(profile))
}

/// GET /api/users/me
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<UserProfile>, AppError> {
    let row = users::user_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let profile = dto::user_profile(&state, &row, Some(user.user_id)).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfilePayload {
    #[validate(
        length(min = 1, max = 150, message = "Username must be 1-150 characters."),
        regex(path = *USERNAME_RE, message = "Enter a valid username.")
    )]
    pub username: Option<String>,
    #[validate(length(min = 1, max = 150, message = "First name must be 1-150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(min = 1, max = 150, message = "Last name must be 1-150 characters."))]
    pub last_name: Option<String>,
}

/// PATCH /api/users/me - partial profile update
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<UserProfile>, AppError> {
    payload.validate()?;

    let row = users::user_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let username = payload.username.as_deref().unwrap_or(&row.username);
    let first_name = payload.first_name.as_deref().unwrap_or(&row.first_name);
    let last_name = payload.last_name.as_deref().unwrap_or(&row.last_name);

    if username != row.username && users::username_taken(&state.pool, username).await? {
        return Err(AppError::validation(
            "username",
            "A user with that username already exists.",
        ));
    }

    users::update_profile(&state.pool, user.user_id, username, first_name, last_name).await?;

    let row = users::user_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let profile = dto::user_profile(&state, &row, Some(user.user_id)).await?;
    Ok(Json(profile))
}

#[derive(Debug, Deserialize)]
pub struct AvatarPayload {
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AvatarResponse {
    pub avatar: String,
}

/// PUT /api/users/me/avatar - replace the avatar from a base64 payload
pub async fn put_avatar(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AvatarPayload>,
) -> Result<Json<AvatarResponse>, AppError> {
    let encoded = match payload.avatar.as_deref() {
        Some(encoded) if !encoded.is_empty() => encoded,
        _ => return Err(AppError::validation("avatar", "This field is required.")),
    };

    let row = users::user_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let relative = media::save_base64_image(&state.media_root, "avatars", encoded).await?;
    users::set_avatar(&state.pool, user.user_id, Some(&relative)).await?;

    if let Some(old) = row.avatar.as_deref() {
        media::delete_media(&state.media_root, old).await;
    }

    Ok(Json(AvatarResponse {
        avatar: media::media_url(&state.base_url, &relative),
    }))
}

/// DELETE /api/users/me/avatar
pub async fn delete_avatar(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, AppError> {
    let row = users::user_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if let Some(old) = row.avatar.as_deref() {
        media::delete_media(&state.media_root, old).await;
    }
    users::set_avatar(&state.pool, user.user_id, None).await?;

    Ok(StatusCode::NO_CONTENT)
}
