use super::AppState;
use super::dto::{self, SubscriptionProfile};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::pagination::{PageParams, Paginated};
use crate::queries::{relations, users};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SubscriptionQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    /// Cap on the recipes embedded per author. A value that does not parse
    /// as an integer is ignored rather than rejected.
    pub recipes_limit: Option<String>,
}

fn parse_recipes_limit(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.parse::<i64>().ok())
        .filter(|&limit| limit >= 0)
}

/// GET /api/users/subscriptions - the authors the caller follows
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<SubscriptionQuery>,
) -> Result<Json<Paginated<SubscriptionProfile>>, AppError> {
    let page = PageParams {
        limit: query.limit,
        offset: query.offset,
    };
    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());

    let count = users::count_subscribed_authors(&state.pool, user.user_id).await?;
    let authors =
        users::subscribed_authors(&state.pool, user.user_id, page.limit(), page.offset()).await?;

    let mut results = Vec::with_capacity(authors.len());
    for author in &authors {
        results.push(
            dto::subscription_profile(&state, author, Some(user.user_id), recipes_limit).await?,
        );
    }

    Ok(Json(Paginated { count, results }))
}

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<String>,
}

/// POST /api/users/{id}/subscribe
pub async fn subscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(author_id): Path<i64>,
    Query(query): Query<SubscribeQuery>,
) -> Result<(StatusCode, Json<SubscriptionProfile>), AppError> {
    if author_id == user.user_id {
        return Err(AppError::Conflict(
            "You cannot subscribe to yourself!".to_string(),
        ));
    }

    let author = users::user_by_id(&state.pool, author_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !relations::add_subscription(&state.pool, user.user_id, author_id).await? {
        return Err(AppError::Conflict(
            "You are already subscribed to this user!".to_string(),
        ));
    }

    tracing::info!(
        subscriber_id = user.user_id,
        author_id,
        "Subscription created"
    );

    let recipes_limit = parse_recipes_limit(query.recipes_limit.as_deref());
    let profile =
        dto::subscription_profile(&state, &author, Some(user.user_id), recipes_limit).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// DELETE /api/users/{id}/subscribe
pub async fn unsubscribe(
    State(state): State<AppState>,
    user: AuthUser,
    Path(author_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    users::user_by_id(&state.pool, author_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !relations::remove_subscription(&state.pool, user.user_id, author_id).await? {
        return Err(AppError::Conflict(
            "You are not subscribed to this user!".to_string(),
        ));
    }

    Ok(StatusCode::NO_CONTENT)
}
