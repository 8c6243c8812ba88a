use super::AppState;
use super::dto::{self, RecipeDetail, RecipeSummary};
use crate::auth::{AuthUser, MaybeUser};
use crate::error::AppError;
use crate::media;
use crate::models::CollectionKind;
use crate::pagination::{PageParams, Paginated};
use crate::queries::{ingredients, recipes, relations, shopping_list as cart_queries};
use crate::shopping_list::{SHOPPING_LIST_FILENAME, render_shopping_list};
use crate::validation::{IngredientEntry, validate_image_present, validate_ingredient_entries};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{
        StatusCode,
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    },
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RecipeListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub author: Option<i64>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

fn flag_on(raw: Option<&str>) -> bool {
    matches!(raw, Some("1") | Some("true"))
}

/// GET /api/recipes - filtered, paginated listing
///
/// The viewer-scoped flags only apply for authenticated callers; anonymous
/// requests carrying them get the unfiltered listing.
pub async fn list(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(query): Query<RecipeListQuery>,
) -> Result<Json<Paginated<RecipeDetail>>, AppError> {
    let page = PageParams {
        limit: query.limit,
        offset: query.offset,
    };

    let mut filters = recipes::RecipeFilters {
        author: query.author,
        ..Default::default()
    };
    if let Some(viewer_id) = viewer.user_id() {
        if flag_on(query.is_favorited.as_deref()) {
            filters.favorited_by = Some(viewer_id);
        }
        if flag_on(query.is_in_shopping_cart.as_deref()) {
            filters.in_cart_of = Some(viewer_id);
        }
    }

    let count = recipes::count_recipes(&state.pool, &filters).await?;
    let rows = recipes::list_recipes(&state.pool, &filters, page.limit(), page.offset()).await?;

    let mut results = Vec::with_capacity(rows.len());
    for row in &rows {
        results.push(dto::recipe_detail(&state, row, viewer.user_id()).await?);
    }

    Ok(Json(Paginated { count, results }))
}

#[derive(Debug, Deserialize)]
pub struct IngredientEntryPayload {
    pub id: i64,
    pub amount: i64,
}

#[derive(Debug, Deserialize)]
pub struct CreateRecipePayload {
    pub name: String,
    pub text: String,
    pub cooking_time: i64,
    pub image: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientEntryPayload>,
}

fn validate_scalars(name: &str, text: &str, cooking_time: i64) -> Result<(), AppError> {
    if name.trim().is_empty() || name.chars().count() > 256 {
        return Err(AppError::validation(
            "name",
            "Name must be 1-256 characters.",
        ));
    }
    if text.trim().is_empty() {
        return Err(AppError::validation("text", "This field is required."));
    }
    if cooking_time < 1 {
        return Err(AppError::validation(
            "cooking_time",
            "Cooking time cannot be less than 1 minute!",
        ));
    }
    Ok(())
}

/// Validate entries and confirm every referenced ingredient exists.
async fn checked_entries(
    state: &AppState,
    raw: &[IngredientEntryPayload],
) -> Result<Vec<IngredientEntry>, AppError> {
    let entries: Vec<IngredientEntry> = raw
        .iter()
        .map(|e| IngredientEntry {
            ingredient_id: e.id,
            amount: e.amount,
        })
        .collect();
    validate_ingredient_entries(&entries)?;

    let ids: Vec<i64> = entries.iter().map(|e| e.ingredient_id).collect();
    let known = ingredients::existing_ids(&state.pool, &ids).await?;
    if let Some(missing) = ids.iter().find(|id| !known.contains(id)) {
        return Err(AppError::validation(
            "ingredients",
            format!("Ingredient {missing} does not exist."),
        ));
    }

    Ok(entries)
}

/// POST /api/recipes
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRecipePayload>,
) -> Result<(StatusCode, Json<RecipeDetail>), AppError> {
    validate_scalars(&payload.name, &payload.text, payload.cooking_time)?;
    validate_image_present(payload.image.as_deref())?;
    let entries = checked_entries(&state, &payload.ingredients).await?;

    let image = payload.image.as_deref().unwrap_or_default();
    let relative = media::save_base64_image(&state.media_root, "recipes", image).await?;

    let created = recipes::create_recipe(
        &state.pool,
        user.user_id,
        &recipes::NewRecipe {
            name: &payload.name,
            image: &relative,
            text: &payload.text,
            cooking_time: payload.cooking_time,
            created_at: Utc::now().timestamp(),
        },
        &entries,
    )
    .await;

    // A failed insert must not leave the staged image behind
    let id = match created {
        Ok(id) => id,
        Err(e) => {
            media::delete_media(&state.media_root, &relative).await;
            return Err(e.into());
        }
    };

    tracing::info!(recipe_id = id, author_id = user.user_id, "Recipe created");

    let row = recipes::recipe_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::Internal("created recipe vanished".to_string()))?;
    let detail = dto::recipe_detail(&state, &row, Some(user.user_id)).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

/// GET /api/recipes/{id}
pub async fn detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<i64>,
) -> Result<Json<RecipeDetail>, AppError> {
    let row = recipes::recipe_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = dto::recipe_detail(&state, &row, viewer.user_id()).await?;
    Ok(Json(detail))
}

/// PATCH /api/recipes/{id} - author-only full update
///
/// The ingredient list is replaced wholesale; the image is replaced only
/// when the payload carries one.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<CreateRecipePayload>,
) -> Result<Json<RecipeDetail>, AppError> {
    let row = recipes::recipe_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if row.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    validate_scalars(&payload.name, &payload.text, payload.cooking_time)?;
    let entries = checked_entries(&state, &payload.ingredients).await?;

    let new_image = match payload.image.as_deref() {
        Some(encoded) if !encoded.is_empty() => {
            Some(media::save_base64_image(&state.media_root, "recipes", encoded).await?)
        }
        _ => None,
    };

    let updated = recipes::update_recipe(
        &state.pool,
        id,
        &recipes::RecipeUpdate {
            name: &payload.name,
            image: new_image.as_deref(),
            text: &payload.text,
            cooking_time: payload.cooking_time,
        },
        &entries,
    )
    .await;

    // The row still points at the old image when the transaction fails, so
    // discard the staged replacement instead
    if let Err(e) = updated {
        if let Some(staged) = new_image.as_deref() {
            media::delete_media(&state.media_root, staged).await;
        }
        return Err(e.into());
    }

    if new_image.is_some() {
        media::delete_media(&state.media_root, &row.image).await;
    }

    let row = recipes::recipe_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = dto::recipe_detail(&state, &row, Some(user.user_id)).await?;
    Ok(Json(detail))
}

/// DELETE /api/recipes/{id} - author-only
pub async fn destroy(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let row = recipes::recipe_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    if row.author_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    recipes::delete_recipe(&state.pool, id).await?;
    media::delete_media(&state.media_root, &row.image).await;

    tracing::info!(recipe_id = id, author_id = user.user_id, "Recipe deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct ShortLink {
    #[serde(rename = "short-link")]
    pub short_link: String,
}

/// GET /api/recipes/{id}/get-link - a stable shareable link
pub async fn get_link(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ShortLink>, AppError> {
    recipes::recipe_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;

    Ok(Json(ShortLink {
        short_link: format!("{}/recipes/{}", state.base_url.trim_end_matches('/'), id),
    }))
}

async fn add_to_collection(
    state: &AppState,
    kind: CollectionKind,
    user: AuthUser,
    recipe_id: i64,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    let row = recipes::recipe_by_id(&state.pool, recipe_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !relations::add(&state.pool, kind, user.user_id, recipe_id).await? {
        return Err(AppError::Conflict(kind.already_present_message().to_string()));
    }

    Ok((StatusCode::CREATED, Json(dto::recipe_summary(state, &row))))
}

async fn remove_from_collection(
    state: &AppState,
    kind: CollectionKind,
    user: AuthUser,
    recipe_id: i64,
) -> Result<StatusCode, AppError> {
    recipes::recipe_by_id(&state.pool, recipe_id)
        .await?
        .ok_or(AppError::NotFound)?;

    if !relations::remove(&state.pool, kind, user.user_id, recipe_id).await? {
        return Err(AppError::Conflict(kind.not_present_message().to_string()));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/recipes/{id}/favorite
pub async fn add_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    add_to_collection(&state, CollectionKind::Favorite, user, id).await
}

/// DELETE /api/recipes/{id}/favorite
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from_collection(&state, CollectionKind::Favorite, user, id).await
}

/// POST /api/recipes/{id}/shopping_cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<RecipeSummary>), AppError> {
    add_to_collection(&state, CollectionKind::ShoppingCart, user, id).await
}

/// DELETE /api/recipes/{id}/shopping_cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    remove_from_collection(&state, CollectionKind::ShoppingCart, user, id).await
}

/// GET /api/recipes/download_shopping_cart - text attachment with summed
/// ingredient totals
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let row = crate::queries::users::user_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let lines = cart_queries::cart_totals(&state.pool, user.user_id).await?;
    let body = render_shopping_list(&row.username, Utc::now(), &lines);

    Ok((
        [
            (CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{SHOPPING_LIST_FILENAME}\""),
            ),
        ],
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flag_on_accepts_one_and_true() {
        assert!(flag_on(Some("1")));
        assert!(flag_on(Some("true")));
        assert!(!flag_on(Some("0")));
        assert!(!flag_on(Some("yes")));
        assert!(!flag_on(None));
    }

    #[test]
    fn test_scalar_validation() {
        assert!(validate_scalars("Soup", "Boil it.", 10).is_ok());
        assert!(validate_scalars("", "Boil it.", 10).is_err());
        assert!(validate_scalars("Soup", "  ", 10).is_err());
        assert!(validate_scalars("Soup", "Boil it.", 0).is_err());
    }

    #[test]
    fn test_short_link_shape() {
        let link = ShortLink {
            short_link: "http://localhost:3000/recipes/7".to_string(),
        };
        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value, json!({"short-link": "http://localhost:3000/recipes/7"}));
    }
}
