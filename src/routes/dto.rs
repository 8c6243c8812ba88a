//! Response shapes and the viewer-dependent fields attached to them
//!
//! `is_subscribed`, `is_favorited` and `is_in_shopping_cart` are existence
//! checks against the relation tables for the current viewer; all three are
//! false for anonymous callers.

use super::AppState;
use crate::error::AppError;
use crate::media::media_url;
use crate::models::{CollectionKind, RecipeRow, UserRow};
use crate::queries::{recipes, relations, users};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RecipeIngredientOut {
    pub id: i64,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

/// Compact recipe summary returned by the toggles and inside subscription
/// profiles.
#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub cooking_time: i64,
}

#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub author: UserProfile,
    pub ingredients: Vec<RecipeIngredientOut>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i64,
}

/// A followed profile enriched with its recipes and their total count
#[derive(Debug, Serialize)]
pub struct SubscriptionProfile {
    #[serde(flatten)]
    pub user: UserProfile,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: i64,
}

pub async fn user_profile(
    state: &AppState,
    user: &UserRow,
    viewer: Option<i64>,
) -> Result<UserProfile, AppError> {
    let is_subscribed = match viewer {
        Some(viewer_id) => relations::is_subscribed(&state.pool, viewer_id, user.id).await?,
        None => false,
    };

    Ok(UserProfile {
        id: user.id,
        email: user.email.clone(),
        username: user.username.clone(),
        first_name: user.first_name.clone(),
        last_name: user.last_name.clone(),
        is_subscribed,
        avatar: user
            .avatar
            .as_deref()
            .map(|path| media_url(&state.base_url, path)),
    })
}

pub fn recipe_summary(state: &AppState, recipe: &RecipeRow) -> RecipeSummary {
    RecipeSummary {
        id: recipe.id,
        name: recipe.name.clone(),
        image: media_url(&state.base_url, &recipe.image),
        cooking_time: recipe.cooking_time,
    }
}

pub async fn recipe_detail(
    state: &AppState,
    recipe: &RecipeRow,
    viewer: Option<i64>,
) -> Result<RecipeDetail, AppError> {
    let author = users::user_by_id(&state.pool, recipe.author_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("recipe {} has no author row", recipe.id)))?;
    let author = user_profile(state, &author, viewer).await?;

    let ingredients = recipes::ingredients_for(&state.pool, recipe.id)
        .await?
        .into_iter()
        .map(|row| RecipeIngredientOut {
            id: row.id,
            name: row.name,
            measurement_unit: row.measurement_unit,
            amount: row.amount,
        })
        .collect();

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer_id) => (
            relations::exists(&state.pool, CollectionKind::Favorite, viewer_id, recipe.id).await?,
            relations::exists(
                &state.pool,
                CollectionKind::ShoppingCart,
                viewer_id,
                recipe.id,
            )
            .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeDetail {
        id: recipe.id,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name.clone(),
        image: media_url(&state.base_url, &recipe.image),
        text: recipe.text.clone(),
        cooking_time: recipe.cooking_time,
    })
}

pub async fn subscription_profile(
    state: &AppState,
    user: &UserRow,
    viewer: Option<i64>,
    recipes_limit: Option<i64>,
) -> Result<SubscriptionProfile, AppError> {
    let profile = user_profile(state, user, viewer).await?;
    let recipe_rows = recipes::recipes_by_author(&state.pool, user.id, recipes_limit).await?;
    let recipes_count = recipes::count_by_author(&state.pool, user.id).await?;

    Ok(SubscriptionProfile {
        user: profile,
        recipes: recipe_rows
            .iter()
            .map(|row| recipe_summary(state, row))
            .collect(),
        recipes_count,
    })
}
