use super::AppState;
use crate::error::AppError;
use crate::models::IngredientRow;
use crate::queries::ingredients;
use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct IngredientQuery {
    pub name: Option<String>,
}

/// GET /api/ingredients - unpaginated prefix search over the reference list
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<IngredientQuery>,
) -> Result<Json<Vec<IngredientRow>>, AppError> {
    let rows = ingredients::search(&state.pool, query.name.as_deref()).await?;
    Ok(Json(rows))
}

/// GET /api/ingredients/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<IngredientRow>, AppError> {
    let row = ingredients::ingredient_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(row))
}
