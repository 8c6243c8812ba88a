//! Token issuance. Credential storage/protocol design is delegated to the
//! auth crates; this surface only exchanges a password for a Bearer token.

use super::AppState;
use crate::auth::{AuthUser, generate_token, verify_password};
use crate::error::AppError;
use crate::queries::users;
use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

const BAD_CREDENTIALS: &str = "Unable to log in with provided credentials.";

/// POST /api/auth/token/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = users::user_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::Conflict(BAD_CREDENTIALS.to_string()))?;

    if !verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Conflict(BAD_CREDENTIALS.to_string()));
    }

    let auth_token = generate_token(user.id, &state.jwt_secret, state.jwt_lifetime_seconds)
        .map_err(|e| AppError::Internal(format!("failed to issue token: {e}")))?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(TokenResponse { auth_token }))
}

/// POST /api/auth/token/logout
///
/// Tokens are stateless; logout is acknowledged and the client discards
/// its token.
pub async fn logout(user: AuthUser) -> StatusCode {
    tracing::info!(user_id = user.user_id, "User logged out");
    StatusCode::NO_CONTENT
}
