//! Authentication middleware for Axum
//!
//! `auth_context_middleware` runs on the whole API surface: it validates a
//! Bearer token when one is present and stores the caller in the request
//! extensions. Handlers then extract `AuthUser` (401 when anonymous) or
//! `MaybeUser` (anonymous allowed).

use super::jwt::{AuthUser, validate_token};
use crate::error::AppError;
use crate::routes::AppState;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;

/// Validates the Bearer token (when present) and inserts the caller into
/// request extensions. A present-but-invalid token is rejected outright; a
/// token for a deleted user is treated the same way.
pub async fn auth_context_middleware(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(TypedHeader(authorization)) = bearer {
        let auth_user = validate_token(authorization.token(), &state.jwt_secret).map_err(|e| {
            warn!(error = %e, "Invalid or expired token");
            AppError::Unauthorized
        })?;

        // The token may outlive the account
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE id = ?")
            .bind(auth_user.user_id)
            .fetch_optional(&state.pool)
            .await?;

        if exists.is_none() {
            warn!(user_id = auth_user.user_id, "Token for unknown user");
            return Err(AppError::Unauthorized);
        }

        request.extensions_mut().insert(auth_user);
    }

    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

/// Optional caller for endpoints that are readable anonymously
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<AuthUser>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<i64> {
        self.0.map(|u| u.user_id)
    }
}

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<AuthUser>().copied()))
    }
}
