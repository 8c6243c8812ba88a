use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use sqlx::SqlitePool;
use std::path::PathBuf;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::auth::auth_context_middleware;

mod auth;
mod dto;
mod health;
mod ingredients;
mod recipes;
mod subscriptions;
mod users;

pub use health::{health, ready};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    pub jwt_lifetime_seconds: u64,
    pub base_url: String,
    pub media_root: PathBuf,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        // Profiles
        .route("/users", get(users::list).post(users::register))
        .route("/users/me", get(users::me).patch(users::update_me))
        .route(
            "/users/me/avatar",
            put(users::put_avatar).delete(users::delete_avatar),
        )
        .route("/users/subscriptions", get(subscriptions::list))
        .route("/users/{id}", get(users::detail))
        .route(
            "/users/{id}/subscribe",
            post(subscriptions::subscribe).delete(subscriptions::unsubscribe),
        )
        // Reference data
        .route("/ingredients", get(ingredients::list))
        .route("/ingredients/{id}", get(ingredients::detail))
        // Recipes
        .route("/recipes", get(recipes::list).post(recipes::create))
        .route(
            "/recipes/download_shopping_cart",
            get(recipes::download_shopping_cart),
        )
        .route(
            "/recipes/{id}",
            get(recipes::detail)
                .patch(recipes::update)
                .delete(recipes::destroy),
        )
        .route(
            "/recipes/{id}/favorite",
            post(recipes::add_favorite).delete(recipes::remove_favorite),
        )
        .route(
            "/recipes/{id}/shopping_cart",
            post(recipes::add_to_cart).delete(recipes::remove_from_cart),
        )
        .route("/recipes/{id}/get-link", get(recipes::get_link))
        // Token auth
        .route("/auth/token/login", post(auth::login))
        .route("/auth/token/logout", post(auth::logout))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_context_middleware,
        ));

    Router::new()
        // Health check endpoints (no auth, pool-only state)
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state.pool.clone())
        .merge(
            Router::new()
                .nest("/api", api)
                .nest_service("/media", ServeDir::new(&state.media_root))
                .with_state(state),
        )
        .layer(TraceLayer::new_for_http())
}
