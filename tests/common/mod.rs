#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use temp_dir::TempDir;
use tower::ServiceExt;

/// 1x1 transparent PNG as a data URL, enough for image payloads
pub const TEST_IMAGE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

pub const TEST_PASSWORD: &str = "password123";

pub async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .unwrap();

    sqlx::query("PRAGMA foreign_keys = true")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();

    pool
}

pub struct TestApp {
    pub router: Router,
    pub pool: SqlitePool,
    // Owning the TempDir keeps the media directory alive for the test
    media_dir: TempDir,
}

pub fn create_test_app(pool: SqlitePool) -> TestApp {
    let media_dir = TempDir::new().unwrap();

    let state = forkful::AppState {
        pool: pool.clone(),
        jwt_secret: "test_secret_key_minimum_32_characters_long".to_string(),
        jwt_lifetime_seconds: 7 * 24 * 60 * 60,
        base_url: "http://localhost:3000".to_string(),
        media_root: media_dir.path().to_path_buf(),
    };

    TestApp {
        router: forkful::router(state),
        pool,
        media_dir,
    }
}

impl TestApp {
    pub fn media_root(&self) -> &std::path::Path {
        self.media_dir.path()
    }

    /// Count stored files under one media subdirectory.
    pub fn media_file_count(&self, subdir: &str) -> usize {
        match std::fs::read_dir(self.media_root().join(subdir)) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }

    /// Send a request and return the raw response.
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<axum::body::Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(value) => builder
                .header("content-type", "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and decode the JSON body (Null for empty bodies).
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.send(method, uri, token, body).await;
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    /// Register a user; returns the new user id.
    pub async fn register(&self, email: &str, username: &str) -> i64 {
        let (status, body) = self
            .request(
                "POST",
                "/api/users",
                None,
                Some(json!({
                    "email": email,
                    "username": username,
                    "first_name": "Test",
                    "last_name": "User",
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "registration failed: {body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                "POST",
                "/api/auth/token/login",
                None,
                Some(json!({ "email": email, "password": TEST_PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["auth_token"].as_str().unwrap().to_string()
    }

    pub async fn register_and_login(&self, email: &str, username: &str) -> (i64, String) {
        let id = self.register(email, username).await;
        let token = self.login(email).await;
        (id, token)
    }

    /// Insert an ingredient directly; returns its id.
    pub async fn seed_ingredient(&self, name: &str, unit: &str) -> i64 {
        let result = sqlx::query("INSERT INTO ingredients (name, measurement_unit) VALUES (?, ?)")
            .bind(name)
            .bind(unit)
            .execute(&self.pool)
            .await
            .unwrap();
        result.last_insert_rowid()
    }

    /// Create a recipe over the API; `ingredients` pairs are (id, amount).
    pub async fn create_recipe(
        &self,
        token: &str,
        name: &str,
        ingredients: &[(i64, i64)],
    ) -> i64 {
        let entries: Vec<Value> = ingredients
            .iter()
            .map(|(id, amount)| json!({ "id": id, "amount": amount }))
            .collect();
        let (status, body) = self
            .request(
                "POST",
                "/api/recipes",
                Some(token),
                Some(json!({
                    "name": name,
                    "text": "Mix everything and cook.",
                    "cooking_time": 15,
                    "image": TEST_IMAGE,
                    "ingredients": entries,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "recipe creation failed: {body}");
        body["id"].as_i64().unwrap()
    }
}
