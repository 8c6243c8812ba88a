use axum::http::StatusCode;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_create_recipe_returns_detail() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (author_id, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let sugar = app.seed_ingredient("sugar", "g").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Pancakes",
                "text": "Mix and fry.",
                "cooking_time": 20,
                "image": common::TEST_IMAGE,
                "ingredients": [
                    { "id": flour, "amount": 200 },
                    { "id": sugar, "amount": 50 },
                ],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["name"], "Pancakes");
    assert_eq!(body["author"]["id"].as_i64().unwrap(), author_id);
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["is_in_shopping_cart"], false);
    assert!(body["image"].as_str().unwrap().contains("/media/recipes/"));

    let ingredients = body["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 2);
    assert_eq!(ingredients[0]["name"], "flour");
    assert_eq!(ingredients[0]["amount"].as_i64().unwrap(), 200);
}

#[tokio::test]
async fn test_create_requires_auth() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (status, _) = app
        .request(
            "POST",
            "/api/recipes",
            None,
            Some(json!({
                "name": "Pancakes",
                "text": "Mix.",
                "cooking_time": 20,
                "image": common::TEST_IMAGE,
                "ingredients": [],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_without_ingredients_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Empty",
                "text": "Nothing.",
                "cooking_time": 5,
                "image": common::TEST_IMAGE,
                "ingredients": [],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["ingredients"].is_array());
}

#[tokio::test]
async fn test_create_with_duplicate_ingredients_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Doubled",
                "text": "Twice the flour.",
                "cooking_time": 5,
                "image": common::TEST_IMAGE,
                "ingredients": [
                    { "id": flour, "amount": 100 },
                    { "id": flour, "amount": 200 },
                ],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ingredients"][0], "Ingredients must not repeat!");
}

#[tokio::test]
async fn test_create_with_zero_amount_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Zero",
                "text": "No flour at all.",
                "cooking_time": 5,
                "image": common::TEST_IMAGE,
                "ingredients": [{ "id": flour, "amount": 0 }],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["amount"].is_array());
}

#[tokio::test]
async fn test_create_with_unknown_ingredient_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Ghost",
                "text": "Made of nothing.",
                "cooking_time": 5,
                "image": common::TEST_IMAGE,
                "ingredients": [{ "id": 4242, "amount": 10 }],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["ingredients"][0].as_str().unwrap().contains("4242"));
}

#[tokio::test]
async fn test_create_without_image_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Invisible",
                "text": "No image.",
                "cooking_time": 5,
                "ingredients": [{ "id": flour, "amount": 10 }],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["image"].is_array());
}

#[tokio::test]
async fn test_create_with_zero_cooking_time_rejected() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;

    let (status, body) = app
        .request(
            "POST",
            "/api/recipes",
            Some(&token),
            Some(json!({
                "name": "Instant",
                "text": "Zero minutes.",
                "cooking_time": 0,
                "image": common::TEST_IMAGE,
                "ingredients": [{ "id": flour, "amount": 10 }],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["cooking_time"].is_array());
}

#[tokio::test]
async fn test_detail_readable_anonymously() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe = app.create_recipe(&token, "Bread", &[(flour, 500)]).await;

    let (status, body) = app
        .request("GET", &format!("/api/recipes/{recipe}"), None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Bread");
    assert_eq!(body["is_favorited"], false);
    assert_eq!(body["author"]["is_subscribed"], false);
}

#[tokio::test]
async fn test_update_replaces_ingredient_list() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let sugar = app.seed_ingredient("sugar", "g").await;
    let recipe = app.create_recipe(&token, "Bread", &[(flour, 500)]).await;

    let (status, body) = app
        .request(
            "PATCH",
            &format!("/api/recipes/{recipe}"),
            Some(&token),
            Some(json!({
                "name": "Sweet bread",
                "text": "Now with sugar.",
                "cooking_time": 45,
                "ingredients": [{ "id": sugar, "amount": 80 }],
            })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Sweet bread");
    let ingredients = body["ingredients"].as_array().unwrap();
    assert_eq!(ingredients.len(), 1);
    assert_eq!(ingredients[0]["name"], "sugar");
}

#[tokio::test]
async fn test_update_keeps_old_image_until_commit() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe = app.create_recipe(&token, "Bread", &[(flour, 500)]).await;
    assert_eq!(app.media_file_count("recipes"), 1);

    // Force the write transaction to fail after the new image is staged
    sqlx::query("ALTER TABLE recipe_ingredients RENAME TO recipe_ingredients_hidden")
        .execute(&app.pool)
        .await
        .unwrap();

    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/recipes/{recipe}"),
            Some(&token),
            Some(json!({
                "name": "Bread",
                "text": "Still bread.",
                "cooking_time": 45,
                "image": common::TEST_IMAGE,
                "ingredients": [{ "id": flour, "amount": 500 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    // The staged replacement is discarded; only the original file remains
    assert_eq!(app.media_file_count("recipes"), 1);

    sqlx::query("ALTER TABLE recipe_ingredients_hidden RENAME TO recipe_ingredients")
        .execute(&app.pool)
        .await
        .unwrap();
    let (_, body) = app
        .request("GET", &format!("/api/recipes/{recipe}"), None, None)
        .await;
    assert!(body["image"].as_str().unwrap().contains("/media/recipes/"));
}

#[tokio::test]
async fn test_update_by_non_author_forbidden() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, author_token) = app.register_and_login("alice@example.com", "alice").await;
    let (_, other_token) = app.register_and_login("bob@example.com", "bob").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe = app
        .create_recipe(&author_token, "Bread", &[(flour, 500)])
        .await;

    let (status, _) = app
        .request(
            "PATCH",
            &format!("/api/recipes/{recipe}"),
            Some(&other_token),
            Some(json!({
                "name": "Stolen bread",
                "text": "Mine now.",
                "cooking_time": 45,
                "ingredients": [{ "id": flour, "amount": 1 }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_by_author() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe = app.create_recipe(&token, "Bread", &[(flour, 500)]).await;

    let (status, _) = app
        .request("DELETE", &format!("/api/recipes/{recipe}"), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .request("GET", &format!("/api/recipes/{recipe}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_by_non_author_forbidden() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, author_token) = app.register_and_login("alice@example.com", "alice").await;
    let (_, other_token) = app.register_and_login("bob@example.com", "bob").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe = app
        .create_recipe(&author_token, "Bread", &[(flour, 500)])
        .await;

    let (status, _) = app
        .request(
            "DELETE",
            &format!("/api/recipes/{recipe}"),
            Some(&other_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_newest_first_with_author_filter() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (alice_id, alice_token) = app.register_and_login("alice@example.com", "alice").await;
    let (_, bob_token) = app.register_and_login("bob@example.com", "bob").await;
    let flour = app.seed_ingredient("flour", "g").await;

    let first = app.create_recipe(&alice_token, "First", &[(flour, 1)]).await;
    let second = app.create_recipe(&alice_token, "Second", &[(flour, 2)]).await;
    app.create_recipe(&bob_token, "Other", &[(flour, 3)]).await;

    let (status, body) = app
        .request("GET", &format!("/api/recipes?author={alice_id}"), None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"].as_i64().unwrap(), 2);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results[0]["id"].as_i64().unwrap(), second);
    assert_eq!(results[1]["id"].as_i64().unwrap(), first);
}

#[tokio::test]
async fn test_get_link_points_at_recipe() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (_, token) = app.register_and_login("alice@example.com", "alice").await;
    let flour = app.seed_ingredient("flour", "g").await;
    let recipe = app.create_recipe(&token, "Bread", &[(flour, 500)]).await;

    let (status, body) = app
        .request("GET", &format!("/api/recipes/{recipe}/get-link"), None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["short-link"].as_str().unwrap(),
        format!("http://localhost:3000/recipes/{recipe}")
    );
}

#[tokio::test]
async fn test_get_link_unknown_recipe() {
    let pool = common::setup_test_db().await;
    let app = common::create_test_app(pool);

    let (status, _) = app
        .request("GET", "/api/recipes/999/get-link", None, None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
