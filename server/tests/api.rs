//! Integration tests for the recipe API.
//!
//! These run against a real Postgres database named by `TEST_DATABASE_URL`
//! and are skipped when it is unset. Every test signs up its own users, so
//! tests can share one database and run in parallel.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use diesel::prelude::*;
use recipe_server::db::{self, DbPool};
use recipe_server::schema::{sessions, users};
use recipe_server::store::labels::{ingredients, tags};
use recipe_server::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

static POOL: LazyLock<Option<Arc<DbPool>>> = LazyLock::new(|| {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::create_pool(&url).expect("Should connect to test database");
    Some(Arc::new(pool))
});

/// Test helper: the shared pool, or `None` when no test database is configured
fn test_pool() -> Option<Arc<DbPool>> {
    let pool = POOL.clone();
    if pool.is_none() {
        eprintln!("TEST_DATABASE_URL not set, skipping");
    }
    pool
}

fn setup_app(pool: &Arc<DbPool>) -> axum::Router {
    build_router(AppState {
        pool: pool.clone(),
        session_ttl_days: 30,
    })
}

/// Test helper: send one request and return the status and JSON body (`Null` when empty)
async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Should parse JSON")
    };
    (status, value)
}

struct TestUser {
    id: Uuid,
    email: String,
    token: String,
}

async fn signup(app: &axum::Router) -> TestUser {
    let email = format!("user-{}@example.com", Uuid::new_v4());
    let (status, body) = send(
        app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": email, "password": "testpass123", "name": "Test"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");

    TestUser {
        id: body["user_id"].as_str().unwrap().parse().unwrap(),
        email,
        token: body["token"].as_str().unwrap().to_string(),
    }
}

async fn create_recipe(app: &axum::Router, user: &TestUser, payload: Value) -> Value {
    let (status, body) = send(
        app,
        "POST",
        "/api/recipe/recipes",
        Some(&user.token),
        Some(payload),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body
}

fn names(items: &Value) -> Vec<&str> {
    items
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_signup_and_login() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": user.email.to_uppercase(), "password": "testpass123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, _) = send(&app, "GET", "/api/recipe/recipes", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/api/user/token",
        None,
        Some(json!({"email": user.email, "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_signup_rejects_duplicate_and_invalid() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": user.email, "password": "testpass123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // The account and its first session were written together, and the
    // rejected retry added neither
    {
        let mut conn = pool.get().unwrap();
        let accounts: i64 = users::table
            .filter(users::email.eq(&user.email))
            .count()
            .get_result(&mut conn)
            .unwrap();
        let user_sessions: i64 = sessions::table
            .filter(sessions::user_id.eq(user.id))
            .count()
            .get_result(&mut conn)
            .unwrap();
        assert_eq!(accounts, 1);
        assert_eq!(user_sessions, 1);
    }

    let (status, _) = send(
        &app,
        "POST",
        "/api/user/create",
        None,
        Some(json!({"email": format!("{}@example.com", Uuid::new_v4()), "password": "pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_requires_auth() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);

    for uri in ["/api/recipe/recipes", "/api/recipe/tags", "/api/recipe/ingredients"] {
        let (status, _) = send(&app, "GET", uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
    }

    let (status, _) = send(&app, "GET", "/api/recipe/tags", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// =============================================================================
// Tags and ingredients
// =============================================================================

#[tokio::test]
async fn test_list_tags_by_name_descending() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    {
        let mut conn = pool.get().unwrap();
        tags::get_or_create(&mut conn, user.id, "Dessert").unwrap();
        tags::get_or_create(&mut conn, user.id, "Vegan").unwrap();
    }

    let (status, body) = send(&app, "GET", "/api/recipe/tags", Some(&user.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Vegan", "Dessert"]);
}

#[tokio::test]
async fn test_labels_are_private_to_their_owner() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let owner = signup(&app).await;
    let other = signup(&app).await;

    let tag_id = {
        let mut conn = pool.get().unwrap();
        ingredients::get_or_create(&mut conn, other.id, "Pepper").unwrap();
        tags::get_or_create(&mut conn, owner.id, "Fruity").unwrap().id
    };

    let (_, body) = send(&app, "GET", "/api/recipe/ingredients", Some(&owner.token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let uri = format!("/api/recipe/tags/{tag_id}");
    let (status, _) = send(&app, "PATCH", &uri, Some(&other.token), Some(json!({"name": "Mine"}))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &uri, Some(&other.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assigned_only_lists_each_tag_once() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    {
        let mut conn = pool.get().unwrap();
        tags::get_or_create(&mut conn, user.id, "Unused").unwrap();
    }
    for title in ["Soup", "Salad"] {
        create_recipe(
            &app,
            &user,
            json!({"title": title, "time_minutes": 10, "price": "3.00", "tags": [{"name": "Lunch"}]}),
        )
        .await;
    }

    let (status, body) = send(
        &app,
        "GET",
        "/api/recipe/tags?assigned_only=1",
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&body), vec!["Lunch"]);

    let (_, body) = send(&app, "GET", "/api/recipe/tags?assigned_only=0", Some(&user.token), None).await;
    assert_eq!(names(&body), vec!["Unused", "Lunch"]);

    let (status, _) = send(
        &app,
        "GET",
        "/api/recipe/tags?assigned_only=yes",
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_and_delete_ingredient() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let recipe = create_recipe(
        &app,
        &user,
        json!({"title": "Stew", "time_minutes": 90, "price": 12.5, "ingredients": [{"name": "Carrot"}, {"name": "Onion"}]}),
    )
    .await;
    let carrot = recipe["ingredients"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["name"] == "Carrot")
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/recipe/ingredients/{carrot}");

    let (status, body) = send(&app, "PATCH", &uri, Some(&user.token), Some(json!({"name": "Parsnip"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Parsnip");

    let (status, _) = send(&app, "PUT", &uri, Some(&user.token), Some(json!({"name": "Onion"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "PUT", &uri, Some(&user.token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let recipe_uri = format!("/api/recipe/recipes/{}", recipe["id"].as_str().unwrap());
    let (_, body) = send(&app, "GET", &recipe_uri, Some(&user.token), None).await;
    assert_eq!(names(&body["ingredients"]), vec!["Onion"]);
}

// =============================================================================
// Recipes
// =============================================================================

#[tokio::test]
async fn test_create_recipe_merges_duplicate_names() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let body = create_recipe(
        &app,
        &user,
        json!({
            "title": "Pretzels",
            "time_minutes": 30,
            "price": "4.50",
            "ingredients": [{"name": "Salt"}, {"name": "Salt"}, {"name": "Flour"}]
        }),
    )
    .await;
    assert_eq!(body["price"], "4.50");
    assert_eq!(body["link"], "");
    assert_eq!(names(&body["ingredients"]), vec!["Flour", "Salt"]);

    let (_, body) = send(&app, "GET", "/api/recipe/ingredients", Some(&user.token), None).await;
    assert_eq!(names(&body), vec!["Salt", "Flour"]);
}

#[tokio::test]
async fn test_create_recipe_reuses_existing_tag() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let existing = {
        let mut conn = pool.get().unwrap();
        tags::get_or_create(&mut conn, user.id, "Indian").unwrap()
    };

    let body = create_recipe(
        &app,
        &user,
        json!({"title": "Curry", "time_minutes": 40, "price": "7.00", "tags": [{"name": "Indian"}, {"name": "Spicy"}]}),
    )
    .await;
    let tag_ids: Vec<&str> = body["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_str().unwrap())
        .collect();
    assert!(tag_ids.contains(&existing.id.to_string().as_str()));

    let (_, body) = send(&app, "GET", "/api/recipe/tags", Some(&user.token), None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_recipe_is_not_saved() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let payloads = [
        json!({"title": "", "time_minutes": 5, "price": "1.00"}),
        json!({"title": "Toast", "time_minutes": 5, "price": "-1.00"}),
        json!({"title": "Toast", "time_minutes": 5, "price": "1.005"}),
        json!({"title": "Toast", "time_minutes": 5, "price": "1.00", "tags": [{"name": " "}]}),
        json!({"title": "Toast", "time_minutes": 5}),
    ];
    for payload in payloads {
        let (status, _) = send(&app, "POST", "/api/recipe/recipes", Some(&user.token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }

    let (_, body) = send(&app, "GET", "/api/recipe/recipes", Some(&user.token), None).await;
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = send(&app, "GET", "/api/recipe/tags", Some(&user.token), None).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_patch_leaves_recipe_unchanged() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let recipe = create_recipe(
        &app,
        &user,
        json!({"title": "Omelette", "time_minutes": 10, "price": "2.50", "tags": [{"name": "Eggs"}]}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}", recipe["id"].as_str().unwrap());

    let payloads = [
        json!({"title": "New", "time_minutes": -1}),
        json!({"title": null, "tags": []}),
        json!({"title": "New", "tags": [{"name": ""}]}),
    ];
    for payload in payloads {
        let (status, _) = send(&app, "PATCH", &uri, Some(&user.token), Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }

    let (status, body) = send(&app, "GET", &uri, Some(&user.token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Omelette");
    assert_eq!(body["time_minutes"], 10);
    assert_eq!(names(&body["tags"]), vec!["Eggs"]);
}

#[tokio::test]
async fn test_patch_recipe_relations() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let recipe = create_recipe(
        &app,
        &user,
        json!({"title": "Porridge", "time_minutes": 5, "price": "1.20", "tags": [{"name": "Breakfast"}]}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}", recipe["id"].as_str().unwrap());

    // Scalar-only patch leaves tags alone
    let (status, body) = send(&app, "PATCH", &uri, Some(&user.token), Some(json!({"title": "Oats"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Oats");
    assert_eq!(names(&body["tags"]), vec!["Breakfast"]);

    // Replacing the list swaps the links
    let (_, body) = send(&app, "PATCH", &uri, Some(&user.token), Some(json!({"tags": [{"name": "Quick"}]}))).await;
    assert_eq!(names(&body["tags"]), vec!["Quick"]);

    // An empty list clears them
    let (_, body) = send(&app, "PATCH", &uri, Some(&user.token), Some(json!({"tags": []}))).await;
    assert!(body["tags"].as_array().unwrap().is_empty());

    // Detached tags remain the user's
    let (_, body) = send(&app, "GET", "/api/recipe/tags", Some(&user.token), None).await;
    assert_eq!(names(&body), vec!["Quick", "Breakfast"]);
}

#[tokio::test]
async fn test_put_recipe_requires_all_scalars() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let recipe = create_recipe(
        &app,
        &user,
        json!({"title": "Pancakes", "time_minutes": 20, "price": "2.00", "link": "https://example.com"}),
    )
    .await;
    let uri = format!("/api/recipe/recipes/{}", recipe["id"].as_str().unwrap());

    let (status, _) = send(&app, "PUT", &uri, Some(&user.token), Some(json!({"title": "Crepes"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(&user.token),
        Some(json!({"title": "Crepes", "time_minutes": 25, "price": "3.10"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Crepes");
    assert_eq!(body["price"], "3.10");
}

#[tokio::test]
async fn test_recipes_are_private_to_their_owner() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let owner = signup(&app).await;
    let other = signup(&app).await;

    let recipe = create_recipe(&app, &owner, json!({"title": "Secret", "time_minutes": 1, "price": "0.00"})).await;
    let uri = format!("/api/recipe/recipes/{}", recipe["id"].as_str().unwrap());

    let (status, _) = send(&app, "GET", &uri, Some(&other.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "DELETE", &uri, Some(&other.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", "/api/recipe/recipes", Some(&other.token), None).await;
    assert!(body.as_array().unwrap().is_empty());

    let (status, _) = send(&app, "DELETE", &uri, Some(&owner.token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &uri, Some(&owner.token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filter_recipes_by_tags_and_ingredients() {
    let Some(pool) = test_pool() else { return };
    let app = setup_app(&pool);
    let user = signup(&app).await;

    let thai = create_recipe(
        &app,
        &user,
        json!({"title": "Thai Curry", "time_minutes": 30, "price": "5.00", "tags": [{"name": "Thai"}], "ingredients": [{"name": "Rice"}]}),
    )
    .await;
    let vegan = create_recipe(
        &app,
        &user,
        json!({"title": "Tofu Bowl", "time_minutes": 15, "price": "6.00", "tags": [{"name": "Vegan"}]}),
    )
    .await;
    create_recipe(&app, &user, json!({"title": "Plain Toast", "time_minutes": 2, "price": "0.50"})).await;

    let thai_tag = thai["tags"][0]["id"].as_str().unwrap();
    let vegan_tag = vegan["tags"][0]["id"].as_str().unwrap();
    let rice = thai["ingredients"][0]["id"].as_str().unwrap();

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/recipe/recipes?tags={thai_tag},{vegan_tag}"),
        Some(&user.token),
        None,
    )
    .await;
    let titles: Vec<&str> = body.as_array().unwrap().iter().map(|r| r["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Tofu Bowl", "Thai Curry"]);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/recipe/recipes?ingredients={rice}"),
        Some(&user.token),
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Thai Curry");
    assert!(body[0].get("description").is_none());

    let (status, _) = send(&app, "GET", "/api/recipe/recipes?tags=abc", Some(&user.token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
