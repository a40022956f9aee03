use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use loadlab_api::{AppState, router};
use loadlab_db::Database;

fn app() -> Router {
    let db = Arc::new(Database::open_in_memory().expect("open in-memory db"));
    router(AppState { db })
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = match body {
        Some(json) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .expect("build request"),
    };

    let response = app.clone().oneshot(request).await.expect("send request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse body")
    };
    (status, value)
}

#[tokio::test]
async fn root_describes_the_service() {
    let app = app();
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["health"], "/health");
    assert_eq!(body["endpoints"]["users"], "/users/");
}

#[tokio::test]
async fn health_reports_connected_store() {
    let app = app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn user_post_lifecycle() {
    let app = app();

    // Create a user
    let (status, user) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({"email": "a@x.com", "full_name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["id"], 1);
    assert_eq!(user["email"], "a@x.com");
    assert_eq!(user["is_active"], true);

    // Duplicate email is rejected without mutating storage
    let (status, err) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({"email": "a@x.com", "full_name": "A2"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["detail"], "Email already registered");

    let (_, users) = send(&app, "GET", "/users/", None).await;
    assert_eq!(users.as_array().expect("user page").len(), 1);

    // Create a post bound to the user; response embeds the owner
    let (status, post) = send(
        &app,
        "POST",
        "/users/1/posts/",
        Some(json!({"title": "T", "content": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["owner_id"], 1);
    assert_eq!(post["owner"]["email"], "a@x.com");

    // Delete the user; its posts go with it
    let (status, body) = send(&app, "DELETE", "/users/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, posts) = send(&app, "GET", "/posts/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(posts.as_array().expect("post page").is_empty());

    let (status, _) = send(&app, "GET", "/users/1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn post_for_missing_owner_is_not_found() {
    let app = app();
    let (status, err) = send(
        &app,
        "POST",
        "/users/42/posts/",
        Some(json!({"title": "T", "content": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["detail"], "User not found");

    let (_, posts) = send(&app, "GET", "/posts/", None).await;
    assert!(posts.as_array().expect("post page").is_empty());
}

#[tokio::test]
async fn malformed_user_payloads_are_rejected() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({"email": "not-an-email", "full_name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        "/users/",
        Some(json!({"email": "a@x.com", "full_name": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_pages_partition_without_overlap() {
    let app = app();
    for i in 0..6 {
        let (status, _) = send(
            &app,
            "POST",
            "/users/",
            Some(json!({
                "email": format!("u{}@x.com", i),
                "full_name": format!("U{}", i),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, first) = send(&app, "GET", "/users/?skip=0&limit=3", None).await;
    let (_, second) = send(&app, "GET", "/users/?skip=3&limit=3", None).await;

    let ids: Vec<i64> = first
        .as_array()
        .expect("first page")
        .iter()
        .chain(second.as_array().expect("second page"))
        .map(|u| u["id"].as_i64().expect("user id"))
        .collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);

    // limit is uncapped: a huge window returns everything
    let (_, all) = send(&app, "GET", "/users/?skip=0&limit=1000000", None).await;
    assert_eq!(all.as_array().expect("full page").len(), 6);
}

#[tokio::test]
async fn fibonacci_admission_bounds() {
    let app = app();

    let (status, body) = send(&app, "GET", "/compute/fibonacci/40", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fibonacci"], 102_334_155);

    let (status, _) = send(&app, "GET", "/compute/fibonacci/41", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/compute/fibonacci/-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sum_admission_bounds() {
    let app = app();

    let (status, body) = send(&app, "GET", "/compute/sum/10000000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sum"], 50_000_005_000_000u64);

    let (status, _) = send(&app, "GET", "/compute/sum/10000001", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "GET", "/compute/sum/-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
