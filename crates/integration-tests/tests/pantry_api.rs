//! Integration tests for the pantry CRUD endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use pantry_integration_tests::{ADMIN_TOKEN, ScriptedText, TableVideos, TestApp};
use serde_json::json;

fn app() -> TestApp {
    TestApp::new(ScriptedText::always(Ok("{}".into())), TableVideos::default())
}

// =============================================================================
// Create / List
// =============================================================================

#[tokio::test]
async fn test_created_item_is_normalized_and_listed() {
    let app = app();

    let (status, created) = app
        .post("/pantry", json!({ "userId": "alice", "name": "  Brown Rice " }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "brown rice");
    assert_eq!(created["userId"], "alice");
    assert!(created["dateAdded"].is_string());

    let (status, items) = app.get("/pantry?userId=alice").await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], created["id"]);
}

#[tokio::test]
async fn test_list_is_newest_first_and_scoped() {
    let app = app();
    app.post(
        "/pantry",
        json!({ "userId": "alice", "name": "flour", "dateAdded": "2026-01-01T00:00:00Z" }),
    )
    .await;
    app.post(
        "/pantry",
        json!({ "userId": "alice", "name": "sugar", "dateAdded": "2026-02-01T00:00:00Z" }),
    )
    .await;
    app.add_item("bob", "milk").await;

    let (_, items) = app.get("/pantry?userId=alice").await;
    let names: Vec<&str> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["sugar", "flour"]);
}

#[tokio::test]
async fn test_list_without_user_is_bad_request() {
    let (status, body) = app().get("/pantry").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID required");
}

#[tokio::test]
async fn test_create_rejects_missing_fields() {
    let app = app();

    let (status, body) = app.post("/pantry", json!({ "userId": "alice", "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Item name is required");

    let (status, body) = app.post("/pantry", json!({ "name": "rice" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "User ID required");

    let (status, body) = app
        .post("/pantry", json!({ "userId": "alice", "name": 42 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    assert!(app.store.is_empty().await);
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_removes_item() {
    let app = app();
    let id = app.add_item("alice", "rice").await;

    let (status, body) = app.delete(&format!("/pantry?id={id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Item deleted successfully");

    let (status, _) = app.delete(&format!("/pantry?id={id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_missing_id_leaves_collection() {
    let app = app();
    app.add_item("alice", "rice").await;

    let (status, _) = app
        .delete("/pantry?id=6f1c1a4e-0000-4000-8000-000000000000")
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = app.delete("/pantry").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Item ID is required");

    let (status, _) = app.delete("/pantry?id=rice").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(app.store.len().await, 1);
}

// =============================================================================
// Clear
// =============================================================================

#[tokio::test]
async fn test_clear_for_user() {
    let app = app();
    app.add_item("alice", "rice").await;
    app.add_item("alice", "egg").await;
    app.add_item("bob", "milk").await;

    let (status, body) = app.delete("/pantry/clear?userId=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 2);
    assert_eq!(body["message"], "Successfully deleted 2 items from pantry");

    let (_, items) = app.get("/pantry?userId=bob").await;
    assert_eq!(items.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_global_clear_disabled_without_token() {
    let app = app();
    app.add_item("alice", "rice").await;

    let (status, _) = app
        .request(Method::DELETE, "/pantry/clear", None, Some(ADMIN_TOKEN))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.len().await, 1);
}

#[tokio::test]
async fn test_global_clear_with_admin_token() {
    let app = TestApp::with_admin_token(
        ScriptedText::always(Ok("{}".into())),
        TableVideos::default(),
    );
    app.add_item("alice", "rice").await;
    app.add_item("bob", "milk").await;

    let (status, _) = app.delete("/pantry/clear").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(Method::DELETE, "/pantry/clear", None, Some(ADMIN_TOKEN))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["deletedCount"], 2);
    assert!(app.store.is_empty().await);

    // Clearing an empty pantry reports zero
    let (_, body) = app
        .request(Method::DELETE, "/pantry/clear", None, Some(ADMIN_TOKEN))
        .await;
    assert_eq!(body["deletedCount"], 0);
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_probes() {
    let app = app();
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}
