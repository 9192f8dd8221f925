//! Integration tests for the recipe suggestion endpoints.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::http::StatusCode;
use pantry_integration_tests::{ScriptedText, TableVideos, TestApp};
use pantry_server::services::generation::GenerationError;

const TWO_RECIPES: &str = "```json\n{\"Fried Rice\": \"# Fried Rice\\n\\n## Ingredients\\n- rice\", \"Omelette\": \"# Omelette\"}\n```";

fn videos() -> TableVideos {
    // The first recipe's video arrives well after the second's
    TableVideos::default()
        .with("Fried Rice", "fr-vid", Duration::from_millis(80))
        .with("Omelette", "om-vid", Duration::from_millis(5))
}

async fn seeded(text: ScriptedText) -> TestApp {
    let app = TestApp::new(text, videos());
    app.add_item("alice", "rice").await;
    app.add_item("alice", "egg").await;
    app
}

#[tokio::test]
async fn test_missing_uid_is_bad_request() {
    let app = TestApp::new(ScriptedText::always(Ok(TWO_RECIPES.into())), videos());
    let (status, body) = app.get("/recipes").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing uid");
}

#[tokio::test]
async fn test_empty_pantry_is_no_ingredients() {
    let app = TestApp::new(ScriptedText::always(Ok(TWO_RECIPES.into())), videos());
    app.add_item("bob", "milk").await;

    let (status, body) = app.get("/recipes?uid=alice").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        "No pantry items found. Add some ingredients to your pantry first."
    );
    assert_eq!(app.text.calls(), 0);
}

#[tokio::test]
async fn test_recipes_keep_generator_order() {
    let app = seeded(ScriptedText::always(Ok(TWO_RECIPES.into()))).await;

    let (status, body) = app.get("/recipes?uid=alice").await;
    assert_eq!(status, StatusCode::OK);

    let recipes = body["recipes"].as_array().unwrap();
    assert_eq!(recipes.len(), 2);
    assert_eq!(recipes[0]["id"], "0");
    assert_eq!(recipes[0]["title"], "Fried Rice");
    assert_eq!(recipes[0]["youtubeVideoId"], "fr-vid");
    assert_eq!(recipes[0]["youtubeVideoTitle"], "How to make Fried Rice");
    assert!(recipes[0]["markdownRecipe"]
        .as_str()
        .unwrap()
        .starts_with("# Fried Rice"));
    assert_eq!(recipes[1]["id"], "1");
    assert_eq!(recipes[1]["title"], "Omelette");
    assert_eq!(recipes[1]["youtubeVideoId"], "om-vid");
}

#[tokio::test]
async fn test_recipe_without_video_omits_video_fields() {
    let app = TestApp::new(
        ScriptedText::always(Ok(r##"{"Congee": "# Congee"}"##.into())),
        videos(),
    );
    app.add_item("alice", "rice").await;

    let (status, body) = app.get("/recipes?uid=alice").await;
    assert_eq!(status, StatusCode::OK);

    let recipe = &body["recipes"][0];
    assert_eq!(recipe["title"], "Congee");
    assert!(recipe.get("youtubeVideoId").is_none());
    assert!(recipe.get("youtubeVideoTitle").is_none());
}

#[tokio::test]
async fn test_retry_recovers_on_third_attempt() {
    let app = seeded(ScriptedText::scripted(
        vec![
            Err(GenerationError::Unavailable("503".into())),
            Ok("I cannot answer in JSON today".into()),
        ],
        Ok(TWO_RECIPES.into()),
    ))
    .await;

    let (status, body) = app.get("/recipes?uid=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"].as_array().unwrap().len(), 2);
    assert_eq!(app.text.calls(), 3);
}

#[tokio::test]
async fn test_generation_failure_is_500_with_details() {
    let app = seeded(ScriptedText::always(Ok("not json at all".into()))).await;

    let (status, body) = app.get("/recipes?uid=alice").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to generate recipes");
    assert!(body["details"].is_string());
    assert_eq!(app.text.calls(), 3);
}

// =============================================================================
// Cache
// =============================================================================

#[tokio::test]
async fn test_second_request_is_served_from_cache() {
    let app = seeded(ScriptedText::always(Ok(TWO_RECIPES.into()))).await;

    app.get("/recipes?uid=alice").await;
    let (status, body) = app.get("/recipes?uid=alice").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recipes"][1]["title"], "Omelette");
    assert_eq!(app.text.calls(), 1);

    app.get("/recipes?uid=alice&refresh=true").await;
    assert_eq!(app.text.calls(), 2);
}

#[tokio::test]
async fn test_pantry_mutation_invalidates_cache() {
    let app = seeded(ScriptedText::always(Ok(TWO_RECIPES.into()))).await;

    app.get("/recipes?uid=alice").await;
    app.add_item("alice", "scallion").await;
    app.get("/recipes?uid=alice").await;

    assert_eq!(app.text.calls(), 2);
}

#[tokio::test]
async fn test_recipe_detail_reads_cached_batch() {
    let app = seeded(ScriptedText::always(Ok(TWO_RECIPES.into()))).await;

    let (status, body) = app.get("/recipes/1?uid=alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Recipe not found");

    app.get("/recipes?uid=alice").await;

    let (status, body) = app.get("/recipes/1?uid=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["title"], "Omelette");
    assert_eq!(body["id"], "1");

    let (status, _) = app.get("/recipes/9?uid=alice").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.text.calls(), 1);
}
