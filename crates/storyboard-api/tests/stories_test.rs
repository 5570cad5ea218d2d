mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{TestContext, get_json, post_json};
use storyboard_test_support::ScriptedStoryGenerator;

#[tokio::test]
async fn test_generate_story_returns_text() {
    let ctx = TestContext::new();

    let (status, body) = post_json(
        ctx.app(),
        "/api/v1/stories/generate",
        &json!({ "prompt": "a dragon who collects teapots" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["story"], "Once upon a time, a test passed.");
    assert_eq!(ctx.stories.call_count(), 1);
}

#[tokio::test]
async fn test_generate_story_missing_prompt_is_rejected() {
    let ctx = TestContext::new();

    let (status, body) = post_json(ctx.app(), "/api/v1/stories/generate", &json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    // Validation happens before any generator call.
    assert_eq!(ctx.stories.call_count(), 0);
}

#[tokio::test]
async fn test_generate_story_blank_prompt_is_rejected() {
    let ctx = TestContext::new();

    let (status, _) = post_json(
        ctx.app(),
        "/api/v1/stories/generate",
        &json!({ "prompt": "   " }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(ctx.stories.call_count(), 0);
}

#[tokio::test]
async fn test_generate_story_upstream_failure_maps_to_500() {
    let ctx = TestContext::with_mocks(
        storyboard_test_support::ScriptedSpeechProvider::new(),
        ScriptedStoryGenerator::new().failing(),
    );

    let (status, body) = post_json(
        ctx.app(),
        "/api/v1/stories/generate",
        &json!({ "prompt": "anything" }),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "upstream_error");
}

#[tokio::test]
async fn test_save_story_without_audio_defaults() {
    let ctx = TestContext::new();
    let user = ctx.users.seed_user("reader@example.com");

    let (status, body) = post_json(
        ctx.app(),
        "/api/v1/stories/save",
        &json!({
            "userId": user.id,
            "title": "The Teapot Dragon",
            "content": "Once there was a dragon.",
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let asset = &body["asset"];
    assert_eq!(asset["name"], "The Teapot Dragon");
    assert_eq!(asset["content"], "Once there was a dragon.");
    assert!(asset["audioUrl"].is_null());
    assert_eq!(asset["lengthSeconds"], 0.0);
    assert_eq!(ctx.users.appended_assets().len(), 1);
}

#[tokio::test]
async fn test_save_story_without_title_derives_name_from_content() {
    let ctx = TestContext::new();
    let user = ctx.users.seed_user("reader@example.com");
    let content = "a".repeat(50);

    let (status, body) = post_json(
        ctx.app(),
        "/api/v1/stories/save",
        &json!({ "userId": user.id, "content": content }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let name = body["asset"]["name"].as_str().unwrap();
    assert!(name.ends_with("..."));
    assert_eq!(name.len(), 33);
}

#[tokio::test]
async fn test_save_story_missing_content_is_rejected() {
    let ctx = TestContext::new();
    let user = ctx.users.seed_user("reader@example.com");

    let (status, body) = post_json(
        ctx.app(),
        "/api/v1/stories/save",
        &json!({ "userId": user.id, "title": "No body" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(ctx.users.appended_assets().is_empty());
}

#[tokio::test]
async fn test_save_story_for_unknown_user_is_not_found() {
    let ctx = TestContext::new();

    let (status, body) = post_json(
        ctx.app(),
        "/api/v1/stories/save",
        &json!({ "userId": Uuid::new_v4(), "content": "orphaned story" }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert!(ctx.users.appended_assets().is_empty());
}

#[tokio::test]
async fn test_list_assets_newest_first() {
    let ctx = TestContext::new();
    let user = ctx.users.seed_user("reader@example.com");

    // The stepping clock gives each save a later timestamp than the last.
    for title in ["first", "second", "third"] {
        let (status, _) = post_json(
            ctx.app(),
            "/api/v1/stories/save",
            &json!({ "userId": user.id, "title": title, "content": "text" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get_json(
        ctx.app(),
        &format!("/api/v1/stories/user/{}", user.id),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["assets"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["third", "second", "first"]);
}

#[tokio::test]
async fn test_list_assets_for_unknown_user_is_not_found() {
    let ctx = TestContext::new();

    let (status, _) = get_json(
        ctx.app(),
        &format!("/api/v1/stories/user/{}", Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_story_by_id() {
    let ctx = TestContext::new();
    let user = ctx.users.seed_user("reader@example.com");

    let (_, saved) = post_json(
        ctx.app(),
        "/api/v1/stories/save",
        &json!({ "userId": user.id, "title": "mine", "content": "text" }),
    )
    .await;
    let asset_id = saved["asset"]["id"].as_str().unwrap().to_string();

    let (status, body) = get_json(
        ctx.app(),
        &format!("/api/v1/stories/{asset_id}?userId={}", user.id),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asset"]["name"], "mine");
}

#[tokio::test]
async fn test_get_story_owned_by_someone_else_is_not_found() {
    let ctx = TestContext::new();
    let owner = ctx.users.seed_user("owner@example.com");
    let other = ctx.users.seed_user("other@example.com");

    let (_, saved) = post_json(
        ctx.app(),
        "/api/v1/stories/save",
        &json!({ "userId": owner.id, "title": "private", "content": "text" }),
    )
    .await;
    let asset_id = saved["asset"]["id"].as_str().unwrap().to_string();

    let (status, body) = get_json(
        ctx.app(),
        &format!("/api/v1/stories/{asset_id}?userId={}", other.id),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_get_story_without_user_id_is_rejected() {
    let ctx = TestContext::new();

    let (status, body) = get_json(
        ctx.app(),
        &format!("/api/v1/stories/{}", Uuid::new_v4()),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}
