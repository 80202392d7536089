//! Web API Catalog Tests
//!
//! Integration tests for tags, tag groups, collections, contributors,
//! country tags, chapters and learner journeys.

mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

async fn create(app: &TestApp, path: &str, body: Value) -> i64 {
    let response = app.server.post(path).json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"]["id"].as_i64().unwrap()
}

async fn create_asset(app: &TestApp, folder: i64, name: &str) -> i64 {
    create(app, "/api/assets", json!({ "name": name, "parent": folder })).await
}

// ============================================================================
// Collections, contributors and tag groups
// ============================================================================

#[tokio::test]
async fn test_collection_crud() {
    let app = TestApp::new().await;

    let id = create(&app, "/api/collections", json!({ "name": "Winter" })).await;

    let response = app.server.get(&format!("/api/collections/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Winter");

    let response = app
        .server
        .patch(&format!("/api/collections/{}", id))
        .json(&json!({ "name": "Winter 2024" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Winter 2024");

    let response = app.server.get("/api/collections").await;
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 1);

    app.server
        .delete(&format!("/api/collections/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get(&format!("/api/collections/{}", id)).await;
    response.assert_status_not_found();
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Collection not found"
    );
}

#[tokio::test]
async fn test_contributor_duplicate_conflict() {
    let app = TestApp::new().await;
    create(&app, "/api/contributors", json!({ "name": "Jordan Lee" })).await;

    let response = app
        .server
        .post("/api/contributors")
        .json(&json!({ "name": "Jordan Lee" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(
        body["error"]["message"],
        "Contributor \"Jordan Lee\" already exists."
    );
}

#[tokio::test]
async fn test_named_entry_blank_name_rejected() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/tag-groups")
        .json(&json!({ "name": "   " }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_delete_missing_contributor() {
    let app = TestApp::new().await;

    let response = app.server.delete("/api/contributors/5").await;
    response.assert_status_not_found();
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Contributor not found"
    );
}

// ============================================================================
// Tags
// ============================================================================

#[tokio::test]
async fn test_tags_by_group() {
    let app = TestApp::new().await;

    let topics = create(&app, "/api/tag-groups", json!({ "name": "Topics" })).await;
    let levels = create(&app, "/api/tag-groups", json!({ "name": "Levels" })).await;

    create(&app, "/api/tags", json!({ "name": "Safety", "group": topics })).await;
    create(&app, "/api/tags", json!({ "name": "Beginner", "group": levels })).await;
    create(&app, "/api/tags", json!({ "name": "Loose" })).await;

    let body: Value = app.server.get("/api/tags").await.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let body: Value = app
        .server
        .get(&format!("/api/tags?group={}", topics))
        .await
        .json();
    let tags = body["data"].as_array().unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags[0]["name"], "Safety");
    assert_eq!(tags[0]["group"], topics);
    assert_eq!(tags[0]["deprecated"], false);
}

#[tokio::test]
async fn test_tag_name_unique_within_group() {
    let app = TestApp::new().await;

    let a = create(&app, "/api/tag-groups", json!({ "name": "A" })).await;
    let b = create(&app, "/api/tag-groups", json!({ "name": "B" })).await;
    create(&app, "/api/tags", json!({ "name": "Shared", "group": a })).await;

    let response = app
        .server
        .post("/api/tags")
        .json(&json!({ "name": "Shared", "group": a }))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Tag \"Shared\" already exists in this group."
    );

    create(&app, "/api/tags", json!({ "name": "Shared", "group": b })).await;
}

#[tokio::test]
async fn test_tag_unknown_group_rejected() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/tags")
        .json(&json!({ "name": "Orphan", "group": 31 }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Invalid pk \"31\" - object does not exist."
    );
}

#[tokio::test]
async fn test_update_tag_deprecate_and_ungroup() {
    let app = TestApp::new().await;

    let group = create(&app, "/api/tag-groups", json!({ "name": "Topics" })).await;
    let tag = create(&app, "/api/tags", json!({ "name": "Legacy", "group": group })).await;

    let response = app
        .server
        .patch(&format!("/api/tags/{}", tag))
        .json(&json!({ "deprecated": true, "group": null }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Legacy");
    assert_eq!(body["data"]["deprecated"], true);
    assert!(body["data"]["group"].is_null());
}

#[tokio::test]
async fn test_deleting_group_keeps_tags() {
    let app = TestApp::new().await;

    let group = create(&app, "/api/tag-groups", json!({ "name": "Temporary" })).await;
    let tag = create(&app, "/api/tags", json!({ "name": "Kept", "group": group })).await;

    app.server
        .delete(&format!("/api/tag-groups/{}", group))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = app.server.get(&format!("/api/tags/{}", tag)).await;
    response.assert_status_ok();
    assert!(response.json::<Value>()["data"]["group"].is_null());
}

#[tokio::test]
async fn test_deleting_tag_detaches_assets() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Library", None).await;

    let tag = create(&app, "/api/tags", json!({ "name": "Short" })).await;
    let asset = create(
        &app,
        "/api/assets",
        json!({ "name": "Clip", "parent": folder, "tags": [tag] }),
    )
    .await;

    app.server
        .delete(&format!("/api/tags/{}", tag))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body: Value = app
        .server
        .get(&format!("/api/assets/{}", asset))
        .await
        .json();
    assert_eq!(body["data"]["tags"], json!([]));
}

// ============================================================================
// Country tags
// ============================================================================

#[tokio::test]
async fn test_country_tag_lifecycle() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/country-tags")
        .json(&json!({
            "name": "united-kingdom",
            "display_name": "United Kingdom",
            "code": "gb"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["code"], "GB");

    let response = app
        .server
        .patch(&format!("/api/country-tags/{}", id))
        .json(&json!({ "display_name": "UK" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["display_name"], "UK");

    let response = app
        .server
        .post("/api/country-tags")
        .json(&json!({
            "name": "great-britain",
            "display_name": "Great Britain",
            "code": "GB"
        }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    app.server
        .delete(&format!("/api/country-tags/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_country_tag_bad_code() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/country-tags")
        .json(&json!({ "name": "nowhere", "display_name": "Nowhere", "code": "XYZ" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

    let response = app
        .server
        .post("/api/country-tags")
        .json(&json!({ "name": "nowhere", "display_name": "Nowhere", "code": "1A" }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["code"],
        "UNPROCESSABLE_ENTITY"
    );
}

#[tokio::test]
async fn test_asset_locations() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Library", None).await;

    let fr = create(
        &app,
        "/api/country-tags",
        json!({ "name": "france", "display_name": "France", "code": "FR" }),
    )
    .await;
    let asset = create(
        &app,
        "/api/assets",
        json!({ "name": "Paris", "parent": folder, "locations": [fr] }),
    )
    .await;

    let body: Value = app
        .server
        .get(&format!("/api/assets?location={}", fr))
        .await
        .json();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["id"], asset);
    assert_eq!(body["data"][0]["locations"], json!([fr]));
}

// ============================================================================
// Chapters
// ============================================================================

#[tokio::test]
async fn test_chapter_crud() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = create_asset(&app, folder, "Lecture").await;

    let response = app
        .server
        .post("/api/chapters")
        .json(&json!({
            "asset": asset,
            "name": "Introduction",
            "start_time": 0,
            "end_time": 90,
            "description": "Welcome"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["asset"], asset);
    assert_eq!(body["data"]["end_time"], 90);

    let response = app
        .server
        .patch(&format!("/api/chapters/{}", id))
        .json(&json!({ "name": "Opening" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["name"], "Opening");

    let body: Value = app
        .server
        .get(&format!("/api/chapters?asset={}", asset))
        .await
        .json();
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    app.server
        .delete(&format!("/api/chapters/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/api/chapters/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_chapter_time_rules() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = create_asset(&app, folder, "Lecture").await;

    let response = app
        .server
        .post("/api/chapters")
        .json(&json!({ "asset": asset, "name": "Backwards", "start_time": 50, "end_time": 10 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Chapter end time must not be before its start time."
    );

    let response = app
        .server
        .post("/api/chapters")
        .json(&json!({ "asset": asset, "name": "Negative", "start_time": -1 }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_chapter_name_unique_per_asset() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let first = create_asset(&app, folder, "First").await;
    let second = create_asset(&app, folder, "Second").await;

    create(
        &app,
        "/api/chapters",
        json!({ "asset": first, "name": "Summary", "start_time": 0 }),
    )
    .await;

    let response = app
        .server
        .post("/api/chapters")
        .json(&json!({ "asset": first, "name": "Summary", "start_time": 5 }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    create(
        &app,
        "/api/chapters",
        json!({ "asset": second, "name": "Summary", "start_time": 0 }),
    )
    .await;
}

#[tokio::test]
async fn test_chapters_removed_with_asset() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = create_asset(&app, folder, "Lecture").await;
    let chapter = create(
        &app,
        "/api/chapters",
        json!({ "asset": asset, "name": "Only", "start_time": 0 }),
    )
    .await;

    app.server
        .delete(&format!("/api/assets/{}", asset))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    app.server
        .get(&format!("/api/chapters/{}", chapter))
        .await
        .assert_status_not_found();
}

// ============================================================================
// Learner journeys
// ============================================================================

#[tokio::test]
async fn test_journey_keeps_asset_order() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Course", None).await;
    let a = create_asset(&app, folder, "Lesson A").await;
    let b = create_asset(&app, folder, "Lesson B").await;
    let c = create_asset(&app, folder, "Lesson C").await;

    let response = app
        .server
        .post("/api/learner-journeys")
        .json(&json!({
            "name": "Onboarding",
            "description": "First week",
            "assets": [c, a, b]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["assets"], json!([c, a, b]));

    let response = app
        .server
        .patch(&format!("/api/learner-journeys/{}", id))
        .json(&json!({ "assets": [b, c] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["assets"], json!([b, c]));
    assert_eq!(body["data"]["description"], "First week");

    // Deleting an asset drops it from the journey.
    app.server
        .delete(&format!("/api/assets/{}", b))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let body: Value = app
        .server
        .get(&format!("/api/learner-journeys/{}", id))
        .await
        .json();
    assert_eq!(body["data"]["assets"], json!([c]));
}

#[tokio::test]
async fn test_journey_rejects_repeated_and_unknown_assets() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Course", None).await;
    let a = create_asset(&app, folder, "Lesson A").await;

    let response = app
        .server
        .post("/api/learner-journeys")
        .json(&json!({ "name": "Twice", "assets": [a, a] }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .server
        .post("/api/learner-journeys")
        .json(&json!({ "name": "Unknown", "assets": [a, 500] }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Invalid pk \"500\" - object does not exist."
    );

    let body: Value = app.server.get("/api/learner-journeys").await.json();
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_journey_delete_and_conflict() {
    let app = TestApp::new().await;

    let id = create(&app, "/api/learner-journeys", json!({ "name": "Path" })).await;

    let response = app
        .server
        .post("/api/learner-journeys")
        .json(&json!({ "name": "Path" }))
        .await;
    response.assert_status(StatusCode::CONFLICT);

    app.server
        .delete(&format!("/api/learner-journeys/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    app.server
        .get(&format!("/api/learner-journeys/{}", id))
        .await
        .assert_status_not_found();
}
