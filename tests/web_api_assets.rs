//! Web API Asset Tests
//!
//! Integration tests for asset endpoints and the stored files behind them.

mod common;

use axum::http::StatusCode;
use axum_test::multipart::MultipartForm;
use bytes::Bytes;
use common::{file_form, file_part, TestApp};
use serde_json::{json, Value};

#[tokio::test]
async fn test_multipart_create_stores_one_object() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;

    let asset = app
        .upload_asset(folder, "Welcome", "welcome.mp4", b"fake video bytes")
        .await;

    assert_eq!(asset["name"], "Welcome");
    assert_eq!(asset["parent"], folder);
    assert_eq!(asset["file"], "welcome.mp4");
    assert_eq!(asset["filetype"], "video/mp4");
    assert_eq!(asset["file_size"], 16);
    assert_eq!(asset["status"], "draft");
    assert_eq!(asset["enabled"], true);

    assert_eq!(
        app.stored_keys().await,
        vec![format!("media/{}/welcome.mp4", folder)]
    );
}

#[tokio::test]
async fn test_multipart_create_with_metadata() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Talks", None).await;

    let tag = app
        .server
        .post("/api/tags")
        .json(&json!({ "name": "Onboarding" }))
        .await
        .json::<Value>()["data"]["id"]
        .as_i64()
        .unwrap();

    let form = file_form("Keynote", "keynote.mp3", b"audio")
        .add_text("description", "Opening talk")
        .add_text("duration", "125")
        .add_text("status", "published")
        .add_text("enabled", "false")
        .add_text("creation_date", "2024-03-01")
        .add_text("tags", tag.to_string());

    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let asset = response.json::<Value>()["data"].clone();
    assert_eq!(asset["description"], "Opening talk");
    assert_eq!(asset["duration"], 125);
    assert_eq!(asset["duration_display"], "00:02:05");
    assert_eq!(asset["status"], "published");
    assert_eq!(asset["enabled"], false);
    assert_eq!(asset["creation_date"], "2024-03-01");
    assert_eq!(asset["tags"], json!([tag]));
}

#[tokio::test]
async fn test_multipart_create_requires_name() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;

    let form = MultipartForm::new().add_part("file", file_part("clip.mp4", b"data"));
    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(
        body["error"]["details"]["name"],
        json!(["This field is required."])
    );
    assert!(app.stored_keys().await.is_empty());
}

#[tokio::test]
async fn test_multipart_create_unknown_folder() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/folders/77/assets")
        .multipart(file_form("Lost", "lost.mp4", b"data"))
        .await;

    response.assert_status_not_found();
    assert!(app.stored_keys().await.is_empty());
}

#[tokio::test]
async fn test_multipart_create_with_empty_file_part() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;

    let form = file_form("NoFile", "", b"");
    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "NoFile");
    assert!(body["data"]["file"].is_null());
    assert!(app.stored_keys().await.is_empty());
}

#[tokio::test]
async fn test_multipart_create_dot_file_name_rejected() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;

    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(file_form("Dots", "..", b"data"))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["error"]["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid file name"));
    assert!(app.stored_keys().await.is_empty());

    let report: Value = app.server.get("/api/storage/report").await.json();
    assert_eq!(report["data"]["consistent"], true);
}

#[tokio::test]
async fn test_multipart_create_name_too_long() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let name = "a".repeat(256);

    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(file_form(&name, "clip.mp4", b"data"))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Ensure this field has no more than 255 characters."
    );
    assert!(app.stored_keys().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_file_name_in_folder_rejected() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    app.upload_asset(folder, "First", "clip.mp4", b"one").await;

    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(file_form("Second", "clip.mp4", b"two"))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "A file with the name \"clip.mp4\" already exists in this Folder: Videos, \
         attached to Asset First. Please rename the file."
    );

    // The first object is untouched.
    let keys = app.stored_keys().await;
    assert_eq!(keys.len(), 1);
    let content = app.storage.get(&keys[0]).await.unwrap();
    assert_eq!(content, Bytes::from_static(b"one"));
}

#[tokio::test]
async fn test_duplicate_asset_name_in_folder_rejected() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;

    app.server
        .post("/api/assets")
        .json(&json!({ "name": "Handbook", "parent": folder }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/assets")
        .json(&json!({ "name": "Handbook", "parent": folder }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Asset \"Handbook\" already exists within Folder \"Docs\" . \
         Please choose another name or a different parent."
    );
}

#[tokio::test]
async fn test_create_asset_without_parent_rejected() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/assets")
        .json(&json!({ "name": "Floating" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "No Parent Folder has been selected. Please choose a Parent Folder."
    );
}

#[tokio::test]
async fn test_create_asset_invalid_status_rejected() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;

    let response = app
        .server
        .post("/api/assets")
        .json(&json!({ "name": "Handbook", "parent": folder, "status": "lost" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_create_asset_invalid_link_rejected() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;

    let response = app
        .server
        .post("/api/assets")
        .json(&json!({ "name": "Handbook", "parent": folder, "link": "not a url" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Enter a valid URL."
    );
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = TestApp::with_max_upload_size(8).await;
    let folder = app.create_folder("Videos", None).await;

    let response = app
        .server
        .post(&format!("/api/folders/{}/assets", folder))
        .multipart(file_form("Big", "big.mp4", &[0u8; 64]))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["error"]["message"]
        .as_str()
        .unwrap()
        .contains("too large"));
    assert!(app.stored_keys().await.is_empty());
}

#[tokio::test]
async fn test_download_asset_file() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;
    let asset = app
        .upload_asset(folder, "Guide", "guide.pdf", b"%PDF-1.4 body")
        .await;
    let id = asset["id"].as_i64().unwrap();

    let response = app.server.get(&format!("/api/assets/{}/file", id)).await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"guide.pdf\""
    );
    assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4 body");
}

#[tokio::test]
async fn test_download_without_file_not_found() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;

    let id = app
        .server
        .post("/api/assets")
        .json(&json!({ "name": "Empty", "parent": folder }))
        .await
        .json::<Value>()["data"]["id"]
        .as_i64()
        .unwrap();

    let response = app.server.get(&format!("/api/assets/{}/file", id)).await;
    response.assert_status_not_found();
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "File not found"
    );
}

#[tokio::test]
async fn test_replace_file_leaves_only_new_object() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = app
        .upload_asset(folder, "Promo", "promo-v1.mp4", b"version one")
        .await;
    let id = asset["id"].as_i64().unwrap();

    let form = MultipartForm::new().add_part("file", file_part("promo-v2.mp4", b"version two"));
    let response = app
        .server
        .put(&format!("/api/assets/{}/file", id))
        .multipart(form)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["file"], "promo-v2.mp4");
    assert_eq!(body["data"]["file_size"], 11);

    assert_eq!(
        app.stored_keys().await,
        vec![format!("media/{}/promo-v2.mp4", folder)]
    );
}

#[tokio::test]
async fn test_replace_file_same_name_overwrites() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = app
        .upload_asset(folder, "Promo", "promo.mp4", b"old")
        .await;
    let id = asset["id"].as_i64().unwrap();

    let form = MultipartForm::new().add_part("file", file_part("promo.mp4", b"new content"));
    app.server
        .put(&format!("/api/assets/{}/file", id))
        .multipart(form)
        .await
        .assert_status_ok();

    let keys = app.stored_keys().await;
    assert_eq!(keys, vec![format!("media/{}/promo.mp4", folder)]);
    let content = app.storage.get(&keys[0]).await.unwrap();
    assert_eq!(content, Bytes::from_static(b"new content"));
}

#[tokio::test]
async fn test_upload_without_file_part() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = app.upload_asset(folder, "Promo", "promo.mp4", b"x").await;
    let id = asset["id"].as_i64().unwrap();

    let form = MultipartForm::new().add_text("name", "ignored");
    let response = app
        .server
        .put(&format!("/api/assets/{}/file", id))
        .multipart(form)
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "No file provided"
    );
}

#[tokio::test]
async fn test_move_asset_relocates_object() {
    let app = TestApp::new().await;
    let source = app.create_folder("Inbox", None).await;
    let target = app.create_folder("Published", None).await;
    let asset = app
        .upload_asset(source, "Story", "story.mp4", b"story bytes")
        .await;
    let id = asset["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/assets/{}", id))
        .json(&json!({ "parent": target }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["parent"], target);

    let keys = app.stored_keys().await;
    assert_eq!(keys, vec![format!("media/{}/story.mp4", target)]);
    let content = app.storage.get(&keys[0]).await.unwrap();
    assert_eq!(content, Bytes::from_static(b"story bytes"));

    let response = app.server.get(&format!("/api/assets/{}/file", id)).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"story bytes");
}

#[tokio::test]
async fn test_move_asset_into_folder_with_same_file_rejected() {
    let app = TestApp::new().await;
    let source = app.create_folder("Inbox", None).await;
    let target = app.create_folder("Published", None).await;
    app.upload_asset(target, "Existing", "story.mp4", b"existing")
        .await;
    let asset = app
        .upload_asset(source, "Story", "story.mp4", b"incoming")
        .await;
    let id = asset["id"].as_i64().unwrap();

    let response = app
        .server
        .patch(&format!("/api/assets/{}", id))
        .json(&json!({ "parent": target }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        app.stored_keys().await,
        vec![
            format!("media/{}/story.mp4", source),
            format!("media/{}/story.mp4", target),
        ]
    );
}

#[tokio::test]
async fn test_move_folder_keeps_asset_downloadable() {
    let app = TestApp::new().await;
    let parent = app.create_folder("Parent", None).await;
    let other = app.create_folder("Other", None).await;
    let child = app.create_folder("Child", Some(parent)).await;
    let asset = app.upload_asset(child, "Clip", "clip.mp4", b"clip").await;
    let id = asset["id"].as_i64().unwrap();

    app.server
        .patch(&format!("/api/folders/{}", child))
        .json(&json!({ "parent": other }))
        .await
        .assert_status_ok();

    // Keys are built from the holding folder id, which did not change.
    assert_eq!(
        app.stored_keys().await,
        vec![format!("media/{}/clip.mp4", child)]
    );
    app.server
        .get(&format!("/api/assets/{}/file", id))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_update_asset_metadata() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;
    let id = app
        .server
        .post("/api/assets")
        .json(&json!({
            "name": "Manual",
            "parent": folder,
            "description": "First draft",
            "link": "https://example.com/manual"
        }))
        .await
        .json::<Value>()["data"]["id"]
        .as_i64()
        .unwrap();

    let response = app
        .server
        .patch(&format!("/api/assets/{}", id))
        .json(&json!({
            "name": "Manual v2",
            "status": "review",
            "description": null,
            "duration": 3600
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["name"], "Manual v2");
    assert_eq!(body["data"]["status"], "review");
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["link"], "https://example.com/manual");
    assert_eq!(body["data"]["duration_display"], "01:00:00");
}

#[tokio::test]
async fn test_update_asset_not_found() {
    let app = TestApp::new().await;

    let response = app
        .server
        .patch("/api/assets/404")
        .json(&json!({ "name": "Ghost" }))
        .await;

    response.assert_status_not_found();
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Asset not found"
    );
}

#[tokio::test]
async fn test_remove_asset_file() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;
    let asset = app.upload_asset(folder, "Sheet", "sheet.csv", b"a,b").await;
    let id = asset["id"].as_i64().unwrap();

    let response = app.server.delete(&format!("/api/assets/{}/file", id)).await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert!(body["data"]["file"].is_null());
    assert!(body["data"]["file_size"].is_null());
    assert!(app.stored_keys().await.is_empty());

    // The asset row survives.
    app.server
        .get(&format!("/api/assets/{}", id))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_delete_asset_removes_object() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;
    let asset = app.upload_asset(folder, "Sheet", "sheet.csv", b"a,b").await;
    let id = asset["id"].as_i64().unwrap();

    let response = app.server.delete(&format!("/api/assets/{}", id)).await;
    response.assert_status(StatusCode::NO_CONTENT);

    assert!(app.stored_keys().await.is_empty());
    app.server
        .get(&format!("/api/assets/{}", id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_list_assets_with_filters() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Library", None).await;

    let collection = app
        .server
        .post("/api/collections")
        .json(&json!({ "name": "Spring" }))
        .await
        .json::<Value>()["data"]["id"]
        .as_i64()
        .unwrap();

    app.server
        .post("/api/assets")
        .json(&json!({
            "name": "Alpha Lesson",
            "parent": folder,
            "status": "published",
            "collections": [collection]
        }))
        .await
        .assert_status(StatusCode::CREATED);
    app.server
        .post("/api/assets")
        .json(&json!({ "name": "Beta Lesson", "parent": folder, "enabled": false }))
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .get(&format!("/api/assets?collection={}", collection))
        .await;
    let body: Value = response.json();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Alpha Lesson");

    let body: Value = app.server.get("/api/assets?status=published").await.json();
    assert_eq!(body["meta"]["total"], 1);

    let body: Value = app.server.get("/api/assets?enabled=false").await.json();
    assert_eq!(body["meta"]["total"], 1);
    assert_eq!(body["data"][0]["name"], "Beta Lesson");

    let body: Value = app.server.get("/api/assets?search=lesson").await.json();
    assert_eq!(body["meta"]["total"], 2);

    let body: Value = app
        .server
        .get(&format!("/api/assets?folder={}&per_page=1", folder))
        .await
        .json();
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_relation_rejected() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Library", None).await;

    let response = app
        .server
        .post("/api/assets")
        .json(&json!({ "name": "Tagged", "parent": folder, "tags": [99] }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.json::<Value>()["error"]["message"],
        "Invalid pk \"99\" - object does not exist."
    );
}

#[tokio::test]
async fn test_storage_report() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Docs", None).await;
    app.upload_asset(folder, "Sheet", "sheet.csv", b"a,b").await;

    let response = app.server.get("/api/storage/report").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"]["consistent"], true);
    assert_eq!(body["data"]["objects_checked"], 1);
    assert_eq!(body["data"]["assets_checked"], 1);

    app.storage
        .put("media/999/stray.bin", Bytes::from_static(b"stray"))
        .await
        .unwrap();

    let body: Value = app.server.get("/api/storage/report").await.json();
    assert_eq!(body["data"]["consistent"], false);
    assert_eq!(
        body["data"]["orphaned_objects"],
        json!(["media/999/stray.bin"])
    );
}

#[tokio::test]
async fn test_asset_chapters_replace() {
    let app = TestApp::new().await;
    let folder = app.create_folder("Videos", None).await;
    let asset = app.upload_asset(folder, "Lecture", "lecture.mp4", b"v").await;
    let id = asset["id"].as_i64().unwrap();

    let response = app
        .server
        .put(&format!("/api/assets/{}/chapters", id))
        .json(&json!({
            "chapters": [
                { "name": "Outro", "start_time": 300 },
                { "name": "Intro", "start_time": 0, "end_time": 60 }
            ]
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let body: Value = app
        .server
        .get(&format!("/api/assets/{}/chapters", id))
        .await
        .json();
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Intro", "Outro"]);

    let response = app
        .server
        .put(&format!("/api/assets/{}/chapters", id))
        .json(&json!({
            "chapters": [
                { "name": "Part", "start_time": 0 },
                { "name": "Part", "start_time": 10 }
            ]
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}
