//! Test helpers for Web API integration tests.
//!
//! Builds the full API router over an in-memory database and an in-memory
//! object store, and keeps a handle on the store so tests can inspect it.

#![allow(dead_code)]

use std::sync::Arc;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use serde_json::{json, Value};

use asset_manager::storage::ObjectStorage;
use asset_manager::web::handlers::AppState;
use asset_manager::web::router::create_router;
use asset_manager::Database;

/// A running test server plus the object store behind it.
pub struct TestApp {
    pub server: TestServer,
    pub storage: ObjectStorage,
    pub db: Database,
}

impl TestApp {
    /// Create a test app with the default upload limit.
    pub async fn new() -> Self {
        Self::with_max_upload_size(10 * 1024 * 1024).await
    }

    /// Create a test app with a custom upload limit in bytes.
    pub async fn with_max_upload_size(max_upload_size: u64) -> Self {
        let db = Database::open_in_memory()
            .await
            .expect("Failed to create test database");
        let storage = ObjectStorage::in_memory();

        let app_state = Arc::new(
            AppState::new(db.clone(), storage.clone()).with_max_upload_size(max_upload_size),
        );
        let router = create_router(app_state, &[]);
        let server = TestServer::new(router).expect("Failed to create test server");

        Self {
            server,
            storage,
            db,
        }
    }

    /// Every object key currently in the store, sorted.
    pub async fn stored_keys(&self) -> Vec<String> {
        self.storage
            .list(Some("media"))
            .await
            .expect("Failed to list objects")
    }

    /// Create a folder and return its id.
    pub async fn create_folder(&self, name: &str, parent: Option<i64>) -> i64 {
        let response = self
            .server
            .post("/api/folders")
            .json(&json!({ "name": name, "parent": parent }))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"]["id"].as_i64().unwrap()
    }

    /// Create an asset with a file through the multipart endpoint.
    pub async fn upload_asset(
        &self,
        folder_id: i64,
        name: &str,
        file_name: &str,
        content: &[u8],
    ) -> Value {
        let response = self
            .server
            .post(&format!("/api/folders/{}/assets", folder_id))
            .multipart(file_form(name, file_name, content))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        response.json::<Value>()["data"].clone()
    }
}

/// Multipart form with a name and a file.
pub fn file_form(name: &str, file_name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new()
        .add_text("name", name.to_string())
        .add_part("file", file_part(file_name, content))
}

/// A file part; the server derives the file type from the name.
pub fn file_part(file_name: &str, content: &[u8]) -> Part {
    Part::bytes(content.to_vec())
        .file_name(file_name.to_string())
        .mime_type("application/octet-stream")
}
