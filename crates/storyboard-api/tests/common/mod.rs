//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use storyboard_api::routes;
use storyboard_api::state::AppState;
use storyboard_test_support::{
    InMemoryUserRepository, ScriptedSpeechProvider, ScriptedStoryGenerator, StepClock,
};

/// Mocks backing one test app, kept so tests can seed data and assert on
/// recorded calls after the request.
pub struct TestContext {
    pub users: Arc<InMemoryUserRepository>,
    pub speech: Arc<ScriptedSpeechProvider>,
    pub stories: Arc<ScriptedStoryGenerator>,
    pub upload_dir: tempfile::TempDir,
}

impl TestContext {
    /// All-defaults context: every provider call succeeds.
    pub fn new() -> Self {
        Self::with_mocks(ScriptedSpeechProvider::new(), ScriptedStoryGenerator::new())
    }

    pub fn with_mocks(speech: ScriptedSpeechProvider, stories: ScriptedStoryGenerator) -> Self {
        // A stepping clock so appended assets get distinct, ordered
        // timestamps.
        let clock = Arc::new(StepClock::new(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
            chrono::Duration::seconds(1),
        ));
        Self {
            users: Arc::new(InMemoryUserRepository::new(clock)),
            speech: Arc::new(speech),
            stories: Arc::new(stories),
            upload_dir: tempfile::tempdir().expect("create upload dir"),
        }
    }

    /// Build the full app router with the same route structure as `main.rs`.
    pub fn app(&self) -> Router {
        let state = AppState::new(
            self.users.clone(),
            self.speech.clone(),
            self.stories.clone(),
            self.upload_dir.path().to_path_buf(),
        );
        Router::new()
            .merge(routes::health::router())
            .nest("/api/v1/users", routes::users::router())
            .nest("/api/v1/speech", routes::speech::router())
            .nest("/api/v1/stories", routes::stories::router())
            .with_state(state)
    }

    /// Asserts no temporary upload survives in the upload directory.
    pub fn assert_no_leftover_uploads(&self) {
        let leftover = std::fs::read_dir(self.upload_dir.path())
            .map(Iterator::count)
            .unwrap_or(0);
        assert_eq!(leftover, 0, "temporary upload left on disk");
    }
}

/// Send a POST request with a JSON body and return status plus parsed body.
pub async fn post_json(app: Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();
    send(app, request).await
}

/// Send a GET request and return status plus parsed body.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Send a multipart POST with an optional file part and text fields.
pub async fn post_multipart(
    app: Router,
    uri: &str,
    file: Option<(&str, &[u8])>,
    fields: &[(&str, &str)],
) -> (StatusCode, Value) {
    const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";
    let body = multipart_body(BOUNDARY, file, fields);
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn multipart_body(boundary: &str, file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
