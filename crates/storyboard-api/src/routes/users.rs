//! Routes for user records.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use storyboard_core::error::DomainError;
use storyboard_core::model::{NewUser, User};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Unique key; repeated calls with the same address return the same
    /// record.
    pub email: Option<String>,
    pub profile_image_url: Option<String>,
}

/// Response body wrapping a user record.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// POST /
///
/// Returns the existing user for the email with 200, or creates one and
/// returns 201.
#[instrument(skip(state, request))]
async fn create_or_fetch(
    State(state): State<AppState>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let Some(email) = request.email.filter(|e| !e.trim().is_empty()) else {
        return Err(DomainError::Validation("missing required parameter: email".into()).into());
    };
    let Some(first_name) = request.first_name.filter(|n| !n.trim().is_empty()) else {
        return Err(
            DomainError::Validation("missing required parameter: firstName".into()).into(),
        );
    };

    if let Some(user) = state.users.find_by_email(&email).await? {
        info!(user_id = %user.id, "returning existing user");
        return Ok((StatusCode::OK, Json(UserResponse { user })));
    }

    let user = state
        .users
        .create_user(NewUser {
            first_name,
            last_name: request.last_name,
            email,
            profile_image_url: request.profile_image_url,
        })
        .await?;
    info!(user_id = %user.id, "created user");
    Ok((StatusCode::CREATED, Json(UserResponse { user })))
}

/// Returns the router for user records.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(create_or_fetch))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::Value;
    use storyboard_test_support::{
        FixedClock, InMemoryUserRepository, ScriptedSpeechProvider, ScriptedStoryGenerator,
    };
    use tower::ServiceExt;

    use super::*;

    fn test_state() -> AppState {
        AppState::new(
            Arc::new(InMemoryUserRepository::new(Arc::new(FixedClock(Utc::now())))),
            Arc::new(ScriptedSpeechProvider::new()),
            Arc::new(ScriptedStoryGenerator::new()),
            std::env::temp_dir(),
        )
    }

    async fn post_create(app: Router, body: &Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_create_then_fetch_returns_same_user() {
        let state = test_state();
        let body = serde_json::json!({"firstName": "Jo", "email": "jo@x.com"});

        let (status, first) = post_create(router().with_state(state.clone()), &body).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, second) = post_create(router().with_state(state), &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["user"]["id"], second["user"]["id"]);
    }

    #[tokio::test]
    async fn test_missing_email_returns_400() {
        let (status, json) = post_create(
            router().with_state(test_state()),
            &serde_json::json!({"firstName": "Jo"}),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_default_profile_image_is_applied() {
        let (_, json) = post_create(
            router().with_state(test_state()),
            &serde_json::json!({"firstName": "Jo", "email": "jo@x.com"}),
        )
        .await;
        assert!(
            json["user"]["profileImageUrl"]
                .as_str()
                .is_some_and(|url| url.starts_with("https://"))
        );
    }
}
