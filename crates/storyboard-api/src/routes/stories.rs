//! Routes for story generation and the asset history.

use axum::extract::{Path, Query, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use storyboard_core::error::DomainError;
use storyboard_core::model::{Asset, NewAsset, name_from_text};

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /generate.
#[derive(Debug, Deserialize)]
pub struct GenerateStoryRequest {
    pub prompt: Option<String>,
}

/// Response body for POST /generate. The story is not persisted here;
/// saving is a separate call.
#[derive(Debug, Serialize)]
pub struct GenerateStoryResponse {
    pub story: String,
}

/// Request body for POST /save.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveStoryRequest {
    pub user_id: Option<Uuid>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub audio_url: Option<String>,
}

/// Response body wrapping a single asset.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    pub asset: Asset,
}

/// Response body for the asset listing.
#[derive(Debug, Serialize)]
pub struct AssetListResponse {
    pub assets: Vec<Asset>,
}

/// Query parameters for GET /{asset_id}.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStoryQuery {
    pub user_id: Option<Uuid>,
}

/// POST /generate
#[instrument(skip(state, request))]
async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateStoryRequest>,
) -> Result<Json<GenerateStoryResponse>, ApiError> {
    let Some(prompt) = request.prompt.filter(|p| !p.trim().is_empty()) else {
        return Err(DomainError::Validation("missing required parameter: prompt".into()).into());
    };

    let story = state.stories.generate_story(&prompt).await?;
    info!(chars = story.len(), "generated story");
    Ok(Json(GenerateStoryResponse { story }))
}

/// POST /save
#[instrument(skip(state, request), fields(user_id = ?request.user_id))]
async fn save(
    State(state): State<AppState>,
    Json(request): Json<SaveStoryRequest>,
) -> Result<Json<AssetResponse>, ApiError> {
    let Some(user_id) = request.user_id else {
        return Err(DomainError::Validation("missing required parameter: userId".into()).into());
    };
    let Some(content) = request.content.filter(|c| !c.trim().is_empty()) else {
        return Err(DomainError::Validation("missing required parameter: content".into()).into());
    };

    let user = state.users.get_user(user_id).await?;
    let name = request
        .title
        .filter(|t| !t.trim().is_empty())
        .unwrap_or_else(|| name_from_text(&content));
    let asset = state
        .users
        .append_asset(
            user.id,
            NewAsset {
                name,
                audio_url: request.audio_url,
                content: Some(content),
                ..NewAsset::default()
            },
        )
        .await?;
    info!(asset_id = %asset.id, "saved story");
    Ok(Json(AssetResponse { asset }))
}

/// GET /user/{user_id}
#[instrument(skip(state))]
async fn list_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<AssetListResponse>, ApiError> {
    let user = state.users.get_user(user_id).await?;
    let assets = state.users.assets_for_user(user.id).await?;
    Ok(Json(AssetListResponse { assets }))
}

/// GET /{asset_id}?userId=
#[instrument(skip(state, query))]
async fn get_story(
    State(state): State<AppState>,
    Path(asset_id): Path<Uuid>,
    Query(query): Query<GetStoryQuery>,
) -> Result<Json<AssetResponse>, ApiError> {
    let Some(user_id) = query.user_id else {
        return Err(DomainError::Validation("missing required parameter: userId".into()).into());
    };

    let user = state.users.get_user(user_id).await?;
    let asset = state.users.get_asset(user.id, asset_id).await?;
    Ok(Json(AssetResponse { asset }))
}

/// Returns the router for stories and the asset history.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate))
        .route("/save", post(save))
        .route("/user/{user_id}", get(list_for_user))
        .route("/{asset_id}", get(get_story))
}
