//! Storyboard API server entry point.

use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use storyboard_api::config::Config;
use storyboard_api::routes;
use storyboard_api::state::AppState;
use storyboard_core::clock::SystemClock;
use storyboard_providers::{SpeechApiClient, StoryApiClient};
use storyboard_store::PgUserRepository;

/// Uploads above this size are rejected before buffering.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting Storyboard API server");

    let config = Config::from_env()?;

    // Create database connection pool and apply migrations.
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!("../../migrations").run(&pool).await?;

    // Build application state: real store and provider clients.
    let users = Arc::new(PgUserRepository::new(pool, Arc::new(SystemClock)));
    let speech = Arc::new(SpeechApiClient::new(
        &config.speech_api_url,
        &config.speech_api_key,
    ));
    let stories = Arc::new(StoryApiClient::new(
        &config.story_api_url,
        &config.story_api_key,
    ));
    let app_state = AppState::new(users, speech, stories, config.upload_dir.clone());

    // Build router.
    // TODO: Replace CorsLayer::permissive() with restricted origins for production.
    let app = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/users", routes::users::router())
        .nest("/api/v1/speech", routes::speech::router())
        .nest("/api/v1/stories", routes::stories::router())
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server.
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("invalid HOST:PORT combination: {e}"))?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app).await?;

    Ok(())
}
