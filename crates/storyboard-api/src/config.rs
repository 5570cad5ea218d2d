//! Server configuration, read from the environment at startup.

use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Runtime configuration for the API server.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Base URL of the speech/translation provider.
    pub speech_api_url: String,
    pub speech_api_key: String,
    /// Base URL of the generative-text provider.
    pub story_api_url: String,
    pub story_api_key: String,
    /// Directory uploaded audio is buffered to before forwarding.
    pub upload_dir: PathBuf,
}

impl Config {
    /// Read configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a required variable is missing or a
    /// value fails to parse.
    pub fn from_env() -> Result<Self, AppError> {
        let database_url = require("DATABASE_URL")?;
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "4000".to_string())
            .parse()
            .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?;
        let speech_api_url =
            env::var("SPEECH_API_URL").unwrap_or_else(|_| "https://api.murf.ai".to_string());
        let speech_api_key = require("SPEECH_API_KEY")?;
        let story_api_url = env::var("STORY_API_URL")
            .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string());
        let story_api_key = require("STORY_API_KEY")?;
        let upload_dir = env::var("UPLOAD_DIR").map_or_else(
            |_| env::temp_dir().join("storyboard-uploads"),
            PathBuf::from,
        );

        Ok(Self {
            host,
            port,
            database_url,
            speech_api_url,
            speech_api_key,
            story_api_url,
            story_api_key,
            upload_dir,
        })
    }
}

fn require(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Config(format!("{name} environment variable must be set")))
}
