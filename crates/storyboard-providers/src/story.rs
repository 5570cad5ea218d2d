//! Client for the generative-text provider.
//!
//! Wraps the user prompt in a fixed short-story instruction and calls a
//! `generateContent`-style endpoint. The raw prompt never goes out alone;
//! generation parameters are fixed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use storyboard_core::error::DomainError;
use storyboard_core::provider::StoryGenerator;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const STORY_INSTRUCTION: &str = "Create a creative and engaging short story based on the \
     following prompt. Make it between 200-400 words: ";

/// Generative-text provider client.
#[derive(Debug, Clone)]
pub struct StoryApiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<ContentPart>,
}

#[derive(Serialize, Deserialize)]
struct ContentPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_k: u32,
    top_p: f64,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl StoryApiClient {
    /// Create a client for the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
        }
    }

    /// Override the model name.
    #[must_use]
    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }
}

#[async_trait::async_trait]
impl StoryGenerator for StoryApiClient {
    async fn generate_story(&self, prompt: &str) -> Result<String, DomainError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![ContentPart {
                    text: format!("{STORY_INSTRUCTION}{prompt}"),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 1024,
            },
        };

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), %detail, "story generation failed");
            return Err(DomainError::Upstream {
                status: Some(status.as_u16()),
                detail,
            });
        }

        let body: GenerateContentResponse = response.json().await.map_err(transport)?;
        let story: String = body
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .map(|part| part.text)
            .collect();

        if story.trim().is_empty() {
            return Err(DomainError::upstream("no story was generated"));
        }
        Ok(story)
    }
}

fn transport(err: reqwest::Error) -> DomainError {
    DomainError::Upstream {
        status: err.status().map(|s| s.as_u16()),
        detail: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_text_collected_across_parts() {
        let body: GenerateContentResponse = serde_json::from_str(
            r#"{
                "candidates": [
                    {"content": {"parts": [{"text": "Once upon "}, {"text": "a time."}]}}
                ]
            }"#,
        )
        .unwrap();
        let story: String = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .map(|p| p.text)
            .collect();
        assert_eq!(story, "Once upon a time.");
    }

    #[test]
    fn test_empty_candidates_parse_as_empty() {
        let body: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(body.candidates.is_empty());
    }
}
