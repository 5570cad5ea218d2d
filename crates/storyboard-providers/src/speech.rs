//! Client for the speech/translation provider.
//!
//! One REST API covers the voice catalog, text-to-speech, text translation,
//! transcription, and voice conversion. Requests authenticate with an
//! `api-key` header. Voice conversion uploads audio as multipart form data
//! and gets a longer timeout than the JSON endpoints.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use storyboard_core::error::DomainError;
use storyboard_core::model::WordDuration;
use storyboard_core::provider::{
    ConversionOptions, ProviderVoice, SpeechProvider, Synthesis, SynthesisOptions, Transcription,
    TranslatedText, Translation, VoiceConversion, VoiceSource,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Voice conversion re-encodes whole files; give it a longer budget.
const CONVERT_TIMEOUT: Duration = Duration::from_secs(120);

const VALID_AUDIO_EXTENSIONS: &[&str] = &[".mp3", ".wav", ".m4a", ".aac", ".ogg", ".webm", ".flac"];

/// Speech provider client. Cheap to clone; both inner clients share
/// connection pools.
#[derive(Debug, Clone)]
pub struct SpeechApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
    convert_client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSpeechRequest<'a> {
    text: &'a str,
    voice_id: &'a str,
    speed: f64,
    pitch: f64,
    format: &'a str,
    quality: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateSpeechResponse {
    audio_file: Option<String>,
    audio_length_in_seconds: Option<f64>,
    #[serde(default)]
    word_durations: Vec<WordDuration>,
    remaining_character_count: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VoiceRecord {
    voice_id: Option<String>,
    id: Option<String>,
    #[serde(alias = "displayName")]
    name: Option<String>,
    gender: Option<String>,
    accent: Option<String>,
    sample_audio: Option<String>,
    preview_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    target_language: &'a str,
    texts: &'a [String],
}

#[derive(Deserialize)]
struct TranslationRecord {
    #[serde(default)]
    source_text: String,
    #[serde(default)]
    translated_text: String,
}

#[derive(Deserialize)]
struct TranslateMetadata {
    target_language: Option<String>,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<TranslationRecord>,
    metadata: Option<TranslateMetadata>,
}

#[derive(Deserialize)]
struct TranscribeResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ConvertResponse {
    audio_file: Option<String>,
    audio_length_in_seconds: Option<f64>,
    transcription: Option<String>,
}

impl SpeechApiClient {
    /// Create a client for the given base URL and API key.
    #[must_use]
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        let convert_client = reqwest::Client::builder()
            .timeout(CONVERT_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into().trim().to_string(),
            client,
            convert_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn read_file_part(
        &self,
        path: &Path,
        original_name: Option<&str>,
    ) -> Result<Part, DomainError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            DomainError::Infrastructure(format!("reading upload {}: {err}", path.display()))
        })?;
        let file_name = file_name_for_upload(original_name);
        Ok(Part::bytes(bytes).file_name(file_name))
    }

    async fn download_part(&self, url: &str) -> Result<Part, DomainError> {
        let response = self.client.get(url).send().await.map_err(transport)?;
        let response = expect_success(response).await?;
        let extension = audio_extension_from_url(url);
        let bytes = response.bytes().await.map_err(transport)?;
        Ok(Part::bytes(bytes.to_vec()).file_name(format!("audio_file{extension}")))
    }
}

#[async_trait::async_trait]
impl SpeechProvider for SpeechApiClient {
    async fn voices(&self) -> Result<Vec<ProviderVoice>, DomainError> {
        let response = self
            .client
            .get(self.url("/v1/speech/voices"))
            .header("api-key", &self.api_key)
            .send()
            .await
            .map_err(transport)?;
        let records: Vec<VoiceRecord> = expect_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        Ok(records
            .into_iter()
            .filter_map(|record| {
                let voice_id = record.voice_id.or(record.id)?;
                Some(ProviderVoice {
                    voice_id,
                    name: record.name,
                    gender: record.gender,
                    accent: record.accent,
                    sample_audio: record.sample_audio.or(record.preview_url),
                })
            })
            .collect())
    }

    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        options: &SynthesisOptions,
    ) -> Result<Synthesis, DomainError> {
        let request = GenerateSpeechRequest {
            text,
            voice_id,
            speed: options.speed.unwrap_or(1.0),
            pitch: options.pitch.unwrap_or(1.0),
            format: options.format.as_deref().unwrap_or("mp3"),
            quality: options.quality.as_deref().unwrap_or("high"),
        };
        let response = self
            .client
            .post(self.url("/v1/speech/generate"))
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let body: GenerateSpeechResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        let audio_url = body
            .audio_file
            .ok_or_else(|| DomainError::upstream("no audio URL in synthesis response"))?;
        Ok(Synthesis {
            audio_url,
            length_seconds: body.audio_length_in_seconds.unwrap_or(0.0),
            word_durations: body.word_durations,
            remaining_character_count: body.remaining_character_count,
        })
    }

    async fn translate(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Translation, DomainError> {
        let request = TranslateRequest {
            target_language: target_lang,
            texts,
        };
        let response = self
            .client
            .post(self.url("/v1/text/translate"))
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;
        let body: TranslateResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        let target_language = body
            .metadata
            .and_then(|m| m.target_language)
            .unwrap_or_else(|| target_lang.to_string());
        Ok(Translation {
            translations: body
                .translations
                .into_iter()
                .map(|t| TranslatedText {
                    source_text: t.source_text,
                    translated_text: t.translated_text,
                })
                .collect(),
            target_language,
        })
    }

    async fn transcribe(
        &self,
        audio: &Path,
        original_name: Option<&str>,
    ) -> Result<Transcription, DomainError> {
        let part = self.read_file_part(audio, original_name).await?;
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(self.url("/v1/speech/transcribe"))
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let body: TranscribeResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        match body.text {
            Some(text) if !text.trim().is_empty() => Ok(Transcription { text }),
            _ => Err(DomainError::upstream("transcription returned no text")),
        }
    }

    async fn convert_voice(
        &self,
        source: &VoiceSource,
        voice_id: &str,
        options: &ConversionOptions,
    ) -> Result<VoiceConversion, DomainError> {
        let part = match source {
            VoiceSource::File {
                path,
                original_name,
            } => self.read_file_part(path, original_name.as_deref()).await?,
            VoiceSource::Url(url) => self.download_part(url).await?,
        };

        // The conversion endpoint takes snake_case form fields.
        let mut form = Form::new()
            .part("file", part)
            .text("voice_id", voice_id.to_string());
        if let Some(retain_prosody) = options.retain_prosody {
            form = form.text("retain_prosody", retain_prosody.to_string());
        }
        if let Some(retain_accent) = options.retain_accent {
            form = form.text("retain_accent", retain_accent.to_string());
        }
        if let Some(return_transcription) = options.return_transcription {
            form = form.text("return_transcription", return_transcription.to_string());
        }
        if let Some(speed) = options.speed {
            form = form.text("speed", speed.to_string());
        }
        if let Some(pitch) = options.pitch {
            form = form.text("pitch", pitch.to_string());
        }

        let response = self
            .convert_client
            .post(self.url("/v1/voice-changer/convert"))
            .header("api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(transport)?;
        let body: ConvertResponse = expect_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        let audio_url = body
            .audio_file
            .ok_or_else(|| DomainError::upstream("no audio URL in conversion response"))?;
        Ok(VoiceConversion {
            audio_url,
            length_seconds: body.audio_length_in_seconds.unwrap_or(0.0),
            transcription: body.transcription,
        })
    }
}

/// Maps a transport-level failure into the upstream error envelope.
fn transport(err: reqwest::Error) -> DomainError {
    DomainError::Upstream {
        status: err.status().map(|s| s.as_u16()),
        detail: err.to_string(),
    }
}

/// Passes a successful response through; turns any other status into an
/// upstream error carrying the response body as diagnostic detail.
async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, DomainError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let detail = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), %detail, "provider request failed");
    Err(DomainError::Upstream {
        status: Some(status.as_u16()),
        detail,
    })
}

/// Filename sent with uploaded audio. The provider routes decoding on the
/// extension, so files uploaded without one get `.mp3`.
fn file_name_for_upload(original_name: Option<&str>) -> String {
    match original_name {
        Some(name) if name.contains('.') => name.to_string(),
        Some(name) => format!("{name}.mp3"),
        None => "audio_file.mp3".to_string(),
    }
}

/// Extension for audio fetched from a remote URL, ignoring query and
/// fragment. Unknown extensions fall back to `.mp3`.
fn audio_extension_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    if let Some(idx) = path.rfind('.') {
        let ext = path[idx..].to_ascii_lowercase();
        if VALID_AUDIO_EXTENSIONS.contains(&ext.as_str()) {
            return ext;
        }
    }
    ".mp3".to_string()
}
