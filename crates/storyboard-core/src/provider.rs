//! Seams for the external AI providers.
//!
//! The speech provider covers the voice catalog, text-to-speech, text
//! translation, transcription, and voice conversion. The story generator
//! covers prompt-to-story text. Both are opaque HTTP services; these traits
//! exist so route handlers can be exercised against mocks.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::model::WordDuration;

/// One voice from the provider catalog, before any reshaping.
#[derive(Debug, Clone)]
pub struct ProviderVoice {
    /// Provider voice identifier, e.g. `en-US-natalie`.
    pub voice_id: String,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub accent: Option<String>,
    /// URL of a sample clip, when the provider has one.
    pub sample_audio: Option<String>,
}

/// Synthesis parameters accepted on TTS requests. All optional; the client
/// fills provider defaults (speed 1.0, pitch 1.0, mp3, high quality).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisOptions {
    pub speed: Option<f64>,
    pub pitch: Option<f64>,
    pub format: Option<String>,
    pub quality: Option<String>,
}

/// Result of a text-to-speech call.
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// URL of the synthesized audio.
    pub audio_url: String,
    /// Duration in seconds.
    pub length_seconds: f64,
    /// Word-level alignment, when the provider returns it.
    pub word_durations: Vec<WordDuration>,
    /// Remaining character quota on the provider account.
    pub remaining_character_count: Option<i64>,
}

/// One translated text in a [`Translation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslatedText {
    pub source_text: String,
    pub translated_text: String,
}

/// Result of a text translation call.
#[derive(Debug, Clone)]
pub struct Translation {
    /// One entry per input text, in input order.
    pub translations: Vec<TranslatedText>,
    /// Language code the texts were translated into.
    pub target_language: String,
}

/// Result of transcribing an audio file.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
}

/// Audio input to voice conversion: a local upload or a remote URL the
/// client downloads first.
#[derive(Debug, Clone)]
pub enum VoiceSource {
    File {
        path: PathBuf,
        /// Name the file was uploaded under; used to preserve the extension.
        original_name: Option<String>,
    },
    Url(String),
}

/// Conversion parameters accepted on voice-changer requests.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    pub retain_prosody: Option<bool>,
    pub retain_accent: Option<bool>,
    pub return_transcription: Option<bool>,
    pub speed: Option<f64>,
    pub pitch: Option<f64>,
}

/// Result of a voice conversion call.
#[derive(Debug, Clone)]
pub struct VoiceConversion {
    pub audio_url: String,
    pub length_seconds: f64,
    /// Transcription of the source audio, when requested and returned.
    pub transcription: Option<String>,
}

/// The speech/translation provider.
#[async_trait]
pub trait SpeechProvider: Send + Sync {
    /// Fetch the voice catalog.
    async fn voices(&self) -> Result<Vec<ProviderVoice>, DomainError>;

    /// Synthesize `text` with the given voice.
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        options: &SynthesisOptions,
    ) -> Result<Synthesis, DomainError>;

    /// Translate one or more texts into `target_lang`.
    async fn translate(
        &self,
        texts: &[String],
        target_lang: &str,
    ) -> Result<Translation, DomainError>;

    /// Transcribe a local audio file to text.
    async fn transcribe(
        &self,
        audio: &Path,
        original_name: Option<&str>,
    ) -> Result<Transcription, DomainError>;

    /// Convert the voice of an audio source to `voice_id`.
    async fn convert_voice(
        &self,
        source: &VoiceSource,
        voice_id: &str,
        options: &ConversionOptions,
    ) -> Result<VoiceConversion, DomainError>;
}

/// The generative-text provider.
#[async_trait]
pub trait StoryGenerator: Send + Sync {
    /// Generate a short story from a user prompt.
    async fn generate_story(&self, prompt: &str) -> Result<String, DomainError>;
}
