//! User and asset data model.
//!
//! Users own an append-only list of assets: generated audio, saved stories,
//! and translation records. Assets are never updated or deleted once
//! appended; their identity is assigned on insertion and immutable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Profile image used when a user is created without one.
pub const DEFAULT_PROFILE_IMAGE_URL: &str =
    "https://cdn-icons-png.freepik.com/512/6645/6645221.png";

/// Maximum characters of source text used for a derived asset name.
const NAME_PREVIEW_CHARS: usize = 30;

/// An identity record. Looked up by email on creation so repeated
/// create calls for the same address return the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Database-assigned identifier.
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    /// Unique across all users.
    pub email: String,
    pub profile_image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a [`User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    /// Falls back to [`DEFAULT_PROFILE_IMAGE_URL`] when `None`.
    pub profile_image_url: Option<String>,
}

/// A persisted artifact owned by exactly one user: story text, synthesized
/// audio, or a translation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Database-assigned identifier, immutable after insertion.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Display name shown in the asset history.
    pub name: String,
    /// URL of the synthesized audio, when the asset has audio.
    pub audio_url: Option<String>,
    /// Audio duration in seconds; 0 when there is no audio.
    pub length_seconds: f64,
    /// Word-level timing alignment returned by the synthesis provider.
    #[serde(default)]
    pub word_durations: Vec<WordDuration>,
    /// Story text, for saved stories.
    pub content: Option<String>,
    /// Source text, for translation assets.
    pub translated_from: Option<String>,
    /// Translated text, for translation assets.
    pub translated_to: Option<String>,
    /// Target language code, for translation assets.
    pub target_lang: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to append an [`Asset`] to a user's history.
#[derive(Debug, Clone, Default)]
pub struct NewAsset {
    pub name: String,
    pub audio_url: Option<String>,
    pub length_seconds: f64,
    pub word_durations: Vec<WordDuration>,
    pub content: Option<String>,
    pub translated_from: Option<String>,
    pub translated_to: Option<String>,
    pub target_lang: Option<String>,
}

/// Per-word timing annotation attached to a synthesized asset. Purely
/// descriptive; it has no lifecycle of its own.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WordDuration {
    pub word: String,
    /// Start offset from the beginning of the audio, in milliseconds.
    pub start_ms: i64,
    /// End offset, in milliseconds.
    pub end_ms: i64,
    /// Index of the word in the source text.
    pub source_word_index: i64,
    pub pitch_scale_minimum: f64,
    pub pitch_scale_maximum: f64,
}

/// Derives an asset display name from its source text: the first 30
/// characters, with an ellipsis when the text is longer.
#[must_use]
pub fn name_from_text(text: &str) -> String {
    let mut name: String = text.chars().take(NAME_PREVIEW_CHARS).collect();
    if text.chars().count() > NAME_PREVIEW_CHARS {
        name.push_str("...");
    }
    name
}
