//! Voice catalog reshaping.
//!
//! The provider returns a flat voice list; the UI wants it grouped by
//! language, accent, and gender. Each grouping is a partition: every voice
//! lands in exactly one bucket, with missing attributes bucketed under
//! "Unknown". Language and region display names are derived from the
//! voice-id prefix (`en-US-natalie` → English, United States).

use std::collections::BTreeMap;

use serde::Serialize;
use storyboard_core::provider::ProviderVoice;

/// One voice, reshaped for the UI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedVoice {
    pub id: String,
    /// Display name; falls back to the voice id.
    pub name: String,
    /// Display language, e.g. `English (United States)`.
    pub language: String,
    pub language_code: String,
    pub region_code: String,
    pub gender: Option<String>,
    pub accent: Option<String>,
    pub sample_audio: Option<String>,
}

/// The reshaped catalog: the flat list plus the three groupings.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceCatalog {
    pub count: usize,
    pub voices: Vec<FormattedVoice>,
    pub voices_by_language: BTreeMap<String, Vec<FormattedVoice>>,
    pub voices_by_accent: BTreeMap<String, Vec<FormattedVoice>>,
    pub voices_by_gender: BTreeMap<String, Vec<FormattedVoice>>,
}

/// Reshape the provider catalog.
#[must_use]
pub fn build_catalog(voices: Vec<ProviderVoice>) -> VoiceCatalog {
    let voices: Vec<FormattedVoice> = voices.into_iter().map(format_voice).collect();

    let mut by_language: BTreeMap<String, Vec<FormattedVoice>> = BTreeMap::new();
    let mut by_accent: BTreeMap<String, Vec<FormattedVoice>> = BTreeMap::new();
    let mut by_gender: BTreeMap<String, Vec<FormattedVoice>> = BTreeMap::new();
    for voice in &voices {
        by_language
            .entry(voice.language.clone())
            .or_default()
            .push(voice.clone());
        by_accent
            .entry(bucket(voice.accent.as_deref()))
            .or_default()
            .push(voice.clone());
        by_gender
            .entry(bucket(voice.gender.as_deref()))
            .or_default()
            .push(voice.clone());
    }

    VoiceCatalog {
        count: voices.len(),
        voices,
        voices_by_language: by_language,
        voices_by_accent: by_accent,
        voices_by_gender: by_gender,
    }
}

fn format_voice(voice: ProviderVoice) -> FormattedVoice {
    let mut parts = voice.voice_id.split('-');
    let language_code = parts.next().unwrap_or_default().to_string();
    let region_code = parts.next().unwrap_or_default().to_string();

    let language = display_name(&language_code, language_name(&language_code));
    let region = display_name(&region_code, region_name(&region_code));
    let display_language = match (language.is_empty(), region.is_empty()) {
        (false, false) => format!("{language} ({region})"),
        (false, true) => language,
        (true, _) => "Unknown".to_string(),
    };

    FormattedVoice {
        name: voice.name.unwrap_or_else(|| voice.voice_id.clone()),
        id: voice.voice_id,
        language: display_language,
        language_code,
        region_code,
        gender: voice.gender,
        accent: voice.accent,
        sample_audio: voice.sample_audio,
    }
}

fn bucket(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "Unknown".to_string(),
    }
}

fn display_name(code: &str, known: Option<&str>) -> String {
    known.map_or_else(|| code.to_string(), ToString::to_string)
}

fn language_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "nl" => "Dutch",
        "hi" => "Hindi",
        "bn" => "Bengali",
        "ta" => "Tamil",
        "ko" => "Korean",
        "ja" => "Japanese",
        "zh" => "Chinese",
        "pl" => "Polish",
        "el" => "Greek",
        "sk" => "Slovak",
        "hr" => "Croatian",
        _ => return None,
    })
}

fn region_name(code: &str) -> Option<&'static str> {
    Some(match code {
        "US" => "United States",
        "UK" => "United Kingdom",
        "AU" => "Australia",
        "IN" => "India",
        "ES" => "Spain",
        "MX" => "Mexico",
        "FR" => "France",
        "DE" => "Germany",
        "IT" => "Italy",
        "BR" => "Brazil",
        "NL" => "Netherlands",
        "CN" => "China",
        "JP" => "Japan",
        "KR" => "Korea",
        "PL" => "Poland",
        "GR" => "Greece",
        "SK" => "Slovakia",
        "HR" => "Croatia",
        "SCOTT" => "Scotland",
        _ => return None,
    })
}
