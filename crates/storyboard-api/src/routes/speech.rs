//! Routes for the speech/translation provider.
//!
//! Four of these are short fixed sequences of provider calls followed by
//! an asset append; the multipart endpoints buffer the upload first and
//! are responsible for cleaning it up on every path that does not hand it
//! to the pipeline.

use axum::extract::{Multipart, State};
use axum::{Json, Router, routing::get, routing::post};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use storyboard_core::error::DomainError;
use storyboard_core::model::{Asset, NewAsset, WordDuration, name_from_text};
use storyboard_core::provider::{
    ConversionOptions, SynthesisOptions, TranslatedText, VoiceSource,
};

use crate::error::ApiError;
use crate::pipeline;
use crate::state::AppState;
use crate::upload::{self, TempUpload};
use crate::voices::{VoiceCatalog, build_catalog};

/// Request body for POST /tts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsRequest {
    pub text: Option<String>,
    pub voice_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub options: Option<SynthesisOptions>,
}

/// Response body for POST /tts.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TtsResponse {
    pub asset: Asset,
    pub word_durations: Vec<WordDuration>,
    pub remaining_characters: Option<i64>,
}

/// Request body for POST /translate.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateAndSpeakRequest {
    pub text: Option<String>,
    pub target_lang: Option<String>,
    pub voice_id: Option<String>,
    pub user_id: Option<Uuid>,
    pub options: Option<SynthesisOptions>,
}

/// Original/translated text pair returned by the translation endpoints.
#[derive(Debug, Serialize)]
pub struct TextPair {
    pub original: String,
    pub translated: String,
}

/// Response body for POST /translate.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateAndSpeakResponse {
    pub asset: Asset,
    pub translation: TextPair,
    pub word_durations: Vec<WordDuration>,
}

/// Request body for POST /translate-text. Accepts either a single text or
/// a batch.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTextRequest {
    pub text: Option<String>,
    pub texts: Option<Vec<String>>,
    pub target_lang: Option<String>,
    pub user_id: Option<Uuid>,
    pub save_to_assets: Option<bool>,
}

/// Response body for POST /translate-text.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateTextResponse {
    pub translations: Vec<TranslatedText>,
    pub target_language: String,
}

/// Response body for POST /translate-speech.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateSpeechResponse {
    pub asset: Asset,
    pub transcription: TextPair,
    pub word_durations: Vec<WordDuration>,
}

/// Response body for POST /voice-changer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceChangerResponse {
    pub asset: Asset,
    /// Transcription of the source audio, when the provider returned one.
    pub transcription: Option<String>,
    /// Echo of the `audioUrl` field, when the request carried one.
    pub original_audio_url: Option<String>,
}

/// GET /voices
#[instrument(skip(state))]
async fn voices(State(state): State<AppState>) -> Result<Json<VoiceCatalog>, ApiError> {
    let voices = state.speech.voices().await?;
    let catalog = build_catalog(voices);
    info!(count = catalog.count, "fetched voice catalog");
    Ok(Json(catalog))
}

/// POST /tts
#[instrument(skip(state, request), fields(user_id = ?request.user_id))]
async fn tts(
    State(state): State<AppState>,
    Json(request): Json<TtsRequest>,
) -> Result<Json<TtsResponse>, ApiError> {
    let text = require(request.text, "text")?;
    let voice_id = require(request.voice_id, "voiceId")?;
    let user_id = require_user_id(request.user_id)?;
    let options = request.options.unwrap_or_default();

    let synthesis = state.speech.synthesize(&text, &voice_id, &options).await?;

    let user = state.users.get_user(user_id).await?;
    let asset = state
        .users
        .append_asset(
            user.id,
            NewAsset {
                name: name_from_text(&text),
                audio_url: Some(synthesis.audio_url),
                length_seconds: synthesis.length_seconds,
                word_durations: synthesis.word_durations.clone(),
                ..NewAsset::default()
            },
        )
        .await?;
    info!(asset_id = %asset.id, "synthesized speech");

    Ok(Json(TtsResponse {
        asset,
        word_durations: synthesis.word_durations,
        remaining_characters: synthesis.remaining_character_count,
    }))
}

/// POST /translate — translate text, synthesize the translation, persist.
#[instrument(skip(state, request), fields(user_id = ?request.user_id))]
async fn translate_and_speak(
    State(state): State<AppState>,
    Json(request): Json<TranslateAndSpeakRequest>,
) -> Result<Json<TranslateAndSpeakResponse>, ApiError> {
    let text = require(request.text, "text")?;
    let target_lang = require(request.target_lang, "targetLang")?;
    let voice_id = require(request.voice_id, "voiceId")?;
    let user_id = require_user_id(request.user_id)?;
    let options = request.options.unwrap_or_default();

    let translation = state
        .speech
        .translate(std::slice::from_ref(&text), &target_lang)
        .await?;
    let Some(translated) = translation.translations.into_iter().next() else {
        return Err(DomainError::upstream("no translation returned").into());
    };
    let translated_text = translated.translated_text;

    let synthesis = state
        .speech
        .synthesize(&translated_text, &voice_id, &options)
        .await?;

    let user = state.users.get_user(user_id).await?;
    let asset = state
        .users
        .append_asset(
            user.id,
            NewAsset {
                name: "Text to Audio Translation".to_string(),
                audio_url: Some(synthesis.audio_url),
                length_seconds: synthesis.length_seconds,
                word_durations: synthesis.word_durations.clone(),
                translated_from: Some(text.clone()),
                translated_to: Some(translated_text.clone()),
                target_lang: Some(target_lang),
                ..NewAsset::default()
            },
        )
        .await?;
    info!(asset_id = %asset.id, "translated and synthesized");

    Ok(Json(TranslateAndSpeakResponse {
        asset,
        translation: TextPair {
            original: text,
            translated: translated_text,
        },
        word_durations: synthesis.word_durations,
    }))
}

/// POST /translate-text — translation only, optional asset append.
#[instrument(skip(state, request), fields(user_id = ?request.user_id))]
async fn translate_text(
    State(state): State<AppState>,
    Json(request): Json<TranslateTextRequest>,
) -> Result<Json<TranslateTextResponse>, ApiError> {
    let texts: Vec<String> = match (request.texts, request.text) {
        (Some(texts), _) if !texts.is_empty() => texts,
        (_, Some(text)) if !text.trim().is_empty() => vec![text],
        _ => {
            return Err(
                DomainError::Validation("missing required parameter: text or texts".into()).into(),
            );
        }
    };
    let target_lang = require(request.target_lang, "targetLang")?;
    let user_id = require_user_id(request.user_id)?;

    let translation = state.speech.translate(&texts, &target_lang).await?;

    if request.save_to_assets.unwrap_or(false) {
        let Some(first) = translation.translations.first() else {
            return Err(DomainError::upstream("no translation returned").into());
        };
        let user = state.users.get_user(user_id).await?;
        let asset = state
            .users
            .append_asset(
                user.id,
                NewAsset {
                    name: "Translation".to_string(),
                    translated_from: Some(first.source_text.clone()),
                    translated_to: Some(first.translated_text.clone()),
                    target_lang: Some(translation.target_language.clone()),
                    ..NewAsset::default()
                },
            )
            .await?;
        info!(asset_id = %asset.id, "saved translation asset");
    }

    Ok(Json(TranslateTextResponse {
        translations: translation.translations,
        target_language: translation.target_language,
    }))
}

/// POST /translate-speech — multipart upload through the full pipeline.
#[instrument(skip_all)]
async fn translate_speech(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TranslateSpeechResponse>, ApiError> {
    let mut form = upload::collect(&state.upload_dir, multipart).await?;

    let Some(file) = form.file.take() else {
        return Err(DomainError::Validation(
            "missing audio file; provide a file upload".into(),
        )
        .into());
    };
    let target_lang = form.field("targetLang").map(ToString::to_string);
    let voice_id = form.field("voiceId").map(ToString::to_string);
    let user_id = form.field("userId").map(ToString::to_string);
    let (Some(target_lang), Some(voice_id), Some(user_id)) = (target_lang, voice_id, user_id)
    else {
        file.remove().await;
        return Err(DomainError::Validation(
            "missing required parameters: targetLang, voiceId, and userId".into(),
        )
        .into());
    };
    let user_id = match Uuid::parse_str(&user_id) {
        Ok(id) => id,
        Err(_) => {
            file.remove().await;
            return Err(DomainError::Validation("userId must be a UUID".into()).into());
        }
    };

    let outcome = pipeline::translate_speech(
        state.speech.as_ref(),
        state.users.as_ref(),
        file,
        &target_lang,
        &voice_id,
        user_id,
        SynthesisOptions::default(),
    )
    .await?;
    info!(asset_id = %outcome.asset.id, "translated speech");

    let word_durations = outcome.asset.word_durations.clone();
    Ok(Json(TranslateSpeechResponse {
        transcription: TextPair {
            original: outcome.original_text,
            translated: outcome.translated_text,
        },
        word_durations,
        asset: outcome.asset,
    }))
}

/// POST /voice-changer — multipart upload or remote URL.
#[instrument(skip_all)]
async fn voice_changer(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<VoiceChangerResponse>, ApiError> {
    let mut form = upload::collect(&state.upload_dir, multipart).await?;
    let file = form.file.take();
    let audio_url = form.field("audioUrl").map(ToString::to_string);

    // The uploaded file takes precedence over a URL, as in the web form.
    let original_name = file
        .as_ref()
        .and_then(TempUpload::original_name)
        .map(ToString::to_string);
    let source = if let Some(upload) = &file {
        VoiceSource::File {
            path: upload.path().to_owned(),
            original_name: original_name.clone(),
        }
    } else if let Some(url) = audio_url.clone() {
        VoiceSource::Url(url)
    } else {
        return Err(DomainError::Validation(
            "missing audio; provide either a file upload or an audioUrl".into(),
        )
        .into());
    };

    let voice_id = form.field("voiceId").map(ToString::to_string);
    let user_id = form.field("userId").map(ToString::to_string);
    let (Some(voice_id), Some(user_id)) = (voice_id, user_id) else {
        remove_if_present(file).await;
        return Err(DomainError::Validation(
            "missing required parameters: voiceId and userId".into(),
        )
        .into());
    };
    let user_id = match Uuid::parse_str(&user_id) {
        Ok(id) => id,
        Err(_) => {
            remove_if_present(file).await;
            return Err(DomainError::Validation("userId must be a UUID".into()).into());
        }
    };
    let options = match form.field("options") {
        Some(raw) => match serde_json::from_str::<ConversionOptions>(raw) {
            Ok(options) => options,
            Err(err) => {
                remove_if_present(file).await;
                return Err(
                    DomainError::Validation(format!("invalid options: {err}")).into(),
                );
            }
        },
        None => ConversionOptions::default(),
    };

    let result = state.speech.convert_voice(&source, &voice_id, &options).await;
    remove_if_present(file).await;
    let conversion = result?;

    let user = state.users.get_user(user_id).await?;
    let name = match &original_name {
        Some(name) => format!("Voice Changed: {name} → {voice_id}"),
        None => format!("Voice Changed: Audio → {voice_id}"),
    };
    let asset = state
        .users
        .append_asset(
            user.id,
            NewAsset {
                name,
                audio_url: Some(conversion.audio_url),
                length_seconds: conversion.length_seconds,
                ..NewAsset::default()
            },
        )
        .await?;
    info!(asset_id = %asset.id, "changed voice");

    // Echoed whenever a URL was supplied, even when an uploaded file won
    // precedence as the conversion source.
    Ok(Json(VoiceChangerResponse {
        asset,
        transcription: conversion.transcription,
        original_audio_url: audio_url,
    }))
}

async fn remove_if_present(file: Option<TempUpload>) {
    if let Some(upload) = file {
        upload.remove().await;
    }
}

fn require(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(DomainError::Validation(format!("missing required parameter: {name}")).into()),
    }
}

fn require_user_id(value: Option<Uuid>) -> Result<Uuid, ApiError> {
    value.ok_or_else(|| {
        ApiError(DomainError::Validation(
            "missing required parameter: userId".into(),
        ))
    })
}

/// Returns the router for the speech context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/voices", get(voices))
        .route("/tts", post(tts))
        .route("/translate", post(translate_and_speak))
        .route("/translate-text", post(translate_text))
        .route("/translate-speech", post(translate_speech))
        .route("/voice-changer", post(voice_changer))
}
