//! Speech-translation pipeline.
//!
//! Strict sequence, no parallelism: transcribe the uploaded audio,
//! translate the transcript, synthesize the translation, then persist an
//! asset on the owning user. The temporary upload is removed exactly once
//! on every exit path; the `TempUpload` guard covers anything this module
//! misses. No retries and no idempotency — a repeated request runs the
//! whole pipeline again and appends a duplicate asset.

use uuid::Uuid;

use storyboard_core::error::DomainError;
use storyboard_core::model::{Asset, NewAsset};
use storyboard_core::provider::{SpeechProvider, SynthesisOptions};
use storyboard_core::repository::UserRepository;

use crate::upload::TempUpload;

/// Everything the route handler needs to build its response.
#[derive(Debug)]
pub struct TranslateSpeechOutcome {
    pub asset: Asset,
    pub original_text: String,
    pub translated_text: String,
}

/// Run the transcribe → translate → synthesize → persist sequence.
///
/// # Errors
///
/// Any failing step aborts the pipeline with its error after the upload is
/// removed. A missing user surfaces as `DomainError::NotFound` after the
/// provider steps completed (the synthesized audio is not persisted).
pub async fn translate_speech(
    speech: &dyn SpeechProvider,
    users: &dyn UserRepository,
    upload: TempUpload,
    target_lang: &str,
    voice_id: &str,
    user_id: Uuid,
    options: SynthesisOptions,
) -> Result<TranslateSpeechOutcome, DomainError> {
    let transcription = match speech.transcribe(upload.path(), upload.original_name()).await {
        Ok(transcription) => transcription,
        Err(err) => {
            upload.remove().await;
            return Err(err);
        }
    };

    let texts = [transcription.text.clone()];
    let translation = match speech.translate(&texts, target_lang).await {
        Ok(translation) => translation,
        Err(err) => {
            upload.remove().await;
            return Err(err);
        }
    };
    let Some(translated) = translation.translations.into_iter().next() else {
        upload.remove().await;
        return Err(DomainError::upstream("no translation returned"));
    };
    let translated_text = translated.translated_text;

    let synthesis = match speech.synthesize(&translated_text, voice_id, &options).await {
        Ok(synthesis) => synthesis,
        Err(err) => {
            upload.remove().await;
            return Err(err);
        }
    };

    // The upload is no longer needed once synthesis succeeded.
    let asset_name = match upload.original_name() {
        Some(name) => format!("Audio: {name}"),
        None => "Audio translation".to_string(),
    };
    upload.remove().await;

    let user = users.get_user(user_id).await?;
    let asset = users
        .append_asset(
            user.id,
            NewAsset {
                name: asset_name,
                audio_url: Some(synthesis.audio_url),
                length_seconds: synthesis.length_seconds,
                word_durations: synthesis.word_durations,
                translated_from: Some(transcription.text.clone()),
                translated_to: Some(translated_text.clone()),
                target_lang: Some(target_lang.to_string()),
                ..NewAsset::default()
            },
        )
        .await?;

    Ok(TranslateSpeechOutcome {
        asset,
        original_text: transcription.text,
        translated_text,
    })
}
