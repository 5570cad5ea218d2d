//! Scripted provider mocks.
//!
//! Each call returns a preconfigured result (or an upstream error when the
//! step is scripted to fail) and records the call name, so tests can assert
//! which provider operations ran.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use storyboard_core::error::DomainError;
use storyboard_core::provider::{
    ConversionOptions, ProviderVoice, SpeechProvider, StoryGenerator, Synthesis, SynthesisOptions,
    Transcription, TranslatedText, Translation, VoiceConversion, VoiceSource,
};

/// A speech provider with scripted results. All steps succeed by default
/// with plausible payloads; individual steps can be scripted to fail.
pub struct ScriptedSpeechProvider {
    voices_result: Vec<ProviderVoice>,
    synthesis: Option<Synthesis>,
    translation: Option<Translation>,
    transcription: Option<Transcription>,
    conversion: Option<VoiceConversion>,
    calls: Mutex<Vec<&'static str>>,
}

impl Default for ScriptedSpeechProvider {
    fn default() -> Self {
        Self {
            voices_result: Vec::new(),
            synthesis: Some(Synthesis {
                audio_url: "https://cdn.example.com/tts.mp3".to_string(),
                length_seconds: 2.5,
                word_durations: Vec::new(),
                remaining_character_count: Some(10_000),
            }),
            translation: Some(Translation {
                translations: vec![TranslatedText {
                    source_text: "hello".to_string(),
                    translated_text: "hola".to_string(),
                }],
                target_language: "es-ES".to_string(),
            }),
            transcription: Some(Transcription {
                text: "hello".to_string(),
            }),
            conversion: Some(VoiceConversion {
                audio_url: "https://cdn.example.com/converted.mp3".to_string(),
                length_seconds: 4.0,
                transcription: None,
            }),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl ScriptedSpeechProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_voices(mut self, voices: Vec<ProviderVoice>) -> Self {
        self.voices_result = voices;
        self
    }

    #[must_use]
    pub fn with_synthesis(mut self, synthesis: Synthesis) -> Self {
        self.synthesis = Some(synthesis);
        self
    }

    #[must_use]
    pub fn with_translation(mut self, translation: Translation) -> Self {
        self.translation = Some(translation);
        self
    }

    #[must_use]
    pub fn with_transcription(mut self, text: &str) -> Self {
        self.transcription = Some(Transcription {
            text: text.to_string(),
        });
        self
    }

    /// Script the synthesis step to fail.
    #[must_use]
    pub fn failing_synthesis(mut self) -> Self {
        self.synthesis = None;
        self
    }

    /// Script the translation step to fail.
    #[must_use]
    pub fn failing_translation(mut self) -> Self {
        self.translation = None;
        self
    }

    /// Script the transcription step to fail.
    #[must_use]
    pub fn failing_transcription(mut self) -> Self {
        self.transcription = None;
        self
    }

    /// Script the voice-conversion step to fail.
    #[must_use]
    pub fn failing_conversion(mut self) -> Self {
        self.conversion = None;
        self
    }

    /// Names of the provider operations called so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl SpeechProvider for ScriptedSpeechProvider {
    async fn voices(&self) -> Result<Vec<ProviderVoice>, DomainError> {
        self.record("voices");
        Ok(self.voices_result.clone())
    }

    async fn synthesize(
        &self,
        _text: &str,
        _voice_id: &str,
        _options: &SynthesisOptions,
    ) -> Result<Synthesis, DomainError> {
        self.record("synthesize");
        self.synthesis
            .clone()
            .ok_or_else(|| DomainError::upstream("synthesis unavailable"))
    }

    async fn translate(
        &self,
        texts: &[String],
        _target_lang: &str,
    ) -> Result<Translation, DomainError> {
        self.record("translate");
        let mut translation = self
            .translation
            .clone()
            .ok_or_else(|| DomainError::upstream("translation unavailable"))?;
        // Echo the caller's source texts so assertions can follow the data.
        for (record, source) in translation.translations.iter_mut().zip(texts) {
            record.source_text.clone_from(source);
        }
        Ok(translation)
    }

    async fn transcribe(
        &self,
        _audio: &Path,
        _original_name: Option<&str>,
    ) -> Result<Transcription, DomainError> {
        self.record("transcribe");
        self.transcription
            .clone()
            .ok_or_else(|| DomainError::upstream("transcription unavailable"))
    }

    async fn convert_voice(
        &self,
        _source: &VoiceSource,
        _voice_id: &str,
        _options: &ConversionOptions,
    ) -> Result<VoiceConversion, DomainError> {
        self.record("convert_voice");
        self.conversion
            .clone()
            .ok_or_else(|| DomainError::upstream("conversion unavailable"))
    }
}

/// A story generator that returns a scripted story and counts calls.
pub struct ScriptedStoryGenerator {
    story: Option<String>,
    calls: Mutex<u32>,
}

impl Default for ScriptedStoryGenerator {
    fn default() -> Self {
        Self {
            story: Some("Once upon a time, a test passed.".to_string()),
            calls: Mutex::new(0),
        }
    }
}

impl ScriptedStoryGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_story(mut self, story: &str) -> Self {
        self.story = Some(story.to_string());
        self
    }

    /// Script generation to fail.
    #[must_use]
    pub fn failing(mut self) -> Self {
        self.story = None;
        self
    }

    /// Number of `generate_story` calls made.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn call_count(&self) -> u32 {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl StoryGenerator for ScriptedStoryGenerator {
    async fn generate_story(&self, _prompt: &str) -> Result<String, DomainError> {
        *self.calls.lock().unwrap() += 1;
        self.story
            .clone()
            .ok_or_else(|| DomainError::upstream("no story was generated"))
    }
}
