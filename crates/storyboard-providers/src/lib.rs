//! Storyboard Providers — clients for the external AI services.
//!
//! Two providers, both opaque HTTP APIs: the speech service (voices, TTS,
//! translation, transcription, voice conversion) and the generative-text
//! service (prompt to story). Each client implements the matching trait
//! from `storyboard-core`.

pub mod speech;
pub mod story;

pub use speech::SpeechApiClient;
pub use story::StoryApiClient;
