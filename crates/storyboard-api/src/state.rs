//! Shared application state.

use std::path::PathBuf;
use std::sync::Arc;

use storyboard_core::provider::{SpeechProvider, StoryGenerator};
use storyboard_core::repository::UserRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// User/asset persistence.
    pub users: Arc<dyn UserRepository>,
    /// Speech/translation provider.
    pub speech: Arc<dyn SpeechProvider>,
    /// Generative-text provider.
    pub stories: Arc<dyn StoryGenerator>,
    /// Directory uploads are buffered to.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserRepository>,
        speech: Arc<dyn SpeechProvider>,
        stories: Arc<dyn StoryGenerator>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            users,
            speech,
            stories,
            upload_dir,
        }
    }
}
