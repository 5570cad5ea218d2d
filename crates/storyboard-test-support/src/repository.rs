//! Test repositories — mock `UserRepository` implementations for tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use storyboard_core::clock::Clock;
use storyboard_core::error::DomainError;
use storyboard_core::model::{Asset, DEFAULT_PROFILE_IMAGE_URL, NewAsset, NewUser, User};
use storyboard_core::repository::UserRepository;

/// An in-memory user repository with the same observable behavior as the
/// real store: idempotent-by-email lookup, append-only assets, listing in
/// descending `created_at` order. Timestamps come from the injected clock.
pub struct InMemoryUserRepository {
    clock: Arc<dyn Clock>,
    state: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    assets: Vec<Asset>,
}

impl InMemoryUserRepository {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(Inner::default()),
        }
    }

    /// Insert a user directly, bypassing the trait, and return it.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn seed_user(&self, email: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            first_name: "Test".to_string(),
            last_name: None,
            email: email.to_string(),
            profile_image_url: DEFAULT_PROFILE_IMAGE_URL.to_string(),
            created_at: self.clock.now(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        user
    }

    /// Snapshot of every asset appended so far, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn appended_assets(&self) -> Vec<Asset> {
        self.state.lock().unwrap().assets.clone()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError> {
        let user = User {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            profile_image_url: new_user
                .profile_image_url
                .unwrap_or_else(|| DEFAULT_PROFILE_IMAGE_URL.to_string()),
            created_at: self.clock.now(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("user {user_id}")))
    }

    async fn append_asset(&self, user_id: Uuid, asset: NewAsset) -> Result<Asset, DomainError> {
        let asset = Asset {
            id: Uuid::new_v4(),
            user_id,
            name: asset.name,
            audio_url: asset.audio_url,
            length_seconds: asset.length_seconds,
            word_durations: asset.word_durations,
            content: asset.content,
            translated_from: asset.translated_from,
            translated_to: asset.translated_to,
            target_lang: asset.target_lang,
            created_at: self.clock.now(),
        };
        self.state.lock().unwrap().assets.push(asset.clone());
        Ok(asset)
    }

    async fn assets_for_user(&self, user_id: Uuid) -> Result<Vec<Asset>, DomainError> {
        let state = self.state.lock().unwrap();
        let mut assets: Vec<Asset> = state
            .assets
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        // Most recent first; later insertion wins ties.
        assets.reverse();
        assets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(assets)
    }

    async fn get_asset(&self, user_id: Uuid, asset_id: Uuid) -> Result<Asset, DomainError> {
        let state = self.state.lock().unwrap();
        state
            .assets
            .iter()
            .find(|a| a.id == asset_id && a.user_id == user_id)
            .cloned()
            .ok_or_else(|| DomainError::NotFound(format!("asset {asset_id}")))
    }
}

/// A user repository that always returns an infrastructure error. Useful
/// for testing error-handling paths.
#[derive(Debug)]
pub struct FailingUserRepository;

#[async_trait]
impl UserRepository for FailingUserRepository {
    async fn find_by_email(&self, _email: &str) -> Result<Option<User>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn create_user(&self, _new_user: NewUser) -> Result<User, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get_user(&self, _user_id: Uuid) -> Result<User, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn append_asset(&self, _user_id: Uuid, _asset: NewAsset) -> Result<Asset, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn assets_for_user(&self, _user_id: Uuid) -> Result<Vec<Asset>, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }

    async fn get_asset(&self, _user_id: Uuid, _asset_id: Uuid) -> Result<Asset, DomainError> {
        Err(DomainError::Infrastructure("connection refused".into()))
    }
}
