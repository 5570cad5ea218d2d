//! User/asset repository abstraction.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DomainError;
use crate::model::{Asset, NewAsset, NewUser, User};

/// Repository trait for user records and their append-only asset history.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by email. Returns `None` when no user has the address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Insert a new user record.
    async fn create_user(&self, new_user: NewUser) -> Result<User, DomainError>;

    /// Load a user by id.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the user does not exist.
    async fn get_user(&self, user_id: Uuid) -> Result<User, DomainError>;

    /// Append an asset to a user's history and return the stored record.
    async fn append_asset(&self, user_id: Uuid, asset: NewAsset) -> Result<Asset, DomainError>;

    /// All assets for a user, most recent first.
    async fn assets_for_user(&self, user_id: Uuid) -> Result<Vec<Asset>, DomainError>;

    /// Load a single asset, scoped to its owning user.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::NotFound` when the asset does not exist or
    /// belongs to a different user.
    async fn get_asset(&self, user_id: Uuid, asset_id: Uuid) -> Result<Asset, DomainError>;
}
