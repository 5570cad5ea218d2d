//! `PostgreSQL` implementation of the `UserRepository` trait.
//!
//! Assets live in their own table keyed by `user_id`. Appending an asset is
//! a single insert, so concurrent requests for the same user never race on
//! a shared document.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use storyboard_core::clock::Clock;
use storyboard_core::error::DomainError;
use storyboard_core::model::{
    Asset, DEFAULT_PROFILE_IMAGE_URL, NewAsset, NewUser, User, WordDuration,
};
use storyboard_core::repository::UserRepository;

const USER_COLUMNS: &str = "id, first_name, last_name, email, profile_image_url, created_at";
const ASSET_COLUMNS: &str = "id, user_id, name, audio_url, length_seconds, word_durations, \
     content, translated_from, translated_to, target_lang, created_at";

/// PostgreSQL-backed user repository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgUserRepository {
    /// Creates a new `PgUserRepository`. The clock stamps `created_at` on
    /// inserts.
    #[must_use]
    pub fn new(pool: PgPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(user_from_row).transpose()
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

        sqlx::query(
            "INSERT INTO users (id, first_name, last_name, email, profile_image_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.profile_image_url)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(user)
    }

    async fn get_user(&self, user_id: Uuid) -> Result<User, DomainError> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match row {
            Some(row) => user_from_row(&row),
            None => Err(DomainError::NotFound(format!("user {user_id}"))),
        }
    }

    async fn append_asset(&self, user_id: Uuid, asset: NewAsset) -> Result<Asset, DomainError> {
        let word_durations = serde_json::to_value(&asset.word_durations)
            .map_err(|err| DomainError::Infrastructure(err.to_string()))?;
        let created_at: DateTime<Utc> = self.clock.now();
        let id = Uuid::new_v4();

        sqlx::query(
            "INSERT INTO assets (id, user_id, name, audio_url, length_seconds, word_durations, \
             content, translated_from, translated_to, target_lang, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(id)
        .bind(user_id)
        .bind(&asset.name)
        .bind(&asset.audio_url)
        .bind(asset.length_seconds)
        .bind(&word_durations)
        .bind(&asset.content)
        .bind(&asset.translated_from)
        .bind(&asset.translated_to)
        .bind(&asset.target_lang)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(Asset {
            id,
            user_id,
            name: asset.name,
            audio_url: asset.audio_url,
            length_seconds: asset.length_seconds,
            word_durations: asset.word_durations,
            content: asset.content,
            translated_from: asset.translated_from,
            translated_to: asset.translated_to,
            target_lang: asset.target_lang,
            created_at,
        })
    }

    async fn assets_for_user(&self, user_id: Uuid) -> Result<Vec<Asset>, DomainError> {
        let rows = sqlx::query(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(asset_from_row).collect()
    }

    async fn get_asset(&self, user_id: Uuid, asset_id: Uuid) -> Result<Asset, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 AND user_id = $2"
        ))
        .bind(asset_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => asset_from_row(&row),
            None => Err(DomainError::NotFound(format!("asset {asset_id}"))),
        }
    }
}

fn db_err(err: sqlx::Error) -> DomainError {
    tracing::error!(error = %err, "database query failed");
    DomainError::Infrastructure(err.to_string())
}

fn user_from_row(row: &PgRow) -> Result<User, DomainError> {
    Ok(User {
        id: row.try_get("id").map_err(db_err)?,
        first_name: row.try_get("first_name").map_err(db_err)?,
        last_name: row.try_get("last_name").map_err(db_err)?,
        email: row.try_get("email").map_err(db_err)?,
        profile_image_url: row.try_get("profile_image_url").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn asset_from_row(row: &PgRow) -> Result<Asset, DomainError> {
    let word_durations: serde_json::Value = row.try_get("word_durations").map_err(db_err)?;
    let word_durations: Vec<WordDuration> = serde_json::from_value(word_durations)
        .map_err(|err| DomainError::Infrastructure(format!("decoding word durations: {err}")))?;

    Ok(Asset {
        id: row.try_get("id").map_err(db_err)?,
        user_id: row.try_get("user_id").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        audio_url: row.try_get("audio_url").map_err(db_err)?,
        length_seconds: row.try_get("length_seconds").map_err(db_err)?,
        word_durations,
        content: row.try_get("content").map_err(db_err)?,
        translated_from: row.try_get("translated_from").map_err(db_err)?,
        translated_to: row.try_get("translated_to").map_err(db_err)?,
        target_lang: row.try_get("target_lang").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}
