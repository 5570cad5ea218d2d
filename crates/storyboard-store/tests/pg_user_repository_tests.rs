//! Integration tests for `PgUserRepository`.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use storyboard_core::error::DomainError;
use storyboard_core::model::{DEFAULT_PROFILE_IMAGE_URL, NewAsset, NewUser, User, WordDuration};
use storyboard_core::repository::UserRepository;
use storyboard_store::PgUserRepository;
use storyboard_test_support::StepClock;

/// Repository over the test pool. The stepping clock uses whole seconds,
/// so timestamps survive the TIMESTAMPTZ round trip unchanged.
fn repo(pool: PgPool) -> PgUserRepository {
    let clock = Arc::new(StepClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        Duration::seconds(1),
    ));
    PgUserRepository::new(pool, clock)
}

async fn create_user(repo: &PgUserRepository, email: &str) -> User {
    repo.create_user(NewUser {
        first_name: "Jo".to_string(),
        last_name: None,
        email: email.to_string(),
        profile_image_url: None,
    })
    .await
    .unwrap()
}

// --- users ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_find_by_email_returns_created_user(pool: PgPool) {
    let repo = repo(pool);
    let created = create_user(&repo, "jo@example.com").await;

    let found = repo.find_by_email("jo@example.com").await.unwrap().unwrap();

    assert_eq!(found.id, created.id);
    assert_eq!(found.email, "jo@example.com");
    assert_eq!(found.profile_image_url, DEFAULT_PROFILE_IMAGE_URL);
    assert_eq!(found.created_at, created.created_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_find_by_email_returns_none_for_unknown_address(pool: PgPool) {
    let repo = repo(pool);
    create_user(&repo, "jo@example.com").await;

    let found = repo.find_by_email("nobody@example.com").await.unwrap();

    assert!(found.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_user_unknown_id_is_not_found(pool: PgPool) {
    let repo = repo(pool);

    let err = repo.get_user(Uuid::new_v4()).await.unwrap_err();

    assert!(matches!(err, DomainError::NotFound(_)));
}

// --- assets ---

#[sqlx::test(migrations = "../../migrations")]
async fn test_assets_listed_newest_first(pool: PgPool) {
    let repo = repo(pool);
    let user = create_user(&repo, "jo@example.com").await;

    for name in ["first", "second", "third"] {
        repo.append_asset(
            user.id,
            NewAsset {
                name: name.to_string(),
                ..NewAsset::default()
            },
        )
        .await
        .unwrap();
    }

    let assets = repo.assets_for_user(user.id).await.unwrap();

    let names: Vec<&str> = assets.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["third", "second", "first"]);
    assert!(assets.windows(2).all(|w| w[0].created_at > w[1].created_at));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_word_durations_survive_jsonb_round_trip(pool: PgPool) {
    let repo = repo(pool);
    let user = create_user(&repo, "jo@example.com").await;
    let durations = vec![
        WordDuration {
            word: "hola".to_string(),
            start_ms: 0,
            end_ms: 420,
            source_word_index: 0,
            pitch_scale_minimum: -0.4,
            pitch_scale_maximum: 0.4,
        },
        WordDuration {
            word: "mundo".to_string(),
            start_ms: 420,
            end_ms: 900,
            source_word_index: 1,
            ..WordDuration::default()
        },
    ];

    let appended = repo
        .append_asset(
            user.id,
            NewAsset {
                name: "Audio: clip.wav".to_string(),
                audio_url: Some("https://cdn.example.com/out.mp3".to_string()),
                length_seconds: 0.9,
                word_durations: durations.clone(),
                translated_from: Some("hello world".to_string()),
                translated_to: Some("hola mundo".to_string()),
                target_lang: Some("es-ES".to_string()),
                ..NewAsset::default()
            },
        )
        .await
        .unwrap();

    let fetched = repo.get_asset(user.id, appended.id).await.unwrap();

    assert_eq!(fetched.word_durations, durations);
    assert_eq!(fetched.audio_url.as_deref(), Some("https://cdn.example.com/out.mp3"));
    assert_eq!(fetched.translated_to.as_deref(), Some("hola mundo"));
    assert_eq!(fetched.target_lang.as_deref(), Some("es-ES"));
    assert_eq!(fetched.created_at, appended.created_at);
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_get_asset_is_scoped_to_the_owner(pool: PgPool) {
    let repo = repo(pool);
    let owner = create_user(&repo, "owner@example.com").await;
    let other = create_user(&repo, "other@example.com").await;

    let asset = repo
        .append_asset(
            owner.id,
            NewAsset {
                name: "private".to_string(),
                content: Some("story text".to_string()),
                ..NewAsset::default()
            },
        )
        .await
        .unwrap();

    let err = repo.get_asset(other.id, asset.id).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    // The owner still sees it.
    let fetched = repo.get_asset(owner.id, asset.id).await.unwrap();
    assert_eq!(fetched.content.as_deref(), Some("story text"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_assets_for_user_excludes_other_users(pool: PgPool) {
    let repo = repo(pool);
    let a = create_user(&repo, "a@example.com").await;
    let b = create_user(&repo, "b@example.com").await;

    repo.append_asset(
        a.id,
        NewAsset {
            name: "mine".to_string(),
            ..NewAsset::default()
        },
    )
    .await
    .unwrap();

    let assets = repo.assets_for_user(b.id).await.unwrap();

    assert!(assets.is_empty());
}
