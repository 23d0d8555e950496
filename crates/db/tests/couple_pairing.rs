//! Integration tests for couple creation and invite-code pairing.

use std::str::FromStr;

use db::models::{
    couple::{Couple, CoupleError},
    profile::{CreateProfile, Profile},
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode},
};
use tempfile::TempDir;
use uuid::Uuid;

async fn setup_test_pool() -> (SqlitePool, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");

    let options =
        SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path.to_string_lossy()))
            .expect("Invalid database URL")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePool::connect_with(options)
        .await
        .expect("Failed to create pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    (pool, temp_dir)
}

async fn create_test_profile(pool: &SqlitePool, name: &str, email: &str) -> Profile {
    let data = CreateProfile {
        display_name: name.to_string(),
        email: email.to_string(),
    };
    Profile::create(pool, &data, Uuid::new_v4())
        .await
        .expect("Failed to create test profile")
}

#[tokio::test]
async fn join_by_invite_code_pairs_both_profiles() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let alex = create_test_profile(&pool, "Alex", "alex@example.com").await;
    let sam = create_test_profile(&pool, "Sam", "sam@example.com").await;

    let couple = Couple::create(&pool, alex.id, Uuid::new_v4())
        .await
        .expect("Failed to create couple");
    assert!(couple.partner_id.is_none());

    let joined = Couple::join(&pool, &couple.invite_code, sam.id)
        .await
        .expect("Join should succeed");

    assert_eq!(joined.id, couple.id);
    assert_eq!(joined.partner_id, Some(sam.id));
    assert_eq!(joined.partner_of(alex.id), Some(sam.id));
    assert_eq!(joined.partner_of(sam.id), Some(alex.id));

    // Both sides resolve to the same couple
    let for_alex = Couple::find_for_profile(&pool, alex.id)
        .await
        .unwrap()
        .expect("Alex should have a couple");
    let for_sam = Couple::find_for_profile(&pool, sam.id)
        .await
        .unwrap()
        .expect("Sam should have a couple");
    assert_eq!(for_alex.id, for_sam.id);
}

#[tokio::test]
async fn invalid_invite_code_is_rejected() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let sam = create_test_profile(&pool, "Sam", "sam@example.com").await;

    let result = Couple::join(&pool, "NOPE1234", sam.id).await;
    assert!(matches!(result, Err(CoupleError::InviteCodeInvalid)));
}

#[tokio::test]
async fn creator_cannot_join_own_couple() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let alex = create_test_profile(&pool, "Alex", "alex@example.com").await;

    let couple = Couple::create(&pool, alex.id, Uuid::new_v4()).await.unwrap();
    let result = Couple::join(&pool, &couple.invite_code, alex.id).await;
    assert!(matches!(result, Err(CoupleError::AlreadyPaired)));
}

#[tokio::test]
async fn full_couple_rejects_a_third_partner() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let alex = create_test_profile(&pool, "Alex", "alex@example.com").await;
    let sam = create_test_profile(&pool, "Sam", "sam@example.com").await;
    let riley = create_test_profile(&pool, "Riley", "riley@example.com").await;

    let couple = Couple::create(&pool, alex.id, Uuid::new_v4()).await.unwrap();
    Couple::join(&pool, &couple.invite_code, sam.id).await.unwrap();

    let result = Couple::join(&pool, &couple.invite_code, riley.id).await;
    assert!(matches!(result, Err(CoupleError::InviteCodeInvalid)));
}

#[tokio::test]
async fn paired_profile_cannot_create_another_couple() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let alex = create_test_profile(&pool, "Alex", "alex@example.com").await;
    let sam = create_test_profile(&pool, "Sam", "sam@example.com").await;

    let couple = Couple::create(&pool, alex.id, Uuid::new_v4()).await.unwrap();
    Couple::join(&pool, &couple.invite_code, sam.id).await.unwrap();

    let result = Couple::create(&pool, sam.id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(CoupleError::AlreadyPaired)));

    let result = Couple::create(&pool, alex.id, Uuid::new_v4()).await;
    assert!(matches!(result, Err(CoupleError::AlreadyPaired)));
}

#[tokio::test]
async fn find_all_paired_skips_pending_couples() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let alex = create_test_profile(&pool, "Alex", "alex@example.com").await;
    let sam = create_test_profile(&pool, "Sam", "sam@example.com").await;
    let riley = create_test_profile(&pool, "Riley", "riley@example.com").await;

    let couple = Couple::create(&pool, alex.id, Uuid::new_v4()).await.unwrap();
    Couple::join(&pool, &couple.invite_code, sam.id).await.unwrap();

    // Riley's couple stays pending
    Couple::create(&pool, riley.id, Uuid::new_v4()).await.unwrap();

    let paired = Couple::find_all_paired(&pool).await.unwrap();
    assert_eq!(paired.len(), 1);
    assert_eq!(paired[0].id, couple.id);
}
