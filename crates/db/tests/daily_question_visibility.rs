//! Integration tests for daily question scheduling and visibility.
//!
//! A row with `couple_id` NULL is the global question for that date and is
//! visible to every couple; a couple-specific row shadows it for that couple
//! only.

use std::str::FromStr;

use chrono::NaiveDate;
use db::models::{
    couple::Couple,
    daily_question::DailyQuestion,
    profile::{CreateProfile, Profile},
    question::{CreateQuestion, Question},
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

async fn create_test_question(pool: &SqlitePool, prompt: &str) -> Question {
    let data = CreateQuestion {
        prompt: prompt.to_string(),
        category: None,
    };
    Question::create(pool, &data, Uuid::new_v4())
        .await
        .expect("Failed to create question")
}

async fn create_paired_couple(pool: &SqlitePool, tag: &str) -> Couple {
    let a = Profile::create(
        pool,
        &CreateProfile {
            display_name: format!("{tag}-a"),
            email: format!("{tag}-a@example.com"),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let b = Profile::create(
        pool,
        &CreateProfile {
            display_name: format!("{tag}-b"),
            email: format!("{tag}-b@example.com"),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let couple = Couple::create(pool, a.id, Uuid::new_v4()).await.unwrap();
    Couple::join(pool, &couple.invite_code, b.id).await.unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::from_str(s).unwrap()
}

#[tokio::test]
async fn global_question_is_visible_to_all_couples() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let question = create_test_question(&pool, "What made you smile today?").await;
    let couple_one = create_paired_couple(&pool, "one").await;
    let couple_two = create_paired_couple(&pool, "two").await;
    let today = date("2026-08-06");

    let created =
        DailyQuestion::insert_if_absent(&pool, Uuid::new_v4(), question.id, None, today)
            .await
            .unwrap();
    assert!(created);

    for couple in [&couple_one, &couple_two] {
        let resolved = DailyQuestion::resolve_for_couple_on(&pool, couple.id, today)
            .await
            .unwrap()
            .expect("Global question should be visible");
        assert_eq!(resolved.question_id, question.id);
        assert!(resolved.couple_id.is_none());
    }
}

#[tokio::test]
async fn couple_specific_question_shadows_global() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let global_q = create_test_question(&pool, "What made you smile today?").await;
    let couple_q = create_test_question(&pool, "Where should we travel next?").await;
    let couple_one = create_paired_couple(&pool, "one").await;
    let couple_two = create_paired_couple(&pool, "two").await;
    let today = date("2026-08-06");

    DailyQuestion::insert_if_absent(&pool, Uuid::new_v4(), global_q.id, None, today)
        .await
        .unwrap();
    DailyQuestion::insert_if_absent(
        &pool,
        Uuid::new_v4(),
        couple_q.id,
        Some(couple_one.id),
        today,
    )
    .await
    .unwrap();

    let one = DailyQuestion::resolve_for_couple_on(&pool, couple_one.id, today)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(one.question_id, couple_q.id);
    assert_eq!(one.couple_id, Some(couple_one.id));

    // The other couple still sees the global question
    let two = DailyQuestion::resolve_for_couple_on(&pool, couple_two.id, today)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(two.question_id, global_q.id);
}

#[tokio::test]
async fn one_global_slot_per_day() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let q1 = create_test_question(&pool, "First").await;
    let q2 = create_test_question(&pool, "Second").await;
    let today = date("2026-08-06");

    let first = DailyQuestion::insert_if_absent(&pool, Uuid::new_v4(), q1.id, None, today)
        .await
        .unwrap();
    let second = DailyQuestion::insert_if_absent(&pool, Uuid::new_v4(), q2.id, None, today)
        .await
        .unwrap();

    assert!(first);
    assert!(!second, "Second global insert for the same day must be a no-op");

    let scheduled = DailyQuestion::find_on_date(&pool, today).await.unwrap();
    assert_eq!(scheduled.len(), 1);
    assert_eq!(scheduled[0].question_id, q1.id);
}

#[tokio::test]
async fn recent_questions_are_excluded_from_random_pick() {
    let (pool, _temp_dir) = setup_test_pool().await;
    let used = create_test_question(&pool, "Used recently").await;
    let fresh = create_test_question(&pool, "Never used").await;

    DailyQuestion::insert_if_absent(&pool, Uuid::new_v4(), used.id, None, date("2026-08-01"))
        .await
        .unwrap();

    // With the window covering the used date, only the fresh question remains
    let picked = Question::pick_random_excluding_recent(&pool, None, date("2026-07-20"))
        .await
        .unwrap()
        .expect("A question should remain");
    assert_eq!(picked.id, fresh.id);

    // Exhausting the bank returns None
    DailyQuestion::insert_if_absent(&pool, Uuid::new_v4(), fresh.id, None, date("2026-08-02"))
        .await
        .unwrap();
    let picked = Question::pick_random_excluding_recent(&pool, None, date("2026-07-20"))
        .await
        .unwrap();
    assert!(picked.is_none());
}
