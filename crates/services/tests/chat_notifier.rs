//! End-to-end tests for the chat notifier: per-message markers, feed entries
//! and the per-day badge aggregate, all idempotent across ticks.

use std::time::Duration;

use chrono::Utc;
use db::{
    DBService,
    models::{
        chat_message::{ChatMessage, CreateChatMessage},
        chat_notification::{ChatNotification, SimpleChatNotification},
        couple::Couple,
        notification::Notification,
        profile::{CreateProfile, Profile},
    },
    test_utils::create_test_pool,
};
use services::services::chat_notifier::ChatNotifier;
use sqlx::SqlitePool;
use uuid::Uuid;

struct Fixture {
    alex: Profile,
    sam: Profile,
    couple: Couple,
}

async fn seed_couple(pool: &SqlitePool) -> Fixture {
    let alex = Profile::create(
        pool,
        &CreateProfile {
            display_name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let sam = Profile::create(
        pool,
        &CreateProfile {
            display_name: "Sam".to_string(),
            email: "sam@example.com".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let couple = Couple::create(pool, alex.id, Uuid::new_v4()).await.unwrap();
    let couple = Couple::join(pool, &couple.invite_code, sam.id).await.unwrap();

    Fixture { alex, sam, couple }
}

async fn send_message(pool: &SqlitePool, fixture: &Fixture, body: &str) -> ChatMessage {
    ChatMessage::create(
        pool,
        &CreateChatMessage {
            couple_id: fixture.couple.id,
            sender_id: fixture.alex.id,
            body: body.to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn messages_produce_markers_feed_entries_and_badge() {
    let (pool, _temp_dir) = create_test_pool().await;
    let fixture = seed_couple(&pool).await;
    send_message(&pool, &fixture, "hey you").await;
    send_message(&pool, &fixture, "lunch later?").await;

    let notifier = ChatNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(30));
    notifier.tick().await.unwrap();

    // Per-message markers for the recipient only
    let markers = ChatNotification::find_for_recipient(&pool, fixture.sam.id)
        .await
        .unwrap();
    assert_eq!(markers.len(), 2);
    assert!(
        ChatNotification::find_for_recipient(&pool, fixture.alex.id)
            .await
            .unwrap()
            .is_empty()
    );

    // Feed entries for the recipient
    let feed = Notification::find_for_recipient(&pool, fixture.sam.id, true)
        .await
        .unwrap();
    assert_eq!(feed.len(), 2);
    assert!(feed.iter().all(|n| n.title == "New message from Alex"));

    // One badge row with the day's count
    let today = Utc::now().date_naive();
    let badges = SimpleChatNotification::find_for_recipient_on(&pool, fixture.sam.id, today)
        .await
        .unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].message_count, 2);
    assert_eq!(badges[0].sender_id, fixture.alex.id);
}

#[tokio::test]
async fn second_tick_changes_nothing() {
    let (pool, _temp_dir) = create_test_pool().await;
    let fixture = seed_couple(&pool).await;
    send_message(&pool, &fixture, "hey you").await;

    let notifier = ChatNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(30));
    notifier.tick().await.unwrap();
    notifier.tick().await.unwrap();

    let markers = ChatNotification::find_for_recipient(&pool, fixture.sam.id)
        .await
        .unwrap();
    assert_eq!(markers.len(), 1);

    let feed = Notification::find_for_recipient(&pool, fixture.sam.id, false)
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);

    let today = Utc::now().date_naive();
    let badges = SimpleChatNotification::find_for_recipient_on(&pool, fixture.sam.id, today)
        .await
        .unwrap();
    assert_eq!(badges[0].message_count, 1);
}

#[tokio::test]
async fn later_messages_fold_into_the_same_badge() {
    let (pool, _temp_dir) = create_test_pool().await;
    let fixture = seed_couple(&pool).await;
    send_message(&pool, &fixture, "first").await;

    let notifier = ChatNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(30));
    notifier.tick().await.unwrap();

    send_message(&pool, &fixture, "second").await;
    send_message(&pool, &fixture, "third").await;
    notifier.tick().await.unwrap();

    let today = Utc::now().date_naive();
    let badges = SimpleChatNotification::find_for_recipient_on(&pool, fixture.sam.id, today)
        .await
        .unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0].message_count, 3);
}

#[tokio::test]
async fn pending_couples_are_skipped() {
    let (pool, _temp_dir) = create_test_pool().await;
    let alex = Profile::create(
        &pool,
        &CreateProfile {
            display_name: "Alex".to_string(),
            email: "alex@example.com".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let couple = Couple::create(&pool, alex.id, Uuid::new_v4()).await.unwrap();

    // A message in a couple with nobody on the other side
    ChatMessage::create(
        &pool,
        &CreateChatMessage {
            couple_id: couple.id,
            sender_id: alex.id,
            body: "anyone there?".to_string(),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let notifier = ChatNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(30));
    notifier.tick().await.unwrap();

    let feed = Notification::find_for_recipient(&pool, alex.id, false)
        .await
        .unwrap();
    assert!(feed.is_empty());
}
