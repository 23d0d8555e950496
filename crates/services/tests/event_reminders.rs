//! Tests for calendar event reminder windowing and fan-out.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use db::{
    DBService,
    models::{
        calendar_event::{CalendarEvent, CreateCalendarEvent},
        couple::Couple,
        notification::{Notification, NotificationKind},
        profile::{CreateProfile, Profile},
    },
    test_utils::create_test_pool,
};
use services::services::event_notifier::EventNotifier;
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

async fn seed_event(
    pool: &SqlitePool,
    fixture: &Fixture,
    title: &str,
    starts_in_minutes: i64,
    remind_minutes_before: i64,
) -> CalendarEvent {
    CalendarEvent::create(
        pool,
        &CreateCalendarEvent {
            couple_id: fixture.couple.id,
            created_by: fixture.alex.id,
            title: title.to_string(),
            description: None,
            starts_at: Utc::now() + TimeDelta::minutes(starts_in_minutes),
            ends_at: None,
            remind_minutes_before: Some(remind_minutes_before),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn open_reminder_window_notifies_both_partners_once() {
    let (pool, _temp_dir) = create_test_pool().await;
    let fixture = seed_couple(&pool).await;
    let event = seed_event(&pool, &fixture, "Anniversary dinner", 30, 60).await;

    let notifier = EventNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(60));
    notifier.tick().await.unwrap();
    notifier.tick().await.unwrap(); // second pass must not duplicate

    for member in [fixture.alex.id, fixture.sam.id] {
        let feed = Notification::find_for_recipient(&pool, member, false)
            .await
            .unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].kind, NotificationKind::CalendarEvent);
        assert_eq!(feed[0].source_id, event.id);
        assert_eq!(feed[0].title, "Anniversary dinner");
    }
}

#[tokio::test]
async fn closed_window_and_past_events_stay_silent() {
    let (pool, _temp_dir) = create_test_pool().await;
    let fixture = seed_couple(&pool).await;

    // Reminder window opens in four hours
    seed_event(&pool, &fixture, "Far away", 300, 60).await;
    // Already started
    seed_event(&pool, &fixture, "Missed it", -10, 60).await;

    let notifier = EventNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(60));
    notifier.tick().await.unwrap();

    for member in [fixture.alex.id, fixture.sam.id] {
        let feed = Notification::find_for_recipient(&pool, member, false)
            .await
            .unwrap();
        assert!(feed.is_empty());
    }
}

#[tokio::test]
async fn reminder_lead_is_per_event() {
    let (pool, _temp_dir) = create_test_pool().await;
    let fixture = seed_couple(&pool).await;

    // Starts in 90 minutes: a 60-minute lead hasn't opened, a 120-minute one has
    seed_event(&pool, &fixture, "Short lead", 90, 60).await;
    let long_lead = seed_event(&pool, &fixture, "Long lead", 90, 120).await;

    let notifier = EventNotifier::new(DBService { pool: pool.clone() }, Duration::from_secs(60));
    notifier.tick().await.unwrap();

    let feed = Notification::find_for_recipient(&pool, fixture.sam.id, false)
        .await
        .unwrap();
    assert_eq!(feed.len(), 1);
    assert_eq!(feed[0].source_id, long_lead.id);
}
