//! Application services for tandem.
//!
//! The notifier modules each run as an independent periodic task; every tick
//! re-derives its work from the database, so a crashed or skipped tick is
//! caught up on the next one.

pub mod chat_notifier;
pub mod config;
pub mod daily_question_notifier;
pub mod daily_questions;
pub mod event_notifier;
pub mod mailer;
pub mod pulse_notifier;
