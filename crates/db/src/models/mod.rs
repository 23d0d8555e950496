pub mod calendar_event;
pub mod chat_message;
pub mod chat_notification;
pub mod couple;
pub mod daily_question;
pub mod notification;
pub mod profile;
pub mod pulse;
pub mod question;
