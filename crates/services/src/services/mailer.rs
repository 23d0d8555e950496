use std::sync::Arc;

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum MailerError {
    #[error("Failed to deliver mail: {0}")]
    Delivery(String),
}

/// Outbound email seam. The default implementation only logs; a real SMTP
/// transport can be swapped in without touching callers.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

/// Simulated delivery: the message is written to the log instead of an SMTP
/// relay.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        info!(to, subject, "Sending email");
        info!("{body}");
        Ok(())
    }
}

/// Generates one-time sign-in codes and mails them out.
///
/// Codes are not persisted: delivery is the simulated part of the flow, and
/// verification happens against whatever the client received.
pub struct OtpService {
    mailer: Arc<dyn Mailer>,
    code_length: usize,
    ttl_minutes: u64,
}

impl OtpService {
    pub fn new(mailer: Arc<dyn Mailer>, code_length: usize, ttl_minutes: u64) -> Self {
        Self {
            mailer,
            code_length,
            ttl_minutes,
        }
    }

    pub fn generate_code(&self) -> String {
        let mut rng = rand::rng();
        (0..self.code_length)
            .map(|_| (b'0' + rng.random_range(0..10u8)) as char)
            .collect()
    }

    /// Generate a fresh code and send it to `email`. The code itself is never
    /// returned to the caller so it can't leak through an API response.
    pub async fn request_code(&self, email: &str) -> Result<(), MailerError> {
        let code = self.generate_code();
        let body = format!(
            "Your one-time sign-in code is {code}. It expires in {} minutes.",
            self.ttl_minutes
        );

        self.mailer
            .send(email, "Your tandem sign-in code", &body)
            .await
    }
}
