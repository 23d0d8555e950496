use std::time::Duration;

use serde::{Deserialize, Serialize};

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(default)
}

/// Runtime configuration, environment-first with sensible defaults.
///
/// All variables carry the `TANDEM_` prefix; intervals are in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub daily_question_poll_secs: u64,
    pub chat_poll_secs: u64,
    pub event_poll_secs: u64,
    pub pulse_poll_secs: u64,
    /// How far back a question must not have been scheduled before it can be
    /// drawn again.
    pub recent_question_window_days: u32,
    pub otp_code_length: usize,
    pub otp_ttl_minutes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            daily_question_poll_secs: 300,
            chat_poll_secs: 30,
            event_poll_secs: 60,
            pulse_poll_secs: 30,
            recent_question_window_days: 30,
            otp_code_length: 6,
            otp_ttl_minutes: 10,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("TANDEM_HOST").unwrap_or(defaults.host),
            port: std::env::var("TANDEM_PORT")
                .ok()
                .and_then(|s| s.trim().parse::<u16>().ok())
                .unwrap_or(defaults.port),
            daily_question_poll_secs: env_u64(
                "TANDEM_DAILY_QUESTION_POLL_SECS",
                defaults.daily_question_poll_secs,
            ),
            chat_poll_secs: env_u64("TANDEM_CHAT_POLL_SECS", defaults.chat_poll_secs),
            event_poll_secs: env_u64("TANDEM_EVENT_POLL_SECS", defaults.event_poll_secs),
            pulse_poll_secs: env_u64("TANDEM_PULSE_POLL_SECS", defaults.pulse_poll_secs),
            recent_question_window_days: env_u64(
                "TANDEM_RECENT_QUESTION_WINDOW_DAYS",
                defaults.recent_question_window_days as u64,
            ) as u32,
            otp_code_length: env_u64("TANDEM_OTP_CODE_LENGTH", defaults.otp_code_length as u64)
                as usize,
            otp_ttl_minutes: env_u64("TANDEM_OTP_TTL_MINUTES", defaults.otp_ttl_minutes),
        }
    }

    pub fn daily_question_poll_interval(&self) -> Duration {
        Duration::from_secs(self.daily_question_poll_secs)
    }

    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_secs(self.chat_poll_secs)
    }

    pub fn event_poll_interval(&self) -> Duration {
        Duration::from_secs(self.event_poll_secs)
    }

    pub fn pulse_poll_interval(&self) -> Duration {
        Duration::from_secs(self.pulse_poll_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_reasonable() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.otp_code_length, 6);
        assert_eq!(config.recent_question_window_days, 30);
        assert_eq!(config.chat_poll_interval(), Duration::from_secs(30));
    }
}
