use chrono_tz::Tz;
use std::str::FromStr;
use studysync_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Secret that clients have to send in the `x-api-key` header
    pub api_secret_key: String,
    /// Port for the application to run on
    pub port: usize,
    /// Timezone the daily exam reminders are anchored in
    pub reminder_timezone: Tz,
    /// Local hour of the day the exam reminders fire at
    pub reminder_hour: u32,
    /// Timeout in seconds for every call to the notification channel
    pub notification_timeout_secs: u64,
    /// How many times a call to the notification channel is retried on
    /// network errors and rate limiting
    pub notification_max_retries: u32,
    /// How often `ExamDate`s without observers are deleted
    pub orphan_reclaim_interval_secs: u64,
    pub slack_bot_token: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        let api_secret_key = match std::env::var("API_SECRET_KEY") {
            Ok(key) => key,
            Err(_) => {
                info!("Did not find API_SECRET_KEY environment variable. Going to create one.");
                let key = create_random_secret(16);
                info!("Secret api key was generated and set to: {}", key);
                key
            }
        };
        let reminder_hour = parse_env("REMINDER_HOUR", 7u32);
        let reminder_hour = if reminder_hour < 24 {
            reminder_hour
        } else {
            warn!(
                "The given REMINDER_HOUR: {} is not an hour of the day, falling back to 7.",
                reminder_hour
            );
            7
        };
        let slack_bot_token = std::env::var("SLACK_BOT_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        Self {
            api_secret_key,
            port: parse_env("PORT", 5000),
            reminder_timezone: parse_env("REMINDER_TIMEZONE", Tz::UTC),
            reminder_hour,
            notification_timeout_secs: parse_env("NOTIFICATION_TIMEOUT_SECS", 10),
            notification_max_retries: parse_env("NOTIFICATION_MAX_RETRIES", 2),
            orphan_reclaim_interval_secs: parse_env("ORPHAN_RECLAIM_INTERVAL_SECS", 60 * 60),
            slack_bot_token,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_env<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => match value.parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    name, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}
