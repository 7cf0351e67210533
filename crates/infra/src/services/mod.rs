mod inmemory_notifications;
mod slack;

pub use inmemory_notifications::{InMemoryNotificationChannel, PostedMessage};
pub use slack::SlackNotificationChannel;
use thiserror::Error;

/// A message waiting in the queue of the notification channel
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledMessage {
    pub id: String,
    pub channel_id: String,
    pub text: String,
    /// Timestamp in seconds
    pub post_at: i64,
    /// The tag given when scheduling the message, if the channel returns it
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleMessageRequest {
    pub channel_id: String,
    pub text: String,
    /// Timestamp in seconds
    pub post_at: i64,
    pub tag: Option<String>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    #[error("Unable to reach the notification service. Error message: `{0}`")]
    Network(String),
    #[error("Rate limited by the notification service, retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },
    #[error("Not found in the notification service: `{0}`")]
    NotFound(String),
    #[error("The notification service responded with an error: `{0}`")]
    Api(String),
}

/// The chat platform that members are notified through.
///
/// It has no transactions and no idempotency keys, callers reconcile
/// against `list_scheduled_messages` instead.
#[async_trait::async_trait]
pub trait INotificationChannel: Send + Sync {
    /// Creates the channel or returns the id of the existing one with the same name
    async fn create_channel(&self, name: &str) -> Result<String, NotificationError>;
    /// Succeeds if the user already is in the channel
    async fn invite_user(&self, channel_id: &str, user_slack_id: &str)
        -> Result<(), NotificationError>;
    /// Returns the channel id of the direct conversation with a user
    async fn open_direct_message(&self, user_slack_id: &str) -> Result<String, NotificationError>;
    async fn schedule_message(
        &self,
        request: &ScheduleMessageRequest,
    ) -> Result<String, NotificationError>;
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), NotificationError>;
    /// Every pending scheduled message, across all channels
    async fn list_scheduled_messages(&self) -> Result<Vec<ScheduledMessage>, NotificationError>;
    async fn cancel_scheduled_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), NotificationError>;
}
