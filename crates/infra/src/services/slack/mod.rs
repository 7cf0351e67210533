mod slack_api;

use super::{INotificationChannel, NotificationError, ScheduleMessageRequest, ScheduledMessage};
use slack_api::{ScheduleMessageBody, SlackMessageMetadata, SlackRestApi};
use std::time::Duration;

/// Notifies members through a Slack workspace using a bot token
pub struct SlackNotificationChannel {
    api: SlackRestApi,
}

impl SlackNotificationChannel {
    pub fn new(bot_token: String, timeout: Duration, max_retries: u32) -> Self {
        Self {
            api: SlackRestApi::new(bot_token, timeout, max_retries),
        }
    }
}

#[async_trait::async_trait]
impl INotificationChannel for SlackNotificationChannel {
    async fn create_channel(&self, name: &str) -> Result<String, NotificationError> {
        self.api.create_conversation(name).await.map(|c| c.id)
    }

    async fn invite_user(
        &self,
        channel_id: &str,
        user_slack_id: &str,
    ) -> Result<(), NotificationError> {
        self.api.invite(channel_id, user_slack_id).await
    }

    async fn open_direct_message(&self, user_slack_id: &str) -> Result<String, NotificationError> {
        self.api.open_conversation(user_slack_id).await.map(|c| c.id)
    }

    async fn schedule_message(
        &self,
        request: &ScheduleMessageRequest,
    ) -> Result<String, NotificationError> {
        let body = ScheduleMessageBody {
            channel: &request.channel_id,
            text: &request.text,
            post_at: request.post_at,
            metadata: request.tag.as_deref().map(SlackMessageMetadata::reminder),
        };
        self.api.schedule_message(&body).await
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), NotificationError> {
        self.api.post_message(channel_id, text).await
    }

    async fn list_scheduled_messages(&self) -> Result<Vec<ScheduledMessage>, NotificationError> {
        let messages = self.api.list_scheduled_messages().await?;
        Ok(messages
            .into_iter()
            .map(|m| ScheduledMessage {
                tag: m.metadata.as_ref().and_then(|m| m.reminder_tag()),
                id: m.id,
                channel_id: m.channel_id,
                text: m.text,
                post_at: m.post_at,
            })
            .collect())
    }

    async fn cancel_scheduled_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), NotificationError> {
        self.api.delete_scheduled_message(channel_id, message_id).await
    }
}
