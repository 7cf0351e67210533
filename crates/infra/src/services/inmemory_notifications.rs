use super::{INotificationChannel, NotificationError, ScheduleMessageRequest, ScheduledMessage};
use std::sync::Mutex;
use studysync_utils::create_random_secret;

#[derive(Debug, Clone, PartialEq)]
pub struct PostedMessage {
    pub channel_id: String,
    pub text: String,
}

#[derive(Debug, Default)]
struct State {
    /// (channel id, channel name)
    channels: Vec<(String, String)>,
    /// (channel id, user slack id)
    channel_members: Vec<(String, String)>,
    scheduled: Vec<ScheduledMessage>,
    posted: Vec<PostedMessage>,
    fail_schedule_containing: Option<String>,
    fail_cancels: bool,
    drop_tags: bool,
}

/// Notification channel that keeps everything in memory.
///
/// Used when no chat platform is configured and in tests, where
/// failures can be injected.
#[derive(Debug, Default)]
pub struct InMemoryNotificationChannel {
    state: Mutex<State>,
}

impl InMemoryNotificationChannel {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn scheduled_messages(&self) -> Vec<ScheduledMessage> {
        self.state.lock().unwrap().scheduled.clone()
    }

    pub fn scheduled_messages_in(&self, channel_id: &str) -> Vec<ScheduledMessage> {
        self.scheduled_messages()
            .into_iter()
            .filter(|m| m.channel_id == channel_id)
            .collect()
    }

    pub fn posted_messages(&self) -> Vec<PostedMessage> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn channel_members(&self, channel_id: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .channel_members
            .iter()
            .filter(|(c, _)| c == channel_id)
            .map(|(_, user)| user.clone())
            .collect()
    }

    pub fn channel_id_by_name(&self, name: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .channels
            .iter()
            .find(|(_, n)| n == name)
            .map(|(id, _)| id.clone())
    }

    /// Scheduling a message whose text contains `pattern` fails
    pub fn fail_schedule_containing(&self, pattern: Option<&str>) {
        self.state.lock().unwrap().fail_schedule_containing = pattern.map(|p| p.to_string());
    }

    pub fn fail_cancels(&self, fail: bool) {
        self.state.lock().unwrap().fail_cancels = fail;
    }

    /// Stops returning tags when listing, like a channel without message metadata
    pub fn drop_tags(&self, drop: bool) {
        self.state.lock().unwrap().drop_tags = drop;
    }
}

#[async_trait::async_trait]
impl INotificationChannel for InMemoryNotificationChannel {
    async fn create_channel(&self, name: &str) -> Result<String, NotificationError> {
        let mut state = self.state.lock().unwrap();
        if let Some((id, _)) = state.channels.iter().find(|(_, n)| n == name) {
            return Ok(id.clone());
        }
        let id = format!("C{}", create_random_secret(10).to_uppercase());
        state.channels.push((id.clone(), name.to_string()));
        Ok(id)
    }

    async fn invite_user(
        &self,
        channel_id: &str,
        user_slack_id: &str,
    ) -> Result<(), NotificationError> {
        let mut state = self.state.lock().unwrap();
        if !state.channels.iter().any(|(id, _)| id == channel_id) {
            return Err(NotificationError::NotFound(channel_id.to_string()));
        }
        let member = (channel_id.to_string(), user_slack_id.to_string());
        if !state.channel_members.contains(&member) {
            state.channel_members.push(member);
        }
        Ok(())
    }

    async fn open_direct_message(&self, user_slack_id: &str) -> Result<String, NotificationError> {
        Ok(format!("D{}", user_slack_id))
    }

    async fn schedule_message(
        &self,
        request: &ScheduleMessageRequest,
    ) -> Result<String, NotificationError> {
        let mut state = self.state.lock().unwrap();
        if let Some(pattern) = &state.fail_schedule_containing {
            if request.text.contains(pattern.as_str()) {
                return Err(NotificationError::Api("invalid_channel".into()));
            }
        }
        let id = format!("Q{}", create_random_secret(10).to_uppercase());
        state.scheduled.push(ScheduledMessage {
            id: id.clone(),
            channel_id: request.channel_id.clone(),
            text: request.text.clone(),
            post_at: request.post_at,
            tag: request.tag.clone(),
        });
        Ok(id)
    }

    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), NotificationError> {
        self.state.lock().unwrap().posted.push(PostedMessage {
            channel_id: channel_id.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn list_scheduled_messages(&self) -> Result<Vec<ScheduledMessage>, NotificationError> {
        let state = self.state.lock().unwrap();
        let drop_tags = state.drop_tags;
        Ok(state
            .scheduled
            .iter()
            .cloned()
            .map(|mut m| {
                if drop_tags {
                    m.tag = None;
                }
                m
            })
            .collect())
    }

    async fn cancel_scheduled_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), NotificationError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_cancels {
            return Err(NotificationError::Network("connection reset".into()));
        }
        let before = state.scheduled.len();
        state
            .scheduled
            .retain(|m| !(m.id == message_id && m.channel_id == channel_id));
        if state.scheduled.len() == before {
            return Err(NotificationError::NotFound(message_id.to_string()));
        }
        Ok(())
    }
}
