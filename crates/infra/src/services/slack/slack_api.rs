use crate::services::NotificationError;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{error, warn};

const SLACK_API_BASE_URL: &str = "https://slack.com/api";
/// Event type attached as message metadata to every scheduled reminder
pub const REMINDER_EVENT_TYPE: &str = "studysync_reminder";
const MAX_RETRY_AFTER_SECS: u64 = 5;
const BACKOFF_BASE_MILLIS: u64 = 250;

#[derive(Debug, Deserialize)]
pub struct SlackChannel {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SlackScheduledMessage {
    pub id: String,
    pub channel_id: String,
    pub post_at: i64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub metadata: Option<SlackMessageMetadata>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlackMessageMetadata {
    pub event_type: String,
    pub event_payload: Value,
}

impl SlackMessageMetadata {
    pub fn reminder(tag: &str) -> Self {
        Self {
            event_type: REMINDER_EVENT_TYPE.into(),
            event_payload: json!({ "tag": tag }),
        }
    }

    pub fn reminder_tag(&self) -> Option<String> {
        if self.event_type != REMINDER_EVENT_TYPE {
            return None;
        }
        self.event_payload
            .get("tag")
            .and_then(|tag| tag.as_str())
            .map(|tag| tag.to_string())
    }
}

#[derive(Debug, Serialize)]
pub struct ScheduleMessageBody<'a> {
    pub channel: &'a str,
    pub text: &'a str,
    pub post_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SlackMessageMetadata>,
}

/// Thin client over the Slack Web API.
///
/// Every call is retried on network errors and rate limiting, at most
/// `max_retries` times.
pub struct SlackRestApi {
    client: Client,
    bot_token: String,
    max_retries: u32,
}

impl SlackRestApi {
    pub fn new(bot_token: String, timeout: Duration, max_retries: u32) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            bot_token,
            max_retries,
        }
    }

    pub async fn create_conversation(&self, name: &str) -> Result<SlackChannel, NotificationError> {
        let res = self
            .post("conversations.create", &json!({ "name": name }))
            .await;
        match res {
            Ok(body) => parse_field(body, "channel"),
            Err(NotificationError::Api(code)) if code == "name_taken" => self
                .find_conversation_by_name(name)
                .await?
                .ok_or_else(|| NotificationError::NotFound(name.to_string())),
            Err(e) => Err(e),
        }
    }

    async fn find_conversation_by_name(
        &self,
        name: &str,
    ) -> Result<Option<SlackChannel>, NotificationError> {
        let mut cursor = String::new();
        loop {
            let body = self
                .get(
                    "conversations.list",
                    &[
                        ("limit", "200".to_string()),
                        ("exclude_archived", "true".to_string()),
                        ("types", "public_channel,private_channel".to_string()),
                        ("cursor", cursor.clone()),
                    ],
                )
                .await?;
            let next_cursor = next_cursor(&body);
            let channels: Vec<SlackChannel> = parse_field(body, "channels")?;
            if let Some(channel) = channels.into_iter().find(|c| c.name == name) {
                return Ok(Some(channel));
            }
            match next_cursor {
                Some(next) => cursor = next,
                None => return Ok(None),
            }
        }
    }

    pub async fn invite(&self, channel_id: &str, user_id: &str) -> Result<(), NotificationError> {
        let res = self
            .post(
                "conversations.invite",
                &json!({ "channel": channel_id, "users": user_id }),
            )
            .await;
        match res {
            Ok(_) => Ok(()),
            Err(NotificationError::Api(code)) if code == "already_in_channel" => Ok(()),
            Err(NotificationError::Api(code)) if code == "channel_not_found" => {
                Err(NotificationError::NotFound(channel_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn open_conversation(&self, user_id: &str) -> Result<SlackChannel, NotificationError> {
        let body = self
            .post("conversations.open", &json!({ "users": user_id }))
            .await?;
        let channel: Value = parse_field(body, "channel")?;
        let id = channel
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or_else(|| NotificationError::Api("missing_channel_id".into()))?;
        Ok(SlackChannel {
            id: id.to_string(),
            name: String::new(),
        })
    }

    pub async fn schedule_message(
        &self,
        body: &ScheduleMessageBody<'_>,
    ) -> Result<String, NotificationError> {
        let res = self.post("chat.scheduleMessage", body).await?;
        parse_field(res, "scheduled_message_id")
    }

    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), NotificationError> {
        self.post(
            "chat.postMessage",
            &json!({ "channel": channel_id, "text": text }),
        )
        .await
        .map(|_| ())
    }

    pub async fn list_scheduled_messages(
        &self,
    ) -> Result<Vec<SlackScheduledMessage>, NotificationError> {
        let mut messages = Vec::new();
        let mut cursor = String::new();
        loop {
            let body = self
                .post(
                    "chat.scheduledMessages.list",
                    &json!({ "limit": 100, "cursor": cursor }),
                )
                .await?;
            let next_cursor = next_cursor(&body);
            let mut page: Vec<SlackScheduledMessage> = parse_field(body, "scheduled_messages")?;
            messages.append(&mut page);
            match next_cursor {
                Some(next) => cursor = next,
                None => return Ok(messages),
            }
        }
    }

    pub async fn delete_scheduled_message(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<(), NotificationError> {
        let res = self
            .post(
                "chat.deleteScheduledMessage",
                &json!({ "channel": channel_id, "scheduled_message_id": message_id }),
            )
            .await;
        match res {
            Ok(_) => Ok(()),
            Err(NotificationError::Api(code)) if code == "invalid_scheduled_message_id" => {
                Err(NotificationError::NotFound(message_id.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    async fn post(&self, method: &str, body: &impl Serialize) -> Result<Value, NotificationError> {
        let mut attempt = 0;
        loop {
            let res = self
                .client
                .post(&format!("{}/{}", SLACK_API_BASE_URL, method))
                .bearer_auth(&self.bot_token)
                .json(body)
                .send()
                .await;
            match self.handle_response(method, res).await {
                Err(e) if attempt < self.max_retries && is_retryable(method, &e) => {
                    tokio::time::sleep(backoff(&e, attempt)).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }

    async fn get(&self, method: &str, query: &[(&str, String)]) -> Result<Value, NotificationError> {
        let mut attempt = 0;
        loop {
            let res = self
                .client
                .get(&format!("{}/{}", SLACK_API_BASE_URL, method))
                .bearer_auth(&self.bot_token)
                .query(query)
                .send()
                .await;
            match self.handle_response(method, res).await {
                Err(e) if attempt < self.max_retries && is_retryable(method, &e) => {
                    tokio::time::sleep(backoff(&e, attempt)).await;
                    attempt += 1;
                }
                res => return res,
            }
        }
    }

    async fn handle_response(
        &self,
        method: &str,
        res: reqwest::Result<reqwest::Response>,
    ) -> Result<Value, NotificationError> {
        let res = match res {
            Ok(res) => res,
            Err(e) => {
                warn!(
                    "[Network Error] Slack API {} error. Error message: {:?}",
                    method, e
                );
                return Err(NotificationError::Network(e.to_string()));
            }
        };
        if res.status() == StatusCode::TOO_MANY_REQUESTS {
            let retry_after_secs = res
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1);
            warn!(
                "[Rate Limited] Slack API {} asked to retry after {} seconds",
                method, retry_after_secs
            );
            return Err(NotificationError::RateLimited { retry_after_secs });
        }
        let body = res.json::<Value>().await.map_err(|e| {
            error!(
                "[Unexpected Response] Slack API {} error. Error message: {:?}",
                method, e
            );
            NotificationError::Api(e.to_string())
        })?;
        if body.get("ok").and_then(|ok| ok.as_bool()) == Some(true) {
            return Ok(body);
        }
        let code = body
            .get("error")
            .and_then(|e| e.as_str())
            .unwrap_or("unknown_error")
            .to_string();
        Err(NotificationError::Api(code))
    }
}

/// Methods that add a message on every call. A network error can hide a
/// request that Slack already accepted, so these are only retried when rate
/// limited. Reconciliation picks up a message that was lost.
const NON_IDEMPOTENT_METHODS: [&str; 2] = ["chat.scheduleMessage", "chat.postMessage"];

fn is_retryable(method: &str, e: &NotificationError) -> bool {
    match e {
        NotificationError::RateLimited { .. } => true,
        NotificationError::Network(_) => !NON_IDEMPOTENT_METHODS.contains(&method),
        _ => false,
    }
}

fn backoff(e: &NotificationError, attempt: u32) -> Duration {
    match e {
        NotificationError::RateLimited { retry_after_secs } => {
            Duration::from_secs(std::cmp::min(*retry_after_secs, MAX_RETRY_AFTER_SECS))
        }
        _ => Duration::from_millis(BACKOFF_BASE_MILLIS * 2u64.pow(attempt)),
    }
}

fn next_cursor(body: &Value) -> Option<String> {
    body.get("response_metadata")
        .and_then(|m| m.get("next_cursor"))
        .and_then(|c| c.as_str())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
}

fn parse_field<T: for<'de> Deserialize<'de>>(
    mut body: Value,
    field: &str,
) -> Result<T, NotificationError> {
    let value = body
        .get_mut(field)
        .map(Value::take)
        .ok_or_else(|| NotificationError::Api(format!("missing_field_{}", field)))?;
    serde_json::from_value(value).map_err(|e| {
        error!(
            "[Unexpected Response] Slack API field {} could not be parsed. Error message: {:?}",
            field, e
        );
        NotificationError::Api(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reads_reminder_tags_from_metadata() {
        let metadata = SlackMessageMetadata::reminder("calculus:week-before");
        assert_eq!(
            metadata.reminder_tag(),
            Some("calculus:week-before".to_string())
        );

        let other = SlackMessageMetadata {
            event_type: "something_else".into(),
            event_payload: json!({ "tag": "calculus:week-before" }),
        };
        assert_eq!(other.reminder_tag(), None);
    }

    #[test]
    fn it_parses_scheduled_messages() {
        let body = json!({
            "ok": true,
            "scheduled_messages": [
                { "id": "Q1", "channel_id": "D1", "post_at": 1700000000, "date_created": 1, "text": "hi" },
                { "id": "Q2", "channel_id": "D1", "post_at": 1700000001, "date_created": 1 }
            ],
            "response_metadata": { "next_cursor": "" }
        });
        assert_eq!(next_cursor(&body), None);
        let messages: Vec<SlackScheduledMessage> =
            parse_field(body, "scheduled_messages").unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].text, "");
        assert!(messages[0].metadata.is_none());
    }

    #[test]
    fn it_caps_retry_after() {
        assert_eq!(
            backoff(&NotificationError::RateLimited { retry_after_secs: 60 }, 0),
            Duration::from_secs(MAX_RETRY_AFTER_SECS)
        );
        assert_eq!(
            backoff(&NotificationError::Network("reset".into()), 2),
            Duration::from_millis(1000)
        );
        assert!(!is_retryable(
            "chat.scheduledMessages.list",
            &NotificationError::Api("invalid_auth".into())
        ));
    }

    #[test]
    fn it_does_not_resend_messages_after_network_errors() {
        let network = NotificationError::Network("timed out".into());
        let rate_limited = NotificationError::RateLimited { retry_after_secs: 1 };

        assert!(!is_retryable("chat.scheduleMessage", &network));
        assert!(!is_retryable("chat.postMessage", &network));
        assert!(is_retryable("chat.scheduleMessage", &rate_limited));
        assert!(is_retryable("chat.deleteScheduledMessage", &network));
        assert!(is_retryable("chat.scheduledMessages.list", &network));
    }
}
