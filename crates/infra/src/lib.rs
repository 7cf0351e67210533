mod config;
mod repos;
mod services;
mod system;

pub use config::Config;
use repos::Repos;
pub use services::*;
use std::sync::Arc;
use std::time::Duration;
pub use system::{ISys, RealSys, StaticTimeSys};
use tracing::info;

#[derive(Clone)]
pub struct StudySyncContext {
    pub repos: Repos,
    pub config: Config,
    pub sys: Arc<dyn ISys>,
    pub notifications: Arc<dyn INotificationChannel>,
}

struct ContextParams {
    pub postgres_connection_string: Option<String>,
}

impl StudySyncContext {
    async fn create(params: ContextParams) -> anyhow::Result<Self> {
        let config = Config::new();
        let repos = match &params.postgres_connection_string {
            Some(connection_string) => Repos::create_postgres(connection_string).await?,
            None => {
                info!("DATABASE_URL is not set. Using the in-memory store.");
                Repos::create_inmemory()
            }
        };
        let notifications: Arc<dyn INotificationChannel> = match &config.slack_bot_token {
            Some(token) => Arc::new(SlackNotificationChannel::new(
                token.clone(),
                Duration::from_secs(config.notification_timeout_secs),
                config.notification_max_retries,
            )),
            None => {
                info!("SLACK_BOT_TOKEN is not set. Notifications are kept in memory.");
                Arc::new(InMemoryNotificationChannel::new())
            }
        };

        Ok(Self {
            repos,
            config,
            sys: Arc::new(RealSys {}),
            notifications,
        })
    }

    pub fn create_inmemory() -> Self {
        Self::create_inmemory_with_channel(Arc::new(InMemoryNotificationChannel::new()))
    }

    /// In-memory context where the caller keeps a handle to the notification
    /// channel to inspect what was sent
    pub fn create_inmemory_with_channel(channel: Arc<InMemoryNotificationChannel>) -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
            sys: Arc::new(RealSys {}),
            notifications: channel,
        }
    }
}

/// Will setup the infrastructure context given the environment
pub async fn setup_context() -> anyhow::Result<StudySyncContext> {
    StudySyncContext::create(ContextParams {
        postgres_connection_string: std::env::var("DATABASE_URL").ok(),
    })
    .await
}
