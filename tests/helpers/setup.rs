use std::sync::Arc;
use studysync_api::Application;
use studysync_infra::{Config, InMemoryNotificationChannel, StudySyncContext};
use studysync_sdk::{CreateUserInput, StudySyncSDK, User};

pub struct TestApp {
    pub config: Config,
    /// Everything the application sent to the chat platform
    pub channel: Arc<InMemoryNotificationChannel>,
    pub address: String,
}

impl TestApp {
    /// Registers a user and returns a client acting on behalf of it
    pub async fn create_user(&self, sdk: &StudySyncSDK, slack_id: &str) -> (User, StudySyncSDK) {
        let user = sdk
            .user
            .create(CreateUserInput {
                name: format!("Student {}", slack_id),
                slack_id: slack_id.into(),
            })
            .await
            .expect("To create user")
            .user;
        let user_sdk = sdk.for_user(&user.id);
        (user, user_sdk)
    }
}

// Launch the application as a background task
pub async fn spawn_app() -> (TestApp, StudySyncSDK) {
    let channel = Arc::new(InMemoryNotificationChannel::new());
    let mut ctx = StudySyncContext::create_inmemory_with_channel(channel.clone());
    ctx.config.port = 0; // Random port
    ctx.config.reminder_timezone = studysync_domain::Tz::UTC;
    ctx.config.reminder_hour = 7;

    let config = ctx.config.clone();
    let application = Application::new(ctx)
        .await
        .expect("Failed to build application.");

    let address = format!("http://localhost:{}/api/v1", application.port());
    let _ = actix_web::rt::spawn(async move {
        application
            .start()
            .await
            .expect("Expected application to start");
    });

    let sdk = StudySyncSDK::new(address.clone(), config.api_secret_key.clone());
    let app = TestApp {
        config,
        channel,
        address,
    };
    (app, sdk)
}
