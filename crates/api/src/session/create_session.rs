use super::notify_session::notify_session_created;
use crate::error::StudySyncError;
use crate::exam::join_exam_channel;
use crate::shared::{
    auth::protect_route,
    guard::InFlightMutations,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use studysync_api_structs::create_session::*;
use studysync_domain::{Exam, ReminderTarget, StudySession, User};
use studysync_infra::StudySyncContext;
use tracing::{error, info};

pub async fn create_session_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<StudySyncContext>,
    in_flight: web::Data<InFlightMutations>,
) -> Result<HttpResponse, StudySyncError> {
    let user = protect_route(&http_req, &ctx).await?;
    let _permit = in_flight.acquire(&user.id)?;

    let usecase = CreateSessionUseCase {
        user,
        slug: path.into_inner().slug,
        start_ts: body.start_ts,
    };

    execute(usecase, &ctx)
        .await
        .map(|session| HttpResponse::Created().json(APIResponse::new(session)))
        .map_err(StudySyncError::from)
}

/// Creates a `StudySession` for an `Exam` and notifies the exam channel
#[derive(Debug)]
pub struct CreateSessionUseCase {
    pub user: User,
    pub slug: String,
    /// Timestamp in millis
    pub start_ts: i64,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(String),
    StartNotInFuture(i64),
    StorageError,
    /// The session was stored but some notifications failed
    ExternalServiceError(String),
}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(slug) => {
                Self::NotFound(format!("The exam with slug: {}, was not found.", slug))
            }
            UseCaseError::StartNotInFuture(start_ts) => Self::BadClientData(format!(
                "The study session start: {} has to be in the future",
                start_ts
            )),
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::ExternalServiceError(msg) => Self::ExternalServiceError(msg),
        }
    }
}

impl CreateSessionUseCase {
    /// A session with the same start is reused, that makes the request safe
    /// to repeat after a notification failed
    async fn find_or_insert_session(
        &self,
        ctx: &StudySyncContext,
        exam: &Exam,
    ) -> Result<StudySession, UseCaseError> {
        let sessions = &ctx.repos.study_sessions;
        if let Some(session) = sessions.find_by_exam_and_start(&exam.id, self.start_ts).await {
            info!("Reusing study session {} for exam {}", session.id, exam.slug);
            return Ok(session);
        }

        let session = StudySession::new(exam.id.clone(), self.user.id.clone(), self.start_ts);
        match sessions.insert(&session).await {
            Ok(_) => Ok(session),
            // Created by a concurrent request
            Err(e) => sessions
                .find_by_exam_and_start(&exam.id, self.start_ts)
                .await
                .ok_or_else(|| {
                    error!("Unable to store study session. Err: {:?}", e);
                    UseCaseError::StorageError
                }),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateSessionUseCase {
    type Response = StudySession;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateSession";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let mut exam = ctx
            .repos
            .exams
            .find_by_slug(&self.slug)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.slug.clone()))?;

        if self.start_ts <= ctx.sys.get_timestamp_millis() {
            return Err(UseCaseError::StartNotInFuture(self.start_ts));
        }

        let mut session = self.find_or_insert_session(ctx, &exam).await?;

        let channel_id = join_exam_channel(ctx, &mut exam, &self.user)
            .await
            .map_err(|e| UseCaseError::ExternalServiceError(format!("exam channel: {}", e)))?;

        let target = ReminderTarget::Channel(channel_id);
        let notification = notify_session_created(ctx, &target, &exam, &session).await;
        if notification.announced {
            session.announced = true;
            if let Err(e) = ctx.repos.study_sessions.save(&session).await {
                // The next attempt would post the announcement again
                error!("Unable to mark study session {} as announced. Err: {:?}", session.id, e);
            }
        }

        if !notification.failures.is_empty() {
            return Err(UseCaseError::ExternalServiceError(format!(
                "Unable to notify about the study session: {}",
                notification.failures.join(", ")
            )));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use studysync_infra::{InMemoryNotificationChannel, StaticTimeSys};

    const NOW: i64 = 1_750_000_000_000;

    async fn setup() -> (StudySyncContext, Arc<InMemoryNotificationChannel>, User) {
        let channel = Arc::new(InMemoryNotificationChannel::new());
        let mut ctx = StudySyncContext::create_inmemory_with_channel(channel.clone());
        ctx.sys = Arc::new(StaticTimeSys(NOW));
        ctx.repos.exams.insert(&Exam::new("Calculus")).await.unwrap();
        let user = User::new("Ada".into(), "U1".into());
        ctx.repos.users.insert(&user).await.unwrap();
        (ctx, channel, user)
    }

    #[actix_web::test]
    async fn it_creates_session_and_notifies_exam_channel() {
        let (ctx, channel, user) = setup().await;

        let mut usecase = CreateSessionUseCase {
            user,
            slug: "calculus".into(),
            start_ts: NOW + 1000 * 60 * 60,
        };
        let session = usecase.execute(&ctx).await.expect("To create session");

        let exam_channel = channel
            .channel_id_by_name("calculus-exam")
            .expect("Exam channel to be created");
        assert_eq!(channel.scheduled_messages_in(&exam_channel).len(), 2);
        assert_eq!(channel.posted_messages()[0].channel_id, exam_channel);
        assert_eq!(
            ctx.repos.study_sessions.find(&session.id).await,
            Some(session)
        );
    }

    #[actix_web::test]
    async fn it_rejects_sessions_in_the_past() {
        let (ctx, _, user) = setup().await;

        let mut usecase = CreateSessionUseCase {
            user,
            slug: "calculus".into(),
            start_ts: NOW,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::StartNotInFuture(_))
        ));
    }

    #[actix_web::test]
    async fn session_is_kept_when_a_notification_fails() {
        let (ctx, channel, user) = setup().await;
        channel.fail_schedule_containing(Some("starting now"));

        let mut usecase = CreateSessionUseCase {
            user,
            slug: "calculus".into(),
            start_ts: NOW + 1000 * 60 * 60,
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::ExternalServiceError(_))
        ));
        let exam = ctx.repos.exams.find_by_slug("calculus").await.unwrap();
        assert_eq!(ctx.repos.study_sessions.find_by_exam(&exam.id).await.len(), 1);
        assert_eq!(channel.scheduled_messages().len(), 1);
        assert_eq!(channel.posted_messages().len(), 1);
    }

    #[actix_web::test]
    async fn repeating_after_a_failed_notification_completes_it_once() {
        let (ctx, channel, user) = setup().await;
        channel.fail_schedule_containing(Some("starting now"));

        let mut usecase = CreateSessionUseCase {
            user,
            slug: "calculus".into(),
            start_ts: NOW + 1000 * 60 * 60,
        };
        assert!(usecase.execute(&ctx).await.is_err());

        channel.fail_schedule_containing(None);
        let session = usecase.execute(&ctx).await.expect("To complete the session");
        assert!(session.announced);

        let exam = ctx.repos.exams.find_by_slug("calculus").await.unwrap();
        assert_eq!(
            ctx.repos.study_sessions.find_by_exam(&exam.id).await,
            vec![session]
        );
        assert_eq!(channel.scheduled_messages().len(), 2);
        assert_eq!(channel.posted_messages().len(), 1);

        // Once complete, repeating is a no-op
        usecase.execute(&ctx).await.expect("To reuse the session");
        assert_eq!(channel.scheduled_messages().len(), 2);
        assert_eq!(channel.posted_messages().len(), 1);
    }
}
