use super::exam_channel::join_exam_channel;
use super::sync_exam_reminders::{self, ReminderSyncReport, SyncExamRemindersUseCase};
use crate::error::StudySyncError;
use crate::shared::usecase::execute;
use chrono::NaiveDate;
use studysync_domain::{plan_date_change, DateChange, DateChangeKind, Exam, ExamDate, User};
use studysync_infra::StudySyncContext;
use tracing::{error, info, warn};

#[derive(Debug)]
pub struct MembershipChange {
    pub exam: Exam,
    pub exam_date: ExamDate,
    pub kind: DateChangeKind,
    pub reminders: ReminderSyncReport,
}

#[derive(Debug)]
pub enum MembershipError {
    StorageError,
    /// The store was updated but the notification channel failed
    ExternalServiceError(String),
}

impl From<MembershipError> for StudySyncError {
    fn from(e: MembershipError) -> Self {
        match e {
            MembershipError::StorageError => Self::InternalError,
            MembershipError::ExternalServiceError(msg) => Self::ExternalServiceError(msg),
        }
    }
}

async fn apply_date_change(
    ctx: &StudySyncContext,
    user: &User,
    exam: &Exam,
    desired: NaiveDate,
) -> Result<DateChange, MembershipError> {
    let mut retried = false;
    loop {
        let dates = ctx
            .repos
            .exam_dates
            .find_by_exam(&exam.id)
            .await
            .map_err(|e| {
                error!("Unable to fetch dates of exam {}. Err: {:?}", exam.slug, e);
                MembershipError::StorageError
            })?;
        let change = plan_date_change(&exam.id, &dates, &user.id, desired);
        if change.kind == DateChangeKind::Unchanged {
            return Ok(change);
        }
        match ctx.repos.exam_dates.apply(&change.writes).await {
            Ok(_) => return Ok(change),
            // Another user changed the dates of the exam since they were read
            Err(e) if !retried => {
                warn!(
                    "Date change for user {} on exam {} failed, planning again. Err: {:?}",
                    user.id, exam.slug, e
                );
                retried = true;
            }
            Err(e) => {
                error!(
                    "Unable to apply date change for user {} on exam {}. Err: {:?}",
                    user.id, exam.slug, e
                );
                return Err(MembershipError::StorageError);
            }
        }
    }
}

/// Sets the date `user` observes for `exam` to `desired`, joining the `Exam`
/// if needed, and brings the exam channel and the reminders of `user` in
/// line with it.
///
/// Store writes are kept when the notification channel fails afterwards,
/// calling this again with the same date heals it.
pub async fn join_or_move_user(
    ctx: &StudySyncContext,
    user: &User,
    mut exam: Exam,
    desired: NaiveDate,
) -> Result<MembershipChange, MembershipError> {
    let change = apply_date_change(ctx, user, &exam, desired).await?;
    info!(
        "User {} now observes {} for exam {} ({:?})",
        user.id, desired, exam.slug, change.kind
    );

    let mut failures = Vec::new();
    if let Err(e) = join_exam_channel(ctx, &mut exam, user).await {
        failures.push(format!("exam channel: {}", e));
    }

    let sync_reminders = SyncExamRemindersUseCase {
        user,
        exam: &exam,
        date: desired,
    };
    let reminders = match execute(sync_reminders, ctx).await {
        Ok(report) => report,
        Err(sync_exam_reminders::UseCaseError::ExternalServiceError(msg)) => {
            failures.push(msg);
            ReminderSyncReport::default()
        }
    };

    if !failures.is_empty() {
        return Err(MembershipError::ExternalServiceError(failures.join("; ")));
    }

    Ok(MembershipChange {
        exam,
        exam_date: change.exam_date,
        kind: change.kind,
        reminders,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use studysync_infra::InMemoryNotificationChannel;

    struct TestContext {
        ctx: StudySyncContext,
        channel: Arc<InMemoryNotificationChannel>,
        exam: Exam,
    }

    async fn setup() -> TestContext {
        let channel = Arc::new(InMemoryNotificationChannel::new());
        let ctx = StudySyncContext::create_inmemory_with_channel(channel.clone());
        let exam = Exam::new("Calculus");
        ctx.repos.exams.insert(&exam).await.unwrap();
        TestContext { ctx, channel, exam }
    }

    async fn user(ctx: &StudySyncContext, slack_id: &str) -> User {
        let user = User::new(slack_id.into(), slack_id.into());
        ctx.repos.users.insert(&user).await.unwrap();
        user
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 6, day).unwrap()
    }

    #[actix_web::test]
    async fn shared_dates_are_never_moved_under_other_users() {
        let TestContext { ctx, exam, .. } = setup().await;
        let ada = user(&ctx, "U1").await;
        let grace = user(&ctx, "U2").await;

        join_or_move_user(&ctx, &ada, exam.clone(), date(10))
            .await
            .unwrap();
        let joined = join_or_move_user(&ctx, &grace, exam.clone(), date(10))
            .await
            .unwrap();
        assert_eq!(joined.kind, DateChangeKind::Joined);

        let forked = join_or_move_user(&ctx, &ada, exam.clone(), date(15))
            .await
            .unwrap();
        assert_eq!(forked.kind, DateChangeKind::Forked);

        let grace_date = ctx
            .repos
            .exam_dates
            .find_by_exam_and_user(&exam.id, &grace.id)
            .await
            .unwrap();
        assert_eq!(grace_date.date, date(10));
        assert_eq!(grace_date.id, joined.exam_date.id);

        let dates = ctx.repos.exam_dates.find_by_exam(&exam.id).await.unwrap();
        assert_eq!(dates.len(), 2);
        assert!(dates.iter().all(|d| !d.user_ids.is_empty()));
    }

    #[actix_web::test]
    async fn sole_observer_moves_date_in_place() {
        let TestContext { ctx, exam, channel } = setup().await;
        let ada = user(&ctx, "U1").await;

        let created = join_or_move_user(&ctx, &ada, exam.clone(), date(10))
            .await
            .unwrap();
        let moved = join_or_move_user(&ctx, &ada, exam.clone(), date(20))
            .await
            .unwrap();
        assert_eq!(moved.kind, DateChangeKind::MovedInPlace);
        assert_eq!(moved.exam_date.id, created.exam_date.id);
        assert_eq!(moved.reminders.cancelled, 3);
        assert_eq!(channel.scheduled_messages_in("DU1").len(), 3);
    }

    #[actix_web::test]
    async fn store_writes_stay_when_channel_fails() {
        let TestContext { ctx, exam, channel } = setup().await;
        let ada = user(&ctx, "U1").await;
        channel.fail_schedule_containing(Some("Calculus"));

        let res = join_or_move_user(&ctx, &ada, exam.clone(), date(10)).await;
        assert!(matches!(res, Err(MembershipError::ExternalServiceError(_))));
        assert!(ctx
            .repos
            .exam_dates
            .find_by_exam_and_user(&exam.id, &ada.id)
            .await
            .is_some());

        // Running again with the same date heals the reminders
        channel.fail_schedule_containing(None);
        let healed = join_or_move_user(&ctx, &ada, exam, date(10))
            .await
            .unwrap();
        assert_eq!(healed.kind, DateChangeKind::Unchanged);
        assert_eq!(healed.reminders.scheduled, 3);
    }
}
