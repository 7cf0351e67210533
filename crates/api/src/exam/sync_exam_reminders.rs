use crate::error::StudySyncError;
use crate::shared::usecase::UseCase;
use chrono::NaiveDate;
use futures::future::join_all;
use studysync_api_structs::dtos::ReminderSyncDTO;
use studysync_domain::{
    exam_reminder_tag, reminder_text, plan_exam_reminders, Exam, ReminderAnchor,
    ReminderEvent, ReminderTarget, User, EXAM_REMINDER_SLOTS,
};
use studysync_infra::{
    NotificationError, ScheduleMessageRequest, ScheduledMessage, StudySyncContext,
};
use tracing::warn;

/// Reminders closer than this to now are not scheduled
const MIN_SCHEDULE_AHEAD_MILLIS: i64 = 60 * 1000;

/// Replaces the pending exam reminders of a `User` with the ones for `date`.
///
/// The notification channel has no transactions, so every pending reminder
/// for the `Exam` in the direct conversation with the `User` is cancelled
/// before the new ones are scheduled. Running it twice gives the same result.
#[derive(Debug)]
pub struct SyncExamRemindersUseCase<'a> {
    pub user: &'a User,
    pub exam: &'a Exam,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReminderSyncReport {
    pub cancelled: usize,
    /// Cancels that failed. The stale reminders may still be delivered.
    pub failed_cancels: usize,
    pub scheduled: usize,
    pub skipped_past_due: usize,
}

impl From<ReminderSyncReport> for ReminderSyncDTO {
    fn from(report: ReminderSyncReport) -> Self {
        Self {
            cancelled: report.cancelled,
            failed_cancels: report.failed_cancels,
            scheduled: report.scheduled,
            skipped_past_due: report.skipped_past_due,
        }
    }
}

#[derive(Debug)]
pub enum UseCaseError {
    ExternalServiceError(String),
}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::ExternalServiceError(msg) => Self::ExternalServiceError(msg),
        }
    }
}

/// The id of the channel that reminders for `target` are delivered in
pub async fn resolve_reminder_target(
    ctx: &StudySyncContext,
    target: &ReminderTarget,
) -> Result<String, NotificationError> {
    match target {
        ReminderTarget::User(slack_id) => ctx.notifications.open_direct_message(slack_id).await,
        ReminderTarget::Channel(channel_id) => Ok(channel_id.clone()),
    }
}

impl<'a> SyncExamRemindersUseCase<'a> {
    /// A scheduled message belongs to this `Exam` if it carries one of the
    /// reminder tags, or when the channel returns no tag, one of the texts
    fn is_stale_reminder(&self, message: &ScheduledMessage, channel_id: &str) -> bool {
        if message.channel_id != channel_id {
            return false;
        }
        match &message.tag {
            Some(tag) => EXAM_REMINDER_SLOTS
                .iter()
                .any(|slot| *tag == exam_reminder_tag(&self.exam.slug, *slot)),
            None => EXAM_REMINDER_SLOTS
                .iter()
                .any(|slot| message.text == reminder_text(&self.exam.name, *slot)),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<'a> UseCase for SyncExamRemindersUseCase<'a> {
    type Response = ReminderSyncReport;
    type Error = UseCaseError;

    const NAME: &'static str = "SyncExamReminders";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let anchor = ReminderAnchor {
            timezone: ctx.config.reminder_timezone,
            hour: ctx.config.reminder_hour,
        };
        let desired = plan_exam_reminders(&self.exam.name, &self.exam.slug, self.date, &anchor);

        let target = ReminderTarget::User(self.user.slack_id.clone());
        let channel_id = resolve_reminder_target(ctx, &target)
            .await
            .map_err(|e| UseCaseError::ExternalServiceError(e.to_string()))?;
        let scheduled = ctx
            .notifications
            .list_scheduled_messages()
            .await
            .map_err(|e| UseCaseError::ExternalServiceError(e.to_string()))?;

        let stale = scheduled
            .iter()
            .filter(|m| self.is_stale_reminder(m, &channel_id))
            .collect::<Vec<_>>();
        let cancels = stale
            .iter()
            .map(|m| ctx.notifications.cancel_scheduled_message(&m.channel_id, &m.id));
        let mut report = ReminderSyncReport::default();
        for (message, res) in stale.iter().zip(join_all(cancels).await) {
            match res {
                Ok(_) => report.cancelled += 1,
                Err(e) => {
                    warn!(
                        "Partial reconciliation: unable to cancel reminder {} for user {}. Error: {:?}",
                        message.id, self.user.id, e
                    );
                    report.failed_cancels += 1;
                }
            }
        }

        let threshold = ctx.sys.get_timestamp_millis() + MIN_SCHEDULE_AHEAD_MILLIS;
        let (upcoming, past_due): (Vec<&ReminderEvent>, Vec<&ReminderEvent>) =
            desired.iter().partition(|r| r.remind_at > threshold);
        report.skipped_past_due = past_due.len();

        let requests = upcoming
            .iter()
            .map(|r| ScheduleMessageRequest {
                channel_id: channel_id.clone(),
                text: r.text.clone(),
                post_at: r.remind_at / 1000,
                tag: Some(r.tag.clone()),
            })
            .collect::<Vec<_>>();
        let schedules = requests
            .iter()
            .map(|req| ctx.notifications.schedule_message(req));
        let mut failures = Vec::new();
        for (reminder, res) in upcoming.iter().zip(join_all(schedules).await) {
            match res {
                Ok(_) => report.scheduled += 1,
                Err(e) => failures.push(format!("{}: {}", reminder.slot.as_str(), e)),
            }
        }

        if !failures.is_empty() {
            return Err(UseCaseError::ExternalServiceError(format!(
                "Unable to schedule reminders: {}",
                failures.join(", ")
            )));
        }

        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use studysync_domain::Tz;
    use studysync_infra::{INotificationChannel, InMemoryNotificationChannel, StaticTimeSys};

    struct TestContext {
        ctx: StudySyncContext,
        channel: Arc<InMemoryNotificationChannel>,
        user: User,
        exam: Exam,
    }

    fn setup() -> TestContext {
        let channel = Arc::new(InMemoryNotificationChannel::new());
        let mut ctx = StudySyncContext::create_inmemory_with_channel(channel.clone());
        ctx.config.reminder_timezone = Tz::UTC;
        ctx.config.reminder_hour = 7;
        ctx.sys = Arc::new(StaticTimeSys(
            Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap().timestamp_millis(),
        ));

        TestContext {
            ctx,
            channel,
            user: User::new("Ada".into(), "U0001".into()),
            exam: Exam::new("Calculus"),
        }
    }

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, month, day).unwrap()
    }

    async fn sync(t: &TestContext, date: NaiveDate) -> Result<ReminderSyncReport, UseCaseError> {
        let mut usecase = SyncExamRemindersUseCase {
            user: &t.user,
            exam: &t.exam,
            date,
        };
        usecase.execute(&t.ctx).await
    }

    #[actix_web::test]
    async fn it_schedules_the_three_reminders() {
        let t = setup();

        let report = sync(&t, date(6, 10)).await.expect("To sync reminders");
        assert_eq!(report.scheduled, 3);

        let mut post_ats = t
            .channel
            .scheduled_messages_in("DU0001")
            .into_iter()
            .map(|m| m.post_at)
            .collect::<Vec<_>>();
        post_ats.sort();
        let expected = [(6, 3), (6, 9), (6, 10)]
            .iter()
            .map(|(m, d)| Utc.with_ymd_and_hms(2025, *m, *d, 7, 0, 0).unwrap().timestamp())
            .collect::<Vec<_>>();
        assert_eq!(post_ats, expected);
    }

    #[actix_web::test]
    async fn it_is_idempotent() {
        let t = setup();

        sync(&t, date(6, 10)).await.expect("To sync reminders");
        let report = sync(&t, date(6, 10)).await.expect("To sync reminders");
        assert_eq!(report.cancelled, 3);
        assert_eq!(report.scheduled, 3);
        assert_eq!(t.channel.scheduled_messages().len(), 3);
    }

    #[actix_web::test]
    async fn it_replaces_reminders_for_old_date() {
        let t = setup();

        sync(&t, date(6, 10)).await.expect("To sync reminders");
        sync(&t, date(6, 20)).await.expect("To sync reminders");

        let old_day_of = Utc.with_ymd_and_hms(2025, 6, 10, 7, 0, 0).unwrap().timestamp();
        let new_day_of = Utc.with_ymd_and_hms(2025, 6, 20, 7, 0, 0).unwrap().timestamp();
        let messages = t.channel.scheduled_messages();
        assert_eq!(messages.len(), 3);
        assert!(!messages.iter().any(|m| m.post_at == old_day_of));
        assert!(messages.iter().any(|m| m.post_at == new_day_of));
    }

    #[actix_web::test]
    async fn it_matches_on_text_when_tags_are_not_returned() {
        let t = setup();
        t.channel.drop_tags(true);

        sync(&t, date(6, 10)).await.expect("To sync reminders");
        let report = sync(&t, date(6, 20)).await.expect("To sync reminders");
        assert_eq!(report.cancelled, 3);
        assert_eq!(t.channel.scheduled_messages().len(), 3);
    }

    #[actix_web::test]
    async fn it_leaves_other_users_and_exams_alone() {
        let t = setup();
        let other_user = User::new("Grace".into(), "U0002".into());
        let other_exam = Exam::new("Linear Algebra");

        sync(&t, date(6, 10)).await.expect("To sync reminders");
        let mut usecase = SyncExamRemindersUseCase {
            user: &other_user,
            exam: &t.exam,
            date: date(6, 10),
        };
        usecase.execute(&t.ctx).await.expect("To sync reminders");
        let mut usecase = SyncExamRemindersUseCase {
            user: &t.user,
            exam: &other_exam,
            date: date(6, 10),
        };
        usecase.execute(&t.ctx).await.expect("To sync reminders");

        let report = sync(&t, date(6, 20)).await.expect("To sync reminders");
        assert_eq!(report.cancelled, 3);
        assert_eq!(t.channel.scheduled_messages().len(), 9);
        assert_eq!(t.channel.scheduled_messages_in("DU0002").len(), 3);
    }

    #[actix_web::test]
    async fn it_skips_past_due_reminders() {
        let t = setup();

        // A week before 2025-05-05 has already passed
        let report = sync(&t, date(5, 5)).await.expect("To sync reminders");
        assert_eq!(report.skipped_past_due, 1);
        assert_eq!(report.scheduled, 2);
    }

    #[actix_web::test]
    async fn failing_cancels_are_not_fatal() {
        let t = setup();

        sync(&t, date(6, 10)).await.expect("To sync reminders");
        t.channel.fail_cancels(true);
        let report = sync(&t, date(6, 20)).await.expect("To sync reminders");
        assert_eq!(report.failed_cancels, 3);
        assert_eq!(report.scheduled, 3);
    }

    #[actix_web::test]
    async fn failing_schedules_are_reported_after_all_attempts() {
        let t = setup();
        t.channel.fail_schedule_containing(Some("tomorrow"));

        assert!(matches!(
            sync(&t, date(6, 10)).await,
            Err(UseCaseError::ExternalServiceError(_))
        ));
        assert_eq!(t.channel.scheduled_messages().len(), 2);
        assert!(t
            .channel
            .list_scheduled_messages()
            .await
            .unwrap()
            .iter()
            .all(|m| !m.text.contains("tomorrow")));
    }
}
