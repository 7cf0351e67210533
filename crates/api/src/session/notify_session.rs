use crate::exam::resolve_reminder_target;
use futures::future::{join, join_all};
use studysync_domain::{plan_session_reminders, Exam, ReminderEvent, ReminderTarget, StudySession};
use studysync_infra::{ScheduleMessageRequest, ScheduledMessage, StudySyncContext};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionNotification {
    pub scheduled: usize,
    /// Reminders found in the queue from an earlier attempt
    pub already_scheduled: usize,
    pub skipped_past_due: usize,
    /// The announcement was posted by this call
    pub announced: bool,
    pub failures: Vec<String>,
}

impl SessionNotification {
    fn failed(failure: String) -> Self {
        Self {
            failures: vec![failure],
            ..Default::default()
        }
    }
}

fn is_queued(reminder: &ReminderEvent, channel_id: &str, queue: &[ScheduledMessage]) -> bool {
    queue.iter().filter(|m| m.channel_id == channel_id).any(|m| match &m.tag {
        Some(tag) => *tag == reminder.tag,
        None => m.text == reminder.text && m.post_at == reminder.remind_at / 1000,
    })
}

/// Announces a new `StudySession` in the exam channel and schedules the
/// reminders for its start.
///
/// Safe to call again for the same session: reminders that are already
/// queued are left alone and the announcement is only posted while
/// `session.announced` is false. Every message is attempted even when
/// another one fails, the failures are collected in the result.
pub async fn notify_session_created(
    ctx: &StudySyncContext,
    target: &ReminderTarget,
    exam: &Exam,
    session: &StudySession,
) -> SessionNotification {
    let channel_id = match resolve_reminder_target(ctx, target).await {
        Ok(channel_id) => channel_id,
        Err(e) => return SessionNotification::failed(format!("channel: {}", e)),
    };
    let channel_id = channel_id.as_str();
    let queue = match ctx.notifications.list_scheduled_messages().await {
        Ok(queue) => queue,
        Err(e) => return SessionNotification::failed(format!("scheduled messages: {}", e)),
    };
    let plan = plan_session_reminders(
        &exam.name,
        &exam.slug,
        session.start_ts,
        &ctx.config.reminder_timezone,
    );

    let now = ctx.sys.get_timestamp_millis();
    let (upcoming, past_due): (Vec<&ReminderEvent>, Vec<&ReminderEvent>) =
        plan.reminders.iter().partition(|r| r.remind_at > now);
    let (queued, missing): (Vec<&ReminderEvent>, Vec<&ReminderEvent>) = upcoming
        .into_iter()
        .partition(|r| is_queued(r, channel_id, &queue));

    let mut notification = SessionNotification {
        already_scheduled: queued.len(),
        skipped_past_due: past_due.len(),
        ..Default::default()
    };

    let requests = missing
        .iter()
        .map(|r| ScheduleMessageRequest {
            channel_id: channel_id.to_string(),
            text: r.text.clone(),
            post_at: r.remind_at / 1000,
            tag: Some(r.tag.clone()),
        })
        .collect::<Vec<_>>();
    let schedules = join_all(
        requests
            .iter()
            .map(|req| ctx.notifications.schedule_message(req)),
    );
    let announcement = async {
        if session.announced {
            None
        } else {
            Some(ctx.notifications.post_message(channel_id, &plan.announcement).await)
        }
    };
    let (scheduled, announced) = join(schedules, announcement).await;

    for (reminder, res) in missing.iter().zip(scheduled) {
        match res {
            Ok(_) => notification.scheduled += 1,
            Err(e) => notification
                .failures
                .push(format!("{}: {}", reminder.slot.as_str(), e)),
        }
    }
    match announced {
        Some(Ok(_)) => notification.announced = true,
        Some(Err(e)) => notification.failures.push(format!("announcement: {}", e)),
        None => (),
    }

    notification
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use studysync_domain::{Tz, ID};
    use studysync_infra::{InMemoryNotificationChannel, StaticTimeSys};

    const NOW: i64 = 1_750_000_000_000;

    fn exam_channel() -> ReminderTarget {
        ReminderTarget::Channel("CEXAM".into())
    }

    fn setup() -> (StudySyncContext, Arc<InMemoryNotificationChannel>) {
        let channel = Arc::new(InMemoryNotificationChannel::new());
        let mut ctx = StudySyncContext::create_inmemory_with_channel(channel.clone());
        ctx.config.reminder_timezone = Tz::UTC;
        ctx.sys = Arc::new(StaticTimeSys(NOW));
        (ctx, channel)
    }

    #[actix_web::test]
    async fn it_schedules_two_reminders_and_posts_announcement() {
        let (ctx, channel) = setup();
        let exam = Exam::new("Calculus");
        let start_ts = NOW + 1000 * 60 * 60;
        let session = StudySession::new(exam.id.clone(), ID::new(), start_ts);

        let res = notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        assert!(res.failures.is_empty());
        assert_eq!(res.scheduled, 2);
        assert!(res.announced);

        let mut post_ats = channel
            .scheduled_messages_in("CEXAM")
            .into_iter()
            .map(|m| m.post_at)
            .collect::<Vec<_>>();
        post_ats.sort();
        assert_eq!(
            post_ats,
            vec![(start_ts - 5 * 60 * 1000) / 1000, start_ts / 1000]
        );
        let posted = channel.posted_messages();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].text.starts_with("A new Calculus study session was scheduled for"));
    }

    #[actix_web::test]
    async fn one_failed_reminder_does_not_block_the_others() {
        let (ctx, channel) = setup();
        channel.fail_schedule_containing(Some("5 minutes"));
        let exam = Exam::new("Calculus");
        let session = StudySession::new(exam.id.clone(), ID::new(), NOW + 1000 * 60 * 60);

        let res = notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        assert_eq!(res.failures.len(), 1);
        assert!(res.failures[0].starts_with("five-minutes-before"));
        assert!(res.announced);

        let scheduled = channel.scheduled_messages();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].text, "The Calculus study session is starting now!");
        assert_eq!(channel.posted_messages().len(), 1);
    }

    #[actix_web::test]
    async fn notifying_again_only_sends_what_is_missing() {
        let (ctx, channel) = setup();
        channel.fail_schedule_containing(Some("starting now"));
        let exam = Exam::new("Calculus");
        let mut session = StudySession::new(exam.id.clone(), ID::new(), NOW + 1000 * 60 * 60);

        let first = notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        assert_eq!(first.failures.len(), 1);
        session.announced = first.announced;

        channel.fail_schedule_containing(None);
        let second = notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        assert!(second.failures.is_empty());
        assert_eq!(second.already_scheduled, 1);
        assert_eq!(second.scheduled, 1);
        assert!(!second.announced);

        assert_eq!(channel.scheduled_messages_in("CEXAM").len(), 2);
        assert_eq!(channel.posted_messages().len(), 1);
    }

    #[actix_web::test]
    async fn queued_reminders_are_recognized_by_text_without_tags() {
        let (ctx, channel) = setup();
        channel.drop_tags(true);
        let exam = Exam::new("Calculus");
        let session = StudySession::new(exam.id.clone(), ID::new(), NOW + 1000 * 60 * 60);
        let other = StudySession::new(exam.id.clone(), ID::new(), NOW + 1000 * 60 * 120);

        notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        let res = notify_session_created(&ctx, &exam_channel(), &exam, &other).await;
        // Same texts, other times
        assert_eq!(res.already_scheduled, 0);
        assert_eq!(res.scheduled, 2);

        let again = notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        assert_eq!(again.already_scheduled, 2);
        assert_eq!(channel.scheduled_messages_in("CEXAM").len(), 4);
    }

    #[actix_web::test]
    async fn it_skips_reminders_in_the_past() {
        let (ctx, channel) = setup();
        let exam = Exam::new("Calculus");
        let session = StudySession::new(exam.id.clone(), ID::new(), NOW + 1000 * 60 * 2);

        let res = notify_session_created(&ctx, &exam_channel(), &exam, &session).await;
        assert!(res.failures.is_empty());
        assert_eq!(res.skipped_past_due, 1);
        assert_eq!(channel.scheduled_messages().len(), 1);
    }
}
