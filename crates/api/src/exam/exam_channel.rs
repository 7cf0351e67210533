use studysync_domain::{Exam, User};
use studysync_infra::{NotificationError, StudySyncContext};
use tracing::{error, info};

async fn create_exam_channel(
    ctx: &StudySyncContext,
    exam: &mut Exam,
) -> Result<String, NotificationError> {
    let channel_id = ctx.notifications.create_channel(&exam.channel_name()).await?;
    info!("Exam {} got channel {}", exam.slug, channel_id);
    exam.channel_id = Some(channel_id.clone());
    if let Err(e) = ctx.repos.exams.save(exam).await {
        error!(
            "Unable to store channel {} for exam {}. Err: {:?}",
            channel_id, exam.slug, e
        );
    }
    Ok(channel_id)
}

/// Makes sure the `Exam` has a channel and that `user` is a member of it.
///
/// A missing channel is created again, also when it was removed from the
/// chat platform after it was stored.
pub async fn join_exam_channel(
    ctx: &StudySyncContext,
    exam: &mut Exam,
    user: &User,
) -> Result<String, NotificationError> {
    let channel_id = match exam.channel_id.clone() {
        Some(channel_id) => channel_id,
        None => create_exam_channel(ctx, exam).await?,
    };

    match ctx.notifications.invite_user(&channel_id, &user.slack_id).await {
        Err(NotificationError::NotFound(_)) => {
            let channel_id = create_exam_channel(ctx, exam).await?;
            ctx.notifications
                .invite_user(&channel_id, &user.slack_id)
                .await?;
            Ok(channel_id)
        }
        Err(e) => Err(e),
        Ok(_) => Ok(channel_id),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::Arc;
    use studysync_infra::InMemoryNotificationChannel;

    #[actix_web::test]
    async fn it_creates_missing_channels() {
        let channel = Arc::new(InMemoryNotificationChannel::new());
        let ctx = StudySyncContext::create_inmemory_with_channel(channel.clone());
        let user = User::new("Ada".into(), "U0001".into());
        let mut exam = Exam::new("Calculus");
        ctx.repos.exams.insert(&exam).await.unwrap();

        let channel_id = join_exam_channel(&ctx, &mut exam, &user)
            .await
            .expect("To join channel");
        assert_eq!(
            channel.channel_id_by_name("calculus-exam"),
            Some(channel_id.clone())
        );
        assert_eq!(channel.channel_members(&channel_id), vec!["U0001".to_string()]);
        assert_eq!(
            ctx.repos.exams.find(&exam.id).await.unwrap().channel_id,
            Some(channel_id)
        );

        // Stored channel that no longer exists on the platform
        exam.channel_id = Some("CGONE".into());
        let recreated = join_exam_channel(&ctx, &mut exam, &user)
            .await
            .expect("To join channel");
        assert_ne!(recreated, "CGONE");
        assert_eq!(exam.channel_id, Some(recreated));
    }
}
