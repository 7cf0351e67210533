use actix_web::rt::time::interval;
use std::time::Duration;
use studysync_infra::StudySyncContext;
use tracing::{info, info_span};
use tracing_futures::Instrument;

/// Deletes `ExamDate`s that no `User` observes anymore
pub async fn reclaim_orphaned_exam_dates(ctx: &StudySyncContext) -> usize {
    let orphans = ctx.repos.exam_dates.delete_orphaned().await;
    for orphan in &orphans {
        info!(
            "Reclaimed exam date {} of exam {} without observers",
            orphan.date, orphan.exam_id
        );
    }
    orphans.len()
}

pub fn start_orphan_reclaim_job(ctx: StudySyncContext) {
    let period = Duration::from_secs(std::cmp::max(ctx.config.orphan_reclaim_interval_secs, 1));
    actix_web::rt::spawn(
        async move {
            let mut interval = interval(period);
            loop {
                interval.tick().await;
                reclaim_orphaned_exam_dates(&ctx).await;
            }
        }
        .instrument(info_span!("Orphan reclaim job")),
    );
}
