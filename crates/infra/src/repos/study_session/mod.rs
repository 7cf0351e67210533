mod inmemory;
mod postgres;

pub use inmemory::InMemoryStudySessionRepo;
pub use postgres::PostgresStudySessionRepo;
use studysync_domain::{StudySession, ID};

#[async_trait::async_trait]
pub trait IStudySessionRepo: Send + Sync {
    /// Fails if the `Exam` already has a session with the same start
    async fn insert(&self, session: &StudySession) -> anyhow::Result<()>;
    async fn save(&self, session: &StudySession) -> anyhow::Result<()>;
    async fn find(&self, session_id: &ID) -> Option<StudySession>;
    async fn find_by_exam_and_start(&self, exam_id: &ID, start_ts: i64) -> Option<StudySession>;
    /// Sorted by start time
    async fn find_by_exam(&self, exam_id: &ID) -> Vec<StudySession>;
}
