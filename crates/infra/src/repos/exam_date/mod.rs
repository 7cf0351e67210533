mod inmemory;
mod postgres;

use chrono::NaiveDate;
pub use inmemory::InMemoryExamDateRepo;
pub use postgres::PostgresExamDateRepo;
use studysync_domain::{ExamDate, ExamDateWrites, ID};

/// Stores `ExamDate`s together with their observers and the `Exam` memberships
#[async_trait::async_trait]
pub trait IExamDateRepo: Send + Sync {
    async fn find_by_exam(&self, exam_id: &ID) -> anyhow::Result<Vec<ExamDate>>;
    async fn find_by_exam_and_date(&self, exam_id: &ID, date: NaiveDate) -> Option<ExamDate>;
    async fn find_by_exam_and_user(&self, exam_id: &ID, user_id: &ID) -> Option<ExamDate>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<ExamDate>;
    async fn find_member_ids(&self, exam_id: &ID) -> Vec<ID>;
    /// Applies all the writes in a single transaction. Fails without writing
    /// anything when the dates no longer match what the writes expect.
    async fn apply(&self, writes: &ExamDateWrites) -> anyhow::Result<()>;
    /// Deletes and returns every `ExamDate` without observers
    async fn delete_orphaned(&self) -> Vec<ExamDate>;
}
