mod inmemory;
mod postgres;

pub use inmemory::InMemoryExamRepo;
pub use postgres::PostgresExamRepo;
use studysync_domain::{Exam, ID};

#[async_trait::async_trait]
pub trait IExamRepo: Send + Sync {
    /// Fails if an `Exam` with the same slug already exists
    async fn insert(&self, exam: &Exam) -> anyhow::Result<()>;
    async fn save(&self, exam: &Exam) -> anyhow::Result<()>;
    async fn find(&self, exam_id: &ID) -> Option<Exam>;
    async fn find_by_slug(&self, slug: &str) -> Option<Exam>;
    async fn find_many(&self, exam_ids: &[ID]) -> Vec<Exam>;
    async fn find_all(&self) -> Vec<Exam>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::shared::test_helpers::{insert_exam, setup};

    #[tokio::test]
    async fn test_crud_exam() {
        let ctx = setup().await;

        let mut exam = insert_exam(&ctx, "AP Computer Science A").await;
        assert!(exam.slug.starts_with("ap-computer-science-a-"));

        let found = ctx
            .repos
            .exams
            .find_by_slug(&exam.slug)
            .await
            .expect("To find exam by slug");
        assert_eq!(found, exam);

        exam.channel_id = Some("C123".into());
        ctx.repos.exams.save(&exam).await.expect("To save exam");
        assert_eq!(ctx.repos.exams.find(&exam.id).await, Some(exam.clone()));

        assert!(ctx.repos.exams.find_all().await.contains(&exam));
        assert_eq!(
            ctx.repos.exams.find_many(&[exam.id.clone(), ID::new()]).await,
            vec![exam]
        );
    }

    #[tokio::test]
    async fn test_slug_is_unique() {
        let ctx = setup().await;

        let exam = insert_exam(&ctx, "Calculus").await;
        let same_slug = Exam::new(&exam.name.to_uppercase());
        assert_eq!(same_slug.slug, exam.slug);
        assert!(ctx.repos.exams.insert(&same_slug).await.is_err());
    }
}
