use super::IExamRepo;
use studysync_domain::{Exam, ID};
use sqlx::{types::Uuid, FromRow, PgPool};

pub struct PostgresExamRepo {
    pool: PgPool,
}

impl PostgresExamRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ExamRaw {
    exam_uid: Uuid,
    name: String,
    slug: String,
    channel_id: Option<String>,
}

impl From<ExamRaw> for Exam {
    fn from(raw: ExamRaw) -> Self {
        Self {
            id: raw.exam_uid.into(),
            name: raw.name,
            slug: raw.slug,
            channel_id: raw.channel_id,
        }
    }
}

#[async_trait::async_trait]
impl IExamRepo for PostgresExamRepo {
    async fn insert(&self, exam: &Exam) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO exams(exam_uid, name, slug, channel_id)
            VALUES($1, $2, $3, $4)
            "#,
        )
        .bind(exam.id.inner_ref())
        .bind(&exam.name)
        .bind(&exam.slug)
        .bind(&exam.channel_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, exam: &Exam) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE exams
            SET name = $2,
            slug = $3,
            channel_id = $4
            WHERE exam_uid = $1
            "#,
        )
        .bind(exam.id.inner_ref())
        .bind(&exam.name)
        .bind(&exam.slug)
        .bind(&exam.channel_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, exam_id: &ID) -> Option<Exam> {
        sqlx::query_as::<_, ExamRaw>(
            r#"
            SELECT * FROM exams AS e
            WHERE e.exam_uid = $1
            "#,
        )
        .bind(exam_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|e| e.into())
    }

    async fn find_by_slug(&self, slug: &str) -> Option<Exam> {
        sqlx::query_as::<_, ExamRaw>(
            r#"
            SELECT * FROM exams AS e
            WHERE e.slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|e| e.into())
    }

    async fn find_many(&self, exam_ids: &[ID]) -> Vec<Exam> {
        let exam_ids = exam_ids
            .iter()
            .map(|id| *id.inner_ref())
            .collect::<Vec<_>>();

        sqlx::query_as::<_, ExamRaw>(
            r#"
            SELECT * FROM exams AS e
            WHERE e.exam_uid = ANY($1)
            ORDER BY e.name
            "#,
        )
        .bind(&exam_ids)
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|e| e.into())
        .collect()
    }

    async fn find_all(&self) -> Vec<Exam> {
        sqlx::query_as::<_, ExamRaw>(
            r#"
            SELECT * FROM exams AS e
            ORDER BY e.name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|e| e.into())
        .collect()
    }
}
