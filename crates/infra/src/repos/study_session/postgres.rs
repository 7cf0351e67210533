use super::IStudySessionRepo;
use sqlx::{types::Uuid, FromRow, PgPool};
use studysync_domain::{StudySession, ID};

pub struct PostgresStudySessionRepo {
    pool: PgPool,
}

impl PostgresStudySessionRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct StudySessionRaw {
    session_uid: Uuid,
    exam_uid: Uuid,
    created_by: Uuid,
    start_ts: i64,
    announced: bool,
}

impl From<StudySessionRaw> for StudySession {
    fn from(raw: StudySessionRaw) -> Self {
        Self {
            id: raw.session_uid.into(),
            exam_id: raw.exam_uid.into(),
            created_by: raw.created_by.into(),
            start_ts: raw.start_ts,
            announced: raw.announced,
        }
    }
}

#[async_trait::async_trait]
impl IStudySessionRepo for PostgresStudySessionRepo {
    async fn insert(&self, session: &StudySession) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO study_sessions(session_uid, exam_uid, created_by, start_ts, announced)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(session.id.inner_ref())
        .bind(session.exam_id.inner_ref())
        .bind(session.created_by.inner_ref())
        .bind(session.start_ts)
        .bind(session.announced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, session: &StudySession) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE study_sessions
            SET announced = $2
            WHERE session_uid = $1
            "#,
        )
        .bind(session.id.inner_ref())
        .bind(session.announced)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(&self, session_id: &ID) -> Option<StudySession> {
        sqlx::query_as::<_, StudySessionRaw>(
            r#"
            SELECT * FROM study_sessions AS s
            WHERE s.session_uid = $1
            "#,
        )
        .bind(session_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|s| s.into())
    }

    async fn find_by_exam_and_start(&self, exam_id: &ID, start_ts: i64) -> Option<StudySession> {
        sqlx::query_as::<_, StudySessionRaw>(
            r#"
            SELECT * FROM study_sessions AS s
            WHERE s.exam_uid = $1 AND s.start_ts = $2
            "#,
        )
        .bind(exam_id.inner_ref())
        .bind(start_ts)
        .fetch_optional(&self.pool)
        .await
        .ok()
        .flatten()
        .map(|s| s.into())
    }

    async fn find_by_exam(&self, exam_id: &ID) -> Vec<StudySession> {
        sqlx::query_as::<_, StudySessionRaw>(
            r#"
            SELECT * FROM study_sessions AS s
            WHERE s.exam_uid = $1
            ORDER BY s.start_ts
            "#,
        )
        .bind(exam_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_default()
        .into_iter()
        .map(|s| s.into())
        .collect()
    }
}
