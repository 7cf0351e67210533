mod exam;
mod exam_date;
mod shared;
mod study_session;
mod user;

use exam::{IExamRepo, InMemoryExamRepo, PostgresExamRepo};
use exam_date::{IExamDateRepo, InMemoryExamDateRepo, PostgresExamDateRepo};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use study_session::{IStudySessionRepo, InMemoryStudySessionRepo, PostgresStudySessionRepo};
use tracing::info;
use user::{IUserRepo, InMemoryUserRepo, PostgresUserRepo};

#[derive(Clone)]
pub struct Repos {
    pub exams: Arc<dyn IExamRepo>,
    pub exam_dates: Arc<dyn IExamDateRepo>,
    pub users: Arc<dyn IUserRepo>,
    pub study_sessions: Arc<dyn IStudySessionRepo>,
}

impl Repos {
    pub async fn create_postgres(connection_string: &str) -> anyhow::Result<Self> {
        info!("DB CHECKING CONNECTION ...");
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(connection_string)
            .await?;
        info!("DB CHECKING CONNECTION ... [done]");

        info!("DB RUNNING MIGRATIONS ...");
        sqlx::migrate!().run(&pool).await?;
        info!("DB RUNNING MIGRATIONS ... [done]");

        Ok(Self {
            exams: Arc::new(PostgresExamRepo::new(pool.clone())),
            exam_dates: Arc::new(PostgresExamDateRepo::new(pool.clone())),
            users: Arc::new(PostgresUserRepo::new(pool.clone())),
            study_sessions: Arc::new(PostgresStudySessionRepo::new(pool)),
        })
    }

    pub fn create_inmemory() -> Self {
        Self {
            exams: Arc::new(InMemoryExamRepo::new()),
            exam_dates: Arc::new(InMemoryExamDateRepo::new()),
            users: Arc::new(InMemoryUserRepo::new()),
            study_sessions: Arc::new(InMemoryStudySessionRepo::new()),
        }
    }
}
