use crate::error::StudySyncError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use studysync_api_structs::get_exam::*;
use studysync_domain::{Exam, ExamDate, StudySession, User};
use studysync_infra::StudySyncContext;
use tracing::error;

pub async fn get_exam_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    ctx: web::Data<StudySyncContext>,
) -> Result<HttpResponse, StudySyncError> {
    protect_admin_route(&http_req, &ctx)?;

    let usecase = GetExamUseCase {
        slug: path.into_inner().slug,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse::new(
                res.exam,
                res.dates,
                res.members,
                res.sessions,
            ))
        })
        .map_err(StudySyncError::from)
}

#[derive(Debug)]
pub struct GetExamUseCase {
    pub slug: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub exam: Exam,
    pub dates: Vec<ExamDate>,
    pub members: Vec<User>,
    pub sessions: Vec<StudySession>,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(String),
    StorageError,
}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(slug) => {
                Self::NotFound(format!("The exam with slug: {}, was not found.", slug))
            }
            UseCaseError::StorageError => Self::InternalError,
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExamUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "GetExam";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let exam = ctx
            .repos
            .exams
            .find_by_slug(&self.slug)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.slug.clone()))?;

        let mut dates = ctx
            .repos
            .exam_dates
            .find_by_exam(&exam.id)
            .await
            .map_err(|e| {
                error!("Unable to fetch dates of exam {}. Err: {:?}", exam.slug, e);
                UseCaseError::StorageError
            })?;
        dates.sort_by_key(|d| d.date);
        let member_ids = ctx.repos.exam_dates.find_member_ids(&exam.id).await;
        let members = ctx.repos.users.find_many(&member_ids).await;
        let sessions = ctx.repos.study_sessions.find_by_exam(&exam.id).await;

        Ok(UseCaseRes {
            exam,
            dates,
            members,
            sessions,
        })
    }
}
