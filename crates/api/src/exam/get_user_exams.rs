use crate::error::StudySyncError;
use crate::shared::{
    auth::protect_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use studysync_api_structs::dtos::{ExamDTO, UserExamDTO};
use studysync_api_structs::get_user_exams::*;
use studysync_domain::{format_date, Exam, ExamDate, User};
use studysync_infra::StudySyncContext;

pub async fn get_user_exams_controller(
    http_req: HttpRequest,
    ctx: web::Data<StudySyncContext>,
) -> Result<HttpResponse, StudySyncError> {
    let user = protect_route(&http_req, &ctx).await?;

    execute(GetUserExamsUseCase { user }, &ctx)
        .await
        .map(|exams| {
            let exams = exams
                .into_iter()
                .map(|(exam, exam_date)| UserExamDTO {
                    exam: ExamDTO::new(exam),
                    date: format_date(&exam_date.date),
                })
                .collect();
            HttpResponse::Ok().json(APIResponse { exams })
        })
        .map_err(StudySyncError::from)
}

/// The `Exam`s a `User` takes, each with the date the `User` observes
#[derive(Debug)]
pub struct GetUserExamsUseCase {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetUserExamsUseCase {
    type Response = Vec<(Exam, ExamDate)>;
    type Error = UseCaseError;

    const NAME: &'static str = "GetUserExams";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let mut dates = ctx.repos.exam_dates.find_by_user(&self.user.id).await;
        dates.sort_by_key(|d| d.date);
        let exam_ids = dates.iter().map(|d| d.exam_id.clone()).collect::<Vec<_>>();
        let exams = ctx.repos.exams.find_many(&exam_ids).await;

        Ok(dates
            .into_iter()
            .filter_map(|d| {
                exams
                    .iter()
                    .find(|e| e.id == d.exam_id)
                    .map(|e| (e.clone(), d))
            })
            .collect())
    }
}
