use crate::error::StudySyncError;
use crate::shared::{
    auth::protect_admin_route,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use studysync_api_structs::get_exams::*;
use studysync_domain::Exam;
use studysync_infra::StudySyncContext;

pub async fn get_exams_controller(
    http_req: HttpRequest,
    ctx: web::Data<StudySyncContext>,
) -> Result<HttpResponse, StudySyncError> {
    protect_admin_route(&http_req, &ctx)?;

    execute(GetExamsUseCase {}, &ctx)
        .await
        .map(|exams| HttpResponse::Ok().json(APIResponse::new(exams)))
        .map_err(StudySyncError::from)
}

#[derive(Debug)]
pub struct GetExamsUseCase {}

#[derive(Debug)]
pub enum UseCaseError {}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {}
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for GetExamsUseCase {
    type Response = Vec<Exam>;
    type Error = UseCaseError;

    const NAME: &'static str = "GetExams";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let mut exams = ctx.repos.exams.find_all().await;
        exams.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(exams)
    }
}
