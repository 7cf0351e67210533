use super::membership::{join_or_move_user, MembershipChange, MembershipError};
use crate::error::StudySyncError;
use crate::shared::{
    auth::protect_route,
    guard::{Guard, InFlightMutations},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use studysync_api_structs::create_exam::*;
use studysync_domain::{slugify, Exam, User};
use studysync_infra::StudySyncContext;
use tracing::{error, info};

pub async fn create_exam_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<StudySyncContext>,
    in_flight: web::Data<InFlightMutations>,
) -> Result<HttpResponse, StudySyncError> {
    let user = protect_route(&http_req, &ctx).await?;
    let date = Guard::against_malformed_date(&body.date)?;
    let _permit = in_flight.acquire(&user.id)?;

    let usecase = CreateExamUseCase {
        user,
        name: body.0.name,
        date,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Created().json(APIResponse::new(
                res.exam,
                res.exam_date,
                res.kind,
                res.reminders.into(),
            ))
        })
        .map_err(StudySyncError::from)
}

/// Creates an `Exam` with `date` as its first date.
///
/// If an `Exam` with the same slug already exists the `User` joins it instead.
#[derive(Debug)]
pub struct CreateExamUseCase {
    pub user: User,
    pub name: String,
    pub date: NaiveDate,
}

#[derive(Debug)]
pub enum UseCaseError {
    InvalidName,
    StorageError,
    Membership(MembershipError),
}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::InvalidName => {
                Self::BadClientData("The exam name can not be empty".into())
            }
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::Membership(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateExamUseCase {
    type Response = MembershipChange;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateExam";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let slug = slugify(&self.name);
        if slug.is_empty() {
            return Err(UseCaseError::InvalidName);
        }

        let exam = match ctx.repos.exams.find_by_slug(&slug).await {
            Some(exam) => exam,
            None => {
                let exam = Exam::new(&self.name);
                match ctx.repos.exams.insert(&exam).await {
                    Ok(_) => {
                        info!("Created exam {}", exam.slug);
                        exam
                    }
                    // Created concurrently by someone else
                    Err(e) => ctx.repos.exams.find_by_slug(&slug).await.ok_or_else(|| {
                        error!("Unable to create exam {}. Err: {:?}", slug, e);
                        UseCaseError::StorageError
                    })?,
                }
            }
        };

        join_or_move_user(ctx, &self.user, exam, self.date)
            .await
            .map_err(UseCaseError::Membership)
    }
}
