use super::membership::{join_or_move_user, MembershipChange, MembershipError};
use crate::error::StudySyncError;
use crate::shared::{
    auth::protect_route,
    guard::{Guard, InFlightMutations},
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use studysync_api_structs::join_exam::*;
use studysync_domain::User;
use studysync_infra::StudySyncContext;

pub async fn join_exam_controller(
    http_req: HttpRequest,
    path: web::Path<PathParams>,
    body: web::Json<RequestBody>,
    ctx: web::Data<StudySyncContext>,
    in_flight: web::Data<InFlightMutations>,
) -> Result<HttpResponse, StudySyncError> {
    let user = protect_route(&http_req, &ctx).await?;
    let date = Guard::against_malformed_date(&body.date)?;
    let _permit = in_flight.acquire(&user.id)?;

    let usecase = JoinExamUseCase {
        user,
        slug: path.into_inner().slug,
        date,
    };

    execute(usecase, &ctx)
        .await
        .map(|res| {
            HttpResponse::Ok().json(APIResponse::new(
                res.exam,
                res.exam_date,
                res.kind,
                res.reminders.into(),
            ))
        })
        .map_err(StudySyncError::from)
}

#[derive(Debug)]
pub struct JoinExamUseCase {
    pub user: User,
    pub slug: String,
    pub date: NaiveDate,
}

#[derive(Debug)]
pub enum UseCaseError {
    NotFound(String),
    Membership(MembershipError),
}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::NotFound(slug) => {
                Self::NotFound(format!("The exam with slug: {}, was not found.", slug))
            }
            UseCaseError::Membership(e) => e.into(),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for JoinExamUseCase {
    type Response = MembershipChange;
    type Error = UseCaseError;

    const NAME: &'static str = "JoinExam";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let exam = ctx
            .repos
            .exams
            .find_by_slug(&self.slug)
            .await
            .ok_or_else(|| UseCaseError::NotFound(self.slug.clone()))?;

        join_or_move_user(ctx, &self.user, exam, self.date)
            .await
            .map_err(UseCaseError::Membership)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[actix_web::test]
    async fn it_rejects_unknown_exam() {
        let ctx = StudySyncContext::create_inmemory();
        let user = User::new("Ada".into(), "U1".into());

        let mut usecase = JoinExamUseCase {
            user,
            slug: "calculus".into(),
            date: NaiveDate::from_ymd_opt(2099, 6, 10).unwrap(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::NotFound(_))
        ));
    }
}
