use crate::error::StudySyncError;
use crate::shared::{
    auth::protect_admin_route,
    guard::Guard,
    usecase::{execute, UseCase},
};
use actix_web::{web, HttpRequest, HttpResponse};
use studysync_api_structs::create_user::*;
use studysync_domain::User;
use studysync_infra::StudySyncContext;

pub async fn create_user_controller(
    http_req: HttpRequest,
    body: web::Json<RequestBody>,
    ctx: web::Data<StudySyncContext>,
) -> Result<HttpResponse, StudySyncError> {
    protect_admin_route(&http_req, &ctx)?;
    Guard::against_empty_name(&body.name)?;

    let body = body.0;
    let usecase = CreateUserUseCase {
        name: body.name,
        slack_id: body.slack_id,
    };

    execute(usecase, &ctx)
        .await
        .map(|usecase_res| HttpResponse::Created().json(APIResponse::new(usecase_res.user)))
        .map_err(StudySyncError::from)
}

#[derive(Debug)]
pub struct CreateUserUseCase {
    pub name: String,
    pub slack_id: String,
}

#[derive(Debug)]
pub struct UseCaseRes {
    pub user: User,
}

#[derive(Debug)]
pub enum UseCaseError {
    StorageError,
    InvalidSlackId,
    UserAlreadyExists,
}

impl From<UseCaseError> for StudySyncError {
    fn from(e: UseCaseError) -> Self {
        match e {
            UseCaseError::StorageError => Self::InternalError,
            UseCaseError::InvalidSlackId => {
                Self::BadClientData("The slackId can not be empty".into())
            }
            UseCaseError::UserAlreadyExists => Self::Conflict(
                "A user with that slackId already exist. SlackIds need to be unique.".into(),
            ),
        }
    }
}

#[async_trait::async_trait(?Send)]
impl UseCase for CreateUserUseCase {
    type Response = UseCaseRes;
    type Error = UseCaseError;

    const NAME: &'static str = "CreateUser";

    async fn execute(&mut self, ctx: &StudySyncContext) -> Result<Self::Response, Self::Error> {
        let slack_id = self.slack_id.trim();
        if slack_id.is_empty() {
            return Err(UseCaseError::InvalidSlackId);
        }
        if ctx.repos.users.find_by_slack_id(slack_id).await.is_some() {
            return Err(UseCaseError::UserAlreadyExists);
        }

        let user = User::new(self.name.trim().to_string(), slack_id.to_string());
        ctx.repos
            .users
            .insert(&user)
            .await
            .map_err(|_| UseCaseError::StorageError)?;

        Ok(UseCaseRes { user })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[actix_web::test]
    async fn it_rejects_duplicate_slack_ids() {
        let ctx = StudySyncContext::create_inmemory();

        let mut usecase = CreateUserUseCase {
            name: "Ada".into(),
            slack_id: "U0001".into(),
        };
        let res = usecase.execute(&ctx).await.expect("To create user");
        assert_eq!(res.user.name, "Ada");

        let mut usecase = CreateUserUseCase {
            name: "Ada again".into(),
            slack_id: " U0001 ".into(),
        };
        assert!(matches!(
            usecase.execute(&ctx).await,
            Err(UseCaseError::UserAlreadyExists)
        ));
    }
}
