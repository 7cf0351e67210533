use crate::error::StudySyncError;
use actix_web::HttpRequest;
use studysync_domain::{User, ID};
use studysync_infra::StudySyncContext;

fn get_header<'a>(req: &'a HttpRequest, name: &str) -> Result<&'a str, StudySyncError> {
    match req.headers().get(name) {
        Some(value) => value
            .to_str()
            .map_err(|_| StudySyncError::Unauthorized(format!("Malformed {} header provided", name))),
        None => Err(StudySyncError::Unauthorized(format!(
            "Unable to find {} header",
            name
        ))),
    }
}

/// Only lets through requests that carry the api secret key in the `x-api-key` header
pub fn protect_admin_route(req: &HttpRequest, ctx: &StudySyncContext) -> Result<(), StudySyncError> {
    let api_key = get_header(req, "x-api-key")?;
    if api_key != ctx.config.api_secret_key {
        return Err(StudySyncError::Unauthorized(
            "Invalid api-key provided in x-api-key header".into(),
        ));
    }
    Ok(())
}

/// Like `protect_admin_route`, and also resolves the acting `User` from
/// the `x-user-id` header
pub async fn protect_route(
    req: &HttpRequest,
    ctx: &StudySyncContext,
) -> Result<User, StudySyncError> {
    protect_admin_route(req, ctx)?;

    let user_id = get_header(req, "x-user-id")?
        .parse::<ID>()
        .map_err(|e| StudySyncError::Unauthorized(format!("{}", e)))?;

    ctx.repos.users.find(&user_id).await.ok_or_else(|| {
        StudySyncError::Unauthorized("Unable to find user from credentials".into())
    })
}
