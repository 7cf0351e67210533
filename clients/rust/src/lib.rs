mod base;
mod exam;
mod session;
mod status;
mod user;

pub(crate) use base::BaseClient;
pub use base::{APIError, APIResponse};
use exam::ExamClient;
pub use exam::{CreateExamInput, SetExamDateInput};
use session::StudySessionClient;
pub use session::CreateStudySessionInput;
use status::StatusClient;
use std::sync::Arc;
pub use studysync_api_structs::dtos::*;
pub use studysync_domain::ID;
use user::UserClient;
pub use user::CreateUserInput;

// Domain
pub use studysync_api_structs::dtos::ExamDTO as Exam;
pub use studysync_api_structs::dtos::ExamDateDTO as ExamDate;
pub use studysync_api_structs::dtos::StudySessionDTO as StudySession;
pub use studysync_api_structs::dtos::UserDTO as User;

/// StudySync Server SDK
///
/// The SDK contains methods for interacting with the StudySync server
/// API.
#[derive(Clone)]
pub struct StudySyncSDK {
    base: BaseClient,
    pub exam: ExamClient,
    pub session: StudySessionClient,
    pub status: StatusClient,
    pub user: UserClient,
}

impl StudySyncSDK {
    pub fn new<T: Into<String>>(address: String, api_key: T) -> Self {
        let mut base = BaseClient::new(address);
        base.set_api_key(api_key.into());
        Self::from_base(base)
    }

    /// Client that acts on behalf of the given user
    pub fn for_user(&self, user_id: &ID) -> Self {
        let mut base = self.base.clone();
        base.set_user_id(user_id.to_string());
        Self::from_base(base)
    }

    fn from_base(base: BaseClient) -> Self {
        let shared = Arc::new(base.clone());
        let exam = ExamClient::new(shared.clone());
        let session = StudySessionClient::new(shared.clone());
        let status = StatusClient::new(shared.clone());
        let user = UserClient::new(shared);

        Self {
            base,
            exam,
            session,
            status,
            user,
        }
    }
}
