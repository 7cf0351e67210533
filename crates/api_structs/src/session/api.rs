use crate::dtos::StudySessionDTO;
use serde::{Deserialize, Serialize};
use studysync_domain::StudySession;

pub mod create_session {
    use super::*;

    pub type PathParams = crate::exam::api::ExamPathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        /// Timestamp in millis
        pub start_ts: i64,
    }

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub session: StudySessionDTO,
    }

    impl APIResponse {
        pub fn new(session: StudySession) -> Self {
            Self {
                session: StudySessionDTO::new(session),
            }
        }
    }
}
