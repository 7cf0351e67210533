use crate::base::{APIResponse, BaseClient};
use reqwest::StatusCode;
use std::sync::Arc;
use studysync_api_structs::*;

#[derive(Clone)]
pub struct StudySessionClient {
    base: Arc<BaseClient>,
}

#[derive(Debug, Clone)]
pub struct CreateStudySessionInput {
    pub exam_slug: String,
    /// Timestamp in millis
    pub start_ts: i64,
}

impl StudySessionClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(
        &self,
        input: CreateStudySessionInput,
    ) -> APIResponse<create_session::APIResponse> {
        let body = create_session::RequestBody {
            start_ts: input.start_ts,
        };
        self.base
            .post(
                body,
                format!("exams/{}/sessions", input.exam_slug),
                StatusCode::CREATED,
            )
            .await
    }
}
