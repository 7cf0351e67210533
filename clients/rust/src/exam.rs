use crate::base::{APIResponse, BaseClient};
use reqwest::StatusCode;
use std::sync::Arc;
use studysync_api_structs::*;

#[derive(Clone)]
pub struct ExamClient {
    base: Arc<BaseClient>,
}

pub struct CreateExamInput {
    pub name: String,
    /// Formatted as `YYYY-MM-DD`
    pub date: String,
}

pub struct SetExamDateInput {
    pub slug: String,
    /// Formatted as `YYYY-MM-DD`
    pub date: String,
}

impl ExamClient {
    pub(crate) fn new(base: Arc<BaseClient>) -> Self {
        Self { base }
    }

    pub async fn create(&self, input: CreateExamInput) -> APIResponse<create_exam::APIResponse> {
        let body = create_exam::RequestBody {
            name: input.name,
            date: input.date,
        };
        self.base
            .post(body, "exams".into(), StatusCode::CREATED)
            .await
    }

    pub async fn join(&self, input: SetExamDateInput) -> APIResponse<join_exam::APIResponse> {
        let body = join_exam::RequestBody { date: input.date };
        self.base
            .post(body, format!("exams/{}/join", input.slug), StatusCode::OK)
            .await
    }

    pub async fn change_date(
        &self,
        input: SetExamDateInput,
    ) -> APIResponse<change_date::APIResponse> {
        let body = change_date::RequestBody { date: input.date };
        self.base
            .put(body, format!("exams/{}/date", input.slug), StatusCode::OK)
            .await
    }

    pub async fn get(&self, slug: &str) -> APIResponse<get_exam::APIResponse> {
        self.base
            .get(format!("exams/{}", slug), StatusCode::OK)
            .await
    }

    pub async fn get_all(&self) -> APIResponse<get_exams::APIResponse> {
        self.base.get("exams".into(), StatusCode::OK).await
    }

    /// The exams of the acting user
    pub async fn get_mine(&self) -> APIResponse<get_user_exams::APIResponse> {
        self.base.get("me/exams".into(), StatusCode::OK).await
    }
}
