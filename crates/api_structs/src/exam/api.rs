use crate::dtos::{ExamDTO, ExamDateDTO, ReminderSyncDTO, StudySessionDTO, UserDTO, UserExamDTO};
use serde::{Deserialize, Serialize};
use studysync_domain::{DateChangeKind, Exam, ExamDate};

/// Returned by every operation that sets the date a `User` observes
#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDateChangeResponse {
    pub exam: ExamDTO,
    pub exam_date: ExamDateDTO,
    /// How the date was set, e.g. `joined` or `forked`
    pub outcome: String,
    pub reminders: ReminderSyncDTO,
}

impl ExamDateChangeResponse {
    pub fn new(
        exam: Exam,
        exam_date: ExamDate,
        outcome: DateChangeKind,
        reminders: ReminderSyncDTO,
    ) -> Self {
        Self {
            exam: ExamDTO::new(exam),
            exam_date: ExamDateDTO::new(exam_date),
            outcome: outcome.as_str().to_string(),
            reminders,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ExamPathParams {
    pub slug: String,
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamDateRequestBody {
    /// Formatted as `YYYY-MM-DD`
    pub date: String,
}

pub mod create_exam {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub date: String,
    }

    pub type APIResponse = ExamDateChangeResponse;
}

pub mod join_exam {
    use super::*;

    pub type PathParams = ExamPathParams;
    pub type RequestBody = ExamDateRequestBody;
    pub type APIResponse = ExamDateChangeResponse;
}

pub mod change_date {
    use super::*;

    pub type PathParams = ExamPathParams;
    pub type RequestBody = ExamDateRequestBody;
    pub type APIResponse = ExamDateChangeResponse;
}

pub mod get_exam {
    use super::*;
    use studysync_domain::{StudySession, User};

    pub type PathParams = ExamPathParams;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub exam: ExamDTO,
        pub dates: Vec<ExamDateDTO>,
        pub members: Vec<UserDTO>,
        pub sessions: Vec<StudySessionDTO>,
    }

    impl APIResponse {
        pub fn new(
            exam: Exam,
            dates: Vec<ExamDate>,
            members: Vec<User>,
            sessions: Vec<StudySession>,
        ) -> Self {
            Self {
                exam: ExamDTO::new(exam),
                dates: dates.into_iter().map(ExamDateDTO::new).collect(),
                members: members.into_iter().map(UserDTO::new).collect(),
                sessions: sessions.into_iter().map(StudySessionDTO::new).collect(),
            }
        }
    }
}

pub mod get_exams {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub exams: Vec<ExamDTO>,
    }

    impl APIResponse {
        pub fn new(exams: Vec<Exam>) -> Self {
            Self {
                exams: exams.into_iter().map(ExamDTO::new).collect(),
            }
        }
    }
}

pub mod get_user_exams {
    use super::*;

    #[derive(Debug, Deserialize, Serialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub exams: Vec<UserExamDTO>,
    }
}
