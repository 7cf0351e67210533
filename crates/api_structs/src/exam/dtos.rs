use serde::{Deserialize, Serialize};
use studysync_domain::{format_date, Exam, ExamDate, ID};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamDTO {
    pub id: ID,
    pub name: String,
    pub slug: String,
    pub channel_id: Option<String>,
}

impl ExamDTO {
    pub fn new(exam: Exam) -> Self {
        Self {
            id: exam.id,
            name: exam.name,
            slug: exam.slug,
            channel_id: exam.channel_id,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExamDateDTO {
    pub id: ID,
    /// Formatted as `YYYY-MM-DD`
    pub date: String,
    pub user_ids: Vec<ID>,
}

impl ExamDateDTO {
    pub fn new(exam_date: ExamDate) -> Self {
        Self {
            id: exam_date.id,
            date: format_date(&exam_date.date),
            user_ids: exam_date.user_ids,
        }
    }
}

/// An `Exam` together with the date the `User` observes
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserExamDTO {
    pub exam: ExamDTO,
    pub date: String,
}

/// Outcome of syncing the reminders of a `User` with the notification channel
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReminderSyncDTO {
    pub cancelled: usize,
    pub failed_cancels: usize,
    pub scheduled: usize,
    pub skipped_past_due: usize,
}
