use serde::{Deserialize, Serialize};
use studysync_domain::{StudySession, ID};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudySessionDTO {
    pub id: ID,
    pub exam_id: ID,
    pub created_by: ID,
    pub start_ts: i64,
}

impl StudySessionDTO {
    pub fn new(session: StudySession) -> Self {
        Self {
            id: session.id,
            exam_id: session.exam_id,
            created_by: session.created_by,
            start_ts: session.start_ts,
        }
    }
}
