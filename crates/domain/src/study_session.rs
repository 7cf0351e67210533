use crate::shared::entity::{Entity, ID};

/// A study session for an `Exam`. Created once and never rescheduled.
#[derive(Debug, Clone, PartialEq)]
pub struct StudySession {
    pub id: ID,
    pub exam_id: ID,
    /// The `User` that created the session
    pub created_by: ID,
    /// Start of the session as a timestamp in millis
    pub start_ts: i64,
    /// The announcement has been posted in the exam channel
    pub announced: bool,
}

impl StudySession {
    pub fn new(exam_id: ID, created_by: ID, start_ts: i64) -> Self {
        Self {
            id: Default::default(),
            exam_id,
            created_by,
            start_ts,
            announced: false,
        }
    }
}

impl Entity for StudySession {
    fn id(&self) -> &ID {
        &self.id
    }
}
