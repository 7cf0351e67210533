use super::IStudySessionRepo;
use crate::repos::shared::inmemory_repo::*;
use studysync_domain::{StudySession, ID};

pub struct InMemoryStudySessionRepo {
    sessions: std::sync::Mutex<Vec<StudySession>>,
}

impl InMemoryStudySessionRepo {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IStudySessionRepo for InMemoryStudySessionRepo {
    async fn insert(&self, session: &StudySession) -> anyhow::Result<()> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions
            .iter()
            .any(|s| s.exam_id == session.exam_id && s.start_ts == session.start_ts)
        {
            return Err(anyhow::Error::msg(format!(
                "Exam: {} already has a session starting at: {}",
                session.exam_id, session.start_ts
            )));
        }
        sessions.push(session.clone());
        Ok(())
    }

    async fn save(&self, session: &StudySession) -> anyhow::Result<()> {
        save(session, &self.sessions);
        Ok(())
    }

    async fn find(&self, session_id: &ID) -> Option<StudySession> {
        find(session_id, &self.sessions)
    }

    async fn find_by_exam_and_start(&self, exam_id: &ID, start_ts: i64) -> Option<StudySession> {
        find_by(&self.sessions, |s| s.exam_id == *exam_id && s.start_ts == start_ts).pop()
    }

    async fn find_by_exam(&self, exam_id: &ID) -> Vec<StudySession> {
        let mut sessions = find_by(&self.sessions, |s| s.exam_id == *exam_id);
        sessions.sort_by_key(|s| s.start_ts);
        sessions
    }
}
