use super::IExamDateRepo;
use crate::repos::shared::inmemory_repo::*;
use chrono::NaiveDate;
use std::sync::Mutex;
use studysync_domain::{ExamDate, ExamDateWrites, ID};

#[derive(Debug, Clone)]
struct ExamMember {
    exam_id: ID,
    user_id: ID,
}

pub struct InMemoryExamDateRepo {
    exam_dates: Mutex<Vec<ExamDate>>,
    members: Mutex<Vec<ExamMember>>,
}

impl InMemoryExamDateRepo {
    pub fn new() -> Self {
        Self {
            exam_dates: Mutex::new(vec![]),
            members: Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IExamDateRepo for InMemoryExamDateRepo {
    async fn find_by_exam(&self, exam_id: &ID) -> anyhow::Result<Vec<ExamDate>> {
        Ok(find_by(&self.exam_dates, |d| d.exam_id == *exam_id))
    }

    async fn find_by_exam_and_date(&self, exam_id: &ID, date: NaiveDate) -> Option<ExamDate> {
        find_by(&self.exam_dates, |d| d.exam_id == *exam_id && d.date == date).pop()
    }

    async fn find_by_exam_and_user(&self, exam_id: &ID, user_id: &ID) -> Option<ExamDate> {
        find_by(&self.exam_dates, |d| {
            d.exam_id == *exam_id && d.is_observed_by(user_id)
        })
        .pop()
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<ExamDate> {
        find_by(&self.exam_dates, |d| d.is_observed_by(user_id))
    }

    async fn find_member_ids(&self, exam_id: &ID) -> Vec<ID> {
        find_by(&self.members, |m| m.exam_id == *exam_id)
            .into_iter()
            .map(|m| m.user_id)
            .collect()
    }

    async fn apply(&self, writes: &ExamDateWrites) -> anyhow::Result<()> {
        // Both locks are held for the whole change
        let mut exam_dates = self.exam_dates.lock().unwrap();
        let mut members = self.members.lock().unwrap();

        writes.verify(&exam_dates)?;

        if let Some(user_id) = &writes.ensure_member {
            let is_member = members
                .iter()
                .any(|m| m.exam_id == writes.exam_id && m.user_id == *user_id);
            if !is_member {
                members.push(ExamMember {
                    exam_id: writes.exam_id.clone(),
                    user_id: user_id.clone(),
                });
            }
        }
        writes.apply_to(&mut exam_dates);

        Ok(())
    }

    async fn delete_orphaned(&self) -> Vec<ExamDate> {
        find_and_delete_by(&self.exam_dates, |d| d.user_ids.is_empty())
    }
}
