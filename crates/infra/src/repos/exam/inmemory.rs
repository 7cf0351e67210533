use super::IExamRepo;
use crate::repos::shared::inmemory_repo::*;
use studysync_domain::{Exam, ID};

pub struct InMemoryExamRepo {
    exams: std::sync::Mutex<Vec<Exam>>,
}

impl InMemoryExamRepo {
    pub fn new() -> Self {
        Self {
            exams: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IExamRepo for InMemoryExamRepo {
    async fn insert(&self, exam: &Exam) -> anyhow::Result<()> {
        let mut exams = self.exams.lock().unwrap();
        if exams.iter().any(|e| e.slug == exam.slug) {
            return Err(anyhow::Error::msg(format!(
                "An exam with slug: {} already exists",
                exam.slug
            )));
        }
        exams.push(exam.clone());
        Ok(())
    }

    async fn save(&self, exam: &Exam) -> anyhow::Result<()> {
        save(exam, &self.exams);
        Ok(())
    }

    async fn find(&self, exam_id: &ID) -> Option<Exam> {
        find(exam_id, &self.exams)
    }

    async fn find_by_slug(&self, slug: &str) -> Option<Exam> {
        find_by(&self.exams, |e| e.slug == slug).pop()
    }

    async fn find_many(&self, exam_ids: &[ID]) -> Vec<Exam> {
        find_by(&self.exams, |e| exam_ids.contains(&e.id))
    }

    async fn find_all(&self) -> Vec<Exam> {
        find_by(&self.exams, |_| true)
    }
}
