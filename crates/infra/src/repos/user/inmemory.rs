use super::IUserRepo;
use crate::repos::shared::inmemory_repo::*;
use studysync_domain::{User, ID};

pub struct InMemoryUserRepo {
    users: std::sync::Mutex<Vec<User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self {
            users: std::sync::Mutex::new(vec![]),
        }
    }
}

#[async_trait::async_trait]
impl IUserRepo for InMemoryUserRepo {
    async fn insert(&self, user: &User) -> anyhow::Result<()> {
        if !find_by(&self.users, |u| u.slack_id == user.slack_id).is_empty() {
            return Err(anyhow::Error::msg(format!(
                "A user with slack id: {} already exists",
                user.slack_id
            )));
        }
        insert(user, &self.users);
        Ok(())
    }

    async fn find(&self, user_id: &ID) -> Option<User> {
        find(user_id, &self.users)
    }

    async fn find_by_slack_id(&self, slack_id: &str) -> Option<User> {
        find_by(&self.users, |u| u.slack_id == slack_id).pop()
    }

    async fn find_many(&self, user_ids: &[ID]) -> Vec<User> {
        find_by(&self.users, |u| user_ids.contains(&u.id))
    }
}
