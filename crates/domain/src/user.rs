use crate::shared::entity::{Entity, ID};

/// A member of the community. `slack_id` is the messaging identity
/// personal reminders are delivered to.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: ID,
    pub name: String,
    pub slack_id: String,
}

impl User {
    pub fn new(name: String, slack_id: String) -> Self {
        Self {
            id: Default::default(),
            name,
            slack_id,
        }
    }
}

impl Entity for User {
    fn id(&self) -> &ID {
        &self.id
    }
}
