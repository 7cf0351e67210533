use crate::shared::entity::{Entity, ID};
use itertools::Itertools;

/// An `Exam` that members of the community are studying for.
///
/// Members may disagree on when the `Exam` takes place, so the dates
/// are stored separately as `ExamDate`s.
#[derive(Debug, Clone, PartialEq)]
pub struct Exam {
    pub id: ID,
    pub name: String,
    /// Unique, derived from `name` with `slugify`
    pub slug: String,
    /// The notification channel shared by all members. `None` until
    /// the channel has been created.
    pub channel_id: Option<String>,
}

impl Exam {
    pub fn new(name: &str) -> Self {
        let name = name.trim().to_string();
        Self {
            id: Default::default(),
            slug: slugify(&name),
            name,
            channel_id: None,
        }
    }

    /// Name of the notification channel for this `Exam`
    pub fn channel_name(&self) -> String {
        format!("{}-exam", self.slug)
    }
}

impl Entity for Exam {
    fn id(&self) -> &ID {
        &self.id
    }
}

/// Lowercases the name and replaces every run of whitespace with a single hyphen
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .join("-")
}
