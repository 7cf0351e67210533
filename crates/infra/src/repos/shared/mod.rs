pub mod inmemory_repo;

#[cfg(test)]
pub mod test_helpers {
    use crate::{setup_context, StudySyncContext};
    use studysync_domain::{Exam, User};
    use studysync_utils::create_random_secret;

    /// Postgres context when `DATABASE_URL` is set, in-memory otherwise.
    /// The database is shared between tests so every fixture gets a unique name.
    pub async fn setup() -> StudySyncContext {
        setup_context().await.expect("To setup context")
    }

    pub async fn insert_exam(ctx: &StudySyncContext, name: &str) -> Exam {
        let exam = Exam::new(&format!("{} {}", name, create_random_secret(8)));
        ctx.repos.exams.insert(&exam).await.expect("To insert exam");
        exam
    }

    pub async fn insert_user(ctx: &StudySyncContext, name: &str) -> User {
        let user = User::new(name.into(), format!("U{}", create_random_secret(10)));
        ctx.repos.users.insert(&user).await.expect("To insert user");
        user
    }
}
