use crate::error::StudySyncError;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use studysync_domain::{parse_date, ID};

pub struct Guard {}

impl Guard {
    pub fn against_malformed_date(val: &str) -> Result<NaiveDate, StudySyncError> {
        parse_date(val).map_err(|e| StudySyncError::BadClientData(format!("{}", e)))
    }

    pub fn against_empty_name(val: &str) -> Result<(), StudySyncError> {
        if val.trim().is_empty() {
            return Err(StudySyncError::BadClientData("Name can not be empty".into()));
        }
        Ok(())
    }
}

/// Users that currently have a mutation in flight.
///
/// A `User` can only have one mutation in flight at a time, the others are
/// rejected instead of queued.
#[derive(Debug, Clone, Default)]
pub struct InFlightMutations {
    users: Arc<Mutex<HashSet<ID>>>,
}

impl InFlightMutations {
    pub fn new() -> Self {
        Default::default()
    }

    /// Marks the `User` as busy until the returned permit is dropped
    pub fn acquire(&self, user_id: &ID) -> Result<MutationPermit, StudySyncError> {
        let mut users = self
            .users
            .lock()
            .map_err(|_| StudySyncError::InternalError)?;
        if !users.insert(user_id.clone()) {
            return Err(StudySyncError::Conflict(
                "Another change for this user is already in progress".into(),
            ));
        }
        Ok(MutationPermit {
            users: self.users.clone(),
            user_id: user_id.clone(),
        })
    }
}

#[derive(Debug)]
pub struct MutationPermit {
    users: Arc<Mutex<HashSet<ID>>>,
    user_id: ID,
}

impl Drop for MutationPermit {
    fn drop(&mut self) {
        if let Ok(mut users) = self.users.lock() {
            users.remove(&self.user_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_rejects_concurrent_mutations_for_same_user() {
        let in_flight = InFlightMutations::new();
        let user = ID::new();
        let other = ID::new();

        let permit = in_flight.acquire(&user).expect("To acquire permit");
        assert!(matches!(
            in_flight.acquire(&user),
            Err(StudySyncError::Conflict(_))
        ));
        assert!(in_flight.acquire(&other).is_ok());

        drop(permit);
        assert!(in_flight.acquire(&user).is_ok());
    }

    #[test]
    fn it_rejects_malformed_input() {
        assert!(Guard::against_malformed_date("2025-02-30").is_err());
        assert!(Guard::against_malformed_date("2025-06-10").is_ok());
        assert!(Guard::against_empty_name("   ").is_err());
        assert!(Guard::against_empty_name("Calculus").is_ok());
    }
}
