use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use thiserror::Error;

/// A calendar date on which a group of `User`s expect an `Exam` to take place
#[derive(Debug, Clone, PartialEq)]
pub struct ExamDate {
    pub id: ID,
    pub exam_id: ID,
    pub date: NaiveDate,
    /// The `User`s observing this date. Never empty once stored.
    pub user_ids: Vec<ID>,
}

impl ExamDate {
    pub fn new(exam_id: ID, date: NaiveDate, first_observer: ID) -> Self {
        Self {
            id: Default::default(),
            exam_id,
            date,
            user_ids: vec![first_observer],
        }
    }

    pub fn is_observed_by(&self, user_id: &ID) -> bool {
        self.user_ids.contains(user_id)
    }

    pub fn is_sole_observer(&self, user_id: &ID) -> bool {
        self.user_ids.len() == 1 && self.is_observed_by(user_id)
    }
}

impl Entity for ExamDate {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateChangeKind {
    /// The `User` already observes the desired date
    Unchanged,
    /// The `User` had no date and attached to an existing one
    Joined,
    /// The `User` had no date and a new one was created
    Created,
    /// The `User` was the sole observer and moved to an existing date.
    /// The vacated date is deleted.
    Merged,
    /// The `User` was the sole observer and the date was mutated in place
    MovedInPlace,
    /// The `User` shared the old date and moved to an existing one
    Moved,
    /// The `User` shared the old date and a new one was created
    Forked,
}

impl DateChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unchanged => "unchanged",
            Self::Joined => "joined",
            Self::Created => "created",
            Self::Merged => "merged",
            Self::MovedInPlace => "movedInPlace",
            Self::Moved => "moved",
            Self::Forked => "forked",
        }
    }
}

/// State of an `ExamDate` that a `DateChange` was planned from
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedExamDate {
    pub id: ID,
    pub date: NaiveDate,
    /// Set when the plan relies on this `User` being the only observer
    pub sole_observer: Option<ID>,
}

/// The store no longer looks like the dates a `DateChange` was planned from
#[derive(Error, Debug, PartialEq)]
pub enum ExamDateConflict {
    #[error("Exam date: {0} no longer exists")]
    Gone(ID),
    #[error("Exam date: {0} has been moved")]
    Moved(ID),
    #[error("Exam date: {0} is observed by other users")]
    Shared(ID),
    #[error("Date: {0} already exists for the exam")]
    DateTaken(NaiveDate),
}

/// Writes to the store that make up a single `DateChange`.
/// They have to be applied atomically, and only while `expected` still holds.
#[derive(Debug, Clone, PartialEq)]
pub struct ExamDateWrites {
    pub exam_id: ID,
    pub expected: Vec<ExpectedExamDate>,
    /// `User` that has to be a member of the `Exam` afterwards
    pub ensure_member: Option<ID>,
    pub insert: Option<ExamDate>,
    /// (exam date, new calendar date)
    pub move_date: Option<(ID, NaiveDate)>,
    /// (exam date, user)
    pub detach: Option<(ID, ID)>,
    /// (exam date, user)
    pub attach: Option<(ID, ID)>,
    pub delete: Option<ID>,
}

impl ExamDateWrites {
    fn new(exam_id: &ID, user_id: &ID) -> Self {
        Self {
            exam_id: exam_id.clone(),
            expected: Vec::new(),
            ensure_member: Some(user_id.clone()),
            insert: None,
            move_date: None,
            detach: None,
            attach: None,
            delete: None,
        }
    }

    fn expect_date(&mut self, exam_date: &ExamDate, sole_observer: Option<&ID>) {
        self.expected.push(ExpectedExamDate {
            id: exam_date.id.clone(),
            date: exam_date.date,
            sole_observer: sole_observer.cloned(),
        });
    }

    /// Checks that the writes can be applied to the current `dates` of the `Exam`
    pub fn verify(&self, dates: &[ExamDate]) -> Result<(), ExamDateConflict> {
        let dates = dates
            .iter()
            .filter(|d| d.exam_id == self.exam_id)
            .collect::<Vec<_>>();

        for expected in &self.expected {
            let current = dates
                .iter()
                .find(|d| d.id == expected.id)
                .ok_or_else(|| ExamDateConflict::Gone(expected.id.clone()))?;
            if current.date != expected.date {
                return Err(ExamDateConflict::Moved(expected.id.clone()));
            }
            if let Some(user_id) = &expected.sole_observer {
                if !current.is_sole_observer(user_id) {
                    return Err(ExamDateConflict::Shared(expected.id.clone()));
                }
            }
        }

        if let Some(inserted) = &self.insert {
            if dates.iter().any(|d| d.date == inserted.date) {
                return Err(ExamDateConflict::DateTaken(inserted.date));
            }
        }
        if let Some((exam_date_id, date)) = &self.move_date {
            if dates.iter().any(|d| d.id != *exam_date_id && d.date == *date) {
                return Err(ExamDateConflict::DateTaken(*date));
            }
        }

        Ok(())
    }

    /// Applies the date writes to an in-memory collection of `ExamDate`s.
    /// Exam membership is not part of the collection and is left to the caller.
    pub fn apply_to(&self, dates: &mut Vec<ExamDate>) {
        if let Some(exam_date) = &self.insert {
            dates.push(exam_date.clone());
        }
        if let Some((exam_date_id, date)) = &self.move_date {
            if let Some(exam_date) = dates.iter_mut().find(|d| d.id == *exam_date_id) {
                exam_date.date = *date;
            }
        }
        if let Some((exam_date_id, user_id)) = &self.detach {
            if let Some(exam_date) = dates.iter_mut().find(|d| d.id == *exam_date_id) {
                exam_date.user_ids.retain(|id| id != user_id);
            }
        }
        if let Some((exam_date_id, user_id)) = &self.attach {
            if let Some(exam_date) = dates.iter_mut().find(|d| d.id == *exam_date_id) {
                if !exam_date.is_observed_by(user_id) {
                    exam_date.user_ids.push(user_id.clone());
                }
            }
        }
        if let Some(exam_date_id) = &self.delete {
            dates.retain(|d| d.id != *exam_date_id);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DateChange {
    pub kind: DateChangeKind,
    /// The date observed by the `User` after the change
    pub exam_date: ExamDate,
    /// The date observed by the `User` before the change
    pub previous: Option<ExamDate>,
    pub writes: ExamDateWrites,
}

/// Decides how `user_id` ends up observing `desired` among the `dates` of an `Exam`.
///
/// A date is only mutated in place when the `User` is its sole observer,
/// otherwise the other observers would have their date moved under them.
pub fn plan_date_change(
    exam_id: &ID,
    dates: &[ExamDate],
    user_id: &ID,
    desired: NaiveDate,
) -> DateChange {
    let current = dates
        .iter()
        .find(|d| d.exam_id == *exam_id && d.is_observed_by(user_id));
    let existing = dates
        .iter()
        .find(|d| d.exam_id == *exam_id && d.date == desired);
    let mut writes = ExamDateWrites::new(exam_id, user_id);

    let with_user = |exam_date: &ExamDate| {
        let mut exam_date = exam_date.clone();
        if !exam_date.is_observed_by(user_id) {
            exam_date.user_ids.push(user_id.clone());
        }
        exam_date
    };

    let (kind, exam_date) = match (current, existing) {
        (Some(current), _) if current.date == desired => (DateChangeKind::Unchanged, current.clone()),
        (None, Some(existing)) => {
            writes.expect_date(existing, None);
            writes.attach = Some((existing.id.clone(), user_id.clone()));
            (DateChangeKind::Joined, with_user(existing))
        }
        (None, None) => {
            let created = ExamDate::new(exam_id.clone(), desired, user_id.clone());
            writes.insert = Some(created.clone());
            (DateChangeKind::Created, created)
        }
        (Some(current), Some(existing)) if current.is_sole_observer(user_id) => {
            writes.expect_date(current, Some(user_id));
            writes.expect_date(existing, None);
            writes.attach = Some((existing.id.clone(), user_id.clone()));
            writes.delete = Some(current.id.clone());
            (DateChangeKind::Merged, with_user(existing))
        }
        (Some(current), None) if current.is_sole_observer(user_id) => {
            writes.expect_date(current, Some(user_id));
            writes.move_date = Some((current.id.clone(), desired));
            let mut moved = current.clone();
            moved.date = desired;
            (DateChangeKind::MovedInPlace, moved)
        }
        (Some(current), Some(existing)) => {
            writes.expect_date(current, None);
            writes.expect_date(existing, None);
            writes.detach = Some((current.id.clone(), user_id.clone()));
            writes.attach = Some((existing.id.clone(), user_id.clone()));
            (DateChangeKind::Moved, with_user(existing))
        }
        (Some(current), None) => {
            writes.expect_date(current, None);
            writes.detach = Some((current.id.clone(), user_id.clone()));
            let created = ExamDate::new(exam_id.clone(), desired, user_id.clone());
            writes.insert = Some(created.clone());
            (DateChangeKind::Forked, created)
        }
    };

    DateChange {
        kind,
        exam_date,
        previous: current.cloned(),
        writes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn apply(change: &DateChange, dates: &[ExamDate]) -> Vec<ExamDate> {
        let mut dates = dates.to_vec();
        change.writes.apply_to(&mut dates);
        dates
    }

    fn assert_no_orphans(dates: &[ExamDate]) {
        for d in dates {
            assert!(!d.user_ids.is_empty(), "Date {} has no observers", d.date);
        }
    }

    #[test]
    fn first_user_creates_date() {
        let exam_id = ID::new();
        let user = ID::new();

        let change = plan_date_change(&exam_id, &[], &user, date(10));
        assert_eq!(change.kind, DateChangeKind::Created);
        assert!(change.previous.is_none());
        assert_eq!(change.writes.ensure_member, Some(user.clone()));

        let dates = apply(&change, &[]);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].date, date(10));
        assert_eq!(dates[0].user_ids, vec![user]);
    }

    #[test]
    fn joining_user_attaches_to_matching_date() {
        let exam_id = ID::new();
        let existing = ExamDate::new(exam_id.clone(), date(10), ID::new());
        let user = ID::new();

        let change = plan_date_change(&exam_id, &[existing.clone()], &user, date(10));
        assert_eq!(change.kind, DateChangeKind::Joined);
        assert_eq!(change.exam_date.id, existing.id);

        let dates = apply(&change, &[existing]);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].user_ids.len(), 2);
        assert!(dates[0].is_observed_by(&user));
    }

    #[test]
    fn joining_user_with_other_date_creates_new_date() {
        let exam_id = ID::new();
        let existing = ExamDate::new(exam_id.clone(), date(10), ID::new());
        let user = ID::new();

        let change = plan_date_change(&exam_id, &[existing.clone()], &user, date(12));
        assert_eq!(change.kind, DateChangeKind::Created);

        let dates = apply(&change, &[existing.clone()]);
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0], existing);
    }

    #[test]
    fn same_date_is_unchanged() {
        let exam_id = ID::new();
        let user = ID::new();
        let existing = ExamDate::new(exam_id.clone(), date(10), user.clone());

        let change = plan_date_change(&exam_id, &[existing.clone()], &user, date(10));
        assert_eq!(change.kind, DateChangeKind::Unchanged);
        assert_eq!(apply(&change, &[existing.clone()]), vec![existing]);
    }

    #[test]
    fn sole_observer_mutates_in_place() {
        let exam_id = ID::new();
        let user = ID::new();
        let existing = ExamDate::new(exam_id.clone(), date(10), user.clone());

        let change = plan_date_change(&exam_id, &[existing.clone()], &user, date(15));
        assert_eq!(change.kind, DateChangeKind::MovedInPlace);
        assert_eq!(change.previous.as_ref().map(|d| d.date), Some(date(10)));

        let dates = apply(&change, &[existing.clone()]);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].id, existing.id);
        assert_eq!(dates[0].date, date(15));
        assert_no_orphans(&dates);
    }

    #[test]
    fn sole_observer_merges_into_existing_date() {
        let exam_id = ID::new();
        let user = ID::new();
        let own = ExamDate::new(exam_id.clone(), date(10), user.clone());
        let other = ExamDate::new(exam_id.clone(), date(15), ID::new());

        let change = plan_date_change(&exam_id, &[own.clone(), other.clone()], &user, date(15));
        assert_eq!(change.kind, DateChangeKind::Merged);

        let dates = apply(&change, &[own, other.clone()]);
        assert_eq!(dates.len(), 1);
        assert_eq!(dates[0].id, other.id);
        assert_eq!(dates[0].user_ids.len(), 2);
        assert_no_orphans(&dates);
    }

    #[test]
    fn shared_observer_forks_without_touching_others() {
        let exam_id = ID::new();
        let user = ID::new();
        let other_user = ID::new();
        let mut shared = ExamDate::new(exam_id.clone(), date(10), other_user.clone());
        shared.user_ids.push(user.clone());

        let change = plan_date_change(&exam_id, &[shared.clone()], &user, date(15));
        assert_eq!(change.kind, DateChangeKind::Forked);

        let dates = apply(&change, &[shared.clone()]);
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].id, shared.id);
        assert_eq!(dates[0].date, date(10));
        assert_eq!(dates[0].user_ids, vec![other_user]);
        assert_eq!(dates[1].date, date(15));
        assert_eq!(dates[1].user_ids, vec![user]);
        assert_no_orphans(&dates);
    }

    #[test]
    fn shared_observer_moves_to_existing_date() {
        let exam_id = ID::new();
        let user = ID::new();
        let mut shared = ExamDate::new(exam_id.clone(), date(10), ID::new());
        shared.user_ids.push(user.clone());
        let other = ExamDate::new(exam_id.clone(), date(15), ID::new());

        let change = plan_date_change(&exam_id, &[shared.clone(), other.clone()], &user, date(15));
        assert_eq!(change.kind, DateChangeKind::Moved);

        let dates = apply(&change, &[shared.clone(), other]);
        assert_eq!(dates.len(), 2);
        assert_eq!(dates[0].date, date(10));
        assert_eq!(dates[0].user_ids.len(), 1);
        assert!(dates[1].is_observed_by(&user));
        assert_no_orphans(&dates);
    }

    #[test]
    fn plan_is_stale_once_another_user_joins_the_moved_date() {
        let exam_id = ID::new();
        let ada = ID::new();
        let own = ExamDate::new(exam_id.clone(), date(10), ada.clone());

        let change = plan_date_change(&exam_id, &[own.clone()], &ada, date(20));
        assert_eq!(change.kind, DateChangeKind::MovedInPlace);
        assert_eq!(change.writes.verify(&[own.clone()]), Ok(()));

        let mut shared = own.clone();
        shared.user_ids.push(ID::new());
        assert_eq!(
            change.writes.verify(&[shared]),
            Err(ExamDateConflict::Shared(own.id))
        );
    }

    #[test]
    fn plan_is_stale_once_the_target_date_is_gone() {
        let exam_id = ID::new();
        let ada = ID::new();
        let other = ExamDate::new(exam_id.clone(), date(15), ID::new());

        let change = plan_date_change(&exam_id, &[other.clone()], &ada, date(15));
        assert_eq!(change.kind, DateChangeKind::Joined);
        assert_eq!(
            change.writes.verify(&[]),
            Err(ExamDateConflict::Gone(other.id.clone()))
        );

        let mut moved = other.clone();
        moved.date = date(16);
        assert_eq!(
            change.writes.verify(&[moved]),
            Err(ExamDateConflict::Moved(other.id))
        );
    }

    #[test]
    fn moving_onto_a_taken_date_is_rejected() {
        let exam_id = ID::new();
        let ada = ID::new();
        let own = ExamDate::new(exam_id.clone(), date(10), ada.clone());

        let change = plan_date_change(&exam_id, &[own.clone()], &ada, date(20));
        let created = ExamDate::new(exam_id, date(20), ID::new());
        assert_eq!(
            change.writes.verify(&[own, created]),
            Err(ExamDateConflict::DateTaken(date(20)))
        );
    }

    #[test]
    fn dates_of_other_exams_are_ignored() {
        let exam_id = ID::new();
        let user = ID::new();
        let foreign = ExamDate::new(ID::new(), date(10), user.clone());

        let change = plan_date_change(&exam_id, &[foreign], &user, date(10));
        assert_eq!(change.kind, DateChangeKind::Created);
        assert_eq!(change.exam_date.exam_id, exam_id);
    }
}
