mod date;
mod exam;
mod exam_date;
mod reminder;
mod shared;
mod study_session;
mod user;

pub use chrono_tz::Tz;
pub use date::{format_date, parse_date, InvalidDateError};
pub use exam::{slugify, Exam};
pub use exam_date::{
    plan_date_change, DateChange, DateChangeKind, ExamDate, ExamDateConflict, ExamDateWrites,
    ExpectedExamDate,
};
pub use reminder::{
    exam_reminder_tag, plan_exam_reminders, plan_session_reminders, reminder_text,
    ReminderAnchor, ReminderEvent, ReminderSlot, ReminderTarget, SessionReminderPlan,
    EXAM_REMINDER_SLOTS,
};
pub use shared::entity::{Entity, InvalidIDError, ID};
pub use study_session::StudySession;
pub use user::User;
