use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The points in time at which reminders are sent out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderSlot {
    WeekBefore,
    DayBefore,
    DayOf,
    FiveMinutesBefore,
    StartingNow,
}

impl ReminderSlot {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WeekBefore => "week-before",
            Self::DayBefore => "day-before",
            Self::DayOf => "day-of",
            Self::FiveMinutesBefore => "five-minutes-before",
            Self::StartingNow => "starting-now",
        }
    }
}

pub const EXAM_REMINDER_SLOTS: [ReminderSlot; 3] = [
    ReminderSlot::WeekBefore,
    ReminderSlot::DayBefore,
    ReminderSlot::DayOf,
];

/// Who a reminder is delivered to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderTarget {
    /// Direct message to a user, identified by the messaging identity
    User(String),
    /// A shared channel
    Channel(String),
}

/// A message that should be delivered at `remind_at`.
///
/// `ReminderEvent`s are never stored, the only record of them is the
/// queue of scheduled messages of the notification channel. They are
/// recognized there by `tag`, or by `text` when the channel does not
/// return tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ReminderEvent {
    pub slot: ReminderSlot,
    pub text: String,
    /// Timestamp in millis
    pub remind_at: i64,
    pub tag: String,
}

/// Local time of day that exam reminders are aligned to
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderAnchor {
    pub timezone: Tz,
    /// Hour of the day, 0-23
    pub hour: u32,
}

impl Default for ReminderAnchor {
    fn default() -> Self {
        Self {
            timezone: Tz::UTC,
            hour: 7,
        }
    }
}

impl ReminderAnchor {
    /// Timestamp in millis of the anchor time on the given local date.
    ///
    /// Day offsets are plain calendar day subtractions. When the anchor
    /// falls into a DST gap the first hour after the gap is used.
    pub fn timestamp_millis(&self, date: NaiveDate) -> i64 {
        let time = NaiveTime::from_hms_opt(self.hour, 0, 0).unwrap_or_default();
        let local = NaiveDateTime::new(date, time);

        self.timezone
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| {
                self.timezone
                    .from_local_datetime(&(local + Duration::hours(1)))
                    .earliest()
            })
            .map(|dt| dt.timestamp_millis())
            .unwrap_or_else(|| Utc.from_utc_datetime(&local).timestamp_millis())
    }
}

/// Text of the reminder sent at `slot`, for exam dates and study sessions alike
pub fn reminder_text(exam_name: &str, slot: ReminderSlot) -> String {
    match slot {
        ReminderSlot::WeekBefore => format!(
            "Your {} exam is in a week! Time to start studying together.",
            exam_name
        ),
        ReminderSlot::DayBefore => format!(
            "Your {} exam is tomorrow! Get some rest tonight.",
            exam_name
        ),
        ReminderSlot::DayOf => format!("Your {} exam is today! Good luck!", exam_name),
        ReminderSlot::FiveMinutesBefore => {
            format!("A {} study session starts in 5 minutes!", exam_name)
        }
        ReminderSlot::StartingNow => {
            format!("The {} study session is starting now!", exam_name)
        }
    }
}

pub fn exam_reminder_tag(exam_slug: &str, slot: ReminderSlot) -> String {
    format!("{}:{}", exam_slug, slot.as_str())
}

/// Plans the three reminders for an exam date: a week before, the day
/// before and on the day itself, all at the anchor time.
pub fn plan_exam_reminders(
    exam_name: &str,
    exam_slug: &str,
    exam_date: NaiveDate,
    anchor: &ReminderAnchor,
) -> [ReminderEvent; 3] {
    let event = |slot: ReminderSlot, days_before: i64| ReminderEvent {
        slot,
        text: reminder_text(exam_name, slot),
        remind_at: anchor.timestamp_millis(exam_date - Duration::days(days_before)),
        tag: exam_reminder_tag(exam_slug, slot),
    };

    [
        event(ReminderSlot::WeekBefore, 7),
        event(ReminderSlot::DayBefore, 1),
        event(ReminderSlot::DayOf, 0),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionReminderPlan {
    /// Five minutes before and at the start of the session
    pub reminders: [ReminderEvent; 2],
    /// Posted right away when the session is created
    pub announcement: String,
}

pub fn plan_session_reminders(
    exam_name: &str,
    exam_slug: &str,
    start_ts: i64,
    timezone: &Tz,
) -> SessionReminderPlan {
    let event = |slot: ReminderSlot, millis_before: i64| ReminderEvent {
        slot,
        text: reminder_text(exam_name, slot),
        remind_at: start_ts - millis_before,
        tag: format!("{}:session-{}:{}", exam_slug, start_ts, slot.as_str()),
    };

    let start = timezone
        .timestamp_millis_opt(start_ts)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M %Z").to_string())
        .unwrap_or_else(|| start_ts.to_string());

    SessionReminderPlan {
        reminders: [
            event(ReminderSlot::FiveMinutesBefore, 1000 * 60 * 5),
            event(ReminderSlot::StartingNow, 0),
        ],
        announcement: format!(
            "A new {} study session was scheduled for {}!",
            exam_name, start
        ),
    }
}
