//! Calendar-day keys and due-date rules.
//!
//! History is keyed by local calendar day. Keys render as `YYYY-MM-DD`,
//! which is also how `NaiveDate` serializes, so persisted snapshots and
//! CLI output agree on one format.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Weekday};

use crate::error::ValidationError;
use crate::habit::{Habit, Periodicity};

pub const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

/// Calendar day `days_ago` days before `now`.
pub fn date_key(now: NaiveDateTime, days_ago: u64) -> NaiveDate {
    now.date()
        .checked_sub_days(Days::new(days_ago))
        .unwrap_or(NaiveDate::MIN)
}

pub fn today_key(now: NaiveDateTime) -> NaiveDate {
    date_key(now, 0)
}

pub fn yesterday_key(now: NaiveDateTime) -> NaiveDate {
    date_key(now, 1)
}

pub fn format_key(date: NaiveDate) -> String {
    date.format(DATE_KEY_FORMAT).to_string()
}

pub fn parse_key(key: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(key.trim(), DATE_KEY_FORMAT).map_err(|e| ValidationError::InvalidValue {
        field: "date".into(),
        message: format!("'{key}' is not a YYYY-MM-DD date: {e}"),
    })
}

/// Whether `habit` is expected to be done on `date`.
///
/// Custom schedules match on the weekday set OR on the interval counted
/// from the creation day; days before creation never match the interval.
/// A custom schedule with neither part set is due every day.
pub fn is_due_on_date(habit: &Habit, date: NaiveDate) -> bool {
    match &habit.periodicity {
        Periodicity::Daily => true,
        Periodicity::Weekly => date.weekday() == Weekday::Mon,
        Periodicity::Monthly => date.day() == 1,
        Periodicity::Custom {
            days_of_week,
            interval_days,
        } => {
            if days_of_week.is_empty() && interval_days.is_none() {
                return true;
            }
            let weekday = date.weekday().number_from_monday() as u8;
            let on_weekday = days_of_week.contains(&weekday);
            let on_interval = interval_days.is_some_and(|n| {
                let since = (date - habit.created_at.date()).num_days();
                n > 0 && since >= 0 && since % i64::from(n) == 0
            });
            on_weekday || on_interval
        }
    }
}
