//! Global streak: consecutive past days on which every due habit was completed.

use chrono::NaiveDate;

use crate::dates::is_due_on_date;
use crate::habit::Habit;
use crate::history::{History, HistoryStatus};

/// Walk back from the day before `today`.
///
/// A habit counts as due on a day only if it already existed then. Days with
/// nothing due are skipped without breaking the streak; the first day where
/// some due habit is not `completed` ends the walk.
pub fn global_streak(habits: &[Habit], history: &History, today: NaiveDate, lookback_days: u32) -> u32 {
    if habits.is_empty() {
        return 0;
    }
    let mut streak = 0;
    for days_ago in 1..=u64::from(lookback_days) {
        let Some(day) = today.checked_sub_days(chrono::Days::new(days_ago)) else {
            break;
        };
        let mut due = habits
            .iter()
            .filter(|h| h.created_at.date() <= day && is_due_on_date(h, day))
            .peekable();
        if due.peek().is_none() {
            continue;
        }
        if due.all(|h| history.status(day, &h.id) == Some(HistoryStatus::Completed)) {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}
