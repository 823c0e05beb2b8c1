//! Per-day resolution history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::habit::HabitId;

/// How a habit was resolved on a given day. Absence means undetermined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryStatus {
    Completed,
    /// Done for less than the configured minutes.
    Partial,
    /// Done for more than the configured minutes.
    Over,
    Failed,
}

impl HistoryStatus {
    pub fn is_success(self) -> bool {
        !matches!(self, HistoryStatus::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HistoryStatus::Completed => "completed",
            HistoryStatus::Partial => "partial",
            HistoryStatus::Over => "over",
            HistoryStatus::Failed => "failed",
        }
    }
}

/// `day -> habit -> status`. Serializes as `{"YYYY-MM-DD": {id: status}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(BTreeMap<NaiveDate, BTreeMap<HabitId, HistoryStatus>>);

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, date: NaiveDate, habit_id: &str) -> Option<HistoryStatus> {
        self.0.get(&date).and_then(|day| day.get(habit_id)).copied()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&BTreeMap<HabitId, HistoryStatus>> {
        self.0.get(&date)
    }

    pub fn set(&mut self, date: NaiveDate, habit_id: &str, status: HistoryStatus) {
        self.0
            .entry(date)
            .or_default()
            .insert(habit_id.to_string(), status);
    }

    pub fn days(&self) -> impl Iterator<Item = (&NaiveDate, &BTreeMap<HabitId, HistoryStatus>)> {
        self.0.iter()
    }

    /// Most recent first, `days` entries ending at `until`, `None` where unresolved.
    pub fn recent_for(
        &self,
        habit_id: &str,
        until: NaiveDate,
        days: u64,
    ) -> Vec<(NaiveDate, Option<HistoryStatus>)> {
        (0..days)
            .filter_map(|i| until.checked_sub_days(chrono::Days::new(i)))
            .map(|d| (d, self.status(d, habit_id)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
