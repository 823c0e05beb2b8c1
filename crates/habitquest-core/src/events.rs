use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::history::HistoryStatus;
use crate::items::EffectCategory;

/// Every state change in the engine produces one or more events.
/// The shell turns them into notifications; callers may also inspect them.
/// An operation that was a no-op yields no events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngineEvent {
    HabitAdded {
        habit_id: String,
        name: String,
        at: NaiveDateTime,
    },
    HabitRemoved {
        habit_id: String,
        at: NaiveDateTime,
    },
    HabitUpdated {
        habit_id: String,
        at: NaiveDateTime,
    },
    HabitCompleted {
        habit_id: String,
        date: NaiveDate,
        status: HistoryStatus,
        earned: u64,
        multiplier: f64,
        streak: u32,
        /// True for the one-day-back correction paths.
        retroactive: bool,
        at: NaiveDateTime,
    },
    HabitFailed {
        habit_id: String,
        date: NaiveDate,
        multiplier: f64,
        /// Key of the shield that absorbed the penalty, if any.
        shield: Option<String>,
        at: NaiveDateTime,
    },
    LevelUp {
        level: u32,
        title: String,
        at: NaiveDateTime,
    },
    AchievementUnlocked {
        achievement_id: String,
        name: String,
        reward: Option<String>,
        at: NaiveDateTime,
    },
    ItemUsed {
        item_id: String,
        name: String,
        icon: String,
        category: EffectCategory,
        target: Option<String>,
        at: NaiveDateTime,
    },
    ItemGranted {
        item_id: String,
        qty: u32,
        at: NaiveDateTime,
    },
}
