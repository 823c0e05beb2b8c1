//! Achievement catalog and evaluation.
//!
//! Each achievement is a pure predicate over the engine snapshot plus an
//! optional reward item. A predicate that cannot decide (corrupt data in a
//! loaded snapshot, for instance) reports an error; evaluation treats that
//! as "not yet satisfied" and moves on.

use serde::Serialize;
use thiserror::Error;

use crate::engine::EngineState;
use crate::history::HistoryStatus;
use crate::items::Rarity;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CheckError {
    #[error("habit '{habit_id}' has a non-finite multiplier")]
    NonFiniteMultiplier { habit_id: String },
}

pub type Predicate = fn(&EngineState) -> Result<bool, CheckError>;

#[derive(Clone, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rarity: Rarity,
    /// Item id granted on unlock.
    pub reward: Option<&'static str>,
    #[serde(skip)]
    pub check: Predicate,
}

impl std::fmt::Debug for Achievement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Achievement")
            .field("id", &self.id)
            .field("reward", &self.reward)
            .finish_non_exhaustive()
    }
}

fn any_full_completion(state: &EngineState) -> Result<bool, CheckError> {
    Ok(state
        .history
        .days()
        .any(|(_, day)| day.values().any(|s| *s == HistoryStatus::Completed)))
}

fn max_streak_at_least(state: &EngineState, n: u32) -> bool {
    state.habits.iter().any(|h| h.streak >= n)
}

fn max_multiplier_at_least(state: &EngineState, n: f64) -> Result<bool, CheckError> {
    let mut reached = false;
    for habit in &state.habits {
        if !habit.multiplier.is_finite() {
            return Err(CheckError::NonFiniteMultiplier {
                habit_id: habit.id.clone(),
            });
        }
        reached |= habit.multiplier >= n;
    }
    Ok(reached)
}

fn all_completed_same_day(state: &EngineState) -> Result<bool, CheckError> {
    if state.habits.len() < 2 {
        return Ok(false);
    }
    Ok(state.history.days().any(|(_, day)| {
        state
            .habits
            .iter()
            .all(|h| day.get(&h.id) == Some(&HistoryStatus::Completed))
    }))
}

pub const ACHIEVEMENTS: &[Achievement] = &[
    // First steps
    Achievement {
        id: "first_habit",
        name: "First Step",
        description: "Complete your first habit",
        icon: "👣",
        rarity: Rarity::Common,
        reward: None,
        check: any_full_completion,
    },
    Achievement {
        id: "first_habit_added",
        name: "The Journey Begins",
        description: "Add your first habit",
        icon: "🌱",
        rarity: Rarity::Common,
        reward: None,
        check: |s| Ok(!s.habits.is_empty()),
    },
    Achievement {
        id: "three_habits",
        name: "Multitasker",
        description: "Add 3 different habits",
        icon: "🎯",
        rarity: Rarity::Common,
        reward: None,
        check: |s| Ok(s.habits.len() >= 3),
    },
    // Streaks
    Achievement {
        id: "streak_3",
        name: "Three in a Row",
        description: "Complete a habit 3 days in a row",
        icon: "🔥",
        rarity: Rarity::Common,
        reward: None,
        check: |s| Ok(max_streak_at_least(s, 3)),
    },
    Achievement {
        id: "streak_7",
        name: "Perfect Week",
        description: "Complete a habit 7 days in a row",
        icon: "⚡",
        rarity: Rarity::Rare,
        reward: Some("shield_of_streak"),
        check: |s| Ok(max_streak_at_least(s, 7)),
    },
    Achievement {
        id: "streak_14",
        name: "Unstoppable Fortnight",
        description: "Complete a habit 14 days in a row",
        icon: "🌟",
        rarity: Rarity::Rare,
        reward: Some("boost_potion"),
        check: |s| Ok(max_streak_at_least(s, 14)),
    },
    Achievement {
        id: "streak_30",
        name: "Iron Month",
        description: "Complete a habit 30 days in a row",
        icon: "💎",
        rarity: Rarity::Epic,
        reward: Some("double_elixir"),
        check: |s| Ok(max_streak_at_least(s, 30)),
    },
    Achievement {
        id: "streak_100",
        name: "Centurion",
        description: "Complete a habit 100 days in a row",
        icon: "🏛️",
        rarity: Rarity::Legendary,
        reward: Some("multiplier_gem"),
        check: |s| Ok(max_streak_at_least(s, 100)),
    },
    // All habits
    Achievement {
        id: "all_day",
        name: "Full Day",
        description: "Complete every habit on the same day",
        icon: "🌈",
        rarity: Rarity::Rare,
        reward: None,
        check: all_completed_same_day,
    },
    Achievement {
        id: "all_week",
        name: "Total Warrior",
        description: "Complete every due habit 7 days in a row",
        icon: "⚔️",
        rarity: Rarity::Epic,
        reward: Some("amulet_constancy"),
        check: |s| Ok(s.global_streak >= 7),
    },
    Achievement {
        id: "all_month",
        name: "Total Constancy",
        description: "Complete every due habit 30 days in a row",
        icon: "👑",
        rarity: Rarity::Legendary,
        reward: Some("multiplier_gem"),
        check: |s| Ok(s.global_streak >= 30),
    },
    // Multipliers
    Achievement {
        id: "mult_2",
        name: "Gear Up",
        description: "Reach x2.0 on any habit",
        icon: "⚙️",
        rarity: Rarity::Rare,
        reward: None,
        check: |s| max_multiplier_at_least(s, 2.0),
    },
    Achievement {
        id: "mult_3",
        name: "Turbocharged",
        description: "Reach x3.0 on any habit",
        icon: "🚀",
        rarity: Rarity::Epic,
        reward: Some("boost_potion"),
        check: |s| max_multiplier_at_least(s, 3.0),
    },
    Achievement {
        id: "mult_5",
        name: "God Mode",
        description: "Reach x5.0 on any habit",
        icon: "🌌",
        rarity: Rarity::Legendary,
        reward: Some("double_elixir"),
        check: |s| max_multiplier_at_least(s, 5.0),
    },
    // Levels
    Achievement {
        id: "level_1",
        name: "Initiate",
        description: "Reach level 1",
        icon: "🥉",
        rarity: Rarity::Common,
        reward: Some("shield_of_streak"),
        check: |s| Ok(s.level >= 1),
    },
    Achievement {
        id: "level_2",
        name: "Adventurer",
        description: "Reach level 2",
        icon: "🥈",
        rarity: Rarity::Rare,
        reward: Some("time_crystal"),
        check: |s| Ok(s.level >= 2),
    },
    Achievement {
        id: "level_3",
        name: "Master",
        description: "Reach level 3",
        icon: "🥇",
        rarity: Rarity::Epic,
        reward: Some("double_elixir"),
        check: |s| Ok(s.level >= 3),
    },
    Achievement {
        id: "level_5",
        name: "Legend",
        description: "Reach level 5",
        icon: "🏆",
        rarity: Rarity::Legendary,
        reward: Some("multiplier_gem"),
        check: |s| Ok(s.level >= 5),
    },
    // Collection
    Achievement {
        id: "collect_5",
        name: "Collector",
        description: "Hold 5 different items in your inventory",
        icon: "🎒",
        rarity: Rarity::Rare,
        reward: None,
        check: |s| Ok(s.inventory.len() >= 5),
    },
    // Points
    Achievement {
        id: "points_1000",
        name: "A Thousand Points",
        description: "Earn 1,000 points in total",
        icon: "💯",
        rarity: Rarity::Common,
        reward: None,
        check: |s| Ok(s.lifetime_points >= 1000),
    },
    Achievement {
        id: "points_10000",
        name: "Ten Thousand",
        description: "Earn 10,000 points in total",
        icon: "💰",
        rarity: Rarity::Rare,
        reward: None,
        check: |s| Ok(s.lifetime_points >= 10000),
    },
];

pub fn find_achievement(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

/// Achievements from `catalog` not yet unlocked in `state` whose predicate
/// now holds. Predicate errors count as "not satisfied".
pub fn newly_satisfied<'a>(catalog: &'a [Achievement], state: &EngineState) -> Vec<&'a Achievement> {
    catalog
        .iter()
        .filter(|a| !state.is_unlocked(a.id))
        .filter(|a| match (a.check)(state) {
            Ok(satisfied) => satisfied,
            Err(e) => {
                tracing::debug!(achievement = a.id, error = %e, "achievement check failed");
                false
            }
        })
        .collect()
}
