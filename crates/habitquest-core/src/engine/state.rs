//! The persisted engine snapshot.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::habit::{Habit, HabitId};
use crate::history::History;
use crate::items::ActiveEffect;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub item_id: String,
    pub qty: u32,
}

/// Everything the engine owns. Callers get read-only views of it; the
/// store persists it verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineState {
    pub habits: Vec<Habit>,
    pub history: History,
    /// Points within the current level.
    pub points: u64,
    /// Points ever earned. Never decreases.
    pub lifetime_points: u64,
    pub level: u32,
    pub global_streak: u32,
    pub unlocked_achievements: BTreeSet<String>,
    pub inventory: Vec<InventoryEntry>,
    pub active_effects: Vec<ActiveEffect>,
}

impl EngineState {
    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|h| h.id == id)
    }

    pub(crate) fn habit_mut(&mut self, id: &str) -> Option<&mut Habit> {
        self.habits.iter_mut().find(|h| h.id == id)
    }

    pub fn has_habit(&self, id: &HabitId) -> bool {
        self.habit(id).is_some()
    }

    pub fn item_qty(&self, item_id: &str) -> u32 {
        self.inventory
            .iter()
            .find(|e| e.item_id == item_id)
            .map_or(0, |e| e.qty)
    }

    pub fn is_unlocked(&self, achievement_id: &str) -> bool {
        self.unlocked_achievements.contains(achievement_id)
    }

    /// Remove one unit, dropping the entry at zero. False if none held.
    pub(crate) fn take_item(&mut self, item_id: &str) -> bool {
        let Some(pos) = self.inventory.iter().position(|e| e.item_id == item_id && e.qty > 0) else {
            return false;
        };
        self.inventory[pos].qty -= 1;
        if self.inventory[pos].qty == 0 {
            self.inventory.remove(pos);
        }
        true
    }

    /// Add one unit up to `max_stack`. False if already at the cap.
    pub(crate) fn give_item(&mut self, item_id: &str, max_stack: u32) -> bool {
        match self.inventory.iter_mut().find(|e| e.item_id == item_id) {
            Some(entry) if entry.qty >= max_stack => false,
            Some(entry) => {
                entry.qty += 1;
                true
            }
            None if max_stack == 0 => false,
            None => {
                self.inventory.push(InventoryEntry {
                    item_id: item_id.to_string(),
                    qty: 1,
                });
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inventory_stack_and_removal() {
        let mut state = EngineState::default();
        assert!(!state.take_item("lucky_coin"));
        assert!(state.give_item("lucky_coin", 2));
        assert!(state.give_item("lucky_coin", 2));
        assert!(!state.give_item("lucky_coin", 2));
        assert_eq!(state.item_qty("lucky_coin"), 2);
        assert!(state.take_item("lucky_coin"));
        assert!(state.take_item("lucky_coin"));
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn fresh_state_deserializes_from_empty_object() {
        let state: EngineState = serde_json::from_str("{}").unwrap();
        assert_eq!(state, EngineState::default());
        assert_eq!(state.level, 0);
        assert_eq!(state.points, 0);
    }
}
