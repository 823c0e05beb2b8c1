//! Progression engine.
//!
//! The engine is split in two. [`reduce`] is a pure function from
//! `(state, action, context)` to the next state plus events. [`Engine`] is
//! the shell around it: it reads the clock, asks the reducer for the next
//! snapshot, hands that snapshot to the store and only then swaps it in,
//! and feeds the resulting events to the notification queue.
//!
//! A failed save leaves the in-memory state untouched, so the engine never
//! runs ahead of what is persisted.

mod levels;
mod reducer;
mod rules;
mod state;
mod streak;

pub use levels::{apply_points, level_info, threshold, title, LevelInfo, LEVEL_THRESHOLDS, LEVEL_TITLES};
pub use reducer::{reduce, round_points, Action, CompletionMode, Context, Transition};
pub use rules::{round1, Rules};
pub use state::{EngineState, InventoryEntry};
pub use streak::global_streak;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::achievements::{Achievement, ACHIEVEMENTS};
use crate::clock::{Clock, SystemClock};
use crate::dates::today_key;
use crate::error::Result;
use crate::events::EngineEvent;
use crate::habit::{Habit, HabitId, HabitPatch, HabitSpec};
use crate::items::{active_effects_at, ActiveEffect};
use crate::notifications::{Notification, NotificationQueue};
use crate::storage::{data_dir, Config, JsonFileStore, StateStore};

/// Multiplier every new habit starts at.
pub const BASE_MULTIPLIER: f64 = 1.0;

pub struct Engine {
    state: EngineState,
    rules: Rules,
    clock: Box<dyn Clock>,
    store: Option<Box<dyn StateStore>>,
    notifications: NotificationQueue,
    achievements: &'static [Achievement],
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("state", &self.state)
            .field("rules", &self.rules)
            .field("persistent", &self.store.is_some())
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// An engine over `state` with no store attached.
    ///
    /// # Errors
    ///
    /// Returns a config error if `rules` fail [`Rules::validate`].
    pub fn new(state: EngineState, rules: Rules, clock: impl Clock + 'static) -> Result<Self> {
        rules.validate()?;
        Ok(Self {
            state,
            rules,
            clock: Box::new(clock),
            store: None,
            notifications: NotificationQueue::default(),
            achievements: ACHIEVEMENTS,
        })
    }

    /// Load the snapshot from `store` (defaults when it holds none) and
    /// persist every later transition to it.
    pub fn open(store: impl StateStore + 'static, rules: Rules, clock: impl Clock + 'static) -> Result<Self> {
        let state = store.load()?.unwrap_or_default();
        Ok(Self::new(state, rules, clock)?.with_store(store))
    }

    /// Engine backed by the JSON snapshot in the data directory, using the
    /// rules and notification settings from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let store = JsonFileStore::new(config.state_path(&data_dir()?));
        debug!(path = %store.path().display(), "opening state");
        Ok(Self::open(store, config.rules.clone(), SystemClock)?.with_notifications(config.notification_queue()))
    }

    pub fn with_store(mut self, store: impl StateStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_notifications(mut self, queue: NotificationQueue) -> Self {
        self.notifications = queue;
        self
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.state.habit(id)
    }

    pub fn habits(&self) -> &[Habit] {
        &self.state.habits
    }

    /// Effects active at the current clock instant.
    pub fn active_effects(&self) -> Vec<&ActiveEffect> {
        active_effects_at(&self.state.active_effects, self.clock.now())
    }

    /// Calendar date of the current clock instant.
    pub fn today(&self) -> NaiveDate {
        today_key(self.clock.now())
    }

    pub fn level_info(&self) -> LevelInfo {
        level_info(self.state.level, self.state.points)
    }

    /// Notifications still visible now.
    pub fn notifications(&mut self) -> &[Notification] {
        let now = self.clock.now();
        self.notifications.visible(now)
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications.is_enabled()
    }

    pub fn dismiss_notification(&mut self, id: u64) -> bool {
        self.notifications.dismiss(id)
    }

    /// Run one action through the reducer and commit the result.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bad input, or the store's error if
    /// the new snapshot could not be saved. In both cases the state is
    /// unchanged.
    pub fn dispatch(&mut self, action: Action) -> Result<Vec<EngineEvent>> {
        let now = self.clock.now();
        let ctx = Context {
            now,
            rules: &self.rules,
            achievements: self.achievements,
        };
        let Transition { state, events } = reduce(&self.state, &action, &ctx)?;

        if state != self.state {
            if let Some(store) = self.store.as_mut() {
                if let Err(e) = store.save(&state) {
                    warn!(error = %e, "failed to save state; keeping previous snapshot");
                    return Err(e);
                }
            }
            self.state = state;
        }
        if events.is_empty() {
            debug!(?action, "no-op");
        }
        self.notifications.push_events(&events, now);
        Ok(events)
    }

    /// Add a habit under a fresh id and return that id.
    pub fn add_habit(&mut self, spec: HabitSpec) -> Result<HabitId> {
        let id = Uuid::new_v4().to_string();
        self.dispatch(Action::AddHabit { id: id.clone(), spec })?;
        Ok(id)
    }

    pub fn remove_habit(&mut self, id: &str) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::RemoveHabit { id: id.to_string() })
    }

    pub fn update_habit(&mut self, id: &str, patch: HabitPatch) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::UpdateHabit {
            id: id.to_string(),
            patch,
        })
    }

    pub fn complete_habit(&mut self, id: &str) -> Result<Vec<EngineEvent>> {
        self.complete_with(id, CompletionMode::Standard)
    }

    pub fn complete_habit_partial(&mut self, id: &str, minutes: i64) -> Result<Vec<EngineEvent>> {
        self.complete_with(id, CompletionMode::Partial { minutes })
    }

    pub fn complete_habit_overtime(&mut self, id: &str, minutes: i64) -> Result<Vec<EngineEvent>> {
        self.complete_with(id, CompletionMode::Overtime { minutes })
    }

    pub fn complete_with(&mut self, id: &str, mode: CompletionMode) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::Complete {
            id: id.to_string(),
            mode,
        })
    }

    pub fn fail_habit(&mut self, id: &str) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::Fail { id: id.to_string() })
    }

    pub fn retro_complete_yesterday(&mut self, id: &str, mode: CompletionMode) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::RetroCompleteYesterday {
            id: id.to_string(),
            mode,
        })
    }

    pub fn use_item(&mut self, item_id: &str, target: Option<&str>) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::UseItem {
            item_id: item_id.to_string(),
            target: target.map(str::to_string),
        })
    }

    pub fn grant_item(&mut self, item_id: &str) -> Result<Vec<EngineEvent>> {
        self.dispatch(Action::GrantItem {
            item_id: item_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::{CoreError, StorageError};
    use crate::history::HistoryStatus;
    use crate::storage::MemoryStore;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 6, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn engine() -> (Engine, ManualClock) {
        let clock = ManualClock::new(start());
        let engine = Engine::new(EngineState::default(), Rules::default(), clock.clone()).unwrap();
        (engine, clock)
    }

    fn completed(events: &[EngineEvent]) -> (u64, f64) {
        events
            .iter()
            .find_map(|e| match e {
                EngineEvent::HabitCompleted {
                    earned, multiplier, ..
                } => Some((*earned, *multiplier)),
                _ => None,
            })
            .expect("no completion event")
    }

    struct FailingStore;

    impl StateStore for FailingStore {
        fn load(&self) -> Result<Option<EngineState>> {
            Ok(None)
        }

        fn save(&mut self, _state: &EngineState) -> Result<()> {
            Err(StorageError::WriteFailed {
                path: "state.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            }
            .into())
        }
    }

    #[test]
    fn standard_completion_awards_minutes_and_steps_multiplier() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        let events = engine.complete_habit(&id).unwrap();
        assert_eq!(completed(&events), (20, 1.2));

        let habit = engine.habit(&id).unwrap();
        assert_eq!(habit.streak, 1);
        assert_eq!(engine.state().lifetime_points, 20);
        assert_eq!(
            engine.state().history.status(start().date(), &id),
            Some(HistoryStatus::Completed)
        );
    }

    #[test]
    fn partial_completion_keeps_multiplier() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        let events = engine.complete_habit_partial(&id, 10).unwrap();
        assert_eq!(completed(&events), (10, 1.0));
        assert_eq!(engine.habit(&id).unwrap().streak, 1);
    }

    #[test]
    fn completing_twice_is_a_noop() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        engine.complete_habit(&id).unwrap();
        let before = engine.state().clone();
        assert!(engine.complete_habit(&id).unwrap().is_empty());
        assert!(engine.fail_habit(&id).unwrap().is_empty());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn shield_absorbs_penalty() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        engine.state.habits[0].multiplier = 1.4;
        engine.grant_item("shield_of_streak").unwrap();
        engine.use_item("shield_of_streak", None).unwrap();

        let events = engine.fail_habit(&id).unwrap();
        assert!(matches!(
            &events[0],
            EngineEvent::HabitFailed { multiplier, shield: Some(s), .. } if *multiplier == 1.4 && s == "streak_shield"
        ));
        assert!(engine.active_effects().is_empty());
        assert_eq!(engine.habit(&id).unwrap().streak, 0);
    }

    #[test]
    fn failure_without_shield_applies_penalty() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        engine.state.habits[0].multiplier = 1.4;
        engine.fail_habit(&id).unwrap();
        assert_eq!(engine.habit(&id).unwrap().multiplier, 1.0);
        assert_eq!(
            engine.state().history.status(start().date(), &id),
            Some(HistoryStatus::Failed)
        );
    }

    #[test]
    fn retro_completion_undoes_penalty_and_pays_pre_penalty_rate() {
        let (mut engine, clock) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        engine.state.habits[0].multiplier = 1.4;
        engine.fail_habit(&id).unwrap();
        assert_eq!(engine.habit(&id).unwrap().multiplier, 1.0);

        clock.advance(Duration::days(1));
        let events = engine
            .retro_complete_yesterday(&id, CompletionMode::Standard)
            .unwrap();
        assert_eq!(completed(&events), (28, 1.6));
        assert_eq!(
            engine.state().history.status(start().date(), &id),
            Some(HistoryStatus::Completed)
        );

        // A second correction for the same day is a no-op.
        assert!(engine
            .retro_complete_yesterday(&id, CompletionMode::Standard)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn retro_partial_validates_minutes() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        let err = engine
            .retro_complete_yesterday(&id, CompletionMode::Partial { minutes: -5 })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn level_rollover_carries_remainder() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Deep work", 40)).unwrap();
        engine.state.points = 600;
        let events = engine.complete_habit(&id).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, EngineEvent::LevelUp { level: 1, .. })));
        assert_eq!(engine.state().level, 1);
        assert_eq!(engine.state().points, 13);
        assert!(engine.state().is_unlocked("level_1"));
    }

    #[test]
    fn instant_item_without_target_is_not_consumed() {
        let (mut engine, _) = engine();
        engine.grant_item("recovery_potion").unwrap();
        assert!(engine.use_item("recovery_potion", None).unwrap().is_empty());
        assert!(engine.use_item("recovery_potion", Some("nope")).unwrap().is_empty());
        assert_eq!(engine.state().item_qty("recovery_potion"), 1);
    }

    #[test]
    fn recovery_potion_and_gem_raise_multiplier() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        engine.grant_item("recovery_potion").unwrap();
        engine.grant_item("multiplier_gem").unwrap();
        engine.use_item("recovery_potion", Some(&id)).unwrap();
        engine.use_item("multiplier_gem", Some(&id)).unwrap();
        let habit = engine.habit(&id).unwrap();
        assert_eq!(habit.multiplier, 1.9);
        assert_eq!(habit.base_multiplier, 1.5);
        assert_eq!(engine.state().item_qty("multiplier_gem"), 0);
    }

    #[test]
    fn time_crystal_marks_yesterday() {
        let (mut engine, clock) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        clock.advance(Duration::days(1));
        engine.grant_item("time_crystal").unwrap();
        let events = engine.use_item("time_crystal", Some(&id)).unwrap();
        assert_eq!(completed(&events), (20, 1.0));
        assert_eq!(engine.habit(&id).unwrap().streak, 1);
        assert_eq!(engine.state().global_streak, 1);

        // Yesterday is already done now, so a second crystal stays in the bag.
        engine.grant_item("time_crystal").unwrap();
        assert!(engine.use_item("time_crystal", Some(&id)).unwrap().is_empty());
        assert_eq!(engine.state().item_qty("time_crystal"), 1);
    }

    #[test]
    fn timed_effect_expires_with_the_clock() {
        let (mut engine, clock) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 10)).unwrap();
        engine.grant_item("double_elixir").unwrap();
        engine.use_item("double_elixir", None).unwrap();
        assert_eq!(engine.active_effects().len(), 1);

        clock.advance(Duration::days(3) + Duration::seconds(1));
        assert!(engine.active_effects().is_empty());
        let events = engine.complete_habit(&id).unwrap();
        assert_eq!(completed(&events).0, 10);
        assert!(engine.state().active_effects.is_empty());
    }

    #[test]
    fn removing_a_habit_keeps_history() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 10)).unwrap();
        engine.complete_habit(&id).unwrap();
        engine.remove_habit(&id).unwrap();
        assert!(engine.habit(&id).is_none());
        assert_eq!(
            engine.state().history.status(start().date(), &id),
            Some(HistoryStatus::Completed)
        );
        assert!(engine.remove_habit(&id).unwrap().is_empty());
    }

    #[test]
    fn update_validates_and_leaves_progress_alone() {
        let (mut engine, _) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 10)).unwrap();
        engine.complete_habit(&id).unwrap();
        let patch = HabitPatch {
            minutes: Some(0),
            ..Default::default()
        };
        assert!(engine.update_habit(&id, patch).is_err());

        let patch = HabitPatch {
            name: Some("Long run".into()),
            minutes: Some(45),
            ..Default::default()
        };
        engine.update_habit(&id, patch).unwrap();
        let habit = engine.habit(&id).unwrap();
        assert_eq!((habit.name.as_str(), habit.minutes), ("Long run", 45));
        assert_eq!((habit.multiplier, habit.streak), (1.2, 1));
    }

    #[test]
    fn add_habit_rejects_bad_input_without_changes() {
        let (mut engine, _) = engine();
        assert!(engine.add_habit(HabitSpec::new("   ", 10)).is_err());
        assert!(engine.add_habit(HabitSpec::new("Run", 0)).is_err());
        assert!(engine.habits().is_empty());
        assert!(engine.state().unlocked_achievements.is_empty());
    }

    #[test]
    fn global_streak_counts_days_where_all_were_completed() {
        let (mut engine, clock) = engine();
        let a = engine.add_habit(HabitSpec::new("A", 5)).unwrap();
        let b = engine.add_habit(HabitSpec::new("B", 5)).unwrap();
        engine.complete_habit(&a).unwrap();
        clock.advance(Duration::days(1));
        assert_eq!(engine.state().global_streak, 0);

        engine.complete_habit(&a).unwrap();
        engine.complete_habit(&b).unwrap();
        clock.advance(Duration::days(1));
        engine.complete_habit(&a).unwrap();
        assert_eq!(engine.state().global_streak, 1);
    }

    #[test]
    fn saves_after_each_change_and_skips_noops() {
        let clock = ManualClock::new(start());
        let store = MemoryStore::new();
        let mut engine = Engine::open(store.clone(), Rules::default(), clock).unwrap();
        let id = engine.add_habit(HabitSpec::new("Run", 10)).unwrap();
        engine.complete_habit(&id).unwrap();
        assert_eq!(store.save_count(), 2);
        engine.complete_habit(&id).unwrap();
        assert_eq!(store.save_count(), 2);
        assert_eq!(store.snapshot().as_ref(), Some(engine.state()));
    }

    #[test]
    fn failed_save_keeps_previous_state() {
        let clock = ManualClock::new(start());
        let mut engine = Engine::open(FailingStore, Rules::default(), clock).unwrap();
        let err = engine.add_habit(HabitSpec::new("Run", 10)).unwrap_err();
        assert!(matches!(err, CoreError::Storage(_)));
        assert!(engine.habits().is_empty());
        assert!(engine.notifications().is_empty());
    }

    #[test]
    fn events_become_notifications_that_expire() {
        let (mut engine, clock) = engine();
        let id = engine.add_habit(HabitSpec::new("Run", 20)).unwrap();
        engine.complete_habit(&id).unwrap();
        let messages: Vec<String> = engine.notifications().iter().map(|n| n.message.clone()).collect();
        assert!(messages.contains(&"+20 pts — x1.2".to_string()));

        let first = engine.notifications()[0].id;
        assert!(engine.dismiss_notification(first));
        assert!(!engine.dismiss_notification(first));

        clock.advance(Duration::seconds(4));
        assert!(engine.notifications().is_empty());
    }

    #[test]
    fn open_rejects_invalid_rules() {
        let rules = Rules {
            max_multiplier: 0.5,
            ..Rules::default()
        };
        assert!(Engine::open(MemoryStore::new(), rules, ManualClock::new(start())).is_err());
    }

    #[test]
    fn today_follows_the_engine_clock() {
        let (engine, clock) = engine();
        assert_eq!(engine.today(), start().date());
        clock.advance(Duration::days(2));
        assert_eq!(engine.today(), start().date() + Duration::days(2));
    }

    #[test]
    fn new_rejects_inverted_bounds() {
        let rules = Rules {
            min_multiplier: 2.0,
            max_multiplier: 1.5,
            ..Rules::default()
        };
        let err = Engine::new(EngineState::default(), rules, ManualClock::new(start())).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));

        let rules = Rules {
            max_multiplier: f64::NAN,
            ..Rules::default()
        };
        assert!(Engine::new(EngineState::default(), rules, ManualClock::new(start())).is_err());
    }
}
