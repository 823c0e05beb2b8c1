//! Pure state transitions.
//!
//! `reduce` never touches the clock, the store or the notification queue:
//! it takes the current snapshot, an action and a context (the instant and
//! the rules) and returns the complete next snapshot plus the events that
//! describe what changed. An action that turns out to be a no-op returns no
//! events. The only state change a no-op can carry is the purge of expired
//! effects, which runs at the start of every action.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::levels;
use super::rules::{round1, Rules};
use super::state::EngineState;
use super::streak::global_streak;
use crate::achievements::{newly_satisfied, Achievement};
use crate::dates::{today_key, yesterday_key};
use crate::error::ValidationError;
use crate::events::EngineEvent;
use crate::habit::{validate_minutes, HabitId, HabitPatch, HabitSpec};
use crate::history::HistoryStatus;
use crate::items::{active_effects_at, find_item, purge_expired, ActiveEffect, EffectCategory, EffectKey};

/// How a habit was done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompletionMode {
    /// The configured minutes; the multiplier grows.
    Standard,
    /// Fewer minutes than configured; the multiplier stays put.
    Partial { minutes: i64 },
    /// More minutes than configured; the multiplier grows.
    Overtime { minutes: i64 },
}

impl CompletionMode {
    fn status(self) -> HistoryStatus {
        match self {
            CompletionMode::Standard => HistoryStatus::Completed,
            CompletionMode::Partial { .. } => HistoryStatus::Partial,
            CompletionMode::Overtime { .. } => HistoryStatus::Over,
        }
    }

    fn grows_multiplier(self) -> bool {
        !matches!(self, CompletionMode::Partial { .. })
    }

    /// Minutes supplied by the caller, validated. `None` for standard mode.
    fn minutes_done(self) -> Result<Option<u32>, ValidationError> {
        match self {
            CompletionMode::Standard => Ok(None),
            CompletionMode::Partial { minutes } | CompletionMode::Overtime { minutes } => {
                validate_minutes("minutes_done", minutes).map(Some)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    AddHabit { id: HabitId, spec: HabitSpec },
    RemoveHabit { id: HabitId },
    UpdateHabit { id: HabitId, patch: HabitPatch },
    /// Resolve today as done.
    Complete { id: HabitId, mode: CompletionMode },
    /// Resolve today as failed.
    Fail { id: HabitId },
    /// Amend yesterday to done.
    RetroCompleteYesterday { id: HabitId, mode: CompletionMode },
    UseItem { item_id: String, target: Option<HabitId> },
    GrantItem { item_id: String },
}

/// Inputs to a reduction that are not part of the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    pub now: NaiveDateTime,
    pub rules: &'a Rules,
    pub achievements: &'a [Achievement],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: EngineState,
    pub events: Vec<EngineEvent>,
}

impl Transition {
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

/// Points are whole numbers, rounded half away from zero.
pub fn round_points(value: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round() as u64
}

/// Compute the next snapshot. Validation errors leave nothing changed.
pub fn reduce(state: &EngineState, action: &Action, ctx: &Context<'_>) -> Result<Transition, ValidationError> {
    let mut next = state.clone();
    let purged = purge_expired(&mut next.active_effects, ctx.now);
    if purged > 0 {
        debug!(purged, "purged expired effects");
    }

    let mut reducer = Reducer {
        next,
        events: Vec::new(),
        ctx,
    };
    reducer.apply(action)?;
    Ok(Transition {
        state: reducer.next,
        events: reducer.events,
    })
}

struct Reducer<'c, 'a> {
    next: EngineState,
    events: Vec<EngineEvent>,
    ctx: &'c Context<'a>,
}

impl Reducer<'_, '_> {
    fn apply(&mut self, action: &Action) -> Result<(), ValidationError> {
        match action {
            Action::AddHabit { id, spec } => self.add_habit(id, spec),
            Action::RemoveHabit { id } => {
                self.remove_habit(id);
                Ok(())
            }
            Action::UpdateHabit { id, patch } => self.update_habit(id, patch),
            Action::Complete { id, mode } => self.complete(id, *mode),
            Action::Fail { id } => {
                self.fail(id);
                Ok(())
            }
            Action::RetroCompleteYesterday { id, mode } => self.retro_complete(id, *mode),
            Action::UseItem { item_id, target } => {
                self.use_item(item_id, target.as_deref());
                Ok(())
            }
            Action::GrantItem { item_id } => {
                self.grant_item(item_id);
                self.evaluate_achievements();
                Ok(())
            }
        }
    }

    fn now(&self) -> NaiveDateTime {
        self.ctx.now
    }

    fn rules(&self) -> &Rules {
        self.ctx.rules
    }

    // ── Habits ───────────────────────────────────────────────────────

    fn add_habit(&mut self, id: &str, spec: &HabitSpec) -> Result<(), ValidationError> {
        if self.next.has_habit(&id.to_string()) {
            return Err(ValidationError::InvalidValue {
                field: "id".into(),
                message: format!("habit '{id}' already exists"),
            });
        }
        let habit = spec.clone().into_habit(id.to_string(), self.now())?;
        self.events.push(EngineEvent::HabitAdded {
            habit_id: habit.id.clone(),
            name: habit.name.clone(),
            at: self.now(),
        });
        self.next.habits.push(habit);
        self.recalc_global_streak();
        self.evaluate_achievements();
        Ok(())
    }

    /// History of the removed habit is kept.
    fn remove_habit(&mut self, id: &str) {
        let Some(pos) = self.next.habits.iter().position(|h| h.id == id) else {
            debug!(habit_id = id, "remove: unknown habit");
            return;
        };
        self.next.habits.remove(pos);
        self.events.push(EngineEvent::HabitRemoved {
            habit_id: id.to_string(),
            at: self.now(),
        });
        self.recalc_global_streak();
    }

    fn update_habit(&mut self, id: &str, patch: &HabitPatch) -> Result<(), ValidationError> {
        let now = self.now();
        let Some(habit) = self.next.habit_mut(id) else {
            debug!(habit_id = id, "update: unknown habit");
            return Ok(());
        };
        if patch.is_empty() {
            return Ok(());
        }
        patch.apply_to(habit)?;
        self.events.push(EngineEvent::HabitUpdated {
            habit_id: id.to_string(),
            at: now,
        });
        self.recalc_global_streak();
        Ok(())
    }

    // ── Completion / failure ─────────────────────────────────────────

    fn complete(&mut self, id: &str, mode: CompletionMode) -> Result<(), ValidationError> {
        let minutes_done = mode.minutes_done()?;
        let now = self.now();
        let today = today_key(now);
        let Some(habit) = self.next.habit(id) else {
            debug!(habit_id = id, "complete: unknown habit");
            return Ok(());
        };
        if let Some(existing) = self.next.history.status(today, id) {
            debug!(habit_id = id, status = existing.as_str(), "complete: already resolved today");
            return Ok(());
        }

        let active = active_effects_at(&self.next.active_effects, now);
        let factor = point_factor(&active);
        let boost = multiplier_boost(&active);
        let applied_one_shots: Vec<EffectKey> = one_shot_keys(&active);

        let minutes_used = minutes_done.unwrap_or(habit.minutes);
        let earned = round_points(f64::from(minutes_used) * habit.multiplier * factor);
        let multiplier = if mode.grows_multiplier() {
            self.rules()
                .clamp_multiplier(habit.multiplier + self.rules().multiplier_step + boost)
        } else {
            habit.multiplier
        };

        for key in applied_one_shots {
            consume_one(&mut self.next.active_effects, key, now);
        }
        let status = mode.status();
        let streak = self.bump_habit(id, multiplier);
        self.next.history.set(today, id, status);
        self.events.push(EngineEvent::HabitCompleted {
            habit_id: id.to_string(),
            date: today,
            status,
            earned,
            multiplier,
            streak,
            retroactive: false,
            at: now,
        });
        self.award_points(earned);
        self.recalc_global_streak();
        self.evaluate_achievements();
        Ok(())
    }

    fn fail(&mut self, id: &str) {
        let now = self.now();
        let today = today_key(now);
        let Some(habit) = self.next.habit(id) else {
            debug!(habit_id = id, "fail: unknown habit");
            return;
        };
        if let Some(existing) = self.next.history.status(today, id) {
            debug!(habit_id = id, status = existing.as_str(), "fail: already resolved today");
            return;
        }
        let current = habit.multiplier;

        let (multiplier, shield) = if consume_one(&mut self.next.active_effects, EffectKey::StreakShield, now) {
            (current, Some(EffectKey::StreakShield))
        } else if consume_one(&mut self.next.active_effects, EffectKey::GoldenShield, now) {
            let rules = self.rules();
            (
                rules.clamp_multiplier(current + rules.multiplier_step),
                Some(EffectKey::GoldenShield),
            )
        } else {
            let active = active_effects_at(&self.next.active_effects, now);
            let penalty = active
                .iter()
                .filter(|e| e.key == EffectKey::ReducedPenalty)
                .map(|e| e.value)
                .fold(self.rules().fail_penalty, f64::min)
                .max(0.0);
            (self.rules().clamp_multiplier(current - penalty), None)
        };

        if let Some(habit) = self.next.habit_mut(id) {
            habit.multiplier = multiplier;
            habit.streak = 0;
        }
        self.next.history.set(today, id, HistoryStatus::Failed);
        self.events.push(EngineEvent::HabitFailed {
            habit_id: id.to_string(),
            date: today,
            multiplier,
            shield: shield.map(effect_name),
            at: now,
        });
        self.recalc_global_streak();
    }

    /// Amend yesterday as if its failure penalty had not been applied.
    fn retro_complete(&mut self, id: &str, mode: CompletionMode) -> Result<(), ValidationError> {
        let minutes_done = mode.minutes_done()?;
        let now = self.now();
        let yesterday = yesterday_key(now);
        let Some(habit) = self.next.habit(id) else {
            debug!(habit_id = id, "retro: unknown habit");
            return Ok(());
        };
        if let Some(existing) = self.next.history.status(yesterday, id) {
            if existing.is_success() {
                debug!(habit_id = id, status = existing.as_str(), "retro: yesterday already done");
                return Ok(());
            }
        }

        let rules = self.rules();
        let penalty = rules.fail_penalty;
        let before_penalty = rules.clamp_multiplier(habit.multiplier + penalty);
        let minutes_used = minutes_done.unwrap_or(habit.minutes);
        let earned = round_points(f64::from(minutes_used) * before_penalty);
        let delta = if mode.grows_multiplier() {
            penalty + rules.multiplier_step
        } else {
            penalty
        };
        let multiplier = rules.clamp_multiplier(habit.multiplier + delta);

        let status = mode.status();
        let streak = self.bump_habit(id, multiplier);
        self.next.history.set(yesterday, id, status);
        self.events.push(EngineEvent::HabitCompleted {
            habit_id: id.to_string(),
            date: yesterday,
            status,
            earned,
            multiplier,
            streak,
            retroactive: true,
            at: now,
        });
        self.award_points(earned);
        self.recalc_global_streak();
        self.evaluate_achievements();
        Ok(())
    }

    /// Set the multiplier and add one to the streak. Returns the new streak.
    fn bump_habit(&mut self, id: &str, multiplier: f64) -> u32 {
        match self.next.habit_mut(id) {
            Some(habit) => {
                habit.multiplier = multiplier;
                habit.streak = habit.streak.saturating_add(1);
                habit.streak
            }
            None => 0,
        }
    }

    // ── Items ────────────────────────────────────────────────────────

    fn use_item(&mut self, item_id: &str, target: Option<&str>) {
        let now = self.now();
        let Some(item) = find_item(item_id) else {
            debug!(item_id, "use: unknown item");
            return;
        };
        if self.next.item_qty(item_id) == 0 {
            debug!(item_id, "use: none in inventory");
            return;
        }

        let mut target_used = None;
        match item.category {
            EffectCategory::Timed => self.next.active_effects.push(ActiveEffect {
                key: item.effect,
                value: item.value,
                expires_at: Some(now + Duration::days(i64::from(item.duration_days))),
                item_name: item.name.to_string(),
            }),
            EffectCategory::Passive => self.next.active_effects.push(ActiveEffect {
                key: item.effect,
                value: item.value,
                expires_at: None,
                item_name: item.name.to_string(),
            }),
            EffectCategory::Instant => {
                let Some(target) = target.filter(|t| self.next.habit(t).is_some()) else {
                    debug!(item_id, "use: instant item needs an existing target habit");
                    return;
                };
                if !self.apply_instant(item.effect, item.value, target) {
                    return;
                }
                target_used = Some(target.to_string());
            }
        }

        self.next.take_item(item_id);
        self.events.push(EngineEvent::ItemUsed {
            item_id: item.id.to_string(),
            name: item.name.to_string(),
            icon: item.icon.to_string(),
            category: item.category,
            target: target_used,
            at: now,
        });
        self.evaluate_achievements();
    }

    /// Apply an instant effect to `target`. False if it could not apply,
    /// in which case nothing was changed.
    fn apply_instant(&mut self, key: EffectKey, value: f64, target: &str) -> bool {
        let now = self.now();
        let rules = self.rules().clone();
        match key {
            EffectKey::MultRecovery => {
                let Some(habit) = self.next.habit_mut(target) else {
                    return false;
                };
                habit.multiplier = rules.clamp_multiplier(habit.multiplier + value);
                true
            }
            EffectKey::PermBaseMult => {
                let Some(habit) = self.next.habit_mut(target) else {
                    return false;
                };
                habit.base_multiplier = round1(habit.base_multiplier + value).min(rules.max_multiplier);
                habit.multiplier = rules.clamp_multiplier(habit.multiplier + value);
                true
            }
            EffectKey::RetroactiveComplete => {
                let yesterday = yesterday_key(now);
                if self
                    .next
                    .history
                    .status(yesterday, target)
                    .is_some_and(HistoryStatus::is_success)
                {
                    debug!(habit_id = target, "time crystal: yesterday already done");
                    return false;
                }
                let Some(habit) = self.next.habit_mut(target) else {
                    return false;
                };
                let earned = round_points(f64::from(habit.minutes) * habit.multiplier);
                habit.streak = habit.streak.saturating_add(1);
                let (multiplier, streak) = (habit.multiplier, habit.streak);
                self.next.history.set(yesterday, target, HistoryStatus::Completed);
                self.events.push(EngineEvent::HabitCompleted {
                    habit_id: target.to_string(),
                    date: yesterday,
                    status: HistoryStatus::Completed,
                    earned,
                    multiplier,
                    streak,
                    retroactive: true,
                    at: now,
                });
                self.award_points(earned);
                self.recalc_global_streak();
                true
            }
            other => {
                debug!(effect = %effect_name(other), "no instant behaviour for effect");
                false
            }
        }
    }

    fn grant_item(&mut self, item_id: &str) {
        let Some(item) = find_item(item_id) else {
            debug!(item_id, "grant: unknown item");
            return;
        };
        if !self.next.give_item(item.id, item.max_stack) {
            debug!(item_id, max_stack = item.max_stack, "grant: stack full");
            return;
        }
        self.events.push(EngineEvent::ItemGranted {
            item_id: item.id.to_string(),
            qty: self.next.item_qty(item.id),
            at: self.now(),
        });
    }

    // ── Derived state ────────────────────────────────────────────────

    fn award_points(&mut self, earned: u64) {
        self.next.lifetime_points = self.next.lifetime_points.saturating_add(earned);
        let from = self.next.level;
        let (level, points, gained) = levels::apply_points(from, self.next.points, earned);
        self.next.level = level;
        self.next.points = points;
        for reached in (from + 1)..=(from + gained) {
            info!(level = reached, "level up");
            self.events.push(EngineEvent::LevelUp {
                level: reached,
                title: levels::title(reached).to_string(),
                at: self.now(),
            });
        }
    }

    fn recalc_global_streak(&mut self) {
        self.next.global_streak = global_streak(
            &self.next.habits,
            &self.next.history,
            today_key(self.now()),
            self.rules().global_streak_lookback_days,
        );
    }

    /// Unlock until nothing new is satisfied; rewards can satisfy further checks.
    fn evaluate_achievements(&mut self) {
        loop {
            let unlocked: Vec<&Achievement> = newly_satisfied(self.ctx.achievements, &self.next);
            if unlocked.is_empty() {
                break;
            }
            for achievement in unlocked {
                info!(achievement = achievement.id, "achievement unlocked");
                self.next
                    .unlocked_achievements
                    .insert(achievement.id.to_string());
                self.events.push(EngineEvent::AchievementUnlocked {
                    achievement_id: achievement.id.to_string(),
                    name: achievement.name.to_string(),
                    reward: achievement.reward.map(str::to_string),
                    at: self.now(),
                });
                if let Some(reward) = achievement.reward {
                    self.grant_item(reward);
                }
            }
        }
    }
}

/// Product of the point factors of the distinct effect kinds present.
fn point_factor(active: &[&ActiveEffect]) -> f64 {
    [EffectKey::DoublePoints, EffectKey::NextTriple, EffectKey::Lucky]
        .into_iter()
        .filter(|key| active.iter().any(|e| e.key == *key))
        .filter_map(EffectKey::point_factor)
        .product()
}

/// Largest active multiplier boost, 0 when none.
fn multiplier_boost(active: &[&ActiveEffect]) -> f64 {
    active
        .iter()
        .filter(|e| e.key == EffectKey::GlobalMultBoost)
        .map(|e| e.value)
        .fold(0.0, f64::max)
}

fn one_shot_keys(active: &[&ActiveEffect]) -> Vec<EffectKey> {
    let mut keys: Vec<EffectKey> = Vec::new();
    for effect in active {
        if effect.key.is_one_shot() && !keys.contains(&effect.key) {
            keys.push(effect.key);
        }
    }
    keys
}

/// Remove the first active instance of `key`. True if one was removed.
fn consume_one(effects: &mut Vec<ActiveEffect>, key: EffectKey, now: NaiveDateTime) -> bool {
    match effects.iter().position(|e| e.key == key && e.is_active_at(now)) {
        Some(pos) => {
            effects.remove(pos);
            true
        }
        None => false,
    }
}

fn effect_name(key: EffectKey) -> String {
    serde_json::to_value(key)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| format!("{key:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::ACHIEVEMENTS;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 4, 15)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn ctx(rules: &Rules) -> Context<'_> {
        Context {
            now: now(),
            rules,
            achievements: &[],
        }
    }

    fn state_with(minutes: i64, multiplier: f64) -> EngineState {
        let mut state = EngineState::default();
        let mut habit = HabitSpec::new("Read", minutes)
            .into_habit("h".into(), now() - Duration::days(30))
            .unwrap();
        habit.multiplier = multiplier;
        state.habits.push(habit);
        state
    }

    fn complete(mode: CompletionMode) -> Action {
        Action::Complete {
            id: "h".into(),
            mode,
        }
    }

    fn effect(key: EffectKey, value: f64) -> ActiveEffect {
        ActiveEffect {
            key,
            value,
            expires_at: None,
            item_name: String::new(),
        }
    }

    #[test]
    fn round_points_is_half_away_from_zero() {
        assert_eq!(round_points(12.5), 13);
        assert_eq!(round_points(12.49), 12);
        assert_eq!(round_points(-3.0), 0);
        assert_eq!(round_points(f64::NAN), 0);
    }

    #[test]
    fn point_factors_compose() {
        let rules = Rules::default();
        let mut state = state_with(10, 1.0);
        state.active_effects = vec![
            effect(EffectKey::DoublePoints, 2.0),
            effect(EffectKey::NextTriple, 3.0),
            effect(EffectKey::Lucky, 2.0),
        ];
        let t = reduce(&state, &complete(CompletionMode::Standard), &ctx(&rules)).unwrap();
        match &t.events[0] {
            EngineEvent::HabitCompleted { earned, .. } => assert_eq!(*earned, 120),
            other => panic!("unexpected event {other:?}"),
        }
        // One-shots consumed, timed double stays.
        assert_eq!(t.state.active_effects.len(), 1);
        assert_eq!(t.state.active_effects[0].key, EffectKey::DoublePoints);
    }

    #[test]
    fn only_one_instance_of_a_one_shot_is_consumed() {
        let rules = Rules::default();
        let mut state = state_with(10, 1.0);
        state.active_effects = vec![effect(EffectKey::NextTriple, 3.0), effect(EffectKey::NextTriple, 3.0)];
        let t = reduce(&state, &complete(CompletionMode::Standard), &ctx(&rules)).unwrap();
        assert_eq!(t.state.active_effects.len(), 1);
    }

    #[test]
    fn boost_adds_to_multiplier_step() {
        let rules = Rules::default();
        let mut state = state_with(10, 1.0);
        state.active_effects = vec![effect(EffectKey::GlobalMultBoost, 0.2)];
        let t = reduce(&state, &complete(CompletionMode::Overtime { minutes: 15 }), &ctx(&rules)).unwrap();
        assert_eq!(t.state.habits[0].multiplier, 1.4);
        assert_eq!(t.state.history.status(now().date(), "h"), Some(HistoryStatus::Over));
        assert_eq!(t.state.lifetime_points, 15);
    }

    #[test]
    fn invalid_partial_minutes_is_a_validation_error() {
        let rules = Rules::default();
        let state = state_with(10, 1.0);
        let err = reduce(&state, &complete(CompletionMode::Partial { minutes: 0 }), &ctx(&rules)).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidMinutes { value: 0, .. }));
    }

    #[test]
    fn reduced_penalty_and_golden_shield() {
        let rules = Rules::default();
        let mut state = state_with(10, 1.4);
        state.active_effects = vec![effect(EffectKey::ReducedPenalty, 0.2)];
        let t = reduce(&state, &Action::Fail { id: "h".into() }, &ctx(&rules)).unwrap();
        assert_eq!(t.state.habits[0].multiplier, 1.2);
        // Timed penalty reduction is not consumed.
        assert_eq!(t.state.active_effects.len(), 1);

        let mut state = state_with(10, 1.4);
        state.active_effects = vec![effect(EffectKey::GoldenShield, 0.0)];
        let t = reduce(&state, &Action::Fail { id: "h".into() }, &ctx(&rules)).unwrap();
        assert_eq!(t.state.habits[0].multiplier, 1.6);
        assert!(t.state.active_effects.is_empty());
        assert_eq!(t.state.history.status(now().date(), "h"), Some(HistoryStatus::Failed));
    }

    #[test]
    fn fail_floors_at_min_multiplier() {
        let rules = Rules::default();
        let state = state_with(10, 0.4);
        let t = reduce(&state, &Action::Fail { id: "h".into() }, &ctx(&rules)).unwrap();
        assert_eq!(t.state.habits[0].multiplier, 0.2);
    }

    #[test]
    fn expired_effects_are_purged_even_on_noop() {
        let rules = Rules::default();
        let mut state = state_with(10, 1.0);
        state.active_effects = vec![ActiveEffect {
            key: EffectKey::DoublePoints,
            value: 2.0,
            expires_at: Some(now() - Duration::hours(1)),
            item_name: "Double Elixir".into(),
        }];
        let t = reduce(&state, &Action::Fail { id: "missing".into() }, &ctx(&rules)).unwrap();
        assert!(t.is_noop());
        assert!(t.state.active_effects.is_empty());
    }

    #[test]
    fn achievements_reach_a_fixpoint() {
        let rules = Rules::default();
        let mut state = state_with(10, 1.0);
        state.points = 620;
        for item in ["lucky_coin", "boost_potion", "time_crystal", "triple_scroll"] {
            state.give_item(item, 5);
        }
        let ctx = Context {
            now: now(),
            rules: &rules,
            achievements: ACHIEVEMENTS,
        };
        let t = reduce(&state, &complete(CompletionMode::Standard), &ctx).unwrap();
        // level_1 grants the shield, which makes the fifth distinct item.
        assert_eq!(t.state.level, 1);
        assert!(t.state.is_unlocked("level_1"));
        assert_eq!(t.state.item_qty("shield_of_streak"), 1);
        assert!(t.state.is_unlocked("collect_5"));
        assert!(t.state.is_unlocked("first_habit"));
    }

    #[test]
    fn adding_habits_unlocks_without_rewards() {
        let rules = Rules::default();
        let mut state = EngineState::default();
        for id in ["a", "b"] {
            state.habits.push(HabitSpec::new(id, 5).into_habit(id.into(), now()).unwrap());
        }
        let ctx = Context {
            now: now(),
            rules: &rules,
            achievements: ACHIEVEMENTS,
        };
        let t = reduce(
            &state,
            &Action::AddHabit {
                id: "c".into(),
                spec: HabitSpec::new("c", 5),
            },
            &ctx,
        )
        .unwrap();
        assert!(t.state.is_unlocked("first_habit_added"));
        assert!(t.state.is_unlocked("three_habits"));
        assert!(t.state.inventory.is_empty());
    }

    #[test]
    fn duplicate_habit_id_is_rejected() {
        let rules = Rules::default();
        let state = state_with(10, 1.0);
        let result = reduce(
            &state,
            &Action::AddHabit {
                id: "h".into(),
                spec: HabitSpec::new("Again", 5),
            },
            &ctx(&rules),
        );
        assert!(result.is_err());
    }

    #[test]
    fn effect_names_are_snake_case() {
        assert_eq!(effect_name(EffectKey::StreakShield), "streak_shield");
    }
}
