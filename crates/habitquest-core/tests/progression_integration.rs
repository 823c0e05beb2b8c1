//! Integration tests for the progression engine.
//!
//! Drives an engine over several simulated days with a manual clock and a
//! JSON store, then reopens the store to check the snapshot survives.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use habitquest_core::{
    CompletionMode, Engine, EngineEvent, EngineState, HabitSpec, HistoryStatus, JsonFileStore, ManualClock,
    Periodicity, Rules, StateStore,
};

fn monday_morning() -> NaiveDateTime {
    // 2026-03-02 is a Monday.
    NaiveDate::from_ymd_opt(2026, 3, 2)
        .unwrap()
        .and_hms_opt(8, 30, 0)
        .unwrap()
}

#[test]
fn test_week_of_habits_with_persistence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    let clock = ManualClock::new(monday_morning());

    let mut engine = Engine::open(JsonFileStore::new(&path), Rules::default(), clock.clone()).unwrap();
    let read = engine.add_habit(HabitSpec::new("Read", 30).with_emoji("📚")).unwrap();
    let gym = engine
        .add_habit(HabitSpec::new("Gym", 60).with_periodicity(Periodicity::Custom {
            days_of_week: vec![1, 3, 5],
            interval_days: None,
        }))
        .unwrap();

    // Monday through Sunday, completing everything that is due.
    for day in 0..7 {
        engine.complete_habit(&read).unwrap();
        let today = clock_date(&clock);
        let gym_habit = engine.habit(&gym).unwrap().clone();
        if habitquest_core::dates::is_due_on_date(&gym_habit, today) {
            engine.complete_habit(&gym).unwrap();
        }
        if day < 6 {
            clock.advance(Duration::days(1));
        }
    }

    let read_habit = engine.habit(&read).unwrap();
    assert_eq!(read_habit.streak, 7);
    assert_eq!(read_habit.multiplier, 2.4);
    assert_eq!(engine.habit(&gym).unwrap().streak, 3);
    // Monday to Saturday are complete days seen from Sunday.
    assert_eq!(engine.state().global_streak, 6);
    assert!(engine.state().is_unlocked("streak_7"));
    assert!(engine.state().is_unlocked("mult_2"));
    assert!(engine.state().is_unlocked("all_day"));

    let saved = JsonFileStore::new(&path).load().unwrap().unwrap();
    assert_eq!(&saved, engine.state());

    let reopened = Engine::open(JsonFileStore::new(&path), Rules::default(), clock).unwrap();
    assert_eq!(reopened.state(), engine.state());
    assert_eq!(reopened.level_info().level, engine.state().level);
}

#[test]
fn test_fail_then_correct_next_day() {
    let clock = ManualClock::new(monday_morning());
    let mut engine = Engine::new(Default::default(), Rules::default(), clock.clone()).unwrap();
    let id = engine.add_habit(HabitSpec::new("Meditate", 10)).unwrap();

    engine.complete_habit(&id).unwrap();
    clock.advance(Duration::days(1));
    engine.fail_habit(&id).unwrap();
    assert_eq!(engine.habit(&id).unwrap().multiplier, 0.8);

    clock.advance(Duration::days(1));
    let events = engine
        .retro_complete_yesterday(&id, CompletionMode::Partial { minutes: 5 })
        .unwrap();
    let (earned, multiplier) = match &events[0] {
        EngineEvent::HabitCompleted {
            earned,
            multiplier,
            retroactive: true,
            ..
        } => (*earned, *multiplier),
        other => panic!("unexpected event {other:?}"),
    };
    // Paid at the 1.2 rate the habit had before the penalty; partial
    // only undoes the penalty.
    assert_eq!(earned, 6);
    assert_eq!(multiplier, 1.2);

    let yesterday = clock_date(&clock) - Duration::days(1);
    assert_eq!(
        engine.state().history.status(yesterday, &id),
        Some(HistoryStatus::Partial)
    );
}

#[test]
fn test_rewards_chain_through_achievements() {
    let clock = ManualClock::new(monday_morning());
    let start = EngineState {
        points: 620,
        ..Default::default()
    };
    let mut engine = Engine::new(start, Rules::default(), clock.clone()).unwrap();
    let id = engine.add_habit(HabitSpec::new("Stretch", 10)).unwrap();
    for name in ["Two", "Three"] {
        engine.add_habit(HabitSpec::new(name, 5)).unwrap();
    }
    assert!(engine.state().is_unlocked("three_habits"));
    assert!(engine.state().inventory.is_empty());

    // Crossing into level 1 pays out the streak shield.
    let events = engine.complete_habit(&id).unwrap();
    assert!(events
        .iter()
        .any(|e| matches!(e, EngineEvent::ItemGranted { item_id, .. } if item_id == "shield_of_streak")));
    assert_eq!(engine.state().level, 1);
    assert_eq!(engine.habit(&id).unwrap().multiplier, 1.2);

    let events = engine.use_item("shield_of_streak", None).unwrap();
    assert!(matches!(&events[0], EngineEvent::ItemUsed { target: None, .. }));
    assert_eq!(engine.active_effects().len(), 1);

    clock.advance(Duration::days(1));
    engine.fail_habit(&id).unwrap();
    assert_eq!(engine.habit(&id).unwrap().multiplier, 1.2);
    assert!(engine.active_effects().is_empty());
}

fn clock_date(clock: &ManualClock) -> NaiveDate {
    use habitquest_core::Clock;
    clock.now().date()
}
