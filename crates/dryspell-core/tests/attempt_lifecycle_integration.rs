//! Integration tests for the attempt lifecycle.
//!
//! These tests drive the engine with a fixed clock from start to a stored
//! record, the way a host polls it.

use chrono::{Duration, TimeZone, Utc};
use dryspell_core::{
    AttemptEngine, AttemptState, Clock, EngineError, Event, FixedClock, LevelLadder, RecordStore,
    UnitMode,
};

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2025, 1, 6, 8, 0, 0).unwrap())
}

#[test]
fn test_day_goal_completes_and_finalizes() {
    let clock = clock();
    let mut engine = AttemptEngine::new();
    let mut store = RecordStore::new();

    engine.start(3, UnitMode::Day, clock.now()).unwrap();

    clock.advance(Duration::days(2));
    let outcome = engine.poll(clock.now()).unwrap();
    assert_eq!(outcome.state, AttemptState::Running);
    assert!(outcome.completion.is_none());
    assert!((outcome.progress - 2.0 / 3.0).abs() < 1e-9);

    clock.advance(Duration::days(1));
    let outcome = engine.poll(clock.now()).unwrap();
    assert!(matches!(outcome.completion, Some(Event::AttemptCompleted { .. })));
    assert_eq!(engine.state(), AttemptState::Completed);

    let record = engine.to_record(clock.now()).unwrap();
    assert_eq!(record.actual_days, 3.0);
    assert!(record.is_completed);
    store.append(record).unwrap();

    // Further polls never complete twice.
    clock.advance(Duration::days(1));
    assert!(engine.poll(clock.now()).unwrap().completion.is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn test_minute_mode_records_real_days() {
    let clock = clock();
    let mut engine = AttemptEngine::new();

    engine.start(3, UnitMode::Minute, clock.now()).unwrap();
    clock.advance(Duration::seconds(185));
    let outcome = engine.poll(clock.now()).unwrap();
    assert!(outcome.completion.is_some());

    let record = engine.to_record(clock.now()).unwrap();
    assert!((record.actual_days - 185.0 / 86_400.0).abs() < 1e-12);
    assert_eq!(record.target_days, 3.0);
    assert!(!record.is_completed);
}

#[test]
fn test_abandon_then_restart() {
    let clock = clock();
    let mut engine = AttemptEngine::new();
    let mut store = RecordStore::new();

    engine.start(30, UnitMode::Day, clock.now()).unwrap();
    clock.advance(Duration::days(10));
    engine.abandon(clock.now()).unwrap();
    let first = engine.to_record(clock.now()).unwrap();
    assert!(!first.is_completed);
    assert_eq!(first.achieved_percentage(), 33);
    store.append(first).unwrap();

    clock.advance(Duration::hours(1));
    engine.start(7, UnitMode::Day, clock.now()).unwrap();
    clock.advance(Duration::days(7));
    engine.poll(clock.now()).unwrap();
    store.append(engine.to_record(clock.now()).unwrap()).unwrap();

    assert_eq!(store.len(), 2);
    let newest = store.all()[0];
    assert_eq!(newest.target_days, 7.0);
    assert_eq!(LevelLadder::tier_for(17.0).rank, 3);
}

#[test]
fn test_illegal_transitions() {
    let clock = clock();
    let mut engine = AttemptEngine::new();

    assert!(matches!(
        engine.poll(clock.now()),
        Err(EngineError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        engine.abandon(clock.now()),
        Err(EngineError::InvalidStateTransition { .. })
    ));
    assert!(matches!(
        engine.start(-4, UnitMode::Day, clock.now()),
        Err(EngineError::InvalidGoal { .. })
    ));

    engine.start(1, UnitMode::Second, clock.now()).unwrap();
    assert!(engine.start(1, UnitMode::Second, clock.now()).is_err());
    assert!(engine.to_record(clock.now()).is_err());
}

#[test]
fn test_engine_state_survives_serialization() {
    let clock = clock();
    let mut engine = AttemptEngine::new();
    engine.start(2, UnitMode::Day, clock.now()).unwrap();

    let json = serde_json::to_string(&engine).unwrap();
    let mut restored: AttemptEngine = serde_json::from_str(&json).unwrap();

    clock.advance(Duration::days(2));
    assert!(restored.poll(clock.now()).unwrap().completion.is_some());
}
