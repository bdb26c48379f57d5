//! Tests for the simulation clock: animation ticks, fast-forward and the
//! rules keeping the two apart

use glam::DVec3;
use orrery_core::integrator::advance_many;
use orrery_core::tests::test_helpers::{date, flat_projector, runaway_body, sun_earth};
use orrery_core::units::G_AU_SUNMASS_DAY;
use orrery_core::{ClockError, ClockParams, ClockStatus, PhysicsError, SimulationClock};
use std::time::{Duration, Instant};

const REL_HISTORY: f64 = 2.0 / 3.0;

fn clock_with(steps_per_frame: u32, speed: f64) -> SimulationClock {
    let params = ClockParams {
        g: G_AU_SUNMASS_DAY,
        speed,
        steps_per_frame,
    };
    SimulationClock::new(sun_earth(), date(2024, 1, 1), params, REL_HISTORY)
}

fn coincident_clock() -> SimulationClock {
    let mut bodies = sun_earth();
    bodies[1].position = DVec3::ZERO;
    SimulationClock::new(bodies, date(2024, 1, 1), ClockParams::default(), REL_HISTORY)
}

#[test]
fn test_new_clock_is_paused_and_does_not_step() {
    let mut clock = clock_with(1, 60.0);
    assert_eq!(clock.status(), ClockStatus::Paused);

    let outcome = clock.tick(Duration::from_secs(1), &flat_projector).unwrap();
    assert_eq!(outcome.steps, 0);
    assert!(!outcome.needs_refresh());
    assert_eq!(clock.date(), Some(date(2024, 1, 1)));
}

#[test]
fn test_tick_runs_steps_per_frame_and_records_every_step() {
    let mut clock = clock_with(5, 60.0);
    clock.resume().unwrap();

    let outcome = clock.tick(Duration::from_millis(20), &flat_projector).unwrap();

    assert_eq!(outcome.steps, 5);
    assert!(outcome.needs_refresh());
    assert_eq!(clock.date(), Some(date(2024, 1, 6)));
    assert_eq!(clock.history().trail(1).unwrap().len(), 5);
    // Sun trail capacity is a single point
    assert_eq!(clock.history().trail(0).unwrap().len(), 1);
}

#[test]
fn test_tick_waits_for_a_full_frame_interval() {
    let mut clock = clock_with(1, 10.0);
    clock.resume().unwrap();

    assert_eq!(clock.tick(Duration::from_millis(40), &flat_projector).unwrap().steps, 0);
    assert_eq!(clock.tick(Duration::from_millis(40), &flat_projector).unwrap().steps, 0);
    assert_eq!(clock.tick(Duration::from_millis(40), &flat_projector).unwrap().steps, 1);
}

#[test]
fn test_long_pause_does_not_cause_catch_up_burst() {
    let mut clock = clock_with(1, 10.0);
    clock.resume().unwrap();

    assert_eq!(clock.tick(Duration::from_secs(10), &flat_projector).unwrap().steps, 1);
    assert_eq!(clock.tick(Duration::ZERO, &flat_projector).unwrap().steps, 1);
    assert_eq!(clock.tick(Duration::ZERO, &flat_projector).unwrap().steps, 0);
}

#[test]
fn test_history_is_relative_to_first_body() {
    let mut clock = clock_with(1, 60.0);
    clock.step_frame(&flat_projector).unwrap();

    let sun_point = clock.history().trail(0).unwrap().latest().unwrap();
    assert_eq!(sun_point.x, 0.0);
    assert_eq!(sun_point.y, 0.0);
    let earth_point = clock.history().trail(1).unwrap().latest().unwrap();
    assert!((earth_point.y - 0.0172).abs() < 1e-4);
}

#[test]
fn test_toggle_running() {
    let mut clock = clock_with(1, 60.0);
    assert!(clock.toggle_running().unwrap());
    assert_eq!(clock.status(), ClockStatus::Running);
    assert!(!clock.toggle_running().unwrap());
    assert_eq!(clock.status(), ClockStatus::Paused);
}

#[test]
fn test_fast_forward_reaches_target_and_matches_direct_integration() {
    let mut clock = clock_with(1, 60.0);
    clock.start_fast_forward(date(2025, 1, 1)).unwrap();
    let report = clock.wait_for_fast_forward().unwrap().unwrap();

    assert_eq!(report.steps, 366);
    assert_eq!(clock.date(), Some(date(2025, 1, 1)));

    let mut expected = sun_earth();
    advance_many(&mut expected, G_AU_SUNMASS_DAY, date(2024, 1, 1), 1, 366).unwrap();
    let earth = clock.with_state(|state| state.bodies[1].position).unwrap();
    assert_eq!(earth, expected[1].position);
}

#[test]
fn test_fast_forward_pauses_and_clears_history() {
    let mut clock = clock_with(3, 60.0);
    clock.resume().unwrap();
    clock.tick(Duration::from_secs(1), &flat_projector).unwrap();
    assert!(!clock.history().trail(1).unwrap().is_empty());

    clock.start_fast_forward(date(2023, 6, 1)).unwrap();
    assert!(!clock.is_running());
    assert!(clock.history().trails().iter().all(|t| t.is_empty()));

    clock.wait_for_fast_forward().unwrap();
    assert_eq!(clock.status(), ClockStatus::Paused);
    assert_eq!(clock.progress(), 0.0);
    assert_eq!(clock.date(), Some(date(2023, 6, 1)));
}

#[test]
fn test_resume_and_second_fast_forward_refused_while_computing() {
    let mut clock = clock_with(1, 60.0);
    clock.start_fast_forward(date(2030, 1, 1)).unwrap();

    assert!(matches!(clock.status(), ClockStatus::Computing { .. }));
    assert!(matches!(clock.resume(), Err(ClockError::FastForwardInProgress)));
    assert!(matches!(
        clock.start_fast_forward(date(2031, 1, 1)),
        Err(ClockError::FastForwardInProgress)
    ));
    assert!(matches!(
        clock.step_frame(&flat_projector),
        Err(ClockError::FastForwardInProgress)
    ));

    clock.wait_for_fast_forward().unwrap();
    assert_eq!(clock.date(), Some(date(2030, 1, 1)));
    clock.resume().unwrap();
    assert!(clock.is_running());
}

#[test]
fn test_tick_reports_completion_exactly_once() {
    let mut clock = clock_with(1, 60.0);
    clock.start_fast_forward(date(2024, 3, 1)).unwrap();

    let deadline = Instant::now() + Duration::from_secs(30);
    let report = loop {
        let outcome = clock.tick(Duration::ZERO, &flat_projector).unwrap();
        if let Some(report) = outcome.fast_forward {
            assert!(outcome.needs_refresh());
            break report;
        }
        assert!(Instant::now() < deadline, "fast-forward did not finish");
        std::thread::sleep(Duration::from_millis(1));
    };

    assert_eq!(report.date, date(2024, 3, 1));
    assert!(!clock.is_computing());
    let next = clock.tick(Duration::ZERO, &flat_projector).unwrap();
    assert_eq!(next.fast_forward, None);
    assert!(!next.needs_refresh());
}

#[test]
fn test_fast_forward_to_current_date_completes_immediately() {
    let mut clock = clock_with(1, 60.0);
    clock.start_fast_forward(date(2024, 1, 1)).unwrap();
    let report = clock.wait_for_fast_forward().unwrap().unwrap();

    assert_eq!(report.steps, 0);
    assert_eq!(clock.date(), Some(date(2024, 1, 1)));
}

#[test]
fn test_wait_without_fast_forward_is_none() {
    let mut clock = clock_with(1, 60.0);
    assert!(clock.wait_for_fast_forward().unwrap().is_none());
}

#[test]
fn test_physics_fault_halts_animation() {
    let mut clock = coincident_clock();
    clock.resume().unwrap();

    let result = clock.tick(Duration::from_secs(1), &flat_projector);
    assert!(matches!(
        result,
        Err(ClockError::Faulted(PhysicsError::CoincidentBodies { first: 0, second: 1 }))
    ));
    assert_eq!(clock.status(), ClockStatus::Faulted);
    assert_eq!(clock.date(), Some(date(2024, 1, 1)));

    assert!(matches!(clock.resume(), Err(ClockError::Faulted(_))));
    assert!(matches!(clock.tick(Duration::from_secs(1), &flat_projector), Err(ClockError::Faulted(_))));
    assert!(matches!(clock.start_fast_forward(date(2025, 1, 1)), Err(ClockError::Faulted(_))));
}

#[test]
fn test_physics_fault_in_fast_forward_worker() {
    let mut clock = coincident_clock();
    clock.start_fast_forward(date(2025, 1, 1)).unwrap();

    let result = clock.wait_for_fast_forward();
    assert!(matches!(
        result,
        Err(ClockError::Faulted(PhysicsError::CoincidentBodies { .. }))
    ));
    assert_eq!(clock.status(), ClockStatus::Faulted);
    assert!(clock.fault().is_some());
}

#[test]
fn test_reset_replaces_state_and_clears_fault() {
    let mut clock = coincident_clock();
    clock.resume().unwrap();
    assert!(clock.tick(Duration::from_secs(1), &flat_projector).is_err());

    clock.reset(sun_earth(), date(2000, 1, 1)).unwrap();

    assert_eq!(clock.status(), ClockStatus::Paused);
    assert_eq!(clock.date(), Some(date(2000, 1, 1)));
    clock.resume().unwrap();
    assert_eq!(clock.tick(Duration::from_secs(1), &flat_projector).unwrap().steps, 1);
}

#[test]
fn test_speed_and_steps_per_frame_setters() {
    let mut clock = clock_with(1, 60.0);
    clock.set_speed(30.0);
    clock.set_steps_per_frame(20);

    assert_eq!(clock.params().speed, 30.0);
    assert_eq!(clock.params().steps_per_frame, 20);

    clock.set_steps_per_frame(0);
    assert_eq!(clock.params().steps_per_frame, 1);
}

#[test]
fn test_frame_fault_after_first_steps_commits_nothing() {
    let params = ClockParams {
        steps_per_frame: 5,
        ..ClockParams::default()
    };
    let mut clock = SimulationClock::new(runaway_body(), date(2024, 1, 1), params, REL_HISTORY);

    let result = clock.step_frame(&flat_projector);

    assert!(matches!(
        result,
        Err(ClockError::Faulted(PhysicsError::NonFiniteState { index: 0 }))
    ));
    assert_eq!(clock.date(), Some(date(2024, 1, 1)));
    assert_eq!(clock.with_state(|s| s.bodies[0].position), Some(DVec3::ZERO));
    assert!(clock.history().trail(0).unwrap().is_empty());
}

#[test]
fn test_fast_forward_fault_after_first_steps_commits_nothing() {
    let mut clock = SimulationClock::new(runaway_body(), date(2024, 1, 1), ClockParams::default(), REL_HISTORY);
    clock.start_fast_forward(date(2024, 1, 11)).unwrap();

    let result = clock.wait_for_fast_forward();

    assert!(matches!(
        result,
        Err(ClockError::Faulted(PhysicsError::NonFiniteState { index: 0 }))
    ));
    assert_eq!(clock.date(), Some(date(2024, 1, 1)));
    assert_eq!(clock.with_state(|s| s.bodies[0].position), Some(DVec3::ZERO));
}
