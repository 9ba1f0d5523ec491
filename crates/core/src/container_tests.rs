use super::*;
use crate::clock::FakeClock;
use std::time::Duration;

#[test]
fn new_container_starts_pending() {
    let clock = FakeClock::new();
    let c = Container::new(ContainerKind::ScoutTour, "player-1", &clock);
    assert_eq!(c.status(), ContainerStatus::Pending);
    assert_eq!(c.iteration, 0);
    assert_eq!(c.restart_count, 0);
}

#[test]
fn stopping_flag_surfaces_over_running_lifecycle() {
    let clock = FakeClock::new();
    let mut c = Container::new(ContainerKind::MiningWorker, "player-1", &clock);
    c.lifecycle.start(&clock).unwrap();
    assert_eq!(c.status(), ContainerStatus::Running);
    c.stopping = true;
    assert_eq!(c.status(), ContainerStatus::Stopping);
}

#[test]
fn interrupted_flag_surfaces_over_failed_lifecycle() {
    let clock = FakeClock::new();
    let mut c = Container::new(ContainerKind::MiningWorker, "player-1", &clock);
    c.lifecycle.start(&clock).unwrap();
    c.lifecycle.fail("crash", &clock).unwrap();
    c.interrupted = true;
    assert_eq!(c.status(), ContainerStatus::Interrupted);
}

#[test]
fn default_restart_bound_is_three() {
    let clock = FakeClock::new();
    let c = Container::new(ContainerKind::ScoutTour, "player-1", &clock);
    assert_eq!(c.restart_bound, 3);
    assert_eq!(DEFAULT_RESTART_BOUND, 3);
}

#[test]
fn restart_budget_respects_bound() {
    let clock = FakeClock::new();
    let mut c = Container::new(ContainerKind::ScoutTour, "player-1", &clock);
    c.restart_bound = 2;
    assert!(c.has_restart_budget());
    c.restart_count = 2;
    assert!(!c.has_restart_budget());
}

#[test]
fn non_restartable_never_has_budget() {
    let clock = FakeClock::new();
    let mut c = Container::new(ContainerKind::ScoutTour, "player-1", &clock);
    c.restartable = false;
    assert!(!c.has_restart_budget());
}

#[test]
fn increment_iteration_signals_bound_reached() {
    let clock = FakeClock::new();
    let mut c = Container::new(ContainerKind::ScoutTour, "player-1", &clock);
    c.iteration_bound = 3;
    assert!(!c.increment_iteration());
    assert!(!c.increment_iteration());
    assert!(c.increment_iteration());
    assert_eq!(c.iteration, 3);
}

#[test]
fn increment_iteration_never_bounds_when_zero() {
    let clock = FakeClock::new();
    let mut c = Container::new(ContainerKind::ScoutTour, "player-1", &clock);
    for _ in 0..1000 {
        assert!(!c.increment_iteration());
    }
}

#[test]
fn restart_backoff_doubles_and_caps() {
    assert_eq!(Container::restart_backoff(0), Duration::from_secs(1));
    assert_eq!(Container::restart_backoff(1), Duration::from_secs(2));
    assert_eq!(Container::restart_backoff(2), Duration::from_secs(4));
    assert_eq!(Container::restart_backoff(10), Duration::from_secs(60));
}

#[test]
fn coordinator_kinds_are_flagged() {
    assert!(ContainerKind::MiningCoordinator.is_coordinator());
    assert!(!ContainerKind::MiningWorker.is_coordinator());
}
