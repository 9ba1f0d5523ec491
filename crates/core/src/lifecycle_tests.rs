use super::*;
use crate::clock::FakeClock;
use std::time::Duration;

#[test]
fn start_then_complete_is_legal() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    assert_eq!(lc.status(), LifecycleStatus::Pending);
    lc.start(&clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Running);
    assert!(lc.started_at().is_some());
    clock.advance(Duration::from_secs(1));
    lc.complete(&clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Completed);
    assert!(lc.stopped_at().is_some());
}

#[test]
fn fail_records_error_and_stop_timestamp() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    lc.start(&clock).unwrap();
    lc.fail("boom", &clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Failed);
    assert_eq!(lc.last_error(), Some("boom"));
    assert!(lc.stopped_at().is_some());
}

#[test]
fn stop_from_pending_degrades_to_never_ran() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    lc.stop(&clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Stopped);
    assert!(lc.started_at().is_none());
}

#[test]
fn stop_from_running_is_legal() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    lc.start(&clock).unwrap();
    lc.stop(&clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Stopped);
}

#[test]
fn start_is_only_legal_from_pending() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    lc.start(&clock).unwrap();
    let err = lc.start(&clock).unwrap_err();
    assert_eq!(err.from, LifecycleStatus::Running);
    assert_eq!(err.action, "start");
}

#[test]
fn complete_fail_stop_require_running() {
    let clock = FakeClock::new();
    assert!(Lifecycle::new(&clock).complete(&clock).is_err());
    assert!(Lifecycle::new(&clock).fail("x", &clock).is_err());

    let mut completed = Lifecycle::new(&clock);
    completed.start(&clock).unwrap();
    completed.complete(&clock).unwrap();
    assert!(completed.stop(&clock).is_err());
    assert!(completed.fail("x", &clock).is_err());
}

#[test]
fn reset_for_restart_only_legal_from_failed() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    assert!(lc.reset_for_restart(&clock).is_err());

    lc.start(&clock).unwrap();
    lc.fail("transient", &clock).unwrap();
    lc.reset_for_restart(&clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Pending);
    assert!(lc.last_error().is_none());
    assert!(lc.stopped_at().is_none());
}

#[test]
fn reopen_only_legal_from_stopped() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    lc.stop(&clock).unwrap();
    lc.reopen(&clock).unwrap();
    assert_eq!(lc.status(), LifecycleStatus::Pending);
    lc.start(&clock).unwrap();
    assert!(lc.reopen(&clock).is_err());
}

#[test]
fn update_timestamp_advances_updated_at_without_changing_status() {
    let clock = FakeClock::new();
    let mut lc = Lifecycle::new(&clock);
    let before = lc.updated_at();
    clock.advance(Duration::from_secs(3));
    lc.update_timestamp(&clock);
    assert!(lc.updated_at() > before);
    assert_eq!(lc.status(), LifecycleStatus::Pending);
}

#[test]
fn is_terminal_matches_completed_and_stopped_only() {
    assert!(LifecycleStatus::Completed.is_terminal());
    assert!(LifecycleStatus::Stopped.is_terminal());
    assert!(!LifecycleStatus::Running.is_terminal());
    assert!(!LifecycleStatus::Pending.is_terminal());
    assert!(!LifecycleStatus::Failed.is_terminal());
}
