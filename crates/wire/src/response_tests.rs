use super::*;
use fleet_core::test_support::test_container;

#[test]
fn container_summary_reflects_the_folded_status() {
    let mut container = test_container(ContainerKind::ScoutTour, "p1");
    container.interrupted = true;
    // Interrupted only shadows a FAILED lifecycle status; force it there via
    // the public surface rather than poking lifecycle fields directly.
    let clock = fleet_core::FakeClock::new();
    container.lifecycle.start(&clock).unwrap();
    container.lifecycle.fail("boom", &clock).unwrap();

    let summary = ContainerSummary::from(&container);
    assert_eq!(summary.status, ContainerStatus::Interrupted);
    assert_eq!(summary.last_error.as_deref(), Some("boom"));
}

#[test]
fn response_round_trips_through_json() {
    let response = Response::Containers { containers: Vec::new() };
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(response, back);
}

#[test]
fn error_response_tags_as_its_type_name() {
    let response = Response::Error { message: "no handler".to_string() };
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["type"], "Error");
    assert_eq!(json["message"], "no handler");
}
