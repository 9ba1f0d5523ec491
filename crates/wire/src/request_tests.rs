use super::*;
use fleet_core::PlayerId;

#[test]
fn create_container_tags_as_its_type_name() {
    let request = Request::CreateContainer { kind: ContainerKind::MiningWorker, player_id: PlayerId::new("p1") };
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["type"], "CreateContainer");
    assert_eq!(json["kind"], "mining_worker");
}

#[test]
fn start_container_await_completion_defaults_to_false_when_absent() {
    let json = serde_json::json!({ "type": "StartContainer", "id": ContainerId::new() });
    let request: Request = serde_json::from_value(json).unwrap();
    assert!(matches!(request, Request::StartContainer { await_completion: false, .. }));
}

#[test]
fn send_round_trips_an_arbitrary_json_payload() {
    let request = Request::Send {
        request_type: "GetMarket".to_string(),
        payload: serde_json::json!({ "waypoint": "X1-AB" }),
        player_id: Some(PlayerId::new("p1")),
    };
    let json = serde_json::to_string(&request).unwrap();
    let back: Request = serde_json::from_str(&json).unwrap();
    assert_eq!(request, back);
}
