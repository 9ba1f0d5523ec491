use super::*;

#[test]
fn ship_symbol_displays_as_inner_string() {
    let s = ShipSymbol::from("BUYER-1");
    assert_eq!(s.to_string(), "BUYER-1");
    assert_eq!(s.as_str(), "BUYER-1");
}

#[test]
fn player_id_displays_as_inner_string() {
    let p = PlayerId::from("player-42");
    assert_eq!(p.to_string(), "player-42");
}

#[test]
fn ship_symbols_sort_and_dedup_by_value() {
    let mut ships = vec![ShipSymbol::from("B-2"), ShipSymbol::from("A-1"), ShipSymbol::from("A-1")];
    ships.sort();
    ships.dedup();
    assert_eq!(ships, vec![ShipSymbol::from("A-1"), ShipSymbol::from("B-2")]);
}

#[test]
fn assignment_status_display() {
    assert_eq!(AssignmentStatus::Active.to_string(), "active");
    assert_eq!(AssignmentStatus::Released.to_string(), "released");
}

#[test]
fn release_reason_constants_are_distinct() {
    let reasons = [
        release_reason::DAEMON_RESTART,
        release_reason::ORPHANED_CLEANUP,
        release_reason::STALE_TIMEOUT,
        release_reason::CONTAINER_COMPLETED,
        release_reason::CONTAINER_FAILED,
        release_reason::CONTAINER_STOPPED,
        release_reason::TRANSFER,
    ];
    let unique: std::collections::HashSet<_> = reasons.iter().collect();
    assert_eq!(unique.len(), reasons.len());
}
