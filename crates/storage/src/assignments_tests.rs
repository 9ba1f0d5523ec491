use super::*;
use crate::pool::Store;
use fleet_core::ContainerId;

fn manager() -> SqliteShipAssignmentManager {
    SqliteShipAssignmentManager::new(Store::open_in_memory().unwrap())
}

#[tokio::test]
async fn assign_then_find_by_ship_round_trips() {
    let mgr = manager();
    let ctx = Ctx::root();
    let ship = ShipSymbol::new("BUYER-1");
    let player = PlayerId::new("player-1");
    let container = ContainerId::new();

    mgr.assign(&ctx, &ship, &player, container).await.unwrap();
    let found = mgr.find_by_ship(&ctx, &ship, &player).await.unwrap().unwrap();
    assert_eq!(found.container_id, container);
    assert_eq!(found.status, AssignmentStatus::Active);
}

#[tokio::test]
async fn concurrent_assign_for_same_ship_has_exactly_one_winner() {
    let mgr = manager();
    let ship = ShipSymbol::new("BUYER-1");
    let player = PlayerId::new("player-1");

    let mgr_a = mgr.clone();
    let ship_a = ship.clone();
    let player_a = player.clone();
    let task_a = tokio::spawn(async move { mgr_a.assign(&Ctx::root(), &ship_a, &player_a, ContainerId::new()).await });

    let mgr_b = mgr.clone();
    let ship_b = ship.clone();
    let player_b = player.clone();
    let task_b = tokio::spawn(async move { mgr_b.assign(&Ctx::root(), &ship_b, &player_b, ContainerId::new()).await });

    let (result_a, result_b) = tokio::join!(task_a, task_b);
    let results = [result_a.unwrap(), result_b.unwrap()];

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let losers = results.iter().filter(|r| matches!(r, Err(CoreError::AlreadyAssigned))).count();
    assert_eq!(winners, 1);
    assert_eq!(losers, 1);

    let ctx = Ctx::root();
    let found = mgr.find_by_ship(&ctx, &ship, &player).await.unwrap().unwrap();
    assert_eq!(found.status, AssignmentStatus::Active);
}

#[tokio::test]
async fn release_is_idempotent() {
    let mgr = manager();
    let ctx = Ctx::root();
    let ship = ShipSymbol::new("BUYER-1");
    let player = PlayerId::new("player-1");

    mgr.release(&ctx, &ship, &player, "no_such_assignment").await.unwrap();
    mgr.assign(&ctx, &ship, &player, ContainerId::new()).await.unwrap();
    mgr.release(&ctx, &ship, &player, "done").await.unwrap();
    mgr.release(&ctx, &ship, &player, "done_again").await.unwrap();
    assert!(mgr.find_by_ship(&ctx, &ship, &player).await.unwrap().is_none());
}

#[tokio::test]
async fn transfer_moves_assignment_atomically() {
    let mgr = manager();
    let ctx = Ctx::root();
    let ship = ShipSymbol::new("BUYER-1");
    let player = PlayerId::new("player-1");
    let from = ContainerId::new();
    let to = ContainerId::new();

    mgr.assign(&ctx, &ship, &player, from).await.unwrap();
    let moved = mgr.transfer(&ctx, &ship, &player, from, to).await.unwrap();
    assert_eq!(moved.container_id, to);

    let found = mgr.find_by_container(&ctx, to, &player).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn transfer_fails_not_assigned_when_no_active_assignment() {
    let mgr = manager();
    let ctx = Ctx::root();
    let ship = ShipSymbol::new("BUYER-1");
    let player = PlayerId::new("player-1");

    let err = mgr.transfer(&ctx, &ship, &player, ContainerId::new(), ContainerId::new()).await.unwrap_err();
    assert!(matches!(err, CoreError::NotAssigned));
}

#[tokio::test]
async fn transfer_fails_wrong_container_when_owner_mismatches() {
    let mgr = manager();
    let ctx = Ctx::root();
    let ship = ShipSymbol::new("BUYER-1");
    let player = PlayerId::new("player-1");
    let actual_owner = ContainerId::new();

    mgr.assign(&ctx, &ship, &player, actual_owner).await.unwrap();
    let err = mgr.transfer(&ctx, &ship, &player, ContainerId::new(), ContainerId::new()).await.unwrap_err();
    assert!(matches!(err, CoreError::WrongContainer));
}

#[tokio::test]
async fn release_by_container_releases_only_that_containers_ships() {
    let mgr = manager();
    let ctx = Ctx::root();
    let player = PlayerId::new("player-1");
    let container = ContainerId::new();

    mgr.assign(&ctx, &ShipSymbol::new("A-1"), &player, container).await.unwrap();
    mgr.assign(&ctx, &ShipSymbol::new("A-2"), &player, container).await.unwrap();
    mgr.assign(&ctx, &ShipSymbol::new("A-3"), &player, ContainerId::new()).await.unwrap();

    let released = mgr.release_by_container(&ctx, container, &player, "container_completed").await.unwrap();
    assert_eq!(released, 2);
    assert_eq!(mgr.find_by_container(&ctx, container, &player).await.unwrap().len(), 0);
}

#[tokio::test]
async fn release_all_active_releases_across_players() {
    let mgr = manager();
    let ctx = Ctx::root();
    mgr.assign(&ctx, &ShipSymbol::new("A-1"), &PlayerId::new("p1"), ContainerId::new()).await.unwrap();
    mgr.assign(&ctx, &ShipSymbol::new("A-2"), &PlayerId::new("p2"), ContainerId::new()).await.unwrap();

    let released = mgr.release_all_active(&ctx, "daemon_restart").await.unwrap();
    assert_eq!(released, 2);
}

#[tokio::test]
async fn count_by_container_prefix_matches_naming_convention() {
    let mgr = manager();
    let ctx = Ctx::root();
    let player = PlayerId::new("player-1");
    let coordinator = ContainerId::new();

    mgr.assign(&ctx, &ShipSymbol::new("A-1"), &player, coordinator).await.unwrap();
    let n = mgr.count_by_container_prefix(&ctx, &coordinator.to_string()[..4], &player).await.unwrap();
    assert_eq!(n, 1);
}
