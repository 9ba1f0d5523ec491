//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::clock::FakeClock;
use crate::container::{Container, ContainerId, ContainerKind};
use crate::ship::{Assignment, AssignmentStatus, PlayerId, ShipSymbol};

/// Proptest strategies for core state machine types.
pub mod strategies {
    use crate::lifecycle::LifecycleStatus;
    use proptest::prelude::*;

    pub fn arb_lifecycle_status() -> impl Strategy<Value = LifecycleStatus> {
        prop_oneof![
            Just(LifecycleStatus::Pending),
            Just(LifecycleStatus::Running),
            Just(LifecycleStatus::Completed),
            Just(LifecycleStatus::Failed),
            Just(LifecycleStatus::Stopped),
        ]
    }

    pub fn arb_ship_symbol() -> impl Strategy<Value = String> {
        "[A-Z]{2,6}-[0-9]{1,3}"
    }
}

pub fn test_container(kind: ContainerKind, player: &str) -> Container {
    let clock = FakeClock::new();
    Container::new(kind, player, &clock)
}

pub fn test_assignment(ship: &str, player: &str, container: ContainerId) -> Assignment {
    Assignment {
        ship: ShipSymbol::new(ship),
        player_id: PlayerId::new(player),
        container_id: container,
        status: AssignmentStatus::Active,
        assigned_at_ms: 1_000_000,
        released_at_ms: None,
        release_reason: None,
    }
}
