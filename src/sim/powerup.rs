/// Power-up spawn and verified collection.
///
/// Spawning: after a destroyed block's crumble window elapses, the
/// injected spawn policy is consulted with the vacated cell. The policy
/// is an external collaborator — a pure cell → optional kind decision —
/// so peers stay consistent exactly when their policies agree.
///
/// Collection is deliberately *not* automatic on overlap. An effect is
/// applied only when the local client re-observes a power-up entity at
/// its own occupied cell, and the resulting application event carries a
/// `VerifiedPickup` token that cannot be minted anywhere else. A
/// power-up application without that provenance (e.g. a network echo)
/// has no path into stat mutation.

use crate::domain::entity::{PlayerId, PowerUpKind};
use crate::domain::grid::Cell;
use crate::net::protocol::WireMessage;
use super::bus::EventBus;
use super::event::GameEvent;
use super::world::World;

/// External spawn-selection policy: which power-up, if any, appears on a
/// vacated cell.
pub trait SpawnPolicy {
    fn roll(&mut self, cell: Cell) -> Option<PowerUpKind>;
}

/// Policy that never spawns anything. Default for sessions that don't
/// inject one.
pub struct NoSpawns;

impl SpawnPolicy for NoSpawns {
    fn roll(&mut self, _cell: Cell) -> Option<PowerUpKind> {
        None
    }
}

/// Proof that a power-up application came from local re-observation.
/// Constructible only inside this module; carrying it on the applied
/// event is what "verification provenance" means.
#[derive(Clone, Debug)]
pub struct VerifiedPickup(());

impl VerifiedPickup {
    fn mint() -> Self {
        VerifiedPickup(())
    }
}

/// Delayed spawn roll for a vacated block cell. Skipped if the cell has
/// been re-occupied since destruction started.
pub(crate) fn spawn_roll(
    world: &mut World,
    bus: &mut EventBus,
    policy: &mut dyn SpawnPolicy,
    cell: Cell,
) {
    if world.index.block_at(cell).is_some()
        || world.index.bomb_at(cell).is_some()
        || world.index.powerup_at(cell).is_some()
    {
        return;
    }
    let Some(kind) = policy.roll(cell) else { return };
    if let Some(id) = world.add_powerup(cell, kind) {
        bus.publish(&GameEvent::PowerUpSpawned { id, cell, kind });
    }
}

/// The verification step: the local player re-detects a power-up at its
/// own cell. Applies the effect, removes the entity, announces the
/// collection. A cell already emptied by an earlier collection makes
/// this a no-op.
pub(crate) fn verify_collection(
    world: &mut World,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    local_id: PlayerId,
) {
    let Some(player) = world.player(local_id) else { return };
    if !player.alive() {
        return;
    }
    let cell = player.cell;
    let Some(powerup) = world.remove_powerup_at(cell) else { return };

    // Presence was checked above; no other callback can interleave.
    let Some(player) = world.player_mut(local_id) else { return };
    powerup.kind.apply(player);
    let stats = player.stats();

    bus.publish(&GameEvent::PowerUpCollected {
        id: powerup.id,
        by: local_id,
        kind: powerup.kind,
        cell,
    });
    bus.publish(&GameEvent::StatsUpdated { id: local_id, stats });
    bus.publish(&GameEvent::PowerUpApplied {
        by: local_id,
        kind: powerup.kind,
        pickup: VerifiedPickup::mint(),
    });
    outbox.push(WireMessage::CollectPowerup {
        player_id: local_id,
        powerup_id: powerup.id,
        powerup_type: powerup.kind,
        x: cell.x,
        y: cell.y,
    });
}

/// Mirror a remote collection announcement: remove the entity (keyed by
/// cell — peer-local ids do not line up) and sync the mirror's stats.
/// No `VerifiedPickup` is minted; this path never counts as a local
/// application.
pub(crate) fn mirror_collect(
    world: &mut World,
    bus: &mut EventBus,
    by: PlayerId,
    cell: Cell,
    kind: PowerUpKind,
) {
    let collected = world.remove_powerup_at(cell);
    let Some(player) = world.player_mut(by) else {
        log::warn!("powerup collection for unknown player {:?}", by);
        return;
    };
    kind.apply(player);
    let stats = player.stats();
    if let Some(powerup) = collected {
        bus.publish(&GameEvent::PowerUpCollected { id: powerup.id, by, kind, cell });
    }
    bus.publish(&GameEvent::StatsUpdated { id: by, stats });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Player;
    use crate::sim::arena::Arena;

    struct Always(PowerUpKind);
    impl SpawnPolicy for Always {
        fn roll(&mut self, _cell: Cell) -> Option<PowerUpKind> {
            Some(self.0)
        }
    }

    fn setup() -> (World, EventBus, Vec<WireMessage>) {
        let arena = Arena::parse(&[
            ".......",
            ".......",
            ".......",
            ".......",
            ".......",
        ])
        .unwrap();
        let mut world = World::from_arena(&arena);
        world.add_player(Player::new(PlayerId(1), "local", Cell::new(3, 3), true));
        (world, EventBus::new(), Vec::new())
    }

    #[test]
    fn spawn_roll_consults_policy() {
        let (mut w, mut b, _) = setup();
        spawn_roll(&mut w, &mut b, &mut Always(PowerUpKind::Speed), Cell::new(5, 1));
        assert!(w.index.powerup_at(Cell::new(5, 1)).is_some());

        spawn_roll(&mut w, &mut b, &mut NoSpawns, Cell::new(1, 1));
        assert!(w.index.powerup_at(Cell::new(1, 1)).is_none());
    }

    #[test]
    fn spawn_roll_skips_reoccupied_cells() {
        let (mut w, mut b, _) = setup();
        w.add_block(Cell::new(5, 1), true);
        spawn_roll(&mut w, &mut b, &mut Always(PowerUpKind::Speed), Cell::new(5, 1));
        assert!(w.index.powerup_at(Cell::new(5, 1)).is_none());
    }

    #[test]
    fn verified_collection_applies_and_announces() {
        let (mut w, mut b, mut o) = setup();
        w.add_powerup(Cell::new(3, 3), PowerUpKind::ExtraBomb);

        verify_collection(&mut w, &mut b, &mut o, PlayerId(1));

        assert_eq!(w.player(PlayerId(1)).unwrap().bomb_capacity, 2);
        assert!(w.index.powerup_at(Cell::new(3, 3)).is_none());
        assert!(matches!(
            o.last(),
            Some(WireMessage::CollectPowerup { powerup_type: PowerUpKind::ExtraBomb, .. })
        ));
    }

    #[test]
    fn no_powerup_under_player_is_noop() {
        let (mut w, mut b, mut o) = setup();
        verify_collection(&mut w, &mut b, &mut o, PlayerId(1));
        assert_eq!(w.player(PlayerId(1)).unwrap().bomb_capacity, 1);
        assert!(o.is_empty());
    }

    #[test]
    fn second_collection_at_emptied_cell_is_noop() {
        let (mut w, mut b, mut o) = setup();
        w.add_powerup(Cell::new(3, 3), PowerUpKind::ExtraLife);

        verify_collection(&mut w, &mut b, &mut o, PlayerId(1));
        verify_collection(&mut w, &mut b, &mut o, PlayerId(1));

        // One application, one announcement.
        assert_eq!(w.player(PlayerId(1)).unwrap().lives, 4);
        assert_eq!(o.len(), 1);
    }

    #[test]
    fn mirror_collect_syncs_stats_without_application_event() {
        let (mut w, mut b, _) = setup();
        w.add_player(Player::new(PlayerId(2), "remote", Cell::new(5, 1), false));
        w.add_powerup(Cell::new(5, 1), PowerUpKind::BlastRange);

        use std::cell::RefCell;
        use std::rc::Rc;
        let applied = Rc::new(RefCell::new(0u32));
        let a = applied.clone();
        b.subscribe(move |e| {
            if matches!(e, GameEvent::PowerUpApplied { .. }) {
                *a.borrow_mut() += 1;
            }
        });

        mirror_collect(&mut w, &mut b, PlayerId(2), Cell::new(5, 1), PowerUpKind::BlastRange);

        assert_eq!(w.player(PlayerId(2)).unwrap().blast_range, 2);
        assert!(w.index.powerup_at(Cell::new(5, 1)).is_none());
        assert_eq!(*applied.borrow(), 0);
    }
}
