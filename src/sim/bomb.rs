/// Bomb lifecycle: Armed → Exploding → Removed.
///
/// Placement gates (any failure is a silent no-op — no state change, no
/// announcement):
///   - per-player placement cooldown elapsed
///   - active bombs below capacity
///   - no bomb already on the cell
///
/// On placement the owner's blast range is snapshotted into the bomb;
/// range power-ups collected while the fuse burns never widen an
/// already-armed blast. The fuse is a timer entry — placement returns
/// immediately and detonation fires as an independent later callback,
/// even if the game pauses in between.

use crate::config::GameConfig;
use crate::domain::entity::{BombId, BombState, PlayerId};
use crate::domain::grid::Cell;
use crate::net::protocol::WireMessage;
use super::blast::{self, Explosion};
use super::bus::EventBus;
use super::clock::TimerQueue;
use super::event::GameEvent;
use super::world::World;
use super::Pending;

/// Place a bomb under the locally-controlled player's feet.
/// Returns the bomb id, or `None` for any silently refused placement.
pub(crate) fn place_bomb(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    cfg: &GameConfig,
    now: u64,
    player_id: PlayerId,
) -> Option<BombId> {
    let player = world.player(player_id)?;
    if !player.alive() {
        return None;
    }
    if let Some(last) = player.last_bomb_at {
        if now < last + cfg.timing.place_cooldown_ms {
            return None;
        }
    }
    if player.active_bombs >= player.bomb_capacity {
        return None;
    }
    let cell = player.cell;
    let range = player.blast_range;
    if world.index.bomb_at(cell).is_some() {
        return None;
    }

    let id = world.add_bomb(player_id, cell, range, now)?;
    let player = world.player_mut(player_id)?;
    player.active_bombs += 1;
    player.last_bomb_at = Some(now);

    timers.schedule(now + cfg.timing.fuse_ms, Pending::Fuse(id));
    bus.publish(&GameEvent::BombPlaced { id, owner: player_id, cell });
    outbox.push(WireMessage::DropBomb {
        player_id,
        x: cell.x,
        y: cell.y,
        blast_range: range,
    });
    Some(id)
}

/// Mirror a remote placement announcement. The announced range is
/// trusted as-is; the fuse runs on the local clock so each peer derives
/// the detonation from its own world view.
pub(crate) fn mirror_bomb(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    cfg: &GameConfig,
    now: u64,
    owner: PlayerId,
    cell: Cell,
    range: u32,
) -> Option<BombId> {
    if world.index.bomb_at(cell).is_some() {
        log::warn!("ignoring remote bomb on occupied cell ({}, {})", cell.x, cell.y);
        return None;
    }
    let id = world.add_bomb(owner, cell, range, now)?;
    if let Some(player) = world.player_mut(owner) {
        player.active_bombs += 1;
        player.last_bomb_at = Some(now);
    }
    timers.schedule(now + cfg.timing.fuse_ms, Pending::Fuse(id));
    bus.publish(&GameEvent::BombPlaced { id, owner, cell });
    Some(id)
}

/// Fuse expiry: Armed → Exploding → Removed. The bomb leaves the index
/// before propagation so the blast never treats it as an obstacle, and
/// the owner regains placement capacity (the owner may already be gone —
/// attribution survives the attacker's elimination).
pub(crate) fn fire_fuse(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    cfg: &GameConfig,
    now: u64,
    id: BombId,
) -> Option<Explosion> {
    let bomb = world.bombs.get_mut(&id)?;
    if bomb.state != BombState::Armed {
        return None;
    }
    bomb.state = BombState::Exploding;
    let origin = bomb.cell;
    let radius = bomb.blast_range;
    let owner = bomb.owner;

    world.index.remove_bomb(origin);
    if let Some(player) = world.player_mut(owner) {
        player.active_bombs = player.active_bombs.saturating_sub(1);
    }

    let explosion = blast::detonate(world, timers, bus, outbox, cfg, now, origin, radius, owner);

    if let Some(bomb) = world.bombs.get_mut(&id) {
        bomb.state = BombState::Removed;
    }
    world.bombs.remove(&id);
    Some(explosion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::Player;
    use crate::sim::arena::Arena;

    fn setup() -> (World, TimerQueue<Pending>, EventBus, Vec<WireMessage>, GameConfig) {
        let arena = Arena::parse(&[
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
            ".........",
        ])
        .unwrap();
        let mut world = World::from_arena(&arena);
        world.add_player(Player::new(PlayerId(1), "local", Cell::new(3, 3), true));
        (world, TimerQueue::new(), EventBus::new(), Vec::new(), GameConfig::default())
    }

    #[test]
    fn placement_snapshots_range_and_schedules_fuse() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        w.player_mut(PlayerId(1)).unwrap().blast_range = 3;

        let id = place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 100, PlayerId(1)).unwrap();
        // Range upgrade after arming must not widen the blast.
        w.player_mut(PlayerId(1)).unwrap().blast_range = 7;

        let bomb = &w.bombs[&id];
        assert_eq!(bomb.blast_range, 3);
        assert_eq!(bomb.state, BombState::Armed);
        assert_eq!(w.player(PlayerId(1)).unwrap().active_bombs, 1);
        assert!(matches!(o.last(), Some(WireMessage::DropBomb { blast_range: 3, .. })));

        let due = t.pop_due(100 + cfg.timing.fuse_ms).unwrap();
        assert_eq!(due.deadline, 100 + cfg.timing.fuse_ms);
        assert!(matches!(due.action, Pending::Fuse(f) if f == id));
    }

    #[test]
    fn capacity_limits_concurrent_bombs() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 0, PlayerId(1)).is_some());
        // Step off the bomb, wait out the cooldown, try again at capacity.
        w.player_mut(PlayerId(1)).unwrap().snap_to(Cell::new(3, 4));
        w.index.set_player(PlayerId(1), Cell::new(3, 4));
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 1500, PlayerId(1)).is_none());
    }

    #[test]
    fn cooldown_gates_placement() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        w.player_mut(PlayerId(1)).unwrap().bomb_capacity = 3;
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 0, PlayerId(1)).is_some());

        w.player_mut(PlayerId(1)).unwrap().snap_to(Cell::new(3, 4));
        w.index.set_player(PlayerId(1), Cell::new(3, 4));
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 999, PlayerId(1)).is_none());
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 1000, PlayerId(1)).is_some());
    }

    #[test]
    fn occupied_cell_refuses_second_bomb() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        w.player_mut(PlayerId(1)).unwrap().bomb_capacity = 3;
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 0, PlayerId(1)).is_some());
        // Still standing on the bomb after the cooldown: same cell refused.
        assert!(place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 2000, PlayerId(1)).is_none());
        assert_eq!(w.bombs.len(), 1);
    }

    #[test]
    fn refused_placement_announces_nothing() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 0, PlayerId(1));
        let sent = o.len();
        place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 1, PlayerId(1)); // cooldown
        assert_eq!(o.len(), sent);
    }

    #[test]
    fn fuse_frees_capacity_and_removes_bomb() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        let id = place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 0, PlayerId(1)).unwrap();
        // Walk out of the blast before it fires.
        w.player_mut(PlayerId(1)).unwrap().snap_to(Cell::new(7, 7));
        w.index.set_player(PlayerId(1), Cell::new(7, 7));

        let explosion = fire_fuse(&mut w, &mut t, &mut b, &mut o, &cfg, 2000, id).unwrap();
        assert_eq!(explosion.origin, Cell::new(3, 3));
        assert!(w.bombs.is_empty());
        assert!(w.index.bomb_at(Cell::new(3, 3)).is_none());
        assert_eq!(w.player(PlayerId(1)).unwrap().active_bombs, 0);
    }

    #[test]
    fn fuse_on_missing_bomb_is_noop() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        assert!(fire_fuse(&mut w, &mut t, &mut b, &mut o, &cfg, 0, BombId(42)).is_none());
    }

    #[test]
    fn mirror_bomb_ignores_occupied_cell() {
        let (mut w, mut t, mut b, mut o, cfg) = setup();
        place_bomb(&mut w, &mut t, &mut b, &mut o, &cfg, 0, PlayerId(1)).unwrap();
        assert!(mirror_bomb(&mut w, &mut t, &mut b, &cfg, 10, PlayerId(2), Cell::new(3, 3), 2).is_none());
        assert_eq!(w.bombs.len(), 1);
    }
}
