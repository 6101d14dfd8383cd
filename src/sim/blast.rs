/// Explosion propagation — four independent rays from the origin.
///
/// Per-cell processing order along a ray:
///   1. Out of blast bounds, or a parity/border wall, or an
///      indestructible block → the ray stops *before* this cell.
///   2. Otherwise the blast is rendered here and every overlapping
///      player is hit-checked (the detonating player included —
///      self-damage is preserved, never suppressed).
///   3. A destructible block absorbs the blast: destroyed exactly once
///      per explosion (explosion-scoped destroyed set), then the ray
///      stops *after* this cell.
///
/// The origin cell is always resolved first. Side effects are dispatched
/// immediately; the rendered cells are cleared by a deferred timer after
/// the blast's visual lifetime.
///
/// Hit outcomes follow the synchronization model: only the locally-
/// controlled player takes authoritative damage from a local detonation;
/// remote overlaps merely publish a hit observation — each peer damages
/// itself and announces.

use std::collections::HashSet;

use crate::config::GameConfig;
use crate::domain::entity::PlayerId;
use crate::domain::grid::{Cell, Dir};
use crate::net::protocol::{BlockKind, WireMessage};
use super::bus::EventBus;
use super::clock::TimerQueue;
use super::damage;
use super::event::GameEvent;
use super::world::World;
use super::Pending;

/// Ephemeral record of one detonation. Exists for the duration of its
/// side-effect dispatch; the blast-lifetime timer carries only the
/// rendered cells.
#[derive(Clone, Debug)]
pub struct Explosion {
    pub origin: Cell,
    pub radius: u32,
    pub at: u64,
    /// Rendered cells per direction (origin excluded), in walk order.
    pub rays: [Vec<Cell>; 4],
    /// Blocks destroyed by this detonation.
    pub destroyed: Vec<Cell>,
}

impl Explosion {
    /// All rendered cells: origin first, then each ray in walk order.
    pub fn cells(&self) -> Vec<Cell> {
        let mut cells = vec![self.origin];
        for ray in &self.rays {
            cells.extend_from_slice(ray);
        }
        cells
    }
}

/// Detonate at `origin` with the given radius, attributing hits to
/// `attacker`. Idempotent per invocation: each block cell is destroyed
/// at most once no matter how rays overlap.
pub(crate) fn detonate(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    cfg: &GameConfig,
    now: u64,
    origin: Cell,
    radius: u32,
    attacker: PlayerId,
) -> Explosion {
    let mut destroyed_set: HashSet<Cell> = HashSet::new();
    let mut explosion = Explosion {
        origin,
        radius,
        at: now,
        rays: [Vec::new(), Vec::new(), Vec::new(), Vec::new()],
        destroyed: Vec::new(),
    };

    // Origin resolves first: destroy, render, hit-check.
    try_destroy(world, timers, bus, outbox, cfg, now, attacker, origin, &mut destroyed_set, &mut explosion.destroyed);
    bus.publish(&GameEvent::BlastCell { cell: origin });
    hit_players(world, timers, bus, outbox, cfg, now, origin, attacker);

    for (i, dir) in Dir::ALL.iter().enumerate() {
        let mut cell = origin;
        for _ in 0..radius {
            cell = cell.step(*dir);
            if !world.grid.in_blast_bounds(cell) || cell.is_wall() {
                break;
            }
            // Indestructible blocks behave like walls: stop, nothing rendered.
            let block = world.index.block_at(cell).and_then(|id| world.blocks.get(&id));
            let absorbing = match block {
                Some(b) if !b.destructible => break,
                Some(_) => true,
                None => false,
            };

            explosion.rays[i].push(cell);
            bus.publish(&GameEvent::BlastCell { cell });
            hit_players(world, timers, bus, outbox, cfg, now, cell, attacker);

            if absorbing {
                try_destroy(world, timers, bus, outbox, cfg, now, attacker, cell, &mut destroyed_set, &mut explosion.destroyed);
                break;
            }
        }
    }

    timers.schedule(now + cfg.timing.blast_ms, Pending::BlastEnd { cells: explosion.cells() });
    explosion
}

/// Destroy the destructible block at `cell`, at most once per explosion.
/// Destruction queues the delayed power-up spawn roll and announces the
/// removal when the detonation is locally owned.
fn try_destroy(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    cfg: &GameConfig,
    now: u64,
    attacker: PlayerId,
    cell: Cell,
    destroyed_set: &mut HashSet<Cell>,
    destroyed: &mut Vec<Cell>,
) {
    if destroyed_set.contains(&cell) {
        return;
    }
    let destructible = world
        .index
        .block_at(cell)
        .and_then(|id| world.blocks.get(&id))
        .map(|b| b.destructible)
        .unwrap_or(false);
    if !destructible {
        return;
    }
    if let Some(id) = world.remove_block_at(cell) {
        destroyed_set.insert(cell);
        destroyed.push(cell);
        bus.publish(&GameEvent::BlockDestroyed { id, cell });
        timers.schedule(now + cfg.timing.powerup_delay_ms, Pending::SpawnRoll(cell));
        // Only the detonation's owner announces the removal; peers
        // converge through their own local simulation of the same bomb.
        if world.player(attacker).map(|p| p.local).unwrap_or(false) {
            outbox.push(WireMessage::BlockDestroyed {
                player_id: attacker,
                x: cell.x,
                y: cell.y,
                block_type: BlockKind::Destructible,
            });
        }
    }
}

/// Hit-check one rendered cell: publish a hit observation for every
/// overlapping player, then apply authoritative damage to the locally-
/// controlled ones.
fn hit_players(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    cfg: &GameConfig,
    now: u64,
    cell: Cell,
    attacker: PlayerId,
) {
    let overlapping = world.index.players_at(cell);
    for victim in overlapping {
        bus.publish(&GameEvent::PlayerHit { id: victim, attacker });
        if world.player(victim).map(|p| p.local).unwrap_or(false) {
            damage::apply_damage(world, timers, bus, outbox, cfg, now, victim, attacker);
        }
    }
}
