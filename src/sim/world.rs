/// World: the complete local view of one participant's simulation.
///
/// There is no authoritative server copy — every participant owns a
/// `World` like this one, mutates it from local input and timers, and
/// mirrors remote entities from inbound announcements. Divergence between
/// peers is possible by design; the protocol has no reconciliation.
///
/// Entity storage is id → entity (BTreeMap for deterministic iteration);
/// the spatial index holds the cell → id mapping and is kept consistent
/// by every mutation path before any other callback can observe it.

use std::collections::BTreeMap;

use crate::domain::entity::{
    Block, BlockId, Bomb, BombId, Player, PlayerId, PowerUp, PowerUpId, PowerUpKind,
};
use crate::domain::grid::{Cell, Grid};
use super::arena::Arena;
use super::index::SpatialIndex;

/// Simulation context flags, threaded through every entry point.
/// They gate new *inputs* only — already-scheduled timers still fire.
#[derive(Clone, Copy, Default, Debug)]
pub struct SimContext {
    pub paused: bool,
    pub over: bool,
}

impl SimContext {
    /// Are new movement/placement inputs currently accepted?
    pub fn accepting_input(&self) -> bool {
        !self.paused && !self.over
    }
}

pub struct World {
    pub grid: Grid,
    pub players: BTreeMap<PlayerId, Player>,
    pub bombs: BTreeMap<BombId, Bomb>,
    pub blocks: BTreeMap<BlockId, Block>,
    pub powerups: BTreeMap<PowerUpId, PowerUp>,
    pub index: SpatialIndex,
    pub ctx: SimContext,
    pub spawns: Vec<Cell>,
    next_bomb: u32,
    next_block: u32,
    next_powerup: u32,
}

impl World {
    pub fn from_arena(arena: &Arena) -> Self {
        let mut world = World {
            grid: arena.grid,
            players: BTreeMap::new(),
            bombs: BTreeMap::new(),
            blocks: BTreeMap::new(),
            powerups: BTreeMap::new(),
            index: SpatialIndex::new(),
            ctx: SimContext::default(),
            spawns: arena.spawns.clone(),
            next_bomb: 0,
            next_block: 0,
            next_powerup: 0,
        };
        for (cell, destructible) in &arena.blocks {
            world.add_block(*cell, *destructible);
        }
        world
    }

    // ── Entity creation (id allocation + index insert) ──

    pub fn add_block(&mut self, cell: Cell, destructible: bool) -> Option<BlockId> {
        let id = BlockId(self.next_block);
        if !self.index.insert_block(cell, id) {
            return None;
        }
        self.next_block += 1;
        self.blocks.insert(id, Block::new(id, cell, destructible));
        Some(id)
    }

    pub fn add_bomb(&mut self, owner: PlayerId, cell: Cell, range: u32, now: u64) -> Option<BombId> {
        let id = BombId(self.next_bomb);
        if !self.index.insert_bomb(cell, id) {
            return None;
        }
        self.next_bomb += 1;
        self.bombs.insert(id, Bomb::new(id, owner, cell, range, now));
        Some(id)
    }

    pub fn add_powerup(&mut self, cell: Cell, kind: PowerUpKind) -> Option<PowerUpId> {
        let id = PowerUpId(self.next_powerup);
        if !self.index.insert_powerup(cell, id) {
            return None;
        }
        self.next_powerup += 1;
        self.powerups.insert(id, PowerUp::new(id, cell, kind));
        Some(id)
    }

    pub fn add_player(&mut self, player: Player) {
        self.index.set_player(player.id, player.cell);
        self.players.insert(player.id, player);
    }

    // ── Entity removal (index kept in lockstep) ──

    /// Remove the block at `cell`. Returns its id if one was present —
    /// the idempotence basis for converging local and mirrored destruction.
    pub fn remove_block_at(&mut self, cell: Cell) -> Option<BlockId> {
        let id = self.index.remove_block(cell)?;
        self.blocks.remove(&id);
        Some(id)
    }

    pub fn remove_powerup_at(&mut self, cell: Cell) -> Option<PowerUp> {
        let id = self.index.remove_powerup(cell)?;
        self.powerups.remove(&id)
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.index.remove_player(id);
        self.players.remove(&id)
    }

    // ── Queries ──

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_mut(&id)
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.alive())
    }

    /// Spawn cell for the n-th participant, wrapping if the arena defines
    /// fewer spawns than players.
    pub fn spawn_for(&self, n: usize) -> Option<Cell> {
        if self.spawns.is_empty() {
            return None;
        }
        Some(self.spawns[n % self.spawns.len()])
    }
}
