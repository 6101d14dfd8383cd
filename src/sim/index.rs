/// Spatial index — the authoritative cell → occupant mapping.
///
/// Queried by value by the validator and the propagator; never derived
/// from rendered state. Per-cell capacity invariants are enforced here:
/// at most one block, one bomb, and one power-up per cell. Players may
/// overlap freely and are tracked id → cell.

use std::collections::HashMap;

use crate::domain::entity::{BlockId, BombId, PlayerId, PowerUpId};
use crate::domain::grid::Cell;
use crate::domain::rules::OccupancyView;

#[derive(Default, Debug)]
pub struct SpatialIndex {
    blocks: HashMap<Cell, BlockId>,
    bombs: HashMap<Cell, BombId>,
    powerups: HashMap<Cell, PowerUpId>,
    players: HashMap<PlayerId, Cell>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Blocks ──

    /// Insert a block. Returns false (no-op) if the cell already holds one.
    pub fn insert_block(&mut self, cell: Cell, id: BlockId) -> bool {
        if self.blocks.contains_key(&cell) {
            return false;
        }
        self.blocks.insert(cell, id);
        true
    }

    pub fn remove_block(&mut self, cell: Cell) -> Option<BlockId> {
        self.blocks.remove(&cell)
    }

    pub fn block_at(&self, cell: Cell) -> Option<BlockId> {
        self.blocks.get(&cell).copied()
    }

    // ── Bombs ──

    /// Insert a bomb. Returns false (no-op) if the cell already holds one.
    pub fn insert_bomb(&mut self, cell: Cell, id: BombId) -> bool {
        if self.bombs.contains_key(&cell) {
            return false;
        }
        self.bombs.insert(cell, id);
        true
    }

    pub fn remove_bomb(&mut self, cell: Cell) -> Option<BombId> {
        self.bombs.remove(&cell)
    }

    pub fn bomb_at(&self, cell: Cell) -> Option<BombId> {
        self.bombs.get(&cell).copied()
    }

    // ── Power-ups ──

    pub fn insert_powerup(&mut self, cell: Cell, id: PowerUpId) -> bool {
        if self.powerups.contains_key(&cell) {
            return false;
        }
        self.powerups.insert(cell, id);
        true
    }

    pub fn remove_powerup(&mut self, cell: Cell) -> Option<PowerUpId> {
        self.powerups.remove(&cell)
    }

    pub fn powerup_at(&self, cell: Cell) -> Option<PowerUpId> {
        self.powerups.get(&cell).copied()
    }

    // ── Players ──

    pub fn set_player(&mut self, id: PlayerId, cell: Cell) {
        self.players.insert(id, cell);
    }

    pub fn remove_player(&mut self, id: PlayerId) {
        self.players.remove(&id);
    }

    pub fn player_cell(&self, id: PlayerId) -> Option<Cell> {
        self.players.get(&id).copied()
    }

    /// Every player currently occupying `cell`, sorted for determinism.
    pub fn players_at(&self, cell: Cell) -> Vec<PlayerId> {
        let mut ids: Vec<PlayerId> = self
            .players
            .iter()
            .filter(|(_, c)| **c == cell)
            .map(|(id, _)| *id)
            .collect();
        ids.sort();
        ids
    }

    pub fn clear(&mut self) {
        self.blocks.clear();
        self.bombs.clear();
        self.powerups.clear();
        self.players.clear();
    }
}

impl OccupancyView for SpatialIndex {
    fn has_block(&self, cell: Cell) -> bool {
        self.blocks.contains_key(&cell)
    }
    fn has_bomb(&self, cell: Cell) -> bool {
        self.bombs.contains_key(&cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_bomb_per_cell() {
        let mut idx = SpatialIndex::new();
        assert!(idx.insert_bomb(Cell::new(3, 3), BombId(0)));
        assert!(!idx.insert_bomb(Cell::new(3, 3), BombId(1)));
        assert_eq!(idx.bomb_at(Cell::new(3, 3)), Some(BombId(0)));
    }

    #[test]
    fn one_block_per_cell() {
        let mut idx = SpatialIndex::new();
        assert!(idx.insert_block(Cell::new(3, 3), BlockId(0)));
        assert!(!idx.insert_block(Cell::new(3, 3), BlockId(1)));
        idx.remove_block(Cell::new(3, 3));
        assert!(idx.insert_block(Cell::new(3, 3), BlockId(1)));
    }

    #[test]
    fn one_powerup_per_cell() {
        let mut idx = SpatialIndex::new();
        assert!(idx.insert_powerup(Cell::new(5, 1), PowerUpId(0)));
        assert!(!idx.insert_powerup(Cell::new(5, 1), PowerUpId(1)));
        assert_eq!(idx.remove_powerup(Cell::new(5, 1)), Some(PowerUpId(0)));
        assert_eq!(idx.remove_powerup(Cell::new(5, 1)), None);
    }

    #[test]
    fn players_may_overlap() {
        let mut idx = SpatialIndex::new();
        idx.set_player(PlayerId(1), Cell::new(3, 3));
        idx.set_player(PlayerId(2), Cell::new(3, 3));
        idx.set_player(PlayerId(3), Cell::new(5, 5));
        assert_eq!(idx.players_at(Cell::new(3, 3)), vec![PlayerId(1), PlayerId(2)]);
        assert_eq!(idx.players_at(Cell::new(1, 1)), Vec::<PlayerId>::new());
    }

    #[test]
    fn moving_a_player_updates_its_cell() {
        let mut idx = SpatialIndex::new();
        idx.set_player(PlayerId(1), Cell::new(3, 3));
        idx.set_player(PlayerId(1), Cell::new(3, 4));
        assert_eq!(idx.players_at(Cell::new(3, 3)), Vec::<PlayerId>::new());
        assert_eq!(idx.player_cell(PlayerId(1)), Some(Cell::new(3, 4)));
    }

    #[test]
    fn occupancy_view_queries() {
        use crate::domain::rules::OccupancyView;
        let mut idx = SpatialIndex::new();
        idx.insert_block(Cell::new(1, 2), BlockId(0));
        idx.insert_bomb(Cell::new(2, 1), BombId(0));
        assert!(idx.has_block(Cell::new(1, 2)));
        assert!(idx.has_bomb(Cell::new(2, 1)));
        assert!(!idx.has_block(Cell::new(2, 1)));
    }
}
