/// Entities: Player, Bomb, Block, PowerUp, and their state machines.
///
/// Bomb:   Armed → Exploding → Removed             (terminal)
/// Player: Vulnerable ⇄ Invulnerable, → Eliminated (terminal)
///
/// All entities carry their grid cell; the player additionally keeps a
/// continuous position for announcements and rendering. The continuous
/// position of a locally-controlled player is always a cell center —
/// movement is whole-cell stepping, interpolation is a renderer concern.

use serde::{Deserialize, Serialize};

use super::grid::{Cell, Dir};
use crate::sim::clock::TimerToken;

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct PlayerId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct BombId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct BlockId(pub u32);

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct PowerUpId(pub u32);

/// Player vulnerability state machine.
/// Vulnerable ⇄ Invulnerable cycles; Eliminated is one-way.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VulnState {
    Vulnerable,
    Invulnerable,
    Eliminated,
}

#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub nickname: String,
    /// Continuous position in pixels. Cell-center aligned for the local
    /// player; mirrored verbatim from announcements for remote players.
    pub px: f32,
    pub py: f32,
    pub cell: Cell,
    pub facing: Dir,
    pub speed: f32,
    pub bomb_capacity: u32,
    pub blast_range: u32,
    pub lives: u32,
    pub active_bombs: u32,
    /// Logical-clock timestamp of the last successful placement;
    /// basis of the placement cooldown.
    pub last_bomb_at: Option<u64>,
    pub vuln: VulnState,
    /// Cancellation token of the pending invulnerability-end timer.
    pub invuln_timer: Option<TimerToken>,
    /// True for the locally-controlled player, false for remote mirrors.
    pub local: bool,
}

impl Player {
    pub fn new(id: PlayerId, nickname: &str, cell: Cell, local: bool) -> Self {
        let (px, py) = cell.center();
        Player {
            id,
            nickname: nickname.to_string(),
            px,
            py,
            cell,
            facing: Dir::Down,
            speed: 1.0,
            bomb_capacity: 1,
            blast_range: 1,
            lives: 3,
            active_bombs: 0,
            last_bomb_at: None,
            vuln: VulnState::Vulnerable,
            invuln_timer: None,
            local,
        }
    }

    pub fn alive(&self) -> bool {
        self.vuln != VulnState::Eliminated
    }

    /// Snap the continuous position onto a cell center.
    pub fn snap_to(&mut self, cell: Cell) {
        let (px, py) = cell.center();
        self.px = px;
        self.py = py;
        self.cell = cell;
    }

    pub fn stats(&self) -> PlayerStats {
        PlayerStats {
            lives: self.lives,
            bomb_capacity: self.bomb_capacity,
            blast_range: self.blast_range,
            speed: self.speed,
        }
    }
}

/// Announced stat block, published on every stat change.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct PlayerStats {
    pub lives: u32,
    pub bomb_capacity: u32,
    pub blast_range: u32,
    pub speed: f32,
}

/// Bomb lifecycle state. Removed is terminal.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BombState {
    Armed,
    Exploding,
    Removed,
}

#[derive(Clone, Debug)]
pub struct Bomb {
    pub id: BombId,
    pub owner: PlayerId,
    pub cell: Cell,
    /// Owner's range at placement time. Range power-ups collected while
    /// the bomb is armed do not retroactively widen this blast.
    pub blast_range: u32,
    pub placed_at: u64,
    pub state: BombState,
}

impl Bomb {
    pub fn new(id: BombId, owner: PlayerId, cell: Cell, blast_range: u32, placed_at: u64) -> Self {
        Bomb { id, owner, cell, blast_range, placed_at, state: BombState::Armed }
    }
}

#[derive(Clone, Debug)]
pub struct Block {
    pub id: BlockId,
    pub cell: Cell,
    pub destructible: bool,
}

impl Block {
    pub fn new(id: BlockId, cell: Cell, destructible: bool) -> Self {
        Block { id, cell, destructible }
    }
}

/// Power-up stat effects.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    ExtraBomb,
    BlastRange,
    Speed,
    ExtraLife,
}

impl PowerUpKind {
    /// Apply the stat effect. Crate-internal: the only callers are the
    /// verified-collection path and remote-mirror stat sync.
    pub(crate) fn apply(self, player: &mut Player) {
        match self {
            PowerUpKind::ExtraBomb => player.bomb_capacity += 1,
            PowerUpKind::BlastRange => player.blast_range += 1,
            PowerUpKind::Speed => player.speed += 0.25,
            PowerUpKind::ExtraLife => player.lives += 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PowerUp {
    pub id: PowerUpId,
    pub cell: Cell,
    pub kind: PowerUpKind,
}

impl PowerUp {
    pub fn new(id: PowerUpId, cell: Cell, kind: PowerUpKind) -> Self {
        PowerUp { id, cell, kind }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_vulnerable_at_cell_center() {
        let p = Player::new(PlayerId(1), "nick", Cell::new(1, 1), true);
        assert_eq!(p.vuln, VulnState::Vulnerable);
        assert_eq!(p.cell, Cell::new(1, 1));
        assert_eq!((p.px, p.py), Cell::new(1, 1).center());
        assert_eq!(p.active_bombs, 0);
    }

    #[test]
    fn powerup_effects() {
        let mut p = Player::new(PlayerId(1), "nick", Cell::new(1, 1), true);
        PowerUpKind::ExtraBomb.apply(&mut p);
        PowerUpKind::BlastRange.apply(&mut p);
        PowerUpKind::ExtraLife.apply(&mut p);
        let before = p.speed;
        PowerUpKind::Speed.apply(&mut p);
        assert_eq!(p.bomb_capacity, 2);
        assert_eq!(p.blast_range, 2);
        assert_eq!(p.lives, 4);
        assert!(p.speed > before);
    }

    #[test]
    fn bomb_snapshot_is_independent_of_owner() {
        let mut p = Player::new(PlayerId(1), "nick", Cell::new(1, 1), true);
        let bomb = Bomb::new(BombId(0), p.id, p.cell, p.blast_range, 0);
        PowerUpKind::BlastRange.apply(&mut p);
        assert_eq!(bomb.blast_range, 1);
        assert_eq!(p.blast_range, 2);
    }
}
