/// Events published on the in-process bus during simulation.
/// The presentation layer consumes these for rendering/sound; the
/// session itself consumes nothing — state is mutated before publish.

use crate::domain::entity::{
    BlockId, BombId, PlayerId, PlayerStats, PowerUpId, PowerUpKind,
};
use crate::domain::grid::{Cell, Dir};
use crate::sim::powerup::VerifiedPickup;

#[derive(Clone, Debug)]
pub enum GameEvent {
    PlayerJoined { id: PlayerId, nickname: String, cell: Cell },
    PlayerMoved { id: PlayerId, cell: Cell, facing: Dir },
    /// A blast cell overlapped this player (fires even while invulnerable).
    PlayerHit { id: PlayerId, attacker: PlayerId },
    /// A life was actually lost.
    PlayerDamaged { id: PlayerId, attacker: PlayerId, lives: u32 },
    PlayerEliminated { id: PlayerId, attacker: PlayerId },
    PlayerLeft { id: PlayerId },
    InvulnerabilityStarted { id: PlayerId, until: u64 },
    InvulnerabilityEnded { id: PlayerId },
    StatsUpdated { id: PlayerId, stats: PlayerStats },

    BombPlaced { id: BombId, owner: PlayerId, cell: Cell },
    BlastCell { cell: Cell },
    BlastCleared { cells: Vec<Cell> },
    BlockDestroyed { id: BlockId, cell: Cell },

    PowerUpSpawned { id: PowerUpId, cell: Cell, kind: PowerUpKind },
    PowerUpCollected { id: PowerUpId, by: PlayerId, kind: PowerUpKind, cell: Cell },
    /// Stat application with verification provenance: the pickup token is
    /// only minted by the local re-observation path, never from the wire.
    PowerUpApplied { by: PlayerId, kind: PowerUpKind, pickup: VerifiedPickup },

    GamePaused,
    GameResumed,
    GameEnded,
    GameOver { winner: Option<PlayerId> },
    GameReset,
}
