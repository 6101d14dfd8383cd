/// Simulation layer: mutable world state and its timer-deferred
/// transitions. Single logical thread; every mutation path leaves the
/// spatial index consistent before any other scheduled callback runs.

pub mod arena;
pub mod blast;
pub mod bomb;
pub mod bus;
pub mod clock;
pub mod damage;
pub mod event;
pub mod index;
pub mod powerup;
pub mod session;
pub mod world;

use crate::domain::entity::{BombId, PlayerId};
use crate::domain::grid::Cell;

/// Deferred simulation actions carried on the timer queue.
/// Nothing cancels fuses or spawn rolls; only a fresh invulnerability
/// window replaces a stale `InvulnEnd`.
#[derive(Clone, Debug)]
pub enum Pending {
    /// Fuse expiry: Armed → Exploding.
    Fuse(BombId),
    /// End of a blast's visual lifetime.
    BlastEnd { cells: Vec<Cell> },
    /// Post-destruction spawn roll for the vacated cell.
    SpawnRoll(Cell),
    /// Invulnerability window expiry.
    InvulnEnd(PlayerId),
}
