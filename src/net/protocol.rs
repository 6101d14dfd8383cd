/// Relay wire protocol.
///
/// Every message carries the acting player's id. Outbound messages are
/// announcements of *already-committed* local state; inbound messages
/// mutate remote mirrors directly. The relay is an opaque, at-least-
/// attempted delivery channel: there is no acknowledgement, and a
/// rejected or lost announcement is never reconciled — an accepted
/// architectural gap, not a handled error.
///
/// Encoding is JSON with a `type` discriminator and camelCase fields.

use serde::{Deserialize, Serialize};

use crate::domain::entity::{PlayerId, PowerUpId, PowerUpKind};
use crate::domain::grid::Dir;

/// Block classification carried by BLOCK_DESTROYED, for removal sync.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockKind {
    Destructible,
    Solid,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WireMessage {
    /// Authoritative position update for the announcing player.
    #[serde(rename_all = "camelCase")]
    Move {
        player_id: PlayerId,
        x: f32,
        y: f32,
        direction: Dir,
    },
    /// Bomb armed at a cell, with the range snapshotted at placement.
    #[serde(rename_all = "camelCase")]
    DropBomb {
        player_id: PlayerId,
        x: i32,
        y: i32,
        blast_range: u32,
    },
    /// Destructible block removed at a cell.
    #[serde(rename_all = "camelCase")]
    BlockDestroyed {
        player_id: PlayerId,
        x: i32,
        y: i32,
        block_type: BlockKind,
    },
    /// Verified collection, announced for removal sync on peers.
    #[serde(rename_all = "camelCase")]
    CollectPowerup {
        player_id: PlayerId,
        powerup_id: PowerUpId,
        powerup_type: PowerUpKind,
        x: i32,
        y: i32,
    },
    /// Damage event; attacker defaults to the victim itself.
    #[serde(rename_all = "camelCase")]
    PlayerHit {
        player_id: PlayerId,
        attacker_id: PlayerId,
    },
    /// Terminal elimination. `force_broadcast` marks self-elimination
    /// cases that need guaranteed propagation.
    #[serde(rename_all = "camelCase")]
    PlayerEliminated {
        player_id: PlayerId,
        attacker_id: PlayerId,
        force_broadcast: bool,
    },
}

impl WireMessage {
    /// The acting player.
    pub fn player_id(&self) -> PlayerId {
        match *self {
            WireMessage::Move { player_id, .. }
            | WireMessage::DropBomb { player_id, .. }
            | WireMessage::BlockDestroyed { player_id, .. }
            | WireMessage::CollectPowerup { player_id, .. }
            | WireMessage::PlayerHit { player_id, .. }
            | WireMessage::PlayerEliminated { player_id, .. } => player_id,
        }
    }
}

pub fn encode(msg: &WireMessage) -> serde_json::Result<String> {
    serde_json::to_string(msg)
}

pub fn decode(text: &str) -> serde_json::Result<WireMessage> {
    serde_json::from_str(text)
}
