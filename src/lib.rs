//! Cell-grid arena combat simulation for serverless multiplayer.
//!
//! Every participant runs a full local simulation and is the authority
//! for its own player: local actions commit immediately and are then
//! announced over a relay; remote players exist as mirrors driven by
//! inbound announcements. There is no server-side referee and no
//! reconciliation — peers converge because they share the rules, the
//! arena, and the announcement stream.
//!
//! Layering:
//!   - [`domain`] — pure rules and geometry, no mutable state
//!   - [`sim`] — the world, its timer-deferred transitions, the event bus
//!   - [`net`] — the relay wire protocol
//!   - [`config`] — tunable timings and starting stats
//!
//! [`Session`] ties the layers together; an embedder drives it with
//! local input, clock advancement, and inbound relay frames, and
//! observes it through subscribed [`GameEvent`] callbacks plus the
//! drained announcement outbox.

pub mod config;
pub mod domain;
pub mod net;
pub mod sim;

pub use config::GameConfig;
pub use domain::entity::{PlayerId, PlayerStats, PowerUpKind, VulnState};
pub use domain::grid::{Cell, Dir, Grid};
pub use net::protocol::WireMessage;
pub use sim::arena::{Arena, ArenaError};
pub use sim::bus::{EventBus, SubscriberId};
pub use sim::event::GameEvent;
pub use sim::powerup::{NoSpawns, SpawnPolicy};
pub use sim::session::Session;
