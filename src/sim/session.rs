/// Session: one participant's simulation plus its synchronization edges.
///
/// Owns the world, the event bus, the timer queue, and the outbox of
/// pending relay announcements. The embedder drives it from three sides:
///
///   - local input: `try_move` / `try_place_bomb` (gated by pause/over)
///   - time: `advance_to(now_ms)` fires due timers on the logical clock
///   - the relay: `handle_wire` mirrors inbound announcements
///
/// Local actions are locally authoritative: applied to local state
/// first, then announced. Once announced they are committed — there is
/// no reconciliation if the relay drops or rejects a message (accepted
/// architectural gap). Inbound messages for remote entities mutate the
/// mirrors directly and are never re-validated; malformed or
/// out-of-context ones are logged and dropped, never fatal.
///
/// Pause and game-over gate *inputs* only. A bomb armed before a pause
/// still detonates on schedule during the pause.

use crate::config::GameConfig;
use crate::domain::entity::{Player, PlayerId};
use crate::domain::grid::{Cell, Dir};
use crate::domain::rules;
use crate::net::protocol::{self, WireMessage};
use super::arena::Arena;
use super::bomb;
use super::bus::{EventBus, SubscriberId};
use super::clock::TimerQueue;
use super::damage;
use super::event::GameEvent;
use super::powerup::{self, NoSpawns, SpawnPolicy};
use super::world::World;
use super::Pending;

pub struct Session {
    cfg: GameConfig,
    arena: Arena,
    world: World,
    bus: EventBus,
    timers: TimerQueue<Pending>,
    outbox: Vec<WireMessage>,
    policy: Box<dyn SpawnPolicy>,
    local_id: PlayerId,
    /// Join order, the basis of spawn assignment and reset.
    roster: Vec<(PlayerId, String)>,
    now: u64,
}

impl Session {
    pub fn new(cfg: GameConfig, arena: Arena, local_id: PlayerId) -> Self {
        let world = World::from_arena(&arena);
        Session {
            cfg,
            arena,
            world,
            bus: EventBus::new(),
            timers: TimerQueue::new(),
            outbox: Vec::new(),
            policy: Box::new(NoSpawns),
            local_id,
            roster: Vec::new(),
            now: 0,
        }
    }

    /// Inject the power-up selection policy (external collaborator).
    pub fn set_spawn_policy(&mut self, policy: Box<dyn SpawnPolicy>) {
        self.policy = policy;
    }

    // ── Participants ──

    /// Add a participant at the next spawn point. The local participant
    /// is the one whose id was given at construction.
    pub fn join(&mut self, id: PlayerId, nickname: &str) -> bool {
        if self.world.player(id).is_some() {
            return false;
        }
        let Some(spawn) = self.world.spawn_for(self.roster.len()) else {
            return false;
        };
        let mut player = Player::new(id, nickname, spawn, id == self.local_id);
        player.lives = self.cfg.rules.starting_lives;
        player.bomb_capacity = self.cfg.rules.starting_bombs;
        player.blast_range = self.cfg.rules.starting_range;
        player.speed = self.cfg.rules.starting_speed;
        self.world.add_player(player);
        self.roster.push((id, nickname.to_string()));
        self.bus.publish(&GameEvent::PlayerJoined {
            id,
            nickname: nickname.to_string(),
            cell: spawn,
        });
        true
    }

    /// Disconnect: tear down the participant without an elimination.
    pub fn remove_player(&mut self, id: PlayerId) {
        if self.world.remove_player(id).is_some() {
            self.roster.retain(|(rid, _)| *rid != id);
            self.bus.publish(&GameEvent::PlayerLeft { id });
            damage::check_game_over(&mut self.world, &mut self.bus);
        }
    }

    // ── Local input (silent no-ops on refusal) ──

    /// Whole-cell step in a cardinal direction for the local player.
    pub fn try_move(&mut self, dir: Dir) {
        if !self.world.ctx.accepting_input() {
            return;
        }
        let Some(player) = self.world.player(self.local_id) else { return };
        if !player.alive() {
            return;
        }
        let target = player.cell.step(dir);
        if !rules::can_enter(&self.world.grid, &self.world.index, target) {
            return;
        }
        let Some(player) = self.world.player_mut(self.local_id) else { return };
        player.snap_to(target);
        player.facing = dir;
        let (px, py) = (player.px, player.py);
        self.world.index.set_player(self.local_id, target);

        self.bus.publish(&GameEvent::PlayerMoved { id: self.local_id, cell: target, facing: dir });
        self.outbox.push(WireMessage::Move { player_id: self.local_id, x: px, y: py, direction: dir });

        // Local re-observation of the now-occupied cell.
        powerup::verify_collection(&mut self.world, &mut self.bus, &mut self.outbox, self.local_id);
    }

    /// Place a bomb under the local player. All refusals are silent.
    pub fn try_place_bomb(&mut self) {
        if !self.world.ctx.accepting_input() {
            return;
        }
        bomb::place_bomb(
            &mut self.world,
            &mut self.timers,
            &mut self.bus,
            &mut self.outbox,
            &self.cfg,
            self.now,
            self.local_id,
        );
    }

    // ── Time ──

    /// Advance the logical clock, firing every timer due on the way.
    /// Runs regardless of pause/over: scheduled transitions are not
    /// inputs and are never frozen.
    pub fn advance_to(&mut self, now_ms: u64) {
        let target = now_ms.max(self.now);
        while let Some(due) = self.timers.pop_due(target) {
            self.now = due.deadline;
            match due.action {
                Pending::Fuse(id) => {
                    bomb::fire_fuse(
                        &mut self.world,
                        &mut self.timers,
                        &mut self.bus,
                        &mut self.outbox,
                        &self.cfg,
                        self.now,
                        id,
                    );
                }
                Pending::BlastEnd { cells } => {
                    self.bus.publish(&GameEvent::BlastCleared { cells });
                }
                Pending::SpawnRoll(cell) => {
                    powerup::spawn_roll(&mut self.world, &mut self.bus, &mut *self.policy, cell);
                    powerup::verify_collection(
                        &mut self.world,
                        &mut self.bus,
                        &mut self.outbox,
                        self.local_id,
                    );
                }
                Pending::InvulnEnd(id) => {
                    damage::end_invulnerability(&mut self.world, &mut self.bus, id);
                }
            }
        }
        self.now = target;
    }

    // ── Relay (inbound mirrors, trusted as-is) ──

    /// Decode and apply one raw relay frame.
    pub fn handle_raw(&mut self, text: &str) {
        match protocol::decode(text) {
            Ok(msg) => self.handle_wire(msg),
            Err(e) => log::warn!("dropping malformed relay frame: {e}"),
        }
    }

    /// Apply an inbound announcement to the remote mirror it names.
    /// Messages claiming the local player are echoes and are dropped —
    /// local state is locally authoritative.
    pub fn handle_wire(&mut self, msg: WireMessage) {
        if msg.player_id() == self.local_id {
            log::warn!("dropping relay echo for local player {:?}", self.local_id);
            return;
        }
        match msg {
            WireMessage::Move { player_id, x, y, direction } => {
                let Some(player) = self.world.player_mut(player_id) else {
                    log::warn!("move for unknown player {:?}", player_id);
                    return;
                };
                // Mirrored verbatim — no validator on this path.
                player.px = x;
                player.py = y;
                player.facing = direction;
                let cell = Cell::containing(x, y);
                player.cell = cell;
                self.world.index.set_player(player_id, cell);
                self.bus.publish(&GameEvent::PlayerMoved { id: player_id, cell, facing: direction });
            }
            WireMessage::DropBomb { player_id, x, y, blast_range } => {
                bomb::mirror_bomb(
                    &mut self.world,
                    &mut self.timers,
                    &mut self.bus,
                    &self.cfg,
                    self.now,
                    player_id,
                    Cell::new(x, y),
                    blast_range,
                );
            }
            WireMessage::BlockDestroyed { x, y, .. } => {
                let cell = Cell::new(x, y);
                // Our own simulation of the same detonation usually got
                // here first; converging on an already-empty cell is fine.
                if let Some(id) = self.world.remove_block_at(cell) {
                    self.bus.publish(&GameEvent::BlockDestroyed { id, cell });
                    self.timers.schedule(
                        self.now + self.cfg.timing.powerup_delay_ms,
                        Pending::SpawnRoll(cell),
                    );
                }
            }
            WireMessage::CollectPowerup { player_id, powerup_type, x, y, .. } => {
                powerup::mirror_collect(
                    &mut self.world,
                    &mut self.bus,
                    player_id,
                    Cell::new(x, y),
                    powerup_type,
                );
            }
            WireMessage::PlayerHit { player_id, attacker_id } => {
                if self.world.player(player_id).is_none() {
                    log::warn!("hit for unknown player {:?}", player_id);
                    return;
                }
                damage::mirror_damage(
                    &mut self.world,
                    &mut self.timers,
                    &mut self.bus,
                    &self.cfg,
                    self.now,
                    player_id,
                    attacker_id,
                );
            }
            WireMessage::PlayerEliminated { player_id, attacker_id, .. } => {
                if self.world.player(player_id).is_none() {
                    log::warn!("elimination for unknown player {:?}", player_id);
                    return;
                }
                self.roster.retain(|(rid, _)| *rid != player_id);
                damage::eliminate(&mut self.world, &mut self.bus, player_id, attacker_id);
            }
        }
    }

    /// Take every announcement queued since the last drain, in order.
    pub fn drain_outbox(&mut self) -> Vec<WireMessage> {
        std::mem::take(&mut self.outbox)
    }

    // ── Game flow ──

    pub fn pause(&mut self) {
        if !self.world.ctx.paused {
            self.world.ctx.paused = true;
            self.bus.publish(&GameEvent::GamePaused);
        }
    }

    pub fn resume(&mut self) {
        if self.world.ctx.paused {
            self.world.ctx.paused = false;
            self.bus.publish(&GameEvent::GameResumed);
        }
    }

    /// Explicit termination (as opposed to the win-condition `GameOver`).
    pub fn end(&mut self) {
        if !self.world.ctx.over {
            self.world.ctx.over = true;
            self.bus.publish(&GameEvent::GameEnded);
        }
    }

    /// Rebuild the arena and respawn every joined participant with
    /// fresh stats. Pending timers and announcements are discarded.
    pub fn reset(&mut self) {
        self.world = World::from_arena(&self.arena);
        self.timers.clear();
        self.outbox.clear();
        let roster = std::mem::take(&mut self.roster);
        for (id, nickname) in roster {
            self.join(id, &nickname);
        }
        self.bus.publish(&GameEvent::GameReset);
    }

    // ── Observation ──

    pub fn subscribe(&mut self, handler: impl FnMut(&GameEvent) + 'static) -> SubscriberId {
        self.bus.subscribe(handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriberId) {
        self.bus.unsubscribe(id);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn local_id(&self) -> PlayerId {
        self.local_id
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Deadline of the next scheduled transition, for embedder wakeups.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }
}
