/// Damage / elimination state machine.
///
/// Per player: Vulnerable → Invulnerable → Vulnerable (cyclic), any
/// non-terminal state → Eliminated (terminal, the player entity is torn
/// down). Transitions:
///
/// ┌───────────────┬──────────────────────┬──────────────────────────┐
/// │ State         │ Damage event         │ Result                   │
/// ├───────────────┼──────────────────────┼──────────────────────────┤
/// │ Vulnerable    │ lives > 1            │ −1 life, → Invulnerable  │
/// │ Vulnerable    │ lives == 1           │ → Eliminated             │
/// │ Invulnerable  │ any                  │ no-op (no reschedule)    │
/// │ Eliminated    │ any                  │ ignored (entity gone)    │
/// └───────────────┴──────────────────────┴──────────────────────────┘
///
/// The local player's damage is locally authoritative and announced
/// outward; remote mirrors take damage only from inbound announcements.
/// Elimination always carries an attacker id — the victim's own id for
/// self-elimination, so "killed by self" is never conflated with
/// "unknown attacker".

use crate::config::GameConfig;
use crate::domain::entity::{PlayerId, VulnState};
use crate::net::protocol::WireMessage;
use super::bus::EventBus;
use super::clock::TimerQueue;
use super::event::GameEvent;
use super::world::World;
use super::Pending;

/// Apply a locally-derived damage event to the locally-controlled player.
/// Announces the hit (and possibly the elimination) outward.
pub(crate) fn apply_damage(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    outbox: &mut Vec<WireMessage>,
    cfg: &GameConfig,
    now: u64,
    victim: PlayerId,
    attacker: PlayerId,
) {
    let Some(player) = world.player_mut(victim) else { return };
    if player.vuln != VulnState::Vulnerable {
        return;
    }

    player.lives = player.lives.saturating_sub(1);
    let lives = player.lives;
    let stats = player.stats();

    outbox.push(WireMessage::PlayerHit { player_id: victim, attacker_id: attacker });
    bus.publish(&GameEvent::PlayerDamaged { id: victim, attacker, lives });
    bus.publish(&GameEvent::StatsUpdated { id: victim, stats });

    if lives == 0 {
        outbox.push(WireMessage::PlayerEliminated {
            player_id: victim,
            attacker_id: attacker,
            // Self-elimination must reach every peer even if the relay
            // would otherwise suppress echoes to the sender.
            force_broadcast: attacker == victim,
        });
        eliminate(world, bus, victim, attacker);
    } else {
        start_invulnerability(world, timers, bus, cfg, now, victim);
    }
}

/// Mirror a damage announcement onto a remote player. No outward
/// announcement and no elimination — elimination arrives as its own
/// message from the authoritative (victim's) client.
pub(crate) fn mirror_damage(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    cfg: &GameConfig,
    now: u64,
    victim: PlayerId,
    attacker: PlayerId,
) {
    let Some(player) = world.player_mut(victim) else { return };
    if player.vuln != VulnState::Vulnerable {
        return;
    }

    player.lives = player.lives.saturating_sub(1);
    let lives = player.lives;
    let stats = player.stats();
    bus.publish(&GameEvent::PlayerDamaged { id: victim, attacker, lives });
    bus.publish(&GameEvent::StatsUpdated { id: victim, stats });

    if lives > 0 {
        start_invulnerability(world, timers, bus, cfg, now, victim);
    }
}

/// Vulnerable → Invulnerable for the configured window. A stale pending
/// end-timer is cancelled and replaced; expiry is the only other thing
/// that clears it.
fn start_invulnerability(
    world: &mut World,
    timers: &mut TimerQueue<Pending>,
    bus: &mut EventBus,
    cfg: &GameConfig,
    now: u64,
    id: PlayerId,
) {
    let Some(player) = world.player_mut(id) else { return };
    player.vuln = VulnState::Invulnerable;
    if let Some(stale) = player.invuln_timer.take() {
        timers.cancel(stale);
    }
    let until = now + cfg.timing.invuln_ms;
    player.invuln_timer = Some(timers.schedule(until, Pending::InvulnEnd(id)));
    bus.publish(&GameEvent::InvulnerabilityStarted { id, until });
}

/// Invulnerability window expiry: revert to Vulnerable.
pub(crate) fn end_invulnerability(world: &mut World, bus: &mut EventBus, id: PlayerId) {
    let Some(player) = world.player_mut(id) else { return };
    if player.vuln != VulnState::Invulnerable {
        return;
    }
    player.vuln = VulnState::Vulnerable;
    player.invuln_timer = None;
    bus.publish(&GameEvent::InvulnerabilityEnded { id });
}

/// Terminal transition: tear the player down and fire the local
/// elimination event. One-way; the entity no longer exists afterwards,
/// so later damage events find nothing to apply to.
pub(crate) fn eliminate(world: &mut World, bus: &mut EventBus, victim: PlayerId, attacker: PlayerId) {
    if let Some(mut player) = world.remove_player(victim) {
        player.vuln = VulnState::Eliminated;
        bus.publish(&GameEvent::PlayerEliminated { id: victim, attacker });
    }
    check_game_over(world, bus);
}

/// End the round once at most one participant remains.
pub(crate) fn check_game_over(world: &mut World, bus: &mut EventBus) {
    if world.ctx.over || world.players.len() > 1 {
        return;
    }
    world.ctx.over = true;
    let winner = world.players.keys().next().copied();
    bus.publish(&GameEvent::GameOver { winner });
}
