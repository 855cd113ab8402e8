//! Powerup lifecycle: field spawns, pickups, timed effects and expiry

use glam::Vec2;
use rand::Rng;

use super::state::{ActivePowerup, Ball, GameEvent, GameState, GhostPoint, HazardSegment, Powerup, PowerupKind};
use crate::consts::*;
use crate::distance;

/// Spawn a powerup once the configured interval has passed and the field has room
///
/// The interval keeps counting while the field is full, so a freed slot
/// is refilled on the next tick.
pub fn maybe_spawn(state: &mut GameState) -> bool {
    let interval = state.config.powerup_pace.interval_ms();
    if state.now_ms.saturating_sub(state.last_powerup_spawn) <= interval {
        return false;
    }
    if state.powerups.len() >= MAX_FIELD_POWERUPS {
        return false;
    }
    spawn_powerup(state);
    state.last_powerup_spawn = state.now_ms;
    true
}

/// Place a random powerup at a random spot fully on the platform
pub fn spawn_powerup(state: &mut GameState) {
    let platform = state.platform;
    let margin = POWERUP_RADIUS as i32;
    let lo = Vec2::new(platform.left(), platform.top()).as_ivec2() + margin;
    let hi = Vec2::new(platform.right(), platform.bottom()).as_ivec2() - margin;

    let kind = PowerupKind::ALL[state.rng.random_range(0..PowerupKind::ALL.len())];
    let x = state.rng.random_range(lo.x..=hi.x);
    let y = state.rng.random_range(lo.y..=hi.y);

    let id = state.next_raw_id();
    state.powerups.push(Powerup { id, kind, pos: Vec2::new(x as f32, y as f32) });
    log::debug!("Spawned {} powerup at ({}, {})", kind.as_str(), x, y);
    state.events.push(GameEvent::PowerupSpawned { kind });
}

/// Let ball `idx` collect every powerup it touches; the last one picked wins
pub fn collect_pickups(state: &mut GameState, idx: usize) {
    let mut i = 0;
    while i < state.powerups.len() {
        let ball = &state.balls[idx];
        let powerup = &state.powerups[i];
        if distance(ball.pos, powerup.pos) < ball.radius + powerup.radius() {
            let kind = state.powerups.remove(i).kind;
            apply_powerup(state, idx, kind);
        } else {
            i += 1;
        }
    }
}

/// Give ball `idx` a powerup effect starting now
///
/// A powerup already held is ended first so its side effects do not linger.
pub fn apply_powerup(state: &mut GameState, idx: usize, kind: PowerupKind) {
    let now = state.now_ms;
    if state.balls[idx].powerup.is_some() {
        end_powerup(state, idx);
    }

    let ball = &mut state.balls[idx];
    ball.powerup = Some(ActivePowerup { kind, ends_at: now + kind.duration_ms() });
    let id = ball.id;
    log::debug!("Ball {} picked up {}", id.0, kind.as_str());

    match kind {
        PowerupKind::Grow => ball.radius = BALL_RADIUS * GROW_MULTIPLIER,
        PowerupKind::Heavy => ball.heavy_armed = true,
        PowerupKind::Tron => {
            let seed = HazardSegment::at(ball.pos, ball.palette[2]);
            ball.hazard_trail = vec![seed];
        }
        PowerupKind::Shrink => {
            for other in others_mut(state, idx) {
                other.radius = BALL_RADIUS * SHRINK_MULTIPLIER;
            }
        }
        PowerupKind::Freeze => {
            let until = now + PowerupKind::Freeze.duration_ms();
            for other in others_mut(state, idx) {
                other.freeze(until);
            }
        }
        PowerupKind::Shield => {}
    }

    state.events.push(GameEvent::PowerupPicked { ball: id, kind });
}

/// Active balls other than `idx`
fn others_mut(state: &mut GameState, idx: usize) -> impl Iterator<Item = &mut Ball> {
    state
        .balls
        .iter_mut()
        .enumerate()
        .filter(move |(i, b)| *i != idx && b.active)
        .map(|(_, b)| b)
}

/// Undo the held powerup's side effects and return the ball to base size
pub fn end_powerup(state: &mut GameState, idx: usize) {
    let Some(active) = state.balls[idx].powerup else {
        return;
    };

    match active.kind {
        PowerupKind::Tron => state.balls[idx].hazard_trail.clear(),
        PowerupKind::Heavy => state.balls[idx].heavy_armed = false,
        PowerupKind::Shrink => {
            for other in others_mut(state, idx) {
                other.radius = if other.has_powerup(PowerupKind::Grow) {
                    BALL_RADIUS * GROW_MULTIPLIER
                } else {
                    BALL_RADIUS
                };
            }
        }
        PowerupKind::Freeze => {
            for other in others_mut(state, idx) {
                other.unfreeze();
            }
        }
        PowerupKind::Grow | PowerupKind::Shield => {}
    }

    let ball = &mut state.balls[idx];
    ball.powerup = None;
    ball.radius = BALL_RADIUS;
}

/// Expire held powerups whose time is up
pub fn expire_powerups(state: &mut GameState) {
    let now = state.now_ms;
    for idx in state.active_indices() {
        let Some(active) = state.balls[idx].powerup else {
            continue;
        };
        if now >= active.ends_at {
            end_powerup(state, idx);
            let id = state.balls[idx].id;
            log::debug!("Ball {} lost {}", id.0, active.kind.as_str());
            state.events.push(GameEvent::PowerupExpired { ball: id, kind: active.kind });
        }
    }
}

/// Thaw balls whose freeze has run out
pub fn expire_freezes(state: &mut GameState) {
    let now = state.now_ms;
    for ball in state.balls.iter_mut().filter(|b| b.active) {
        if ball.frozen_until.is_some_and(|until| now >= until) {
            ball.unfreeze();
        }
    }
}

/// Maintain the ghost images drawn behind shielded or freshly hit balls
pub fn update_ghost_trail(ball: &mut Ball, now: u64) {
    let flashing = ball.hit_flash_at.is_some_and(|at| now.saturating_sub(at) < HIT_FLASH_MS);
    if !(ball.has_powerup(PowerupKind::Shield) || flashing) {
        ball.ghost_trail.clear();
        return;
    }

    let far_enough = ball
        .ghost_trail
        .last()
        .is_none_or(|last| distance(last.pos, ball.pos) > GHOST_TRAIL_SPACING);
    if far_enough {
        ball.ghost_trail.push(GhostPoint { pos: ball.pos, at_ms: now });
        if ball.ghost_trail.len() > GHOST_TRAIL_LENGTH {
            ball.ghost_trail.remove(0);
        }
    }
}
