//! Ball-ball knockback and hazard-trail bounces
//!
//! Knockback is not a physical impulse exchange: each side gets its own
//! coefficient, and powerups rescale or zero those coefficients before the
//! push is applied along the line between the centres.

use glam::Vec2;

use super::state::{Ball, BallId, GameEvent, GameState, PowerupKind};
use crate::consts::*;
use crate::{closest_point_on_segment, normalize_or_fallback};

/// Direction used when two centres (or a centre and a trail) coincide
pub const FALLBACK_NORMAL: Vec2 = Vec2::new(1.0, 0.0);

/// Result of a ball-ball contact check
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionResult {
    /// Whether the balls overlapped
    pub hit: bool,
    /// Unit vector from `b` toward `a`
    pub normal: Vec2,
    /// Sum of radii minus centre distance
    pub overlap: f32,
    /// Velocity added to `a`
    pub impulse_a: Vec2,
    /// Velocity added to `b`
    pub impulse_b: Vec2,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec2::ZERO,
            overlap: 0.0,
            impulse_a: Vec2::ZERO,
            impulse_b: Vec2::ZERO,
        }
    }
}

/// Resolve a possible collision between two balls
///
/// Skipped entirely while either ball has spawn immunity. Modifier order:
/// heavy hit, then grow, then shield.
pub fn resolve(a: &mut Ball, b: &mut Ball, now: u64) -> CollisionResult {
    if a.is_immune(now) || b.is_immune(now) {
        return CollisionResult::miss();
    }

    let delta = a.pos - b.pos;
    let dist = delta.length();
    let reach = a.radius + b.radius;
    if dist >= reach {
        return CollisionResult::miss();
    }
    let overlap = reach - dist;
    let normal = normalize_or_fallback(delta, FALLBACK_NORMAL);

    // Knockback received by each side
    let mut knock_a = BASE_KNOCKBACK;
    let mut knock_b = BASE_KNOCKBACK;
    let mut a_landed_heavy = false;
    let mut b_landed_heavy = false;

    if a.heavy_armed {
        knock_a = 0.0;
        knock_b *= HEAVY_KNOCKBACK;
        b.hit_flash_at = Some(now);
        a.heavy_armed = false;
        a.powerup = None;
        a_landed_heavy = true;
    } else if b.heavy_armed {
        knock_b = 0.0;
        knock_a *= HEAVY_KNOCKBACK;
        a.hit_flash_at = Some(now);
        b.heavy_armed = false;
        b.powerup = None;
        b_landed_heavy = true;
    }

    if a.has_powerup(PowerupKind::Grow) {
        knock_b *= GROW_KNOCKBACK;
    }
    if b.has_powerup(PowerupKind::Grow) {
        knock_a *= GROW_KNOCKBACK;
    }

    if a.has_powerup(PowerupKind::Shield) {
        knock_a = 0.0;
    }
    if b.has_powerup(PowerupKind::Shield) {
        knock_b = 0.0;
    }

    let impulse_a = normal * overlap * knock_a;
    let impulse_b = -normal * overlap * knock_b;
    a.vel += impulse_a;
    b.vel += impulse_b;

    if knock_b > 0.0 || a_landed_heavy {
        b.last_hit_by = Some(a.id);
    }
    if knock_a > 0.0 || b_landed_heavy {
        a.last_hit_by = Some(b.id);
    }

    CollisionResult { hit: true, normal, overlap, impulse_a, impulse_b }
}

/// Borrow two distinct balls mutably
fn pair_mut(balls: &mut [Ball], i: usize, j: usize) -> (&mut Ball, &mut Ball) {
    debug_assert!(i < j);
    let (head, tail) = balls.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Resolve every pair of active balls once, in roster order
pub fn resolve_all(state: &mut GameState) {
    let active = state.active_indices();
    let now = state.now_ms;
    for (n, &i) in active.iter().enumerate() {
        for &j in &active[n + 1..] {
            let (a, b) = pair_mut(&mut state.balls, i, j);
            let result = resolve(a, b, now);
            if result.hit {
                let event = GameEvent::Collision { a: a.id, b: b.id };
                state.events.push(event);
            }
        }
    }
}

/// Where a ball touched a hazard trail
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HazardHit {
    /// Unit vector from the trail toward the ball centre
    pub normal: Vec2,
    pub owner: BallId,
}

/// First hazard segment of another ball that `ball` overlaps
///
/// A ball carrying `tron` itself is never hurt by trails.
pub fn find_hazard_hit(ball: &Ball, others: &[Ball]) -> Option<HazardHit> {
    if ball.has_powerup(PowerupKind::Tron) {
        return None;
    }
    others
        .iter()
        .filter(|other| other.id != ball.id && other.active)
        .find_map(|other| {
            other
                .hazard_trail
                .iter()
                .filter(|segment| segment.length() > 0.0)
                .find_map(|segment| {
                    let closest = closest_point_on_segment(ball.pos, segment.start, segment.end);
                    let offset = ball.pos - closest;
                    (offset.length() < ball.radius).then(|| HazardHit {
                        normal: normalize_or_fallback(offset, FALLBACK_NORMAL),
                        owner: other.id,
                    })
                })
        })
}

/// Approximate trail bounce: both components are scaled by |vx + vy| of the
/// incoming velocity
pub fn hazard_bounce(vel: Vec2, normal: Vec2) -> Vec2 {
    normal * (vel.x + vel.y).abs()
}

/// Bounce every active ball that touches another ball's hazard trail
pub fn resolve_hazard_trails(state: &mut GameState) {
    for i in state.active_indices() {
        if let Some(hit) = find_hazard_hit(&state.balls[i], &state.balls) {
            let ball = &mut state.balls[i];
            ball.vel = hazard_bounce(ball.vel, hit.normal);
            let event = GameEvent::HazardBounce { ball: ball.id };
            state.events.push(event);
        }
    }
}
