//! AI steering for the solo opponent and co-op wave balls
//!
//! Steering is stateless: every frame the AI looks at the world, builds a
//! desired move vector and accelerates toward it. Human input changes
//! velocity directly; the AI only ever accelerates, so it turns gradually.

use glam::Vec2;
use rand::Rng;

use super::physics::Platform;
use super::state::{Ball, GameState, Pilot, Powerup, PowerupKind};
use crate::consts::*;
use crate::{distance, normalize_or_fallback};

/// Snapshot of the ball being chased
#[derive(Debug, Clone, Copy)]
struct Target {
    pos: Vec2,
    vel: Vec2,
    powerup: Option<PowerupKind>,
}

impl From<&Ball> for Target {
    fn from(ball: &Ball) -> Self {
        Self { pos: ball.pos, vel: ball.vel, powerup: ball.powerup_kind() }
    }
}

/// Per-axis unit step toward `to`; an axis that already lines up stays 0
pub fn axis_toward(from: Vec2, to: Vec2) -> Vec2 {
    let step = |a: f32, b: f32| {
        if b > a {
            1.0
        } else if b < a {
            -1.0
        } else {
            0.0
        }
    };
    Vec2::new(step(from.x, to.x), step(from.y, to.y))
}

/// Closest powerup on the field
pub fn nearest_powerup(pos: Vec2, powerups: &[Powerup]) -> Option<&Powerup> {
    powerups
        .iter()
        .min_by(|a, b| distance(pos, a.pos).total_cmp(&distance(pos, b.pos)))
}

/// Index of the closest active human ball
pub fn nearest_active_human(state: &GameState, pos: Vec2) -> Option<usize> {
    state
        .balls
        .iter()
        .enumerate()
        .filter(|(_, b)| b.active && b.pilot == Pilot::Human)
        .min_by(|(_, a), (_, b)| distance(pos, a.pos).total_cmp(&distance(pos, b.pos)))
        .map(|(i, _)| i)
}

/// Push away from any edge closer than `margin`, `force` steering units per edge
fn edge_avoidance(pos: Vec2, platform: &Platform, margin: f32, force: f32) -> Vec2 {
    let [left, right, top, bottom] = platform.edge_distances(pos);
    let force = force * BALL_SPEED * AI_SPEED;
    let mut push = Vec2::ZERO;
    if left < margin {
        push.x += force;
    }
    if right < margin {
        push.x -= force;
    }
    if top < margin {
        push.y += force;
    }
    if bottom < margin {
        push.y -= force;
    }
    push
}

/// Steer the solo opponent at ball `idx` against the lone human
pub fn move_ai_ball(state: &mut GameState, idx: usize) {
    let ai = &state.balls[idx];
    if ai.is_frozen() || !ai.active {
        return;
    }
    let Some(target) = state.active_humans().next().map(Target::from) else {
        return;
    };
    let pos = ai.pos;
    let unit = BALL_SPEED * AI_SPEED;

    // Keep a wider berth from the edges while the human is powered up
    let (margin, force) = if target.powerup.is_some() {
        (AI_PLATFORM_MARGIN * 2.0, 4.0)
    } else {
        (AI_PLATFORM_MARGIN, 3.0)
    };
    let mut steer = edge_avoidance(pos, &state.platform, margin, force);

    let to_target = distance(pos, target.pos);
    match target.powerup {
        Some(kind) if to_target < AI_SOLO_DETECTION => {
            let center_offset = state.platform.center() - pos;
            // Dead centre: no blend, only the edge push applies
            if center_offset.length() > 0.0 {
                let escape = normalize_or_fallback(pos - target.pos, Vec2::X);
                let to_center = center_offset.normalize();
                let nearest_edge = state.platform.edge_distances(pos).into_iter().fold(f32::INFINITY, f32::min);
                let edge_proximity = if nearest_edge > 0.0 { (margin * 2.0 / nearest_edge).min(1.0) } else { 1.0 };
                let center_weight = 0.7 * edge_proximity;

                let mut flee = (escape * (1.0 - center_weight) + to_center * center_weight) * unit * 2.0;
                if kind.is_dangerous() {
                    flee *= 1.8;
                }
                steer += flee;
            }
        }
        _ => {
            let pickup = nearest_powerup(pos, &state.powerups).map(|p| p.pos);
            let wants_pickup = pickup.is_some() && state.rng.random::<f32>() < AI_POWERUP_PRIORITY;
            match pickup {
                Some(goal) if wants_pickup => {
                    let speed = (0.5 + distance(pos, goal) / 400.0).min(1.5);
                    steer += axis_toward(pos, goal) * unit * speed;
                }
                _ => {
                    let predicted = target.pos + target.vel * AI_PREDICTION_FRAMES;
                    steer += axis_toward(pos, predicted) * unit;
                }
            }
        }
    }

    state.balls[idx].vel += steer * AI_ACCELERATION;
}

/// Steer a co-op wave ball at the nearest surviving human
pub fn move_ai_ball_coop(state: &mut GameState, idx: usize) {
    let ai = &state.balls[idx];
    let Pilot::CoopAi { speed_multiplier: mult } = ai.pilot else {
        return;
    };
    if ai.is_frozen() || !ai.active {
        return;
    }
    let pos = ai.pos;
    let Some(target) = nearest_active_human(state, pos).map(|i| Target::from(&state.balls[i])) else {
        return;
    };
    let unit = BALL_SPEED * AI_SPEED;

    let mut steer = edge_avoidance(pos, &state.platform, AI_PLATFORM_MARGIN, 3.0);

    let offset = target.pos - pos;
    let to_target = offset.length();
    match target.powerup {
        Some(kind) if to_target < AI_COOP_DETECTION => {
            if kind.is_dangerous() {
                steer -= normalize_or_fallback(offset, Vec2::X) * unit * 1.5 * mult;
            } else if let Some(p) = nearest_powerup(pos, &state.powerups) {
                steer += axis_toward(pos, p.pos) * unit * mult;
            } else {
                // Circle the target at a right angle
                let angle = offset.y.atan2(offset.x) + std::f32::consts::FRAC_PI_2;
                steer += Vec2::from_angle(angle) * unit * mult;
            }
        }
        _ => {
            let looks = state.rng.random::<f32>() < AI_COOP_POWERUP_LOOK;
            let pickup = nearest_powerup(pos, &state.powerups)
                .filter(|p| distance(pos, p.pos) < AI_COOP_POWERUP_RANGE)
                .map(|p| p.pos);
            match pickup {
                Some(goal) if looks => steer += axis_toward(pos, goal) * unit * mult,
                _ => {
                    let predicted = target.pos + target.vel * AI_PREDICTION_FRAMES;
                    steer += axis_toward(pos, predicted) * unit * mult;
                }
            }
        }
    }

    state.balls[idx].vel += steer * AI_ACCELERATION * mult;
}

/// Run whichever steering the pilot of ball `idx` calls for
pub fn steer(state: &mut GameState, idx: usize) {
    match state.balls[idx].pilot {
        Pilot::Human => {}
        Pilot::SoloAi => move_ai_ball(state, idx),
        Pilot::CoopAi { .. } => move_ai_ball_coop(state, idx),
    }
}
