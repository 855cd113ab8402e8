//! Per-frame ball integration and platform bounds
//!
//! Friction is a per-frame decay, so `integrate` must be called exactly once
//! per fixed step.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Ball, HazardSegment, PowerupKind};
use crate::consts::*;
use crate::input::MoveIntent;
use crate::settings::PlatformSize;

/// The square arena, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Top-left corner
    pub origin: Vec2,
    pub side: f32,
}

impl Platform {
    /// Platform of the given size centred on the screen
    pub fn from_size(size: PlatformSize) -> Self {
        let side = size.side();
        let offset = ((SCREEN_SIZE - side) / 2.0).floor();
        Self { origin: Vec2::splat(offset), side }
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.side
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.side
    }

    pub fn center(&self) -> Vec2 {
        self.origin + Vec2::splat(self.side / 2.0)
    }

    /// Distances from `pos` to the left, right, top and bottom edges
    pub fn edge_distances(&self, pos: Vec2) -> [f32; 4] {
        [
            pos.x - self.left(),
            self.right() - pos.x,
            pos.y - self.top(),
            self.bottom() - pos.y,
        ]
    }

    /// Clamp a point so a circle of `radius` around it stays on the platform
    pub fn clamp_inside(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(self.left() + radius, self.right() - radius),
            pos.y.clamp(self.top() + radius, self.bottom() - radius),
        )
    }
}

/// True once the whole ball is past any platform edge
pub fn is_off_platform(ball: &Ball, platform: &Platform) -> bool {
    ball.pos.x - ball.radius > platform.right()
        || ball.pos.x + ball.radius < platform.left()
        || ball.pos.y - ball.radius > platform.bottom()
        || ball.pos.y + ball.radius < platform.top()
}

/// Apply friction, move the ball, and grow its hazard trail
pub fn integrate(ball: &mut Ball) {
    let decay = if ball.is_frozen() { FRICTION * FROZEN_FRICTION } else { FRICTION };
    ball.vel *= decay;
    ball.pos += ball.vel;

    if ball.has_powerup(PowerupKind::Tron) {
        extend_hazard_trail(ball);
    }
}

fn extend_hazard_trail(ball: &mut Ball) {
    let pos = ball.pos;
    let color = ball.palette[2];
    match ball.hazard_trail.last_mut() {
        Some(segment) => {
            segment.end = pos;
            // Seal the segment and start a fresh one at the current position
            if (pos - segment.start).length() > HAZARD_SEGMENT_LENGTH {
                ball.hazard_trail.push(HazardSegment::at(pos, color));
            }
        }
        None => ball.hazard_trail.push(HazardSegment::at(pos, color)),
    }
}

/// Direct velocity change from a human's held directions and stick
///
/// Frozen balls ignore input.
pub fn apply_move_intent(ball: &mut Ball, intent: &MoveIntent) {
    if ball.is_frozen() {
        return;
    }
    ball.vel += intent.keyboard_axis() * BALL_SPEED;
    ball.vel += intent.stick * BALL_SPEED * STICK_SENSITIVITY;
}
