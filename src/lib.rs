//! Rolly - A local multiplayer arena game
//!
//! Core modules:
//! - `sim`: Simulation (physics, knockback, powerups, AI, round rules)
//! - `session`: Title menu and screen flow around the simulation
//! - `settings`: Game configuration chosen on the title screen
//! - `input`: Abstract per-player movement intents and menu events
//! - `render`: Read-only snapshots for an external renderer
//! - `audio`: Sound events for an external audio backend

pub mod audio;
pub mod input;
pub mod render;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::{Screen, Session};
pub use settings::{GameConfig, GameMode, PlatformSize, PowerupPace};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Simulation rate; one `tick` is one frame
    pub const FPS: u32 = 60;
    /// Nominal frame length in milliseconds
    pub const FRAME_MS: u64 = 1000 / FPS as u64;

    /// Screen (world) dimensions; the platform is centred in it
    pub const SCREEN_SIZE: f32 = 800.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 20.0;
    /// Velocity added per held direction per frame
    pub const BALL_SPEED: f32 = 1.0;
    /// Analog sticks are slightly more sensitive than keys
    pub const STICK_SENSITIVITY: f32 = 1.5;
    /// Per-frame velocity decay
    pub const FRICTION: f32 = 0.98;
    /// Extra decay factor applied on top of friction while frozen
    pub const FROZEN_FRICTION: f32 = 0.95;

    /// Knockback coefficient per side before powerup modifiers
    pub const BASE_KNOCKBACK: f32 = 0.05;
    /// Knockback multiplier dealt by an armed heavy hit
    pub const HEAVY_KNOCKBACK: f32 = 5.0;
    /// Knockback multiplier dealt by a grown ball
    pub const GROW_KNOCKBACK: f32 = 2.0;

    /// Powerup defaults
    pub const POWERUP_RADIUS: f32 = 20.0;
    pub const MAX_FIELD_POWERUPS: usize = 3;
    pub const GROW_MULTIPLIER: f32 = 1.5;
    pub const SHRINK_MULTIPLIER: f32 = 0.7;

    /// Hazard trail segments are sealed once longer than this
    pub const HAZARD_SEGMENT_LENGTH: f32 = 20.0;

    /// Ghost trail (render hint) retention
    pub const GHOST_TRAIL_LENGTH: usize = 4;
    pub const GHOST_TRAIL_SPACING: f32 = 20.0;
    pub const HIT_FLASH_MS: u64 = 1000;

    /// Timers (milliseconds)
    pub const SPAWN_IMMUNITY_MS: u64 = 1500;
    pub const READY_PAUSE_MS: u64 = 1000;
    pub const START_PAUSE_MS: u64 = 1000;
    pub const LEVEL_PAUSE_MS: u64 = 2000;
    pub const END_SCREEN_LOCK_MS: u64 = 1000;

    /// Distance of spawn points from the platform corners
    pub const SPAWN_MARGIN: f32 = 80.0;

    /// AI tuning
    pub const AI_SPEED: f32 = 2.0;
    pub const AI_ACCELERATION: f32 = 0.2;
    pub const AI_POWERUP_PRIORITY: f32 = 0.9;
    pub const AI_PLATFORM_MARGIN: f32 = 50.0;
    pub const AI_SOLO_DETECTION: f32 = 350.0;
    pub const AI_COOP_DETECTION: f32 = 300.0;
    pub const AI_COOP_POWERUP_LOOK: f32 = 0.1;
    pub const AI_COOP_POWERUP_RANGE: f32 = 200.0;
    /// Frames of target velocity used for pursuit prediction
    pub const AI_PREDICTION_FRAMES: f32 = 5.0;

    /// Co-op progression
    pub const MAX_LEVEL: u32 = 10;
    pub const COOP_SPAWN_RING: f32 = 0.35;

    /// Controller handling
    pub const STICK_DEADZONE: f32 = 0.15;
    pub const CONTROLLER_POLL_MS: u64 = 3000;
    pub const MENU_REPEAT_MS: u64 = 200;
}

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Linear blend toward `other`; `t` is clamped to [0, 1]
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t) as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Outer, mid and highlight tones of a ball or powerup
pub type Palette = [Rgb; 3];

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Normalize `v`, or return `fallback` when `v` has no usable direction
#[inline]
pub fn normalize_or_fallback(v: Vec2, fallback: Vec2) -> Vec2 {
    let len = v.length();
    if len > f32::EPSILON { v / len } else { fallback }
}

/// Closest point to `p` on the segment `a..b`
///
/// Zero-length segments collapse to `a`.
pub fn closest_point_on_segment(p: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let line = b - a;
    let len_sq = line.length_squared();
    if len_sq < f32::EPSILON {
        return a;
    }
    let t = ((p - a).dot(line) / len_sq).clamp(0.0, 1.0);
    a + line * t
}
