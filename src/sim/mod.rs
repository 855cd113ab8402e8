//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one `tick` per frame, timers as absolute timestamps)
//! - Seeded RNG only
//! - Stable iteration order (humans first, then AI, in spawn order)
//! - No rendering, audio or device dependencies

pub mod ai;
pub mod collision;
pub mod physics;
pub mod powerup;
pub mod round;
pub mod state;
pub mod tick;

pub use ai::{move_ai_ball, move_ai_ball_coop};
pub use collision::{CollisionResult, resolve};
pub use physics::{Platform, integrate, is_off_platform};
pub use round::{reset, start_round};
pub use state::{
    ActivePowerup, Ball, BallId, Banner, BannerKind, GameEvent, GameState, HazardSegment, Pilot, PlayerSlot,
    Powerup, PowerupKind, RoundOutcome, ScoreTable,
};
pub use tick::{TickInput, tick};
