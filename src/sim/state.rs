//! Game state and core simulation types
//!
//! Everything the frame loop mutates lives in [`GameState`]; entities are plain
//! records with explicit optional fields.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::physics::Platform;
use crate::consts::*;
use crate::settings::GameConfig;
use crate::{Palette, Rgb};

/// Handle of a ball inside [`GameState::balls`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BallId(pub u32);

/// Scoring identity; humans use the four colours, the solo AI plays as Black
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    Red,
    Blue,
    Orange,
    Purple,
    Black,
}

impl PlayerSlot {
    /// Human slots in join order; player `i` uses keyboard set `i` and controller `i`
    pub const HUMANS: [PlayerSlot; 4] = [PlayerSlot::Red, PlayerSlot::Blue, PlayerSlot::Orange, PlayerSlot::Purple];

    pub fn name(&self) -> &'static str {
        match self {
            PlayerSlot::Red => "Red",
            PlayerSlot::Blue => "Blue",
            PlayerSlot::Orange => "Orange",
            PlayerSlot::Purple => "Purple",
            PlayerSlot::Black => "Black",
        }
    }

    /// Index into per-player input arrays (None for the AI slot)
    pub fn human_index(&self) -> Option<usize> {
        PlayerSlot::HUMANS.iter().position(|s| s == self)
    }

    pub fn palette(&self) -> Palette {
        match self {
            PlayerSlot::Red => [Rgb(150, 0, 0), Rgb(200, 0, 0), Rgb(255, 0, 0)],
            PlayerSlot::Blue => [Rgb(0, 0, 150), Rgb(0, 0, 200), Rgb(0, 0, 255)],
            PlayerSlot::Orange => [Rgb(150, 100, 0), Rgb(200, 130, 0), Rgb(255, 165, 0)],
            PlayerSlot::Purple => [Rgb(100, 0, 150), Rgb(140, 0, 200), Rgb(180, 0, 255)],
            PlayerSlot::Black => AI_PALETTES[0],
        }
    }
}

/// Co-op AI colours by spawn index
pub const AI_PALETTES: [Palette; 10] = [
    [Rgb(30, 30, 30), Rgb(50, 50, 50), Rgb(70, 70, 70)],
    [Rgb(30, 30, 30), Rgb(50, 50, 50), Rgb(100, 100, 100)],
    [Rgb(30, 30, 30), Rgb(70, 70, 70), Rgb(120, 120, 120)],
    [Rgb(20, 20, 20), Rgb(80, 80, 80), Rgb(140, 140, 140)],
    [Rgb(30, 30, 30), Rgb(90, 90, 90), Rgb(150, 150, 150)],
    [Rgb(40, 40, 40), Rgb(100, 100, 100), Rgb(160, 160, 160)],
    [Rgb(25, 25, 25), Rgb(85, 85, 85), Rgb(145, 145, 145)],
    [Rgb(35, 35, 35), Rgb(95, 95, 95), Rgb(155, 155, 155)],
    [Rgb(45, 45, 45), Rgb(105, 105, 105), Rgb(165, 165, 165)],
    [Rgb(50, 50, 50), Rgb(110, 110, 110), Rgb(170, 170, 170)],
];

/// Who steers a ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Pilot {
    Human,
    /// Opponent of a lone human outside co-op
    SoloAi,
    /// Wave enemy; responses scale with the level it spawned on
    CoopAi { speed_multiplier: f32 },
}

impl Pilot {
    pub fn is_ai(&self) -> bool {
        !matches!(self, Pilot::Human)
    }
}

/// Powerup types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerupKind {
    Grow,
    Shrink,
    Shield,
    Freeze,
    Heavy,
    Tron,
}

impl PowerupKind {
    pub const ALL: [PowerupKind; 6] = [
        PowerupKind::Grow,
        PowerupKind::Shrink,
        PowerupKind::Shield,
        PowerupKind::Freeze,
        PowerupKind::Heavy,
        PowerupKind::Tron,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupKind::Grow => "grow",
            PowerupKind::Shrink => "shrink",
            PowerupKind::Shield => "shield",
            PowerupKind::Freeze => "freeze",
            PowerupKind::Heavy => "heavy",
            PowerupKind::Tron => "tron",
        }
    }

    /// How long the effect lasts once picked up
    pub fn duration_ms(&self) -> u64 {
        match self {
            PowerupKind::Grow => 10_000,
            PowerupKind::Shrink => 7_000,
            PowerupKind::Shield => 7_000,
            PowerupKind::Freeze => 2_000,
            PowerupKind::Heavy => 5_000,
            PowerupKind::Tron => 5_000,
        }
    }

    /// Powerups the AI runs from
    pub fn is_dangerous(&self) -> bool {
        matches!(self, PowerupKind::Heavy | PowerupKind::Grow | PowerupKind::Tron)
    }

    pub fn palette(&self) -> Palette {
        match self {
            PowerupKind::Grow => [Rgb(200, 200, 0), Rgb(255, 255, 0), Rgb(255, 255, 128)],
            PowerupKind::Shrink => [Rgb(0, 200, 0), Rgb(0, 255, 0), Rgb(128, 255, 128)],
            PowerupKind::Shield => [Rgb(200, 0, 200), Rgb(255, 0, 255), Rgb(255, 128, 255)],
            PowerupKind::Freeze => [Rgb(80, 120, 150), Rgb(100, 150, 180), Rgb(135, 206, 235)],
            PowerupKind::Heavy => [Rgb(50, 50, 50), Rgb(100, 100, 100), Rgb::WHITE],
            PowerupKind::Tron => [Rgb(0, 80, 80), Rgb(0, 100, 100), Rgb(0, 128, 128)],
        }
    }
}

/// A powerup held by a ball
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerup {
    pub kind: PowerupKind,
    /// Absolute expiry timestamp (ms)
    pub ends_at: u64,
}

/// A powerup lying on the field; it stays until picked up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powerup {
    pub id: u32,
    pub kind: PowerupKind,
    pub pos: Vec2,
}

impl Powerup {
    pub fn radius(&self) -> f32 {
        POWERUP_RADIUS
    }
}

/// One piece of a tron hazard trail
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardSegment {
    pub start: Vec2,
    pub end: Vec2,
    pub color: Rgb,
}

impl HazardSegment {
    pub fn at(pos: Vec2, color: Rgb) -> Self {
        Self { start: pos, end: pos, color }
    }

    pub fn length(&self) -> f32 {
        (self.end - self.start).length()
    }
}

/// A ghost image for shield / hit-flash rendering (oldest first)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GhostPoint {
    pub pos: Vec2,
    pub at_ms: u64,
}

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: BallId,
    /// Score slot; co-op AI balls have none
    pub slot: Option<PlayerSlot>,
    pub pilot: Pilot,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Always BALL_RADIUS scaled by 1, GROW_MULTIPLIER or SHRINK_MULTIPLIER
    pub radius: f32,
    pub palette: Palette,
    pub powerup: Option<ActivePowerup>,
    /// Attacker for scoring attribution; cleared on reset
    pub last_hit_by: Option<BallId>,
    /// Frozen until this timestamp
    pub frozen_until: Option<u64>,
    /// Next successful collision is a heavy hit
    pub heavy_armed: bool,
    /// When this ball last took a heavy hit
    pub hit_flash_at: Option<u64>,
    /// Collisions are skipped until this timestamp
    pub immune_until: u64,
    /// Hazard trail left while `tron` is held
    pub hazard_trail: Vec<HazardSegment>,
    /// Render-only ghost images
    pub ghost_trail: Vec<GhostPoint>,
    /// Where resets put this ball
    pub spawn: Vec2,
    /// Still on the roster this round
    pub active: bool,
}

impl Ball {
    pub fn new(id: BallId, slot: Option<PlayerSlot>, pilot: Pilot, spawn: Vec2, palette: Palette) -> Self {
        Self {
            id,
            slot,
            pilot,
            pos: spawn,
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
            palette,
            powerup: None,
            last_hit_by: None,
            frozen_until: None,
            heavy_armed: false,
            hit_flash_at: None,
            immune_until: 0,
            hazard_trail: Vec::new(),
            ghost_trail: Vec::with_capacity(GHOST_TRAIL_LENGTH),
            spawn,
            active: true,
        }
    }

    pub fn powerup_kind(&self) -> Option<PowerupKind> {
        self.powerup.map(|p| p.kind)
    }

    pub fn has_powerup(&self, kind: PowerupKind) -> bool {
        self.powerup_kind() == Some(kind)
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen_until.is_some()
    }

    pub fn is_immune(&self, now: u64) -> bool {
        self.immune_until > now
    }

    pub fn freeze(&mut self, until: u64) {
        self.frozen_until = Some(until);
    }

    pub fn unfreeze(&mut self) {
        self.frozen_until = None;
    }

    /// Back to the spawn point with every transient field cleared
    pub fn reset_to_spawn(&mut self, now: u64) {
        self.pos = self.spawn;
        self.vel = Vec2::ZERO;
        self.radius = BALL_RADIUS;
        self.powerup = None;
        self.last_hit_by = None;
        self.frozen_until = None;
        self.heavy_armed = false;
        self.hit_flash_at = None;
        self.hazard_trail.clear();
        self.ghost_trail.clear();
        self.immune_until = now + SPAWN_IMMUNITY_MS;
    }
}

/// Points per player for the current session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTable {
    points: BTreeMap<PlayerSlot, u32>,
}

impl ScoreTable {
    pub fn get(&self, slot: PlayerSlot) -> u32 {
        self.points.get(&slot).copied().unwrap_or(0)
    }

    pub fn award(&mut self, slot: PlayerSlot, points: u32) {
        *self.points.entry(slot).or_insert(0) += points;
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerSlot, u32)> + '_ {
        self.points.iter().map(|(slot, points)| (*slot, *points))
    }
}

/// Co-op wave progression
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoopProgress {
    /// 1-based, never exceeds MAX_LEVEL while playing
    pub level: u32,
    /// Humans knocked out this level
    pub eliminated: BTreeSet<PlayerSlot>,
}

impl Default for CoopProgress {
    fn default() -> Self {
        Self { level: 1, eliminated: BTreeSet::new() }
    }
}

impl CoopProgress {
    /// AI response scaling for balls spawned on this level (caps at 1.5)
    pub fn speed_multiplier(&self) -> f32 {
        1.0 + 0.1 * (self.level.saturating_sub(1)).min(5) as f32
    }
}

/// Pause message shown while the simulation holds still
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BannerKind {
    Ready,
    Level(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub kind: BannerKind,
    pub until: u64,
}

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    Winner(PlayerSlot),
    GameOver { level: u32 },
    Victory,
}

/// Things that happened during a tick, drained by the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Collision { a: BallId, b: BallId },
    HazardBounce { ball: BallId },
    PowerupSpawned { kind: PowerupKind },
    PowerupPicked { ball: BallId, kind: PowerupKind },
    PowerupExpired { ball: BallId, kind: PowerupKind },
    BallFell { ball: BallId },
    Scored { slot: PlayerSlot },
    RoundReset,
    LevelStarted { level: u32 },
    RoundOver(RoundOutcome),
}

/// Complete simulation state for one round of play
#[derive(Debug, Clone)]
pub struct GameState {
    pub config: GameConfig,
    pub platform: Platform,
    /// Humans first, then AI; iteration order is stable
    pub balls: Vec<Ball>,
    /// Never more than MAX_FIELD_POWERUPS
    pub powerups: Vec<Powerup>,
    pub scores: ScoreTable,
    pub coop: CoopProgress,
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    /// Monotonic clock sampled at the start of the current tick
    pub now_ms: u64,
    /// Simulated frames
    pub frame: u64,
    pub last_powerup_spawn: u64,
    pub banner: Option<Banner>,
    pub outcome: Option<RoundOutcome>,
    pub events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Build the roster for `config`; call [`super::round::start_round`] to begin play
    pub fn new(config: GameConfig, seed: u64) -> Self {
        let config = config.validated();
        let mut state = Self {
            config,
            platform: Platform::from_size(config.platform),
            balls: Vec::new(),
            powerups: Vec::new(),
            scores: ScoreTable::default(),
            coop: CoopProgress::default(),
            seed,
            rng: Pcg32::seed_from_u64(seed),
            now_ms: 0,
            frame: 0,
            last_powerup_spawn: 0,
            banner: None,
            outcome: None,
            events: Vec::new(),
            next_id: 1,
        };

        let spawns = super::round::spawn_positions(&state.platform, config.players);
        for (i, slot) in PlayerSlot::HUMANS.iter().take(config.players as usize).enumerate() {
            let id = state.next_entity_id();
            state.balls.push(Ball::new(id, Some(*slot), Pilot::Human, spawns[i], slot.palette()));
        }
        if config.has_solo_ai() {
            let id = state.next_entity_id();
            let spawn = super::round::solo_ai_spawn(&state.platform);
            let black = PlayerSlot::Black;
            state.balls.push(Ball::new(id, Some(black), Pilot::SoloAi, spawn, black.palette()));
        }

        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> BallId {
        let id = self.next_id;
        self.next_id += 1;
        BallId(id)
    }

    /// Allocate a raw ID for non-ball entities
    pub fn next_raw_id(&mut self) -> u32 {
        self.next_entity_id().0
    }

    pub fn ball(&self, id: BallId) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn ball_by_slot(&self, slot: PlayerSlot) -> Option<&Ball> {
        self.balls.iter().find(|b| b.slot == Some(slot))
    }

    /// Indices of balls still on the roster
    pub fn active_indices(&self) -> Vec<usize> {
        (0..self.balls.len()).filter(|&i| self.balls[i].active).collect()
    }

    pub fn active_humans(&self) -> impl Iterator<Item = &Ball> {
        self.balls.iter().filter(|b| b.active && b.pilot == Pilot::Human)
    }

    pub fn coop_ai_count(&self) -> usize {
        self.balls.iter().filter(|b| matches!(b.pilot, Pilot::CoopAi { .. })).count()
    }

    pub fn is_paused(&self) -> bool {
        self.banner.is_some_and(|b| self.now_ms < b.until)
    }

    /// Hold the simulation still behind a banner
    pub fn show_banner(&mut self, kind: BannerKind, duration_ms: u64) {
        self.banner = Some(Banner { kind, until: self.now_ms + duration_ms });
    }

    /// Take the events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
