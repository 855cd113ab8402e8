//! Read-only frame snapshots for an external renderer
//!
//! Drawing happens outside the crate. Everything a renderer needs for one
//! frame is collected here, including time-based colour pulses, so the
//! renderer never has to look inside (or mutate) the simulation.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::session::{MenuItem, Screen, Session};
use crate::settings::GameMode;
use crate::sim::state::GhostPoint;
use crate::sim::{Ball, BannerKind, GameState, HazardSegment, Platform, PlayerSlot, Powerup, PowerupKind};
use crate::{Palette, Rgb};

/// Outline of a frozen ball
pub const FROZEN_OUTLINE: Rgb = Rgb(135, 206, 235);

/// Pulse in [0, 1] driven by the frame clock
fn pulse(now_ms: u64, rate: f32) -> f32 {
    ((now_ms as f32 * rate).sin() + 1.0) / 2.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallView {
    pub pos: Vec2,
    pub radius: f32,
    pub palette: Palette,
    /// Extra outline: light blue while frozen, black/white pulse while heavy is armed
    pub outline: Option<Rgb>,
    pub powerup: Option<PowerupKind>,
    /// Recently took a heavy hit
    pub flashing: bool,
    pub hazard_trail: Vec<HazardSegment>,
    pub ghost_trail: Vec<GhostPoint>,
}

impl BallView {
    pub fn new(ball: &Ball, now_ms: u64) -> Self {
        let outline = if ball.is_frozen() {
            Some(FROZEN_OUTLINE)
        } else if ball.heavy_armed {
            Some(Rgb::BLACK.lerp(Rgb::WHITE, pulse(now_ms, 0.02)))
        } else {
            None
        };
        Self {
            pos: ball.pos,
            radius: ball.radius,
            palette: ball.palette,
            outline,
            powerup: ball.powerup_kind(),
            flashing: ball.hit_flash_at.is_some_and(|at| now_ms.saturating_sub(at) < HIT_FLASH_MS),
            hazard_trail: ball.hazard_trail.clone(),
            ghost_trail: ball.ghost_trail.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerupView {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PowerupKind,
    pub palette: Palette,
}

impl PowerupView {
    pub fn new(powerup: &Powerup, now_ms: u64) -> Self {
        let palette = match powerup.kind {
            // Heavy throbs from dark tones toward white
            PowerupKind::Heavy => {
                let t = pulse(now_ms, 0.01);
                [Rgb::BLACK, Rgb(64, 64, 64), Rgb(128, 128, 128)].map(|tone| tone.lerp(Rgb::WHITE, t))
            }
            kind => kind.palette(),
        };
        Self { pos: powerup.pos, radius: powerup.radius(), kind: powerup.kind, palette }
    }
}

/// Score line and mode info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HudView {
    pub scores: Vec<(PlayerSlot, u32)>,
    pub mode: GameMode,
    pub win_score: Option<u32>,
    /// Co-op level
    pub level: Option<u32>,
}

impl HudView {
    pub fn new(state: &GameState) -> Self {
        let mut slots: Vec<PlayerSlot> = state.balls.iter().filter_map(|b| b.slot).collect();
        slots.sort();
        slots.dedup();
        let coop = state.config.effective_mode() == GameMode::Coop;
        Self {
            scores: slots.into_iter().map(|s| (s, state.scores.get(s))).collect(),
            mode: state.config.effective_mode(),
            win_score: (!coop).then_some(state.config.win_score),
            level: coop.then_some(state.coop.level),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleView {
    /// Menu rows with the highlighted one flagged
    pub rows: Vec<(String, bool)>,
    pub hint: Option<String>,
}

/// What an end screen reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EndView {
    Winner { slot: PlayerSlot, scores: Vec<(PlayerSlot, u32)> },
    GameOver { level: u32, ai_defeated: u32 },
    Victory { levels: u32 },
}

/// Everything needed to draw one frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub screen: Screen,
    pub platform: Option<Platform>,
    pub balls: Vec<BallView>,
    pub powerups: Vec<PowerupView>,
    pub hud: Option<HudView>,
    /// Centred pause message ("Start!", "Ready...", "Level N")
    pub banner: Option<String>,
    pub title: Option<TitleView>,
    pub end: Option<EndView>,
}

fn banner_text(kind: BannerKind) -> String {
    match kind {
        BannerKind::Ready => "Ready...".to_string(),
        BannerKind::Level(level) => format!("Level {}", level),
    }
}

/// Build the snapshot for the session's current screen
pub fn snapshot(session: &Session, now_ms: u64) -> FrameSnapshot {
    let mut frame = FrameSnapshot {
        screen: session.screen,
        platform: None,
        balls: Vec::new(),
        powerups: Vec::new(),
        hud: None,
        banner: None,
        title: None,
        end: None,
    };

    if session.screen == Screen::Title {
        let menu = &session.menu;
        frame.title = Some(TitleView {
            rows: menu
                .visible_items()
                .into_iter()
                .map(|item: MenuItem| (menu.label(item), item == menu.selected))
                .collect(),
            hint: menu.mode_hint().map(str::to_string),
        });
        return frame;
    }

    let Some(game) = session.game.as_ref() else {
        return frame;
    };
    frame.platform = Some(game.platform);
    frame.balls = game.balls.iter().filter(|b| b.active).map(|b| BallView::new(b, now_ms)).collect();
    frame.powerups = game.powerups.iter().map(|p| PowerupView::new(p, now_ms)).collect();
    frame.hud = Some(HudView::new(game));

    frame.banner = match session.screen {
        Screen::Starting { .. } => Some("Start!".to_string()),
        Screen::Playing => game.banner.filter(|_| game.is_paused()).map(|b| banner_text(b.kind)),
        _ => None,
    };

    frame.end = match session.screen {
        Screen::Winner { slot, .. } => Some(EndView::Winner { slot, scores: HudView::new(game).scores }),
        Screen::GameOver { level, .. } => Some(EndView::GameOver { level, ai_defeated: level.saturating_sub(1) }),
        Screen::Victory { .. } => Some(EndView::Victory { levels: MAX_LEVEL }),
        _ => None,
    };

    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MenuEvent;
    use crate::settings::GameConfig;
    use crate::sim::{Pilot, TickInput};

    #[test]
    fn test_outline_colours() {
        let mut ball = Ball::new(
            crate::sim::BallId(1),
            Some(PlayerSlot::Red),
            Pilot::Human,
            Vec2::splat(200.0),
            PlayerSlot::Red.palette(),
        );
        assert_eq!(BallView::new(&ball, 0).outline, None);

        ball.heavy_armed = true;
        // sin(0) = 0 puts the pulse halfway
        assert_eq!(BallView::new(&ball, 0).outline, Some(Rgb(127, 127, 127)));

        ball.freeze(500);
        assert_eq!(BallView::new(&ball, 0).outline, Some(FROZEN_OUTLINE));
    }

    #[test]
    fn test_heavy_powerup_pulses() {
        let heavy = Powerup { id: 1, kind: PowerupKind::Heavy, pos: Vec2::ZERO };
        let peak = (std::f32::consts::FRAC_PI_2 / 0.01).round() as u64;
        let bright = PowerupView::new(&heavy, peak);
        assert!(bright.palette.iter().all(|c| c.0 >= 254));

        let grow = Powerup { id: 2, kind: PowerupKind::Grow, pos: Vec2::ZERO };
        assert_eq!(PowerupView::new(&grow, peak).palette, PowerupKind::Grow.palette());
    }

    #[test]
    fn test_title_and_play_snapshots() {
        let mut session = Session::new(9);
        let title = snapshot(&session, 0);
        let rows = title.title.map(|t| t.rows).unwrap_or_default();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0], ("2 Players".to_string(), true));

        session.update(0, &[MenuEvent::Confirm], &TickInput::default());
        let starting = snapshot(&session, 10);
        assert_eq!(starting.banner.as_deref(), Some("Start!"));
        assert_eq!(starting.balls.len(), 2);
        let hud = starting.hud.unwrap();
        assert_eq!(hud.scores, vec![(PlayerSlot::Red, 0), (PlayerSlot::Blue, 0)]);
        assert_eq!(hud.win_score, Some(25));
    }

    #[test]
    fn test_game_over_reports_ai_defeated() {
        let config = GameConfig { players: 2, mode: GameMode::Coop, ..Default::default() };
        let mut session = Session::with_config(&config, 2);
        session.game = Some(crate::sim::reset(config, 2, 0));
        session.screen = Screen::GameOver { level: 4, shown_at: 0 };

        let frame = snapshot(&session, 100);
        assert!(matches!(frame.end, Some(EndView::GameOver { level: 4, ai_defeated: 3 })));
        assert_eq!(frame.hud.and_then(|h| h.level), Some(1));
    }
}
