//! Fixed timestep simulation tick
//!
//! Core game loop that advances the round by exactly one frame.

use serde::{Deserialize, Serialize};

use super::state::GameState;
use super::{ai, collision, physics, powerup, round};
use crate::input::MoveIntent;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    /// Movement per human, indexed by join order; unused entries are ignored
    pub players: [MoveIntent; 4],
}

impl TickInput {
    pub fn intent(&self, index: usize) -> MoveIntent {
        self.players.get(index).copied().unwrap_or_default()
    }
}

/// Advance the game state by one fixed frame sampled at `now_ms`
///
/// Returns false if the frame was skipped (round over or a banner is up).
pub fn tick(state: &mut GameState, input: &TickInput, now_ms: u64) -> bool {
    state.now_ms = now_ms.max(state.now_ms);

    if state.outcome.is_some() {
        return false;
    }
    if state.is_paused() {
        return false;
    }
    state.banner = None;

    // Humans push their balls directly
    for ball in state.balls.iter_mut().filter(|b| b.active) {
        if let Some(index) = ball.slot.and_then(|s| s.human_index()) {
            physics::apply_move_intent(ball, &input.intent(index));
        }
    }

    // AI accelerates toward its goal
    for idx in state.active_indices() {
        ai::steer(state, idx);
    }

    // Win check before anything moves this frame
    if round::check_winner(state).is_some() {
        return true;
    }

    powerup::maybe_spawn(state);

    for idx in state.active_indices() {
        physics::integrate(&mut state.balls[idx]);
        powerup::collect_pickups(state, idx);
    }

    collision::resolve_all(state);

    round::handle_falls(state);
    if state.outcome.is_some() || state.is_paused() {
        state.frame += 1;
        return true;
    }

    powerup::expire_powerups(state);
    powerup::expire_freezes(state);
    collision::resolve_hazard_trails(state);

    let now = state.now_ms;
    for ball in state.balls.iter_mut().filter(|b| b.active) {
        powerup::update_ghost_trail(ball, now);
    }

    state.frame += 1;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::settings::{GameConfig, GameMode};
    use crate::sim::state::{BannerKind, GameEvent, PlayerSlot, RoundOutcome};
    use glam::Vec2;

    fn run(state: &mut GameState, input: &TickInput, from: u64, frames: u64) -> u64 {
        let mut now = from;
        for _ in 0..frames {
            now += FRAME_MS;
            tick(state, input, now);
        }
        now
    }

    #[test]
    fn test_input_moves_matching_ball() {
        let mut state = round::reset(GameConfig::default(), 12345, 0);
        let mut input = TickInput::default();
        input.players[1].left = true;

        tick(&mut state, &input, FRAME_MS);
        assert_eq!(state.frame, 1);
        assert!(state.balls[1].vel.x < 0.0);
        assert_eq!(state.balls[0].vel, Vec2::ZERO);
    }

    #[test]
    fn test_banner_freezes_simulation() {
        let mut state = round::reset(GameConfig::default(), 1, 0);
        state.show_banner(BannerKind::Ready, READY_PAUSE_MS);
        let mut input = TickInput::default();
        input.players[0].right = true;

        assert!(!tick(&mut state, &input, 500));
        assert_eq!(state.balls[0].vel, Vec2::ZERO);
        assert_eq!(state.frame, 0);

        assert!(tick(&mut state, &input, READY_PAUSE_MS));
        assert!(state.banner.is_none());
        assert_eq!(state.frame, 1);
    }

    #[test]
    fn test_idle_ball_drifts_off_and_scores() {
        let mut state = round::reset(GameConfig::default(), 7, 0);
        let spawn = state.balls[0].spawn;
        let mut input = TickInput::default();
        input.players[0].left = true;

        let mut now = 0;
        while state.scores.get(PlayerSlot::Blue) == 0 {
            now = run(&mut state, &input, now, 1);
            assert!(now < 10_000, "red never left the platform");
        }
        assert_eq!(state.scores.get(PlayerSlot::Red), 0);
        assert_eq!(state.balls[0].pos, spawn);
        assert!(state.is_paused());
    }

    #[test]
    fn test_win_ends_round_before_physics() {
        let mut state = round::reset(GameConfig::default(), 3, 0);
        state.scores.award(PlayerSlot::Red, state.config.win_score);
        state.balls[1].vel = Vec2::new(5.0, 0.0);
        let before = state.balls[1].pos;

        tick(&mut state, &TickInput::default(), FRAME_MS);
        assert_eq!(state.outcome, Some(RoundOutcome::Winner(PlayerSlot::Red)));
        assert_eq!(state.balls[1].pos, before);
        assert!(state.drain_events().contains(&GameEvent::RoundOver(RoundOutcome::Winner(PlayerSlot::Red))));

        assert!(!tick(&mut state, &TickInput::default(), 2 * FRAME_MS));
    }

    #[test]
    fn test_coop_level_banner_then_play() {
        let config = GameConfig { players: 2, mode: GameMode::Coop, ..Default::default() };
        let mut state = round::reset(config, 21, 0);
        assert_eq!(state.banner.map(|b| b.kind), Some(BannerKind::Level(1)));

        let now = run(&mut state, &TickInput::default(), 0, 60);
        assert_eq!(state.frame, 0);
        run(&mut state, &TickInput::default(), now, 70);
        assert!(state.frame > 0);
        // The wave AI has started chasing
        let ai = state.balls.last().map(|b| b.vel).unwrap_or_default();
        assert_ne!(ai, Vec2::ZERO);
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed should produce identical results
        let config = GameConfig { players: 1, ..Default::default() };
        let mut state1 = round::reset(config, 99999, 0);
        let mut state2 = round::reset(config, 99999, 0);

        let mut input = TickInput::default();
        input.players[0].down = true;
        input.players[0].stick = Vec2::new(0.4, 0.0);

        let mut now = 0;
        for frame in 0..2_000u64 {
            now += FRAME_MS;
            let input = if frame % 90 < 45 { input } else { TickInput::default() };
            tick(&mut state1, &input, now);
            tick(&mut state2, &input, now);
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.balls.len(), state2.balls.len());
        for (a, b) in state1.balls.iter().zip(&state2.balls) {
            assert_eq!(a.pos, b.pos);
            assert_eq!(a.powerup_kind(), b.powerup_kind());
        }
        assert_eq!(state1.powerups.len(), state2.powerups.len());
        assert_eq!(state1.scores.get(PlayerSlot::Black), state2.scores.get(PlayerSlot::Black));
    }
}
