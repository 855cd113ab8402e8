//! Round rules: spawn layout, resets, per-mode falls and co-op waves

use glam::Vec2;

use super::physics::{Platform, is_off_platform};
use super::powerup::end_powerup;
use super::state::{AI_PALETTES, Ball, BannerKind, GameEvent, GameState, Pilot, PlayerSlot, RoundOutcome};
use crate::consts::*;
use crate::settings::{GameConfig, GameMode};

/// Spawn corners, one per human in join order
pub fn spawn_positions(platform: &Platform, players: u8) -> Vec<Vec2> {
    let near = SPAWN_MARGIN;
    let top_left = Vec2::new(platform.left() + near, platform.top() + near);
    let top_right = Vec2::new(platform.right() - near, platform.top() + near);
    let bottom_left = Vec2::new(platform.left() + near, platform.bottom() - near);
    let bottom_right = Vec2::new(platform.right() - near, platform.bottom() - near);

    match players {
        0 => Vec::new(),
        1 => vec![top_left],
        2 => vec![top_left, bottom_right],
        n => [top_left, top_right, bottom_left, bottom_right].into_iter().take(n as usize).collect(),
    }
}

/// The solo opponent starts in the corner opposite the lone human
pub fn solo_ai_spawn(platform: &Platform) -> Vec2 {
    Vec2::new(platform.right() - SPAWN_MARGIN, platform.bottom() - SPAWN_MARGIN)
}

/// Co-op AI spawns spread evenly on a ring around the platform centre
pub fn coop_ai_spawns(platform: &Platform, count: u32) -> Vec<Vec2> {
    let ring = platform.side * COOP_SPAWN_RING;
    (0..count)
        .map(|i| {
            let angle = std::f32::consts::TAU * i as f32 / count as f32;
            let pos = platform.center() + Vec2::from_angle(angle) * ring;
            platform.clamp_inside(pos, BALL_RADIUS)
        })
        .collect()
}

/// Begin play at `now`: everyone at spawn, empty field, co-op wave 1
pub fn start_round(state: &mut GameState, now: u64) {
    state.now_ms = now;
    state.outcome = None;
    state.banner = None;
    state.last_powerup_spawn = now;
    reset_all(state);

    if state.config.effective_mode() == GameMode::Coop {
        state.coop = Default::default();
        start_level(state);
    }
    log::info!(
        "Round started: {} players, {}, {} platform",
        state.config.players,
        state.config.effective_mode().as_str(),
        state.config.platform.as_str()
    );
}

/// Fresh state for `config`, ready to play from `now`
pub fn reset(config: GameConfig, seed: u64, now: u64) -> GameState {
    let mut state = GameState::new(config, seed);
    start_round(&mut state, now);
    state
}

/// Every ball back on the roster at its spawn, and the field cleared
pub fn reset_all(state: &mut GameState) {
    let now = state.now_ms;
    for ball in &mut state.balls {
        ball.active = true;
        ball.reset_to_spawn(now);
    }
    state.powerups.clear();
    state.events.push(GameEvent::RoundReset);
}

/// Full reset followed by the "Ready..." pause
fn reset_with_pause(state: &mut GameState) {
    reset_all(state);
    state.show_banner(BannerKind::Ready, READY_PAUSE_MS);
}

/// First active scorer at or above the win score (never in co-op)
pub fn check_winner(state: &mut GameState) -> Option<PlayerSlot> {
    if state.config.effective_mode() == GameMode::Coop {
        return None;
    }
    let target = state.config.win_score;
    let winner = state
        .balls
        .iter()
        .filter(|b| b.active)
        .filter_map(|b| b.slot)
        .find(|slot| state.scores.get(*slot) >= target)?;

    log::info!("{} wins with {} points", winner.name(), state.scores.get(winner));
    finish(state, RoundOutcome::Winner(winner));
    Some(winner)
}

fn finish(state: &mut GameState, outcome: RoundOutcome) {
    state.outcome = Some(outcome);
    state.events.push(GameEvent::RoundOver(outcome));
}

/// Apply the current mode's rules to every active ball that left the platform
pub fn handle_falls(state: &mut GameState) {
    let fallen: Vec<usize> = state
        .active_indices()
        .into_iter()
        .filter(|&i| is_off_platform(&state.balls[i], &state.platform))
        .collect();
    if fallen.is_empty() {
        return;
    }
    for &i in &fallen {
        let ball = &state.balls[i];
        log::debug!("Ball {} fell off at ({:.0}, {:.0})", ball.id.0, ball.pos.x, ball.pos.y);
        state.events.push(GameEvent::BallFell { ball: ball.id });
    }

    match state.config.effective_mode() {
        GameMode::Normal => normal_falls(state, &fallen),
        GameMode::LastStanding => last_standing_falls(state, &fallen),
        GameMode::Coop => coop_falls(state, &fallen),
    }
}

fn award(state: &mut GameState, slot: PlayerSlot) {
    state.scores.award(slot, 1);
    state.events.push(GameEvent::Scored { slot });
}

fn normal_falls(state: &mut GameState, fallen: &[usize]) {
    for &i in fallen {
        let victim = state.balls[i].id;
        let attacker = state.balls[i]
            .last_hit_by
            .and_then(|id| state.ball(id))
            .filter(|b| b.active)
            .and_then(|b| b.slot);

        match attacker {
            Some(slot) => award(state, slot),
            None => {
                // Nobody pushed: every other ball on the roster gets the point
                let others: Vec<PlayerSlot> = state
                    .balls
                    .iter()
                    .filter(|b| b.active && b.id != victim)
                    .filter_map(|b| b.slot)
                    .collect();
                for slot in others {
                    award(state, slot);
                }
            }
        }
    }

    if state.config.players >= 3 {
        let now = state.now_ms;
        for &i in fallen {
            end_powerup(state, i);
            state.balls[i].reset_to_spawn(now);
        }
    } else {
        reset_with_pause(state);
    }
}

fn last_standing_falls(state: &mut GameState, fallen: &[usize]) {
    for &i in fallen {
        end_powerup(state, i);
        state.balls[i].active = false;
    }

    let survivors = state.active_indices();
    match survivors.as_slice() {
        [last] => {
            if let Some(slot) = state.balls[*last].slot {
                log::info!("{} is the last one standing", slot.name());
                award(state, slot);
            }
            reset_with_pause(state);
        }
        [] => {
            log::info!("Everyone fell at once, no point awarded");
            reset_with_pause(state);
        }
        _ => {}
    }
}

fn coop_falls(state: &mut GameState, fallen: &[usize]) {
    // Highest index first so removals keep the remaining indices valid
    for &i in fallen.iter().rev() {
        end_powerup(state, i);
        if matches!(state.balls[i].pilot, Pilot::CoopAi { .. }) {
            state.balls.remove(i);
            continue;
        }
        state.balls[i].active = false;
        if let Some(slot) = state.balls[i].slot {
            state.coop.eliminated.insert(slot);
        }
    }

    if state.active_humans().next().is_none() {
        let level = state.coop.level;
        log::info!("Co-op game over on level {}", level);
        finish(state, RoundOutcome::GameOver { level });
    } else if state.coop_ai_count() == 0 {
        advance_level(state);
    }
}

/// Move to the next co-op wave, or win after the last one
pub fn advance_level(state: &mut GameState) {
    if state.coop.level >= MAX_LEVEL {
        log::info!("All {} co-op levels cleared", MAX_LEVEL);
        finish(state, RoundOutcome::Victory);
        return;
    }
    state.coop.level += 1;
    state.coop.eliminated.clear();
    reset_all(state);
    start_level(state);
}

/// Spawn this level's AI wave and pause on the level banner
fn start_level(state: &mut GameState) {
    spawn_coop_ai(state);
    let level = state.coop.level;
    state.show_banner(BannerKind::Level(level), LEVEL_PAUSE_MS);
    state.events.push(GameEvent::LevelStarted { level });
    log::info!("Co-op level {} with {} AI", level, level);
}

/// Replace any co-op AI with `level` fresh balls
pub fn spawn_coop_ai(state: &mut GameState) {
    state.balls.retain(|b| !matches!(b.pilot, Pilot::CoopAi { .. }));

    let level = state.coop.level;
    let pilot = Pilot::CoopAi { speed_multiplier: state.coop.speed_multiplier() };
    let now = state.now_ms;
    for (i, spawn) in coop_ai_spawns(&state.platform, level).into_iter().enumerate() {
        let id = state.next_entity_id();
        let palette = AI_PALETTES[i.min(AI_PALETTES.len() - 1)];
        let mut ball = Ball::new(id, None, pilot, spawn, palette);
        ball.reset_to_spawn(now);
        state.balls.push(ball);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::powerup::{apply_powerup, expire_powerups};
    use crate::sim::state::{BallId, PowerupKind};

    fn game(players: u8, mode: GameMode) -> GameState {
        let mut state = GameState::new(GameConfig { players, mode, ..Default::default() }, 5);
        start_round(&mut state, 0);
        state.now_ms = 10_000;
        state
    }

    fn push_off(state: &mut GameState, idx: usize) {
        state.balls[idx].pos.x = state.platform.left() - 100.0;
    }

    #[test]
    fn test_spawn_corners() {
        let platform = Platform::from_size(crate::PlatformSize::Medium);
        assert_eq!(spawn_positions(&platform, 1), vec![Vec2::new(180.0, 180.0)]);
        assert_eq!(spawn_positions(&platform, 2), vec![Vec2::new(180.0, 180.0), Vec2::new(620.0, 620.0)]);
        let four = spawn_positions(&platform, 4);
        assert_eq!(four[1], Vec2::new(620.0, 180.0));
        assert_eq!(four[2], Vec2::new(180.0, 620.0));
        assert_eq!(spawn_positions(&platform, 3).len(), 3);
        assert_eq!(solo_ai_spawn(&platform), Vec2::new(620.0, 620.0));
    }

    #[test]
    fn test_coop_ring_spawns_stay_inside() {
        let platform = Platform::from_size(crate::PlatformSize::Small);
        let spawns = coop_ai_spawns(&platform, 7);
        assert_eq!(spawns.len(), 7);
        for pos in spawns {
            assert!(pos.x >= platform.left() + BALL_RADIUS && pos.x <= platform.right() - BALL_RADIUS);
            assert!(pos.y >= platform.top() + BALL_RADIUS && pos.y <= platform.bottom() - BALL_RADIUS);
        }
    }

    #[test]
    fn test_two_player_self_fall_scores_other() {
        let mut state = game(2, GameMode::Normal);
        let spawn = state.balls[0].spawn;
        push_off(&mut state, 0);
        handle_falls(&mut state);

        assert_eq!(state.scores.get(PlayerSlot::Blue), 1);
        assert_eq!(state.scores.get(PlayerSlot::Red), 0);
        assert_eq!(state.balls[0].pos, spawn);
        assert_eq!(state.banner.map(|b| b.kind), Some(BannerKind::Ready));
        assert!(state.is_paused());
    }

    #[test]
    fn test_fallen_shrink_holder_restores_others() {
        let mut state = game(3, GameMode::Normal);
        apply_powerup(&mut state, 0, PowerupKind::Shrink);
        assert_eq!(state.balls[1].radius, BALL_RADIUS * SHRINK_MULTIPLIER);
        assert_eq!(state.balls[2].radius, BALL_RADIUS * SHRINK_MULTIPLIER);

        push_off(&mut state, 0);
        handle_falls(&mut state);
        let radii: Vec<f32> = state.balls.iter().map(|b| b.radius).collect();
        assert_eq!(radii, vec![BALL_RADIUS; 3]);
        assert!(state.balls[0].powerup.is_none());

        state.now_ms = 60_000;
        expire_powerups(&mut state);
        assert!(state.balls.iter().all(|b| b.radius == BALL_RADIUS));
    }

    #[test]
    fn test_attacker_gets_the_point() {
        let mut state = game(3, GameMode::Normal);
        state.balls[1].last_hit_by = Some(state.balls[2].id);
        let untouched = Vec2::new(333.0, 333.0);
        state.balls[0].pos = untouched;
        push_off(&mut state, 1);
        handle_falls(&mut state);

        assert_eq!(state.scores.get(PlayerSlot::Orange), 1);
        assert_eq!(state.scores.get(PlayerSlot::Red), 0);
        // Three or more players: only the faller resets, no pause
        assert_eq!(state.balls[1].pos, state.balls[1].spawn);
        assert_eq!(state.balls[0].pos, untouched);
        assert!(state.banner.is_none());
        assert!(state.balls[1].last_hit_by.is_none());
    }

    #[test]
    fn test_unknown_attacker_falls_back_to_split() {
        let mut state = game(3, GameMode::Normal);
        state.balls[0].last_hit_by = Some(BallId(999));
        push_off(&mut state, 0);
        handle_falls(&mut state);
        assert_eq!(state.scores.get(PlayerSlot::Blue), 1);
        assert_eq!(state.scores.get(PlayerSlot::Orange), 1);
        assert_eq!(state.scores.get(PlayerSlot::Red), 0);
    }

    #[test]
    fn test_last_standing_three_fall_at_once() {
        let mut state = game(4, GameMode::LastStanding);
        for idx in [0, 1, 3] {
            push_off(&mut state, idx);
        }
        handle_falls(&mut state);

        assert_eq!(state.scores.get(PlayerSlot::Orange), 1);
        assert_eq!(state.scores.iter().map(|(_, p)| p).sum::<u32>(), 1);
        assert!(state.balls.iter().all(|b| b.active && b.pos == b.spawn));
        assert_eq!(state.banner.map(|b| b.kind), Some(BannerKind::Ready));
    }

    #[test]
    fn test_last_standing_elimination_and_wipeout() {
        let mut state = game(3, GameMode::LastStanding);
        push_off(&mut state, 0);
        handle_falls(&mut state);
        assert!(!state.balls[0].active);
        assert_eq!(state.active_indices(), vec![1, 2]);
        assert!(state.banner.is_none());

        push_off(&mut state, 1);
        push_off(&mut state, 2);
        handle_falls(&mut state);
        assert_eq!(state.scores.iter().count(), 0);
        assert_eq!(state.active_indices().len(), 3);
    }

    #[test]
    fn test_coop_human_elimination_and_game_over() {
        let mut state = game(2, GameMode::Coop);
        push_off(&mut state, 0);
        handle_falls(&mut state);
        assert!(state.coop.eliminated.contains(&PlayerSlot::Red));
        assert!(state.outcome.is_none());

        push_off(&mut state, 1);
        handle_falls(&mut state);
        assert_eq!(state.outcome, Some(RoundOutcome::GameOver { level: 1 }));
    }

    #[test]
    fn test_coop_level_advance() {
        let mut state = game(2, GameMode::Coop);
        push_off(&mut state, 0);
        handle_falls(&mut state);

        let ai = state.balls.len() - 1;
        push_off(&mut state, ai);
        handle_falls(&mut state);

        assert_eq!(state.coop.level, 2);
        assert_eq!(state.coop_ai_count(), 2);
        assert!(state.coop.eliminated.is_empty());
        assert_eq!(state.active_humans().count(), 2);
        assert_eq!(state.banner.map(|b| b.kind), Some(BannerKind::Level(2)));
        assert_eq!(state.banner.map(|b| b.until), Some(10_000 + LEVEL_PAUSE_MS));
        let multiplier = state.balls.iter().find_map(|b| match b.pilot {
            Pilot::CoopAi { speed_multiplier } => Some(speed_multiplier),
            _ => None,
        });
        assert!(multiplier.is_some_and(|m| (m - 1.1).abs() < 1e-6));
    }

    #[test]
    fn test_clearing_level_ten_is_victory() {
        let mut state = game(2, GameMode::Coop);
        state.coop.level = MAX_LEVEL;
        spawn_coop_ai(&mut state);
        assert_eq!(state.coop_ai_count(), 10);

        for idx in 2..state.balls.len() {
            push_off(&mut state, idx);
        }
        handle_falls(&mut state);

        assert_eq!(state.outcome, Some(RoundOutcome::Victory));
        assert_eq!(state.coop.level, MAX_LEVEL);
        assert_eq!(state.coop_ai_count(), 0);
    }

    #[test]
    fn test_check_winner() {
        let mut state = game(2, GameMode::Normal);
        assert_eq!(check_winner(&mut state), None);
        state.scores.award(PlayerSlot::Blue, state.config.win_score);
        assert_eq!(check_winner(&mut state), Some(PlayerSlot::Blue));
        assert_eq!(state.outcome, Some(RoundOutcome::Winner(PlayerSlot::Blue)));

        let mut state = game(2, GameMode::Coop);
        state.scores.award(PlayerSlot::Red, 1_000);
        assert_eq!(check_winner(&mut state), None);
    }
}
