//! Rolly entry point
//!
//! Headless attract mode: launches one round from the environment's
//! configuration, drives every human slot with wandering input and logs how
//! the round plays out. Windowed frontends link the library instead.

use std::error::Error;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use rolly::audio::AudioManager;
use rolly::consts::*;
use rolly::input::{MenuEvent, MoveIntent};
use rolly::render;
use rolly::sim::TickInput;
use rolly::{GameConfig, Screen, Session};

/// Default cap on simulated frames (two minutes of play)
const DEFAULT_FRAMES: u64 = FPS as u64 * 120;

/// Frames a wandering player holds the same directions
const WANDER_FRAMES: u64 = 30;

fn env_config() -> Result<GameConfig, Box<dyn Error>> {
    match std::env::var("ROLLY_CONFIG") {
        Ok(json) => Ok(GameConfig::from_json(&json)?),
        Err(_) => Ok(GameConfig::default()),
    }
}

fn env_number(name: &str, default: u64) -> Result<u64, Box<dyn Error>> {
    match std::env::var(name) {
        Ok(value) => Ok(value.trim().parse()?),
        Err(_) => Ok(default),
    }
}

/// Random held directions, kept for WANDER_FRAMES at a time
fn wander(rng: &mut Pcg32) -> MoveIntent {
    MoveIntent {
        up: rng.random_bool(0.3),
        down: rng.random_bool(0.3),
        left: rng.random_bool(0.3),
        right: rng.random_bool(0.3),
        ..Default::default()
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = env_config()?;
    let seed = env_number("ROLLY_SEED", 0x5eed)?;
    let max_frames = env_number("ROLLY_FRAMES", DEFAULT_FRAMES)?;
    log::info!("Rolly (headless) starting with seed {}", seed);
    log::debug!("Config: {}", serde_json::to_string(&config)?);

    let mut session = Session::with_config(&config, seed);
    let mut audio = AudioManager::default();
    let mut rng = Pcg32::seed_from_u64(seed ^ 0xa77ac7);
    let mut input = TickInput::default();

    session.update(0, &[MenuEvent::Confirm], &input);

    let mut now = 0;
    for frame in 0..max_frames {
        now += FRAME_MS;
        if frame % WANDER_FRAMES == 0 {
            for intent in input.players.iter_mut() {
                *intent = wander(&mut rng);
            }
        }

        let events = session.update(now, &[], &input);
        audio.play_events(&events);

        if session.screen.shown_at().is_some() {
            break;
        }
    }

    let snapshot = render::snapshot(&session, now);
    log::debug!("Final frame: {}", serde_json::to_string(&snapshot)?);
    match session.screen {
        Screen::Winner { slot, .. } => log::info!("{} won after {} ms", slot.name(), now),
        Screen::GameOver { level, .. } => log::info!("Co-op ended on level {}", level),
        Screen::Victory { .. } => log::info!("Co-op cleared all {} levels", MAX_LEVEL),
        _ => log::info!("Stopped after {} frames without a result", max_frames),
    }
    if let Some(hud) = snapshot.hud {
        for (slot, points) in hud.scores {
            log::info!("  {}: {}", slot.name(), points);
        }
    }

    session.update(now + FRAME_MS, &[MenuEvent::Quit], &input);
    Ok(())
}
