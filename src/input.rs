//! Abstract input consumed by the core
//!
//! Device polling lives outside the crate. A frontend turns key state and
//! controller axes into [`MoveIntent`]s and [`MenuEvent`]s; it does not matter
//! which physical device produced them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Held-direction movement for one player this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MoveIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Analog stick after the deadzone; adds to the keyboard directions
    pub stick: Vec2,
}

impl MoveIntent {
    /// Keyboard directions as a unit-per-key vector (screen y grows downward)
    pub fn keyboard_axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        if self.up {
            axis.y -= 1.0;
        }
        if self.down {
            axis.y += 1.0;
        }
        if self.left {
            axis.x -= 1.0;
        }
        if self.right {
            axis.x += 1.0;
        }
        axis
    }

    pub fn is_neutral(&self) -> bool {
        self.keyboard_axis() == Vec2::ZERO && self.stick == Vec2::ZERO
    }
}

/// Discrete menu navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuEvent {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Quit,
}

/// Zero each stick axis whose magnitude is under the deadzone
pub fn apply_deadzone(raw: Vec2) -> Vec2 {
    let filter = |v: f32| if v.abs() < STICK_DEADZONE { 0.0 } else { v };
    Vec2::new(filter(raw.x), filter(raw.y))
}

/// Raw controller access provided by the frontend
pub trait ControllerSource {
    /// Number of connected controllers right now
    fn connected(&self) -> usize;
    /// Left stick of controller `index`, or None if it is gone
    fn left_stick(&self, index: usize) -> Option<Vec2>;
}

/// No controllers at all (keyboard-only frontends, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControllers;

impl ControllerSource for NoControllers {
    fn connected(&self) -> usize {
        0
    }

    fn left_stick(&self, _index: usize) -> Option<Vec2> {
        None
    }
}

/// Known controllers, refreshed by periodic re-polling
#[derive(Debug, Clone, Default)]
pub struct ControllerRoster {
    count: usize,
    last_poll_ms: Option<u64>,
}

impl ControllerRoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Re-read the controller count every CONTROLLER_POLL_MS; returns true if it changed
    pub fn poll(&mut self, now_ms: u64, source: &impl ControllerSource) -> bool {
        if let Some(last) = self.last_poll_ms {
            if now_ms.saturating_sub(last) <= CONTROLLER_POLL_MS {
                return false;
            }
        }
        self.last_poll_ms = Some(now_ms);

        let current = source.connected();
        if current == self.count {
            return false;
        }
        if current < self.count {
            log::warn!("Controller disconnected ({} -> {})", self.count, current);
        } else {
            log::info!("{} controller(s) connected", current);
        }
        self.count = current;
        true
    }

    /// Deadzoned stick for player `index`; neutral if that controller is missing
    pub fn stick(&self, index: usize, source: &impl ControllerSource) -> Vec2 {
        if index >= self.count {
            return Vec2::ZERO;
        }
        source.left_stick(index).map(apply_deadzone).unwrap_or(Vec2::ZERO)
    }
}

/// Auto-repeat gate for held controller navigation
#[derive(Debug, Clone, Copy, Default)]
pub struct RepeatGate {
    last_ms: Option<u64>,
}

impl RepeatGate {
    /// True if a repeated navigation event may pass at `now_ms`
    pub fn allow(&mut self, now_ms: u64) -> bool {
        match self.last_ms {
            Some(last) if now_ms.saturating_sub(last) <= MENU_REPEAT_MS => false,
            _ => {
                self.last_ms = Some(now_ms);
                true
            }
        }
    }
}
