//! Game configuration chosen on the title screen
//!
//! Immutable for the duration of a round; the title menu builds a fresh one
//! every time a round is launched.

use serde::{Deserialize, Serialize};

/// Player counts in title-menu cycling order
pub const PLAYER_COUNTS: [u8; 4] = [2, 3, 4, 1];
/// Win score options in title-menu cycling order
pub const WIN_SCORES: [u32; 3] = [25, 50, 100];

/// Rule set for a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Normal,
    LastStanding,
    Coop,
}

impl GameMode {
    pub const ALL: [GameMode; 3] = [GameMode::Normal, GameMode::LastStanding, GameMode::Coop];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "Normal",
            GameMode::LastStanding => "Last Standing",
            GameMode::Coop => "Co-op",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', '_', ' '], "").as_str() {
            "normal" => Some(GameMode::Normal),
            "laststanding" | "ls" => Some(GameMode::LastStanding),
            "coop" => Some(GameMode::Coop),
            _ => None,
        }
    }

    /// Whether the mode may be selected with this many players
    pub fn available_for(&self, players: u8) -> bool {
        match self {
            GameMode::Normal => true,
            GameMode::LastStanding => players != 2,
            GameMode::Coop => true,
        }
    }
}

/// Platform side length presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlatformSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl PlatformSize {
    pub const ALL: [PlatformSize; 3] = [PlatformSize::Small, PlatformSize::Medium, PlatformSize::Large];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformSize::Small => "Small",
            PlatformSize::Medium => "Medium",
            PlatformSize::Large => "Large",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "small" => Some(PlatformSize::Small),
            "medium" | "med" => Some(PlatformSize::Medium),
            "large" => Some(PlatformSize::Large),
            _ => None,
        }
    }

    /// Side length in world units
    pub fn side(&self) -> f32 {
        match self {
            PlatformSize::Small => 400.0,
            PlatformSize::Medium => 600.0,
            PlatformSize::Large => 700.0,
        }
    }
}

/// How often powerups appear on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PowerupPace {
    Slow,
    #[default]
    Normal,
    Fast,
}

impl PowerupPace {
    pub const ALL: [PowerupPace; 3] = [PowerupPace::Slow, PowerupPace::Normal, PowerupPace::Fast];

    pub fn as_str(&self) -> &'static str {
        match self {
            PowerupPace::Slow => "Slow",
            PowerupPace::Normal => "Normal",
            PowerupPace::Fast => "Fast",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "slow" => Some(PowerupPace::Slow),
            "normal" => Some(PowerupPace::Normal),
            "fast" => Some(PowerupPace::Fast),
            _ => None,
        }
    }

    /// Spawn interval in milliseconds
    pub fn interval_ms(&self) -> u64 {
        match self {
            PowerupPace::Slow => 30_000,
            PowerupPace::Normal => 15_000,
            PowerupPace::Fast => 7_500,
        }
    }
}

/// Round configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Human players (1 adds a solo AI opponent outside co-op)
    pub players: u8,
    pub mode: GameMode,
    /// First to reach this score wins (ignored in co-op)
    pub win_score: u32,
    pub platform: PlatformSize,
    pub powerup_pace: PowerupPace,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: PLAYER_COUNTS[0],
            mode: GameMode::Normal,
            win_score: WIN_SCORES[0],
            platform: PlatformSize::Medium,
            powerup_pace: PowerupPace::Normal,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<GameConfig>(json).map(|config| config.validated())
    }

    /// Clamp every field into the menu's option lists
    pub fn validated(mut self) -> Self {
        if !PLAYER_COUNTS.contains(&self.players) {
            log::warn!("Unsupported player count {}, using 2", self.players);
            self.players = 2;
        }
        if !WIN_SCORES.contains(&self.win_score) {
            log::warn!("Unsupported win score {}, using {}", self.win_score, WIN_SCORES[0]);
            self.win_score = WIN_SCORES[0];
        }
        if self.mode == GameMode::LastStanding && self.players == 2 {
            self.mode = GameMode::Normal;
        }
        self
    }

    /// Mode whose rules actually run; Last Standing needs three or more balls
    pub fn effective_mode(&self) -> GameMode {
        match self.mode {
            GameMode::LastStanding if self.players < 3 => GameMode::Normal,
            mode => mode,
        }
    }

    /// Whether a solo AI opponent joins the round
    pub fn has_solo_ai(&self) -> bool {
        self.players == 1 && self.mode != GameMode::Coop
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_menu() {
        let config = GameConfig::default();
        assert_eq!(config.players, 2);
        assert_eq!(config.mode, GameMode::Normal);
        assert_eq!(config.win_score, 25);
        assert_eq!(config.platform.side(), 600.0);
        assert_eq!(config.powerup_pace.interval_ms(), 15_000);
    }

    #[test]
    fn test_from_json_partial_and_validated() {
        let config = GameConfig::from_json(r#"{"players": 4, "mode": "Coop"}"#).unwrap();
        assert_eq!(config.players, 4);
        assert_eq!(config.mode, GameMode::Coop);
        assert_eq!(config.platform, PlatformSize::Medium);

        let config = GameConfig::from_json(r#"{"players": 9, "win_score": 7}"#).unwrap();
        assert_eq!(config.players, 2);
        assert_eq!(config.win_score, 25);

        let config = GameConfig::from_json(r#"{"players": 2, "mode": "LastStanding"}"#).unwrap();
        assert_eq!(config.mode, GameMode::Normal);

        assert!(GameConfig::from_json("{not json").is_err());
    }

    #[test]
    fn test_effective_mode() {
        let mut config = GameConfig { players: 1, mode: GameMode::LastStanding, ..Default::default() };
        assert_eq!(config.effective_mode(), GameMode::Normal);
        config.players = 3;
        assert_eq!(config.effective_mode(), GameMode::LastStanding);
        assert!(!config.has_solo_ai());
        config.players = 1;
        config.mode = GameMode::Normal;
        assert!(config.has_solo_ai());
    }

    #[test]
    fn test_option_names() {
        assert_eq!(GameMode::from_str("co-op"), Some(GameMode::Coop));
        assert_eq!(GameMode::from_str("Last Standing"), Some(GameMode::LastStanding));
        assert_eq!(PlatformSize::from_str("LARGE"), Some(PlatformSize::Large));
        assert_eq!(PowerupPace::from_str("fast").map(|p| p.interval_ms()), Some(7_500));
        assert_eq!(PowerupPace::from_str("warp"), None);
        assert!(!GameMode::LastStanding.available_for(2));
        assert!(GameMode::Coop.available_for(2));
        assert!(GameMode::Coop.available_for(1));
        assert!(GameMode::LastStanding.available_for(1));
    }
}
