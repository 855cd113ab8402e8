//! Screen flow around the simulation
//!
//! `Title -> Starting -> Playing -> {Winner | GameOver | Victory} -> Title`.
//! The title menu owns the live option cursors; launching a round freezes
//! them into a [`GameConfig`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::input::MenuEvent;
use crate::settings::{GameConfig, GameMode, PLAYER_COUNTS, PlatformSize, PowerupPace, WIN_SCORES};
use crate::sim::{GameEvent, GameState, PlayerSlot, RoundOutcome, TickInput, round, tick};

/// Current screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Screen {
    Title,
    /// "Start!" pause before the first frame
    Starting { until: u64 },
    Playing,
    Winner { slot: PlayerSlot, shown_at: u64 },
    GameOver { level: u32, shown_at: u64 },
    Victory { shown_at: u64 },
}

impl Screen {
    /// When an end screen appeared
    pub fn shown_at(&self) -> Option<u64> {
        match self {
            Screen::Winner { shown_at, .. } | Screen::GameOver { shown_at, .. } | Screen::Victory { shown_at } => {
                Some(*shown_at)
            }
            _ => None,
        }
    }
}

/// Rows of the title menu, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuItem {
    Players,
    Mode,
    WinScore,
    Platform,
    PowerupSpeed,
}

impl MenuItem {
    pub const ALL: [MenuItem; 5] =
        [MenuItem::Players, MenuItem::Mode, MenuItem::WinScore, MenuItem::Platform, MenuItem::PowerupSpeed];
}

/// Step `index` through a list of `len` options, wrapping both ways
fn cycle(index: usize, len: usize, forward: bool) -> usize {
    if forward { (index + 1) % len } else { (index + len - 1) % len }
}

/// Live option cursors on the title screen
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleMenu {
    pub selected: MenuItem,
    players: usize,
    mode: GameMode,
    win_score: usize,
    platform: PlatformSize,
    pace: PowerupPace,
}

impl Default for TitleMenu {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl TitleMenu {
    /// Cursors positioned on an existing configuration
    pub fn from_config(config: &GameConfig) -> Self {
        let config = config.validated();
        Self {
            selected: MenuItem::Players,
            players: PLAYER_COUNTS.iter().position(|&p| p == config.players).unwrap_or(0),
            mode: config.mode,
            win_score: WIN_SCORES.iter().position(|&s| s == config.win_score).unwrap_or(0),
            platform: config.platform,
            pace: config.powerup_pace,
        }
    }

    pub fn players(&self) -> u8 {
        PLAYER_COUNTS[self.players]
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    /// Configuration a round launched now would use
    pub fn config(&self) -> GameConfig {
        GameConfig {
            players: self.players(),
            mode: self.mode,
            win_score: WIN_SCORES[self.win_score],
            platform: self.platform,
            powerup_pace: self.pace,
        }
    }

    /// Rows currently shown; the win score row is hidden in co-op
    pub fn visible_items(&self) -> Vec<MenuItem> {
        MenuItem::ALL
            .into_iter()
            .filter(|item| !(*item == MenuItem::WinScore && self.mode == GameMode::Coop))
            .collect()
    }

    /// Move the highlight up or down
    pub fn move_selection(&mut self, down: bool) {
        let items = self.visible_items();
        let current = items.iter().position(|i| *i == self.selected).unwrap_or(0);
        self.selected = items[cycle(current, items.len(), down)];
    }

    /// Change the value of the highlighted row
    pub fn change_value(&mut self, forward: bool) {
        match self.selected {
            MenuItem::Players => {
                self.players = cycle(self.players, PLAYER_COUNTS.len(), forward);
                // Landing on 2 players starts over from Normal; other counts keep the mode
                if self.players() == 2 && self.mode != GameMode::Normal {
                    log::debug!("{} reset to Normal for 2 players", self.mode.as_str());
                    self.mode = GameMode::Normal;
                }
            }
            MenuItem::Mode => {
                let modes = GameMode::ALL;
                let mut index = modes.iter().position(|m| *m == self.mode).unwrap_or(0);
                // Normal is always available, so this terminates
                loop {
                    index = cycle(index, modes.len(), forward);
                    if modes[index].available_for(self.players()) {
                        break;
                    }
                }
                self.mode = modes[index];
            }
            MenuItem::WinScore => {
                if self.mode != GameMode::Coop {
                    self.win_score = cycle(self.win_score, WIN_SCORES.len(), forward);
                }
            }
            MenuItem::Platform => {
                let all = PlatformSize::ALL;
                let index = all.iter().position(|p| *p == self.platform).unwrap_or(0);
                self.platform = all[cycle(index, all.len(), forward)];
            }
            MenuItem::PowerupSpeed => {
                let all = PowerupPace::ALL;
                let index = all.iter().position(|p| *p == self.pace).unwrap_or(0);
                self.pace = all[cycle(index, all.len(), forward)];
            }
        }
        // Landing on co-op hides the win score row
        if !self.visible_items().contains(&self.selected) {
            self.selected = MenuItem::Mode;
        }
    }

    /// Display text of a row
    pub fn label(&self, item: MenuItem) -> String {
        match item {
            MenuItem::Players => format!("{} Players", self.players()),
            MenuItem::Mode => format!("Mode: {}", self.mode.as_str()),
            MenuItem::WinScore => format!("First to {} points", WIN_SCORES[self.win_score]),
            MenuItem::Platform => format!("Platform: {}", self.platform.as_str()),
            MenuItem::PowerupSpeed => format!("Powerup Speed: {}", self.pace.as_str()),
        }
    }

    /// Banner under the options explaining the selected mode
    pub fn mode_hint(&self) -> Option<&'static str> {
        (self.mode == GameMode::Coop).then_some("Co-op Mode: Survive As Long As Possible")
    }
}

/// One play session: the menu loop plus the round in progress
#[derive(Debug, Clone)]
pub struct Session {
    pub screen: Screen,
    pub menu: TitleMenu,
    /// Round in progress or just finished (kept for the end screen)
    pub game: Option<GameState>,
    pub running: bool,
    seed: u64,
    rounds: u64,
}

impl Session {
    pub fn new(seed: u64) -> Self {
        Self::with_config(&GameConfig::default(), seed)
    }

    /// Session whose title menu starts on `config`
    pub fn with_config(config: &GameConfig, seed: u64) -> Self {
        Self {
            screen: Screen::Title,
            menu: TitleMenu::from_config(config),
            game: None,
            running: true,
            seed,
            rounds: 0,
        }
    }

    /// Advance one frame; returns the simulation events of that frame
    pub fn update(&mut self, now_ms: u64, menu_events: &[MenuEvent], input: &TickInput) -> Vec<GameEvent> {
        if !self.running {
            return Vec::new();
        }
        if menu_events.contains(&MenuEvent::Quit) {
            log::info!("Quit requested");
            self.running = false;
            return Vec::new();
        }

        match self.screen {
            Screen::Title => {
                for event in menu_events {
                    match event {
                        MenuEvent::Up => self.menu.move_selection(false),
                        MenuEvent::Down => self.menu.move_selection(true),
                        MenuEvent::Left => self.menu.change_value(false),
                        MenuEvent::Right => self.menu.change_value(true),
                        MenuEvent::Confirm => {
                            self.launch(now_ms);
                            break;
                        }
                        MenuEvent::Quit => {}
                    }
                }
                Vec::new()
            }
            Screen::Starting { until } => {
                if now_ms >= until {
                    if let Some(game) = self.game.as_mut() {
                        round::start_round(game, now_ms);
                    }
                    self.screen = Screen::Playing;
                }
                Vec::new()
            }
            Screen::Playing => self.play(now_ms, input),
            Screen::Winner { shown_at, .. } | Screen::GameOver { shown_at, .. } | Screen::Victory { shown_at } => {
                let unlocked = now_ms.saturating_sub(shown_at) >= END_SCREEN_LOCK_MS;
                if unlocked && menu_events.contains(&MenuEvent::Confirm) {
                    self.return_to_title();
                }
                Vec::new()
            }
        }
    }

    fn launch(&mut self, now_ms: u64) {
        let config = self.menu.config();
        let seed = self.seed.wrapping_add(self.rounds);
        self.rounds += 1;
        log::info!("Launching {} round for {} players (seed {})", config.mode.as_str(), config.players, seed);
        self.game = Some(GameState::new(config, seed));
        self.screen = Screen::Starting { until: now_ms + START_PAUSE_MS };
    }

    fn play(&mut self, now_ms: u64, input: &TickInput) -> Vec<GameEvent> {
        let Some(game) = self.game.as_mut() else {
            self.screen = Screen::Title;
            return Vec::new();
        };
        tick::tick(game, input, now_ms);
        let events = game.drain_events();

        if let Some(outcome) = game.outcome {
            self.screen = match outcome {
                RoundOutcome::Winner(slot) => Screen::Winner { slot, shown_at: now_ms },
                RoundOutcome::GameOver { level } => Screen::GameOver { level, shown_at: now_ms },
                RoundOutcome::Victory => Screen::Victory { shown_at: now_ms },
            };
        }
        events
    }

    fn return_to_title(&mut self) {
        log::info!("Back to title");
        self.game = None;
        self.screen = Screen::Title;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(session: &mut Session, now: u64, events: &[MenuEvent]) {
        session.update(now, events, &TickInput::default());
    }

    #[test]
    fn test_menu_defaults_and_labels() {
        let menu = TitleMenu::default();
        assert_eq!(menu.label(MenuItem::Players), "2 Players");
        assert_eq!(menu.label(MenuItem::Mode), "Mode: Normal");
        assert_eq!(menu.label(MenuItem::WinScore), "First to 25 points");
        assert_eq!(menu.label(MenuItem::Platform), "Platform: Medium");
        assert_eq!(menu.label(MenuItem::PowerupSpeed), "Powerup Speed: Normal");
        assert_eq!(menu.mode_hint(), None);
    }

    #[test]
    fn test_players_cycle_and_mode_constraint() {
        let mut menu = TitleMenu::default();
        menu.change_value(true);
        assert_eq!(menu.players(), 3);

        menu.selected = MenuItem::Mode;
        menu.change_value(true);
        assert_eq!(menu.mode(), GameMode::LastStanding);

        // Back to 2 players: Last Standing is forced off
        menu.selected = MenuItem::Players;
        menu.change_value(false);
        assert_eq!(menu.players(), 2);
        assert_eq!(menu.mode(), GameMode::Normal);

        // At 2 players the mode row skips Last Standing
        menu.selected = MenuItem::Mode;
        menu.change_value(true);
        assert_eq!(menu.mode(), GameMode::Coop);
        menu.change_value(true);
        assert_eq!(menu.mode(), GameMode::Normal);
    }

    #[test]
    fn test_one_player_keeps_coop() {
        let mut menu = TitleMenu::default();
        menu.selected = MenuItem::Mode;
        menu.change_value(true);
        assert_eq!(menu.mode(), GameMode::Coop);

        // 2 -> 1 wraps backward through the option list
        menu.selected = MenuItem::Players;
        menu.change_value(false);
        assert_eq!(menu.players(), 1);
        assert_eq!(menu.mode(), GameMode::Coop);
        assert_eq!(menu.config().mode, GameMode::Coop);

        // Reaching 2 again resets to Normal
        menu.change_value(true);
        assert_eq!(menu.players(), 2);
        assert_eq!(menu.mode(), GameMode::Normal);
    }

    #[test]
    fn test_coop_hides_win_score() {
        let mut menu = TitleMenu::from_config(&GameConfig { mode: GameMode::Coop, ..Default::default() });
        assert!(!menu.visible_items().contains(&MenuItem::WinScore));
        menu.selected = MenuItem::Mode;
        menu.move_selection(true);
        assert_eq!(menu.selected, MenuItem::Platform);
        assert_eq!(menu.mode_hint(), Some("Co-op Mode: Survive As Long As Possible"));

        let before = menu.config().win_score;
        menu.selected = MenuItem::WinScore;
        menu.change_value(true);
        assert_eq!(menu.config().win_score, before);
        assert_eq!(menu.selected, MenuItem::Mode);
    }

    #[test]
    fn test_full_screen_flow() {
        let mut session = Session::new(4);
        press(&mut session, 0, &[MenuEvent::Confirm]);
        assert_eq!(session.screen, Screen::Starting { until: START_PAUSE_MS });

        press(&mut session, 500, &[]);
        assert!(matches!(session.screen, Screen::Starting { .. }));
        press(&mut session, START_PAUSE_MS, &[]);
        assert_eq!(session.screen, Screen::Playing);

        // Hand Red the match
        let game = session.game.as_mut().unwrap();
        let target = game.config.win_score;
        game.scores.award(PlayerSlot::Red, target);
        press(&mut session, 1_016, &[]);
        assert_eq!(session.screen, Screen::Winner { slot: PlayerSlot::Red, shown_at: 1_016 });

        // Locked for a second
        press(&mut session, 1_500, &[MenuEvent::Confirm]);
        assert!(matches!(session.screen, Screen::Winner { .. }));
        press(&mut session, 2_016, &[MenuEvent::Confirm]);
        assert_eq!(session.screen, Screen::Title);
        assert!(session.game.is_none());
    }

    #[test]
    fn test_quit_from_any_screen() {
        let mut session = Session::new(4);
        press(&mut session, 0, &[MenuEvent::Confirm]);
        press(&mut session, 100, &[MenuEvent::Quit]);
        assert!(!session.running);
        press(&mut session, 2_000, &[]);
        assert!(matches!(session.screen, Screen::Starting { .. }));
    }

    #[test]
    fn test_menu_navigation_events() {
        let mut session = Session::new(1);
        press(&mut session, 0, &[MenuEvent::Down, MenuEvent::Right, MenuEvent::Right]);
        assert_eq!(session.menu.selected, MenuItem::Mode);
        assert_eq!(session.menu.mode(), GameMode::Normal);
        assert_eq!(session.screen, Screen::Title);
    }
}
