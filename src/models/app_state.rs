use std::sync::{Mutex, MutexGuard};

use crate::config::ServerConfig;
use crate::game::{GameState, RulesEngine};
use crate::websocket::Registry;

/// State shared by every connection.
///
/// The registry and the game have separate locks. Board snapshots are
/// broadcast while the game lock is held; when both are held the game lock is
/// always taken first.
pub struct AppState<R: RulesEngine> {
    pub registry: Mutex<Registry>,
    pub game: Mutex<GameState<R>>,
    pub config: ServerConfig,
}

impl<R: RulesEngine> AppState<R> {
    pub fn new(rules: R, config: ServerConfig) -> Self {
        Self {
            registry: Mutex::new(Registry::new(config.max_spectators)),
            game: Mutex::new(GameState::new(rules, config.clock_seconds)),
            config,
        }
    }

    pub fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn game(&self) -> MutexGuard<'_, GameState<R>> {
        self.game.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
