//! Batch simulation mode
//!
//! Plays games back to back with the autopilot, without waiting for real
//! time: every update is fed the configured tick (or frame) interval.
//!
//! # Example
//!
//! ```rust,ignore
//! use snake_engine::modes::{SimulateConfig, SimulateMode};
//! use snake_engine::persistence::MemoryStore;
//!
//! let config = SimulateConfig::new(100);
//! let mut mode = SimulateMode::new(config, Box::new(MemoryStore::default()));
//! mode.run()?;
//! ```

use anyhow::{Result, bail};
use std::time::Duration;
use tracing::{info, warn};

use crate::autopilot::Autopilot;
use crate::game::{CollisionType, GameConfig, GameEvent, GamePhase, GameSession};
use crate::metrics::GameMetrics;
use crate::persistence::HighScoreStore;

/// Configuration for simulate mode
#[derive(Debug, Clone)]
pub struct SimulateConfig {
    /// Number of games to play
    pub games: usize,

    /// Give up on a game after this many updates
    pub max_updates: u64,

    /// Seed for food and obstacle placement
    pub seed: Option<u64>,

    /// Log progress every N games
    pub log_frequency: usize,

    pub game_config: GameConfig,
}

impl SimulateConfig {
    pub fn new(games: usize) -> Self {
        Self {
            games,
            max_updates: 20_000,
            seed: None,
            log_frequency: 10,
            game_config: GameConfig::default(),
        }
    }
}

/// How one simulated game ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameResult {
    pub score: u32,
    pub ticks: u64,
    /// `None` when the game hit the update limit
    pub reason: Option<CollisionType>,
}

pub struct SimulateMode {
    session: GameSession,
    autopilot: Autopilot,
    metrics: GameMetrics,
    config: SimulateConfig,
}

impl SimulateMode {
    pub fn new(config: SimulateConfig, store: Box<dyn HighScoreStore>) -> Self {
        let game_config = config.game_config.clone();
        let autopilot = Autopilot::new(game_config.boundary);
        let session = match config.seed {
            Some(seed) => GameSession::with_seed(game_config, store, seed),
            None => GameSession::new(game_config, store),
        };

        Self {
            session,
            autopilot,
            metrics: GameMetrics::new(),
            config,
        }
    }

    pub fn metrics(&self) -> &GameMetrics {
        &self.metrics
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Play every configured game and print a summary
    pub fn run(&mut self) -> Result<()> {
        self.print_header();

        for game in 0..self.config.games {
            let result = self.run_game()?;

            if (game + 1) % self.config.log_frequency.max(1) == 0 {
                info!(
                    "[Game {}/{}] last score {} | {}",
                    game + 1,
                    self.config.games,
                    result.score,
                    self.metrics.format_summary()
                );
            }
        }

        self.metrics.update();
        println!("\nSimulation complete in {}", self.metrics.format_time());
        println!("{}", self.metrics.format_summary());
        println!("All-time high score: {}", self.session.high_score());

        Ok(())
    }

    /// Play a single game from Idle back to Idle
    pub fn run_game(&mut self) -> Result<GameResult> {
        if !self.session.start() {
            bail!("session was not idle at game start");
        }

        let countdown = Duration::from_secs(self.session.config().countdown_secs);
        self.session.update(countdown);

        let mut updates = 0;
        while self.session.phase() == GamePhase::Running && updates < self.config.max_updates {
            let snapshot = self.session.snapshot();
            if let Some(direction) = self.autopilot.choose(&snapshot) {
                self.session.propose(direction);
            }

            self.session.update(self.session.driver_interval());
            updates += 1;

            if self.session.take_events().contains(&GameEvent::Aborted) {
                bail!("session aborted during simulation");
            }
        }

        let result = GameResult {
            score: self.session.score(),
            ticks: self.session.tick(),
            reason: match self.session.phase() {
                GamePhase::GameOver(reason) => Some(reason),
                _ => None,
            },
        };

        match result.reason {
            Some(reason) => self.metrics.on_game_over(result.score, reason, result.ticks),
            None => warn!(
                "game stopped at the {} update limit with score {}",
                self.config.max_updates, result.score
            ),
        }

        self.session.reset();
        Ok(result)
    }

    fn print_header(&self) {
        let game = &self.config.game_config;
        println!("{}", "=".repeat(70));
        println!("Snake Simulation");
        println!("{}", "=".repeat(70));
        println!("Games: {}", self.config.games);
        println!(
            "Grid: {}x{} | {:?} | {:?} | {:?}",
            game.grid_width, game.grid_height, game.movement, game.boundary, game.difficulty
        );
        println!("Obstacles: {}", game.obstacles_enabled);
        println!("{}", "=".repeat(70));
    }
}
