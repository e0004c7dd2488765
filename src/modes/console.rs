use anyhow::{Context, Result};
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::autopilot::Autopilot;
use crate::driver::{DriverHandle, TickDriver};
use crate::game::{Command, GameConfig, GameEvent, GamePhase, GameSession};
use crate::input::{InputAction, InputHandler};
use crate::metrics::GameMetrics;
use crate::persistence::JsonFileStore;

/// Real-time play from stdin: one command word per token, events on the log
pub struct ConsoleMode {
    config: GameConfig,
    store: JsonFileStore,
    player: String,
    autopilot: Option<Autopilot>,
    input_handler: InputHandler,
    metrics: GameMetrics,
}

impl ConsoleMode {
    pub fn new(config: GameConfig, save_path: PathBuf, player: String, autopilot: bool) -> Self {
        let autopilot = autopilot.then(|| Autopilot::new(config.boundary));
        Self {
            config,
            store: JsonFileStore::new(save_path),
            player,
            autopilot,
            input_handler: InputHandler::new(),
            metrics: GameMetrics::new(),
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let session = GameSession::new(self.config.clone(), Box::new(self.store.clone()));
        info!(
            "high score {} loaded from {:?}",
            session.high_score(),
            self.store.path()
        );
        println!("Commands: start | w a s d | p (pause) | r (reset) | easy normal hard | status | q");

        let (driver, handle) = TickDriver::new(session);
        let driver_task = tokio::spawn(driver.run());

        let result = self.run_input_loop(handle).await;

        // The handle is gone, so the driver winds down on its own
        let session = driver_task.await.context("Tick driver task failed")?;
        self.metrics.update();
        info!(
            "session over after {}: {} (high score {})",
            self.metrics.format_time(),
            self.metrics.format_summary(),
            session.high_score()
        );

        result
    }

    async fn run_input_loop(&mut self, mut handle: DriverHandle) -> Result<()> {
        let mut lines = spawn_line_reader(BufReader::new(std::io::stdin()));
        let mut snapshots = handle.snapshots.clone();

        'console: loop {
            tokio::select! {
                line = lines.recv() => {
                    let Some(line) = line else {
                        break;
                    };
                    for action in self.input_handler.handle_line(&line) {
                        match action {
                            InputAction::GameCommand(command) => {
                                handle
                                    .commands
                                    .send(command)
                                    .context("Tick driver stopped")?;
                            }
                            InputAction::Status => {
                                let snapshot = handle.snapshots.borrow().clone();
                                let json = serde_json::to_string(&*snapshot)
                                    .context("Failed to serialize snapshot")?;
                                println!("{json}");
                            }
                            InputAction::Quit => break 'console,
                            InputAction::None => {}
                        }
                    }
                }

                Some(event) = handle.events.recv() => {
                    self.handle_event(event, &handle);
                }

                changed = snapshots.changed(), if self.autopilot.is_some() => {
                    if changed.is_err() {
                        break;
                    }
                    let snapshot = snapshots.borrow_and_update().clone();
                    if snapshot.phase == GamePhase::Running {
                        let choice = self
                            .autopilot
                            .as_ref()
                            .and_then(|bot| bot.choose(&snapshot));
                        if let Some(direction) = choice {
                            // Ignore a closed queue here; the next branch reports it
                            let _ = handle.commands.send(Command::Propose(direction));
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    break;
                }
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: GameEvent, handle: &DriverHandle) {
        match event {
            GameEvent::PhaseChanged { to, .. } => {
                if to == GamePhase::Countdown {
                    self.metrics.on_game_start();
                }
                info!("{:?}", to);
            }
            GameEvent::FoodEaten { points } => info!("+{} points", points),
            GameEvent::HighScoreUpdated { high_score } => info!("new high score: {}", high_score),
            GameEvent::GameOver {
                reason,
                final_score,
            } => {
                let ticks = handle.snapshots.borrow().tick;
                self.metrics.on_game_over(final_score, reason, ticks);
                info!(
                    "game over ({:?}), final score {}; type r to reset",
                    reason, final_score
                );
                if let Err(err) = self.store.submit_score(&self.player, final_score) {
                    warn!("failed to record leaderboard entry: {:#}", err);
                }
            }
            GameEvent::Aborted => warn!("session reset after an internal error"),
        }
    }
}

/// Read lines on a plain thread. A read blocked there does not hold up
/// shutdown the way a runtime blocking task would.
fn spawn_line_reader<R>(reader: R) -> mpsc::UnboundedReceiver<String>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in reader.lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!("failed to read input: {}", err);
                    break;
                }
            }
        }
        debug!("input reader finished");
    });
    rx
}
