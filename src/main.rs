use anyhow::Result;
use clap::{Parser, ValueEnum};
use snake_engine::game::{BoundaryMode, Difficulty, GameConfig, MovementMode};
use snake_engine::modes::{ConsoleMode, SimulateConfig, SimulateMode};
use snake_engine::persistence::JsonFileStore;
use std::path::PathBuf;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "snake_engine")]
#[command(version, about = "Real-time snake simulation engine")]
struct Cli {
    /// Run mode
    #[arg(long, default_value = "console")]
    mode: Mode,

    /// JSON game config; missing or invalid values fall back to defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid width
    #[arg(long)]
    width: Option<usize>,

    /// Grid height
    #[arg(long)]
    height: Option<usize>,

    #[arg(long)]
    difficulty: Option<DifficultyArg>,

    #[arg(long)]
    movement: Option<MovementArg>,

    #[arg(long)]
    boundary: Option<BoundaryArg>,

    /// Enable obstacles
    #[arg(long)]
    obstacles: bool,

    /// Save file holding the high score and leaderboard
    #[arg(long, default_value = "snake_save.json")]
    save_file: PathBuf,

    /// Name recorded on the leaderboard (console mode)
    #[arg(long, default_value = "player")]
    name: String,

    /// Let the autopilot steer in console mode
    #[arg(long)]
    autopilot: bool,

    /// Number of games (simulate mode)
    #[arg(long, default_value = "10")]
    games: usize,

    /// Spawn seed (simulate mode)
    #[arg(long)]
    seed: Option<u64>,

    /// Debug logging
    #[arg(long, short)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum Mode {
    /// Play from stdin commands in real time
    Console,
    /// Run autopilot games as fast as possible
    Simulate,
}

#[derive(Clone, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

#[derive(Clone, ValueEnum)]
enum MovementArg {
    Discrete,
    Continuous,
}

#[derive(Clone, ValueEnum)]
enum BoundaryArg {
    Wrap,
    Wall,
}

impl Cli {
    fn game_config(&self) -> GameConfig {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path),
            None => GameConfig::default(),
        };

        if let Some(width) = self.width {
            config.grid_width = width;
        }
        if let Some(height) = self.height {
            config.grid_height = height;
        }
        if let Some(difficulty) = &self.difficulty {
            config.apply_difficulty(match difficulty {
                DifficultyArg::Easy => Difficulty::Easy,
                DifficultyArg::Normal => Difficulty::Normal,
                DifficultyArg::Hard => Difficulty::Hard,
            });
        }
        if let Some(movement) = &self.movement {
            config.movement = match movement {
                MovementArg::Discrete => MovementMode::Discrete,
                MovementArg::Continuous => MovementMode::Continuous,
            };
        }
        if let Some(boundary) = &self.boundary {
            config.boundary = match boundary {
                BoundaryArg::Wrap => BoundaryMode::Wrap,
                BoundaryArg::Wall => BoundaryMode::Wall,
            };
        }
        if self.obstacles {
            config.obstacles_enabled = true;
        }

        config.sanitized()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let config = cli.game_config();

    // Dispatch to appropriate mode
    match cli.mode {
        Mode::Console => {
            let mut console = ConsoleMode::new(config, cli.save_file, cli.name, cli.autopilot);
            console.run().await?;
        }
        Mode::Simulate => {
            let simulate_config = SimulateConfig {
                seed: cli.seed,
                game_config: config,
                ..SimulateConfig::new(cli.games)
            };
            let store = JsonFileStore::new(cli.save_file);
            let mut simulate = SimulateMode::new(simulate_config, Box::new(store));
            simulate.run()?;
        }
    }

    Ok(())
}
