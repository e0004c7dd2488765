use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

use super::movement::{BoundaryMode, MovementMode};

/// Accepted grid side lengths, in cells
pub const GRID_SIDE_RANGE: std::ops::RangeInclusive<usize> = 4..=1024;

/// One entry of the food type table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodType {
    pub name: String,
    /// Display hint for the rendering collaborator
    pub color: String,
    pub points: u32,
    /// Relative spawn weight; all-zero tables fall back to a uniform pick
    pub weight: u32,
}

impl FoodType {
    pub fn new(name: &str, color: &str, points: u32, weight: u32) -> Self {
        Self {
            name: name.to_string(),
            color: color.to_string(),
            points,
            weight,
        }
    }
}

/// Default food table: common apples, rarer high-value treats
pub fn default_food_types() -> Vec<FoodType> {
    vec![
        FoodType::new("apple", "red", 10, 70),
        FoodType::new("golden", "gold", 30, 20),
        FoodType::new("berry", "purple", 50, 10),
    ]
}

/// Difficulty preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

/// Speed and obstacle values a difficulty preset controls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultySettings {
    pub tick_interval_ms: u64,
    pub continuous_speed: f32,
    pub initial_obstacles: usize,
    pub obstacle_probability: f64,
}

impl Difficulty {
    pub fn settings(&self) -> DifficultySettings {
        match self {
            Difficulty::Easy => DifficultySettings {
                tick_interval_ms: 160,
                continuous_speed: 6.0,
                initial_obstacles: 0,
                obstacle_probability: 0.0,
            },
            Difficulty::Normal => DifficultySettings {
                tick_interval_ms: 125,
                continuous_speed: 8.0,
                initial_obstacles: 3,
                obstacle_probability: 0.01,
            },
            Difficulty::Hard => DifficultySettings {
                tick_interval_ms: 80,
                continuous_speed: 12.0,
                initial_obstacles: 8,
                obstacle_probability: 0.03,
            },
        }
    }
}

/// Configuration for the game
///
/// Every field has a documented default, and missing fields in a config
/// file fall back to it. Invalid values are repaired by [`GameConfig::sanitized`]
/// instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Width of the game grid
    pub grid_width: usize,
    /// Height of the game grid
    pub grid_height: usize,
    /// Initial (and minimum) length of the snake
    pub initial_snake_length: usize,

    pub movement: MovementMode,
    pub boundary: BoundaryMode,
    pub difficulty: Difficulty,

    /// Discrete mode: time between ticks
    pub tick_interval_ms: u64,
    /// Continuous mode: head speed in cells per second
    pub continuous_speed: f32,
    /// Continuous mode: time between frames
    pub frame_interval_ms: u64,
    /// Length of the display-only countdown before a round starts
    pub countdown_secs: u64,

    // Obstacles
    pub obstacles_enabled: bool,
    pub initial_obstacles: usize,
    /// Chance of adding one obstacle on each running tick
    pub obstacle_probability: f64,
    pub max_obstacles: usize,

    /// Segments right behind the head that are exempt from self-collision
    pub neck_window: usize,
    /// Random placement attempts before a spawn gives up
    pub spawn_attempts: usize,
    /// Points per extra segment of growth (0 = one segment per food)
    pub growth_divisor: u32,
    pub food_types: Vec<FoodType>,
}

impl Default for GameConfig {
    fn default() -> Self {
        let preset = Difficulty::Normal.settings();
        Self {
            grid_width: 20,
            grid_height: 20,
            initial_snake_length: 3,
            movement: MovementMode::Discrete,
            boundary: BoundaryMode::Wall,
            difficulty: Difficulty::Normal,
            tick_interval_ms: preset.tick_interval_ms,
            continuous_speed: preset.continuous_speed,
            frame_interval_ms: 16,
            countdown_secs: 3,
            obstacles_enabled: false,
            initial_obstacles: preset.initial_obstacles,
            obstacle_probability: preset.obstacle_probability,
            max_obstacles: 20,
            neck_window: 2,
            spawn_attempts: 300,
            growth_divisor: 10,
            food_types: default_food_types(),
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            grid_width: width,
            grid_height: height,
            ..Default::default()
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10, 10)
    }

    /// Create a large grid
    pub fn large() -> Self {
        Self::new(30, 30)
    }

    /// Builder-style difficulty selection
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.apply_difficulty(difficulty);
        self
    }

    /// Overwrite the speed and obstacle fields from a preset
    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        let preset = difficulty.settings();
        self.difficulty = difficulty;
        self.tick_interval_ms = preset.tick_interval_ms;
        self.continuous_speed = preset.continuous_speed;
        self.initial_obstacles = preset.initial_obstacles;
        self.obstacle_probability = preset.obstacle_probability;
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    /// Period the tick driver should run at for the configured movement mode
    pub fn driver_interval(&self) -> Duration {
        match self.movement {
            MovementMode::Discrete => self.tick_interval(),
            MovementMode::Continuous => self.frame_interval(),
        }
    }

    /// Load a configuration file, falling back to defaults on any problem
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(config) => {
                debug!("loaded game config from {:?}", path);
                config.sanitized()
            }
            Err(err) => {
                warn!("using default game config: {err:#}");
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;
        serde_json::from_str(&text).with_context(|| format!("Failed to parse config {:?}", path))
    }

    /// Validate configuration parameters
    ///
    /// # Returns
    ///
    /// `Ok(())` if all parameters are valid, `Err(String)` describing the
    /// first invalid field otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if !self.grid_in_range() {
            return Err(format!(
                "grid sides must be in {}..={}, got {}x{}",
                GRID_SIDE_RANGE.start(),
                GRID_SIDE_RANGE.end(),
                self.grid_width,
                self.grid_height
            ));
        }
        if self.initial_snake_length == 0 || self.initial_snake_length > self.grid_width / 2 {
            return Err(format!(
                "initial_snake_length must be in 1..={}, got {}",
                self.grid_width / 2,
                self.initial_snake_length
            ));
        }
        if self.tick_interval_ms == 0 || self.frame_interval_ms == 0 {
            return Err("tick and frame intervals must be positive".to_string());
        }
        if !(self.continuous_speed.is_finite() && self.continuous_speed > 0.0) {
            return Err(format!(
                "continuous_speed must be positive, got {}",
                self.continuous_speed
            ));
        }
        if !(0.0..=1.0).contains(&self.obstacle_probability) {
            return Err(format!(
                "obstacle_probability must be in [0, 1], got {}",
                self.obstacle_probability
            ));
        }
        if self.spawn_attempts == 0 {
            return Err("spawn_attempts must be positive".to_string());
        }
        if self.food_types.is_empty() {
            return Err("food_types must not be empty".to_string());
        }
        Ok(())
    }

    fn grid_in_range(&self) -> bool {
        GRID_SIDE_RANGE.contains(&self.grid_width) && GRID_SIDE_RANGE.contains(&self.grid_height)
    }

    /// Replace every invalid field with its default
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if !self.grid_in_range() {
            warn!(
                "invalid grid {}x{}, using {}x{}",
                self.grid_width, self.grid_height, defaults.grid_width, defaults.grid_height
            );
            self.grid_width = defaults.grid_width;
            self.grid_height = defaults.grid_height;
        }
        if self.initial_snake_length == 0 || self.initial_snake_length > self.grid_width / 2 {
            let fallback = defaults.initial_snake_length.min(self.grid_width / 2);
            warn!(
                "invalid initial_snake_length {}, using {}",
                self.initial_snake_length, fallback
            );
            self.initial_snake_length = fallback;
        }
        if self.tick_interval_ms == 0 {
            warn!("tick_interval_ms must be positive, using default");
            self.tick_interval_ms = defaults.tick_interval_ms;
        }
        if self.frame_interval_ms == 0 {
            warn!("frame_interval_ms must be positive, using default");
            self.frame_interval_ms = defaults.frame_interval_ms;
        }
        if !(self.continuous_speed.is_finite() && self.continuous_speed > 0.0) {
            warn!("invalid continuous_speed {}, using default", self.continuous_speed);
            self.continuous_speed = defaults.continuous_speed;
        }
        if !(0.0..=1.0).contains(&self.obstacle_probability) {
            warn!(
                "invalid obstacle_probability {}, using default",
                self.obstacle_probability
            );
            self.obstacle_probability = defaults.obstacle_probability;
        }
        if self.spawn_attempts == 0 {
            self.spawn_attempts = defaults.spawn_attempts;
        }
        if self.food_types.is_empty() {
            warn!("empty food table, using default food types");
            self.food_types = defaults.food_types;
        }

        self
    }
}
