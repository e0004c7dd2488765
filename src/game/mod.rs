//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies.
//! A [`GameSession`] is driven by calling [`GameSession::update`] from a tick
//! driver; everything else reads [`Snapshot`]s.

pub mod action;
pub mod collision;
pub mod config;
pub mod direction_buffer;
pub mod movement;
pub mod score;
pub mod session;
pub mod spawner;
pub mod state;

// Re-export commonly used types
pub use action::{Command, Direction};
pub use collision::CollisionDetector;
pub use config::{Difficulty, FoodType, GameConfig};
pub use direction_buffer::DirectionBuffer;
pub use movement::{Advance, BoundaryMode, MovementEngine, MovementMode};
pub use score::{Award, ScoreTracker};
pub use session::{GameEvent, GameSession, Snapshot};
pub use spawner::Spawner;
pub use state::{CollisionType, Food, GamePhase, GridSize, Obstacles, Position, Round, Snake};
