//! Snake Engine - a real-time snake simulation core
//!
//! This library provides:
//! - Core game logic: movement, collisions, spawning, scoring, state machine (game module)
//! - High score and leaderboard persistence (persistence module)
//! - A tokio tick driver with an input queue and per-tick snapshots (driver module)
//! - A greedy autopilot and headless run modes (autopilot, modes modules)

pub mod autopilot;
pub mod driver;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod persistence;
