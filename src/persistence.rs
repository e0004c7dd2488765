//! High score and leaderboard persistence
//!
//! The engine only relies on [`HighScoreStore`]: loading never fails (missing
//! or corrupt data reads as 0) and failed writes are reported to the caller,
//! which logs and ignores them.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Number of entries kept on the leaderboard
pub const LEADERBOARD_SIZE: usize = 10;

/// Storage contract for the best score across sessions
pub trait HighScoreStore: Send {
    /// Stored high score, or 0 when nothing usable is stored
    fn load_high_score(&self) -> u32;

    /// Persist a new high score
    fn save_high_score(&mut self, score: u32) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub name: String,
    pub score: u32,
}

/// On-disk layout of the save file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub high_score: u32,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl SaveData {
    /// Read each field on its own so one bad field does not discard the rest
    fn from_value(value: &Value) -> Self {
        let high_score = value
            .get("high_score")
            .and_then(Value::as_u64)
            .and_then(|score| u32::try_from(score).ok())
            .unwrap_or_default();

        let leaderboard = value
            .get("leaderboard")
            .cloned()
            .and_then(|entries| serde_json::from_value(entries).ok())
            .unwrap_or_default();

        Self {
            high_score,
            leaderboard,
        }
    }
}

/// JSON save file holding the high score and the leaderboard
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the save file, treating any problem as an empty save
    pub fn load(&self) -> SaveData {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no save file at {:?}", self.path);
                return SaveData::default();
            }
            Err(err) => {
                warn!("failed to read save file {:?}: {}", self.path, err);
                return SaveData::default();
            }
        };

        match serde_json::from_str::<Value>(&text) {
            Ok(value) => SaveData::from_value(&value),
            Err(err) => {
                warn!("corrupt save file {:?}: {}", self.path, err);
                SaveData::default()
            }
        }
    }

    fn write(&self, data: &SaveData) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }

        let json = serde_json::to_string_pretty(data).context("Failed to serialize save data")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write save file {:?}", self.path))
    }

    /// Leaderboard entries, best first; empty on missing or corrupt data
    pub fn load_leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.load().leaderboard
    }

    /// Insert a finished game into the leaderboard, keeping the top entries
    pub fn submit_score(&mut self, name: &str, score: u32) -> Result<()> {
        let mut data = self.load();
        data.leaderboard.push(LeaderboardEntry {
            name: name.to_string(),
            score,
        });
        // Stable sort keeps earlier entries ahead on ties
        data.leaderboard.sort_by(|a, b| b.score.cmp(&a.score));
        data.leaderboard.truncate(LEADERBOARD_SIZE);
        data.high_score = data.high_score.max(score);
        self.write(&data)
    }
}

impl HighScoreStore for JsonFileStore {
    fn load_high_score(&self) -> u32 {
        self.load().high_score
    }

    fn save_high_score(&mut self, score: u32) -> Result<()> {
        let mut data = self.load();
        data.high_score = score;
        self.write(&data)
    }
}

/// In-memory store, optionally failing every write
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    high_score: u32,
    fail_writes: bool,
    pub writes: usize,
}

impl MemoryStore {
    pub fn new(high_score: u32) -> Self {
        Self {
            high_score,
            ..Default::default()
        }
    }

    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Default::default()
        }
    }
}

impl HighScoreStore for MemoryStore {
    fn load_high_score(&self) -> u32 {
        self.high_score
    }

    fn save_high_score(&mut self, score: u32) -> Result<()> {
        if self.fail_writes {
            bail!("memory store is read-only");
        }
        self.high_score = score;
        self.writes += 1;
        Ok(())
    }
}
