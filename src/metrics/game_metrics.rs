use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::game::CollisionType;

/// Per-process statistics across games
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    pub total_ticks: u64,
    pub wall_deaths: u32,
    pub obstacle_deaths: u32,
    pub self_deaths: u32,
    /// Final scores of the most recent games (rolling window)
    recent_scores: VecDeque<u32>,
    window_size: usize,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self::with_window(100)
    }

    pub fn with_window(window_size: usize) -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score: 0,
            games_played: 0,
            total_ticks: 0,
            wall_deaths: 0,
            obstacle_deaths: 0,
            self_deaths: 0,
            recent_scores: VecDeque::with_capacity(window_size),
            window_size: window_size.max(1),
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32, reason: CollisionType, ticks: u64) {
        self.games_played += 1;
        self.total_ticks += ticks;
        if final_score > self.high_score {
            self.high_score = final_score;
        }

        match reason {
            CollisionType::Wall => self.wall_deaths += 1,
            CollisionType::Obstacle => self.obstacle_deaths += 1,
            CollisionType::SelfCollision => self.self_deaths += 1,
        }

        if self.recent_scores.len() == self.window_size {
            self.recent_scores.pop_front();
        }
        self.recent_scores.push_back(final_score);
    }

    /// Mean final score over the rolling window
    pub fn mean_score(&self) -> f32 {
        if self.recent_scores.is_empty() {
            return 0.0;
        }
        self.recent_scores.iter().sum::<u32>() as f32 / self.recent_scores.len() as f32
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    pub fn format_summary(&self) -> String {
        format!(
            "games: {} | best: {} | mean: {:.1} | ticks: {} | deaths wall/obstacle/self: {}/{}/{}",
            self.games_played,
            self.high_score,
            self.mean_score(),
            self.total_ticks,
            self.wall_deaths,
            self.obstacle_deaths,
            self.self_deaths
        )
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
