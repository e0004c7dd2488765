use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use super::action::Direction;
use super::config::FoodType;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }
}

/// Grid dimensions in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

impl GridSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Direction applied on the most recent tick
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let mut body = vec![head];

        let back = direction.opposite();
        for i in 1..length {
            let prev = body[i - 1];
            body.push(prev.moved_in_direction(back));
        }

        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Check if position collides with the body, skipping the head and the
    /// `neck` segments right behind it
    pub fn collides_with_body(&self, pos: Position, neck: usize) -> bool {
        self.body.iter().skip(1 + neck).any(|&segment| segment == pos)
    }

    /// Insert a new head segment
    pub fn push_head(&mut self, pos: Position) {
        self.body.insert(0, pos);
    }

    /// Drop tail segments until the body is at most `length` long
    pub fn trim_to(&mut self, length: usize) {
        self.body.truncate(length.max(1));
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }
}

/// A piece of food on the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub position: Position,
    pub kind: FoodType,
}

impl Food {
    pub fn new(position: Position, kind: FoodType) -> Self {
        Self { position, kind }
    }

    pub fn points(&self) -> u32 {
        self.kind.points
    }
}

/// Obstacles in placement order, oldest first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Obstacles {
    cells: VecDeque<Position>,
}

impl Obstacles {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an obstacle, evicting the oldest ones while over `cap`
    pub fn push(&mut self, pos: Position, cap: usize) -> Vec<Position> {
        self.cells.push_back(pos);
        let mut evicted = Vec::new();
        while self.cells.len() > cap {
            if let Some(old) = self.cells.pop_front() {
                evicted.push(old);
            }
        }
        evicted
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Position> {
        self.cells.iter()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
    }
}

/// Type of collision that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    /// Snake hit a wall
    Wall,
    /// Snake hit an obstacle
    Obstacle,
    /// Snake hit itself
    SelfCollision,
}

/// Phase of the game state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Idle,
    Countdown,
    Running,
    Paused,
    GameOver(CollisionType),
}

impl GamePhase {
    pub fn is_running(&self) -> bool {
        matches!(self, GamePhase::Running)
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self, GamePhase::GameOver(_))
    }
}

/// Everything that lives for exactly one round, from start to reset
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub snake: Snake,
    pub food: Option<Food>,
    pub obstacles: Obstacles,
}

impl Round {
    pub fn new(snake: Snake) -> Self {
        Self {
            snake,
            food: None,
            obstacles: Obstacles::new(),
        }
    }

    /// True when `pos` holds a snake segment or an obstacle
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.snake.contains(pos) || self.obstacles.contains(pos)
    }
}
