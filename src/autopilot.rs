//! Greedy autopilot
//!
//! Scores every legal turn from a [`Snapshot`]:
//! - moves into a wall, obstacle or body segment are discarded
//! - closer to the food is better (wrap-aware Manhattan distance)
//! - more free neighbours around the next cell breaks ties, which keeps the
//!   bot out of one-cell pockets
//! - keeping the current direction wins exact ties

use crate::game::{BoundaryMode, Direction, GridSize, Position, Snapshot};

pub struct Autopilot {
    boundary: BoundaryMode,
}

impl Autopilot {
    pub fn new(boundary: BoundaryMode) -> Self {
        Self { boundary }
    }

    /// Best direction for the next tick, or `None` without a snake
    pub fn choose(&self, snapshot: &Snapshot) -> Option<Direction> {
        let head = *snapshot.snake.first()?;
        let current = snapshot.direction?;

        Direction::ALL
            .into_iter()
            .filter(|direction| !current.is_opposite(*direction))
            .map(|direction| (direction, self.evaluate_move(snapshot, head, direction, current)))
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(direction, _)| direction)
    }

    fn evaluate_move(
        &self,
        snapshot: &Snapshot,
        head: Position,
        direction: Direction,
        current: Direction,
    ) -> f64 {
        let Some(next) = self.next_cell(snapshot, head, direction) else {
            return f64::NEG_INFINITY;
        };

        let distance = snapshot
            .food
            .as_ref()
            .map_or(0, |food| self.distance(snapshot.grid, next, food.position));
        let space = Direction::ALL
            .into_iter()
            .filter(|d| self.next_cell(snapshot, next, *d).is_some())
            .count();
        let keep_going = if direction == current { 0.1 } else { 0.0 };

        -(distance as f64) + 0.5 * space as f64 + keep_going
    }

    /// Cell reached by moving from `from`, if it is free
    fn next_cell(&self, snapshot: &Snapshot, from: Position, direction: Direction) -> Option<Position> {
        let next = self
            .boundary
            .resolve(from.moved_in_direction(direction), snapshot.grid)?;

        // The tail moves away this tick, so it does not block
        let body = &snapshot.snake[..snapshot.snake.len().saturating_sub(1)];
        if body.contains(&next) || snapshot.obstacles.contains(&next) {
            return None;
        }
        Some(next)
    }

    fn distance(&self, grid: GridSize, a: Position, b: Position) -> i32 {
        let dx = (a.x - b.x).abs();
        let dy = (a.y - b.y).abs();
        match self.boundary {
            BoundaryMode::Wrap => {
                dx.min(grid.width as i32 - dx) + dy.min(grid.height as i32 - dy)
            }
            BoundaryMode::Wall => dx + dy,
        }
    }
}
