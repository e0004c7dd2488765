//! Movement engine
//!
//! Advances the snake's head either one grid step per tick (discrete) or by
//! integrating speed over frame time (continuous). In continuous mode the
//! head keeps a real-valued position, and the rest of the game only sees the
//! *virtual cell* obtained by rounding it. Both modes resolve the candidate
//! cell through the same [`BoundaryMode`].

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::direction_buffer::DirectionBuffer;
use super::state::{GridSize, Position, Snake};

/// Longest distance, in cells, the head may travel in one frame. Keeps a
/// slow frame from skipping over a cell.
const MAX_FRAME_TRAVEL: f32 = 0.9;

/// How the head advances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementMode {
    /// One cell per tick
    #[default]
    Discrete,
    /// Time-integrated motion, quantized to cells
    Continuous,
}

/// What happens at the edge of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryMode {
    /// Leaving one edge re-enters from the opposite edge
    Wrap,
    /// Leaving the grid ends the game
    #[default]
    Wall,
}

impl BoundaryMode {
    /// Map a candidate cell onto the grid, or `None` if it hit a wall
    pub fn resolve(&self, pos: Position, grid: GridSize) -> Option<Position> {
        match self {
            BoundaryMode::Wrap => Some(Position::new(
                pos.x.rem_euclid(grid.width as i32),
                pos.y.rem_euclid(grid.height as i32),
            )),
            BoundaryMode::Wall => grid.contains(pos).then_some(pos),
        }
    }
}

/// Result of advancing the head
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Still inside the same virtual cell
    Stay,
    /// Entered a new cell on the grid
    Cell(Position),
    /// Crossed a hard wall
    Wall,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct ContinuousHead {
    x: f32,
    y: f32,
    /// A turn was applied in the current cell
    turn_locked: bool,
}

impl ContinuousHead {
    fn at(cell: Position) -> Self {
        Self {
            x: cell.x as f32,
            y: cell.y as f32,
            turn_locked: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MovementEngine {
    mode: MovementMode,
    continuous: Option<ContinuousHead>,
}

impl MovementEngine {
    pub fn new(mode: MovementMode) -> Self {
        Self {
            mode,
            continuous: None,
        }
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    /// Drop any in-flight interpolation
    pub fn reset(&mut self) {
        self.continuous = None;
    }

    /// Real-valued head position in continuous mode
    pub fn precise_head(&self) -> Option<(f32, f32)> {
        self.continuous.map(|head| (head.x, head.y))
    }

    /// Advance the head. Updates `snake.direction` when a buffered turn is
    /// applied, but leaves the body to the caller.
    pub fn advance(
        &mut self,
        snake: &mut Snake,
        buffer: &mut DirectionBuffer,
        boundary: BoundaryMode,
        grid: GridSize,
        speed: f32,
        elapsed: Duration,
    ) -> Advance {
        match self.mode {
            MovementMode::Discrete => Self::step_discrete(snake, buffer, boundary, grid),
            MovementMode::Continuous => {
                self.step_continuous(snake, buffer, boundary, grid, speed, elapsed)
            }
        }
    }

    fn step_discrete(
        snake: &mut Snake,
        buffer: &mut DirectionBuffer,
        boundary: BoundaryMode,
        grid: GridSize,
    ) -> Advance {
        snake.direction = buffer.consume(snake.direction);
        let candidate = snake.head().moved_in_direction(snake.direction);

        match boundary.resolve(candidate, grid) {
            Some(cell) => Advance::Cell(cell),
            None => Advance::Wall,
        }
    }

    fn step_continuous(
        &mut self,
        snake: &mut Snake,
        buffer: &mut DirectionBuffer,
        boundary: BoundaryMode,
        grid: GridSize,
        speed: f32,
        elapsed: Duration,
    ) -> Advance {
        let head_cell = snake.head();
        let head = self
            .continuous
            .get_or_insert_with(|| ContinuousHead::at(head_cell));

        // One turn per cell, so two quick turns cannot fold back onto the neck
        if !head.turn_locked {
            let next = buffer.consume(snake.direction);
            if next != snake.direction {
                snake.direction = next;
                head.x = head_cell.x as f32;
                head.y = head_cell.y as f32;
                head.turn_locked = true;
            }
        }

        let distance = (speed * elapsed.as_secs_f32()).min(MAX_FRAME_TRAVEL);
        let (dx, dy) = snake.direction.delta();
        head.x += dx as f32 * distance;
        head.y += dy as f32 * distance;

        if boundary == BoundaryMode::Wrap {
            head.x = wrap_coordinate(head.x, grid.width);
            head.y = wrap_coordinate(head.y, grid.height);
        }

        let virtual_cell = Position::new(head.x.round() as i32, head.y.round() as i32);
        match boundary.resolve(virtual_cell, grid) {
            None => Advance::Wall,
            Some(cell) if cell == head_cell => Advance::Stay,
            Some(cell) => {
                head.turn_locked = false;
                Advance::Cell(cell)
            }
        }
    }
}

/// Keep a real coordinate inside [-0.5, size - 0.5), the span of cells 0..size
fn wrap_coordinate(value: f32, size: usize) -> f32 {
    let size = size as f32;
    if value >= size - 0.5 {
        value - size
    } else if value < -0.5 {
        value + size
    } else {
        value
    }
}
