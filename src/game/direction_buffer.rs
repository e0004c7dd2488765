use super::action::Direction;
use super::state::GamePhase;

/// Holds at most one pending turn between ticks.
///
/// Proposals are checked against the direction the snake *last moved in*,
/// not against the pending one. Two proposals in the same tick therefore can
/// never chain into a 180-degree turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectionBuffer {
    pending: Option<Direction>,
}

impl DirectionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `direction` for the next tick. Returns whether it was accepted.
    pub fn propose(&mut self, direction: Direction, phase: GamePhase, current: Direction) -> bool {
        if !phase.is_running() || current.is_opposite(direction) {
            return false;
        }
        self.pending = Some(direction);
        true
    }

    /// Take the pending direction, or keep going in `current`
    pub fn consume(&mut self, current: Direction) -> Direction {
        self.pending.take().unwrap_or(current)
    }

    pub fn pending(&self) -> Option<Direction> {
        self.pending
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
