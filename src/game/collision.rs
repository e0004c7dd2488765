use super::movement::Advance;
use super::state::{CollisionType, Position, Round};

/// Checks the post-move head against walls, obstacles and the body.
///
/// Runs once per tick (or per virtual cell change) after the head has been
/// inserted and the tail trimmed, before food is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionDetector {
    /// Segments behind the head that are never treated as a hit
    pub neck_window: usize,
}

impl CollisionDetector {
    pub fn new(neck_window: usize) -> Self {
        Self { neck_window }
    }

    /// Wall check, which only the boundary policy can trigger
    pub fn check_advance(&self, advance: Advance) -> Option<CollisionType> {
        match advance {
            Advance::Wall => Some(CollisionType::Wall),
            _ => None,
        }
    }

    /// Obstacle then self checks for a head that is already on the board
    pub fn check_head(&self, round: &Round, head: Position) -> Option<CollisionType> {
        if round.obstacles.contains(head) {
            return Some(CollisionType::Obstacle);
        }

        if round.snake.collides_with_body(head, self.neck_window) {
            return Some(CollisionType::SelfCollision);
        }

        None
    }
}
