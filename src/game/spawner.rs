use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::config::FoodType;
use super::state::{Food, GridSize, Position, Round};

/// Places food and obstacles on free cells.
///
/// Placement is random sampling with a bounded number of attempts. Running out
/// of attempts is not an error: the caller simply has no food (or no new
/// obstacle) until a later pass tries again.
pub struct Spawner {
    rng: StdRng,
    max_attempts: usize,
}

impl Spawner {
    pub fn new(max_attempts: usize) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_attempts,
        }
    }

    /// Deterministic spawner for simulations and tests
    pub fn seeded(seed: u64, max_attempts: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_attempts,
        }
    }

    pub fn set_max_attempts(&mut self, max_attempts: usize) {
        self.max_attempts = max_attempts.max(1);
    }

    /// Weighted pick from the food table, uniform if the weights are unusable
    pub fn pick_food_type<'a>(&mut self, table: &'a [FoodType]) -> Option<&'a FoodType> {
        if table.is_empty() {
            return None;
        }

        match WeightedIndex::new(table.iter().map(|food| food.weight)) {
            Ok(dist) => table.get(dist.sample(&mut self.rng)),
            Err(_) => table.get(self.rng.gen_range(0..table.len())),
        }
    }

    fn random_free_cell(
        &mut self,
        grid: GridSize,
        is_free: impl Fn(Position) -> bool,
    ) -> Option<Position> {
        for _ in 0..self.max_attempts {
            let x = self.rng.gen_range(0..grid.width) as i32;
            let y = self.rng.gen_range(0..grid.height) as i32;
            let pos = Position::new(x, y);

            if is_free(pos) {
                return Some(pos);
            }
        }
        None
    }

    /// Spawn food away from the snake and obstacles
    pub fn spawn_food(&mut self, table: &[FoodType], grid: GridSize, round: &Round) -> Option<Food> {
        let kind = self.pick_food_type(table)?.clone();

        match self.random_free_cell(grid, |pos| !round.is_blocked(pos)) {
            Some(position) => Some(Food::new(position, kind)),
            None => {
                debug!(
                    "no free cell for food after {} attempts",
                    self.max_attempts
                );
                None
            }
        }
    }

    fn free_for_obstacle(round: &Round, pos: Position) -> bool {
        !round.is_blocked(pos) && round.food.as_ref().is_none_or(|food| food.position != pos)
    }

    /// Place up to `count` obstacles outside `reserved`. Returns how many
    /// were placed.
    pub fn spawn_obstacles(
        &mut self,
        count: usize,
        cap: usize,
        grid: GridSize,
        round: &mut Round,
        reserved: &[Position],
    ) -> usize {
        let mut placed = 0;
        for _ in 0..count.min(cap) {
            let cell = self.random_free_cell(grid, |pos| {
                Self::free_for_obstacle(round, pos) && !reserved.contains(&pos)
            });
            match cell {
                Some(pos) => {
                    round.obstacles.push(pos, cap);
                    placed += 1;
                }
                None => break,
            }
        }
        placed
    }

    /// Roll once for a new obstacle, evicting the oldest past `cap`
    pub fn maybe_add_obstacle(
        &mut self,
        probability: f64,
        cap: usize,
        grid: GridSize,
        round: &mut Round,
    ) -> Option<Position> {
        if cap == 0 || !self.rng.gen_bool(probability.clamp(0.0, 1.0)) {
            return None;
        }

        let pos = self.random_free_cell(grid, |pos| Self::free_for_obstacle(round, pos))?;
        let evicted = round.obstacles.push(pos, cap);
        if !evicted.is_empty() {
            debug!("obstacle cap {} reached, evicted {:?}", cap, evicted);
        }
        Some(pos)
    }
}
