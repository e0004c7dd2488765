//! Game session: the state machine and the per-tick step
//!
//! A [`GameSession`] is owned by a single writer (normally the tick driver).
//! Every public operation is validated against the current [`GamePhase`];
//! calls that make no sense in the current phase are no-ops returning
//! `false`. Collaborators observe the game through [`Snapshot`]s and the
//! [`GameEvent`]s drained with [`GameSession::take_events`].

use anyhow::{Context, Result, bail};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use super::action::{Command, Direction};
use super::collision::CollisionDetector;
use super::config::{Difficulty, GameConfig};
use super::direction_buffer::DirectionBuffer;
use super::movement::{Advance, MovementEngine};
use super::score::ScoreTracker;
use super::spawner::Spawner;
use super::state::{CollisionType, Food, GamePhase, GridSize, Position, Round, Snake};
use crate::persistence::HighScoreStore;

/// Cells ahead of the starting head that never get an initial obstacle
const SAFE_LANE_CELLS: usize = 3;

/// Notifications for audio, leaderboard and other collaborators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameEvent {
    PhaseChanged { from: GamePhase, to: GamePhase },
    FoodEaten { points: u32 },
    GameOver { reason: CollisionType, final_score: u32 },
    HighScoreUpdated { high_score: u32 },
    /// An internal failure forced the session back to Idle
    Aborted,
}

/// Immutable view of the session between two ticks
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub phase: GamePhase,
    pub grid: GridSize,
    pub snake: Vec<Position>,
    pub direction: Option<Direction>,
    pub food: Option<Food>,
    pub obstacles: Vec<Position>,
    pub score: u32,
    pub high_score: u32,
    pub target_length: usize,
    /// Whole seconds left on the countdown, 0 outside Countdown
    pub countdown_secs: u64,
}

pub struct GameSession {
    config: GameConfig,
    pending_difficulty: Option<Difficulty>,
    phase: GamePhase,
    round: Option<Round>,
    buffer: DirectionBuffer,
    movement: MovementEngine,
    collision: CollisionDetector,
    spawner: Spawner,
    score: ScoreTracker,
    store: Box<dyn HighScoreStore>,
    events: Vec<GameEvent>,
    tick: u64,
    countdown_remaining: Duration,
}

impl GameSession {
    /// Create an idle session. The configuration is sanitized first.
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        let spawner = Spawner::new(config.spawn_attempts);
        Self::build(config, store, spawner)
    }

    /// Same as [`GameSession::new`] with deterministic spawning
    pub fn with_seed(config: GameConfig, store: Box<dyn HighScoreStore>, seed: u64) -> Self {
        let spawner = Spawner::seeded(seed, config.spawn_attempts);
        Self::build(config, store, spawner)
    }

    fn build(config: GameConfig, store: Box<dyn HighScoreStore>, mut spawner: Spawner) -> Self {
        let config = config.sanitized();
        spawner.set_max_attempts(config.spawn_attempts);
        let high_score = store.load_high_score();

        Self {
            pending_difficulty: None,
            phase: GamePhase::Idle,
            round: None,
            buffer: DirectionBuffer::new(),
            movement: MovementEngine::new(config.movement),
            collision: CollisionDetector::new(config.neck_window),
            spawner,
            score: ScoreTracker::new(
                high_score,
                config.initial_snake_length,
                config.growth_divisor,
            ),
            store,
            events: Vec::new(),
            tick: 0,
            countdown_remaining: Duration::ZERO,
            config,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    /// Direct access to the active round, for scripted setups and tests
    pub fn round_mut(&mut self) -> Option<&mut Round> {
        self.round.as_mut()
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn high_score(&self) -> u32 {
        self.score.high_score()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn store(&self) -> &dyn HighScoreStore {
        self.store.as_ref()
    }

    pub fn grid(&self) -> GridSize {
        GridSize::new(self.config.grid_width, self.config.grid_height)
    }

    /// Period the driver should call [`GameSession::update`] at
    pub fn driver_interval(&self) -> Duration {
        self.config.driver_interval()
    }

    /// Drain the events produced since the last call
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Dispatch a queued command
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Propose(direction) => self.propose(direction),
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::Resume => self.resume(),
            Command::TogglePause => self.toggle_pause(),
            Command::Reset => self.reset(),
            Command::SetDifficulty(difficulty) => self.set_difficulty(difficulty),
        }
    }

    /// Buffer a turn for the next tick
    pub fn propose(&mut self, direction: Direction) -> bool {
        let Some(round) = &self.round else {
            return false;
        };
        self.buffer
            .propose(direction, self.phase, round.snake.direction)
    }

    /// Idle -> Countdown: build a fresh round
    pub fn start(&mut self) -> bool {
        if self.phase != GamePhase::Idle {
            return false;
        }

        let grid = self.grid();
        let head = Position::new((grid.width / 2) as i32, (grid.height / 2) as i32);
        let snake = Snake::new(head, Direction::Right, self.config.initial_snake_length);
        let mut round = Round::new(snake);

        if self.config.obstacles_enabled {
            let lane = self.safe_lane(head, Direction::Right);
            let placed = self.spawner.spawn_obstacles(
                self.config.initial_obstacles,
                self.config.max_obstacles,
                grid,
                &mut round,
                &lane,
            );
            debug!("placed {} initial obstacles", placed);
        }
        round.food = self
            .spawner
            .spawn_food(&self.config.food_types, grid, &round);

        self.round = Some(round);
        self.buffer.clear();
        self.movement = MovementEngine::new(self.config.movement);
        self.collision = CollisionDetector::new(self.config.neck_window);
        self.score.set_growth_divisor(self.config.growth_divisor);
        self.score.begin_round(self.config.initial_snake_length);
        self.tick = 0;
        self.countdown_remaining = Duration::from_secs(self.config.countdown_secs);

        info!(
            "starting round on {}x{} grid ({:?}, {:?})",
            grid.width, grid.height, self.config.movement, self.config.boundary
        );
        self.set_phase(GamePhase::Countdown);
        true
    }

    /// Cells right ahead of a fresh snake, kept free of initial obstacles
    fn safe_lane(&self, head: Position, direction: Direction) -> Vec<Position> {
        let grid = self.grid();
        let mut lane = Vec::with_capacity(SAFE_LANE_CELLS);
        let mut cell = head;
        for _ in 0..SAFE_LANE_CELLS {
            match self
                .config
                .boundary
                .resolve(cell.moved_in_direction(direction), grid)
            {
                Some(next) => {
                    lane.push(next);
                    cell = next;
                }
                None => break,
            }
        }
        lane
    }

    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.set_phase(GamePhase::Paused);
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            return false;
        }
        self.set_phase(GamePhase::Running);
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.pause() || self.resume()
    }

    /// Drop the round and return to Idle. No-op when already idle.
    pub fn reset(&mut self) -> bool {
        if self.phase == GamePhase::Idle {
            return false;
        }

        self.discard_round();
        if let Some(difficulty) = self.pending_difficulty.take() {
            self.config.apply_difficulty(difficulty);
        }
        self.set_phase(GamePhase::Idle);
        true
    }

    /// Change difficulty. While running the change waits for the next tick;
    /// it never touches the snake or the score.
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        if self.phase.is_running() {
            self.pending_difficulty = Some(difficulty);
        } else {
            // A newer request replaces anything queued while running
            self.pending_difficulty = None;
            self.config.apply_difficulty(difficulty);
        }
        info!("difficulty set to {:?}", difficulty);
        true
    }

    /// Advance the session by `elapsed`.
    ///
    /// Counts down in Countdown and runs one step in Running; every other
    /// phase is left untouched. A failure inside the step resets the session
    /// to Idle instead of leaving it half updated.
    pub fn update(&mut self, elapsed: Duration) {
        match self.phase {
            GamePhase::Countdown => {
                self.countdown_remaining = self.countdown_remaining.saturating_sub(elapsed);
                if self.countdown_remaining.is_zero() {
                    self.set_phase(GamePhase::Running);
                }
            }
            GamePhase::Running => {
                if let Err(err) = self.step(elapsed) {
                    self.abort(err);
                }
            }
            GamePhase::Idle | GamePhase::Paused | GamePhase::GameOver(_) => {}
        }
    }

    fn step(&mut self, elapsed: Duration) -> Result<()> {
        if let Some(difficulty) = self.pending_difficulty.take() {
            self.config.apply_difficulty(difficulty);
            debug!("applied difficulty {:?}", difficulty);
        }

        let grid = self.grid();
        let round = self
            .round
            .as_mut()
            .context("running without an active round")?;
        if round.snake.is_empty() {
            bail!("snake has no segments");
        }

        // Food may be missing after an exhausted spawn; retry every tick
        if round.food.is_none() {
            round.food = self
                .spawner
                .spawn_food(&self.config.food_types, grid, round);
        }

        let advance = self.movement.advance(
            &mut round.snake,
            &mut self.buffer,
            self.config.boundary,
            grid,
            self.config.continuous_speed,
            elapsed,
        );
        let head = match advance {
            Advance::Stay => return Ok(()),
            Advance::Cell(cell) => cell,
            Advance::Wall => {
                self.tick += 1;
                if let Some(reason) = self.collision.check_advance(advance) {
                    self.finish(reason);
                }
                return Ok(());
            }
        };
        self.tick += 1;

        let eating = round
            .food
            .as_ref()
            .filter(|food| food.position == head)
            .map(Food::points);
        let growth = eating.map_or(0, |points| self.score.growth_for(points));

        round.snake.push_head(head);
        round.snake.trim_to(self.score.target_length() + growth);

        if let Some(reason) = self.collision.check_head(round, head) {
            // Collision wins over food on the same tick
            self.finish(reason);
            return Ok(());
        }

        if eating.is_some() {
            round.food = self
                .spawner
                .spawn_food(&self.config.food_types, grid, round);
        }

        if self.config.obstacles_enabled {
            if let Some(pos) = self.spawner.maybe_add_obstacle(
                self.config.obstacle_probability,
                self.config.max_obstacles,
                grid,
                round,
            ) {
                debug!("obstacle added at ({}, {})", pos.x, pos.y);
            }
        }

        if let Some(points) = eating {
            let award = self.score.award(points);
            debug!(
                "ate food worth {} (+{} segments), score {}",
                award.points,
                award.growth,
                self.score.score()
            );
            self.events.push(GameEvent::FoodEaten { points });
            if let Some(high_score) = award.new_high_score {
                self.record_high_score(high_score);
            }
        }

        Ok(())
    }

    fn finish(&mut self, reason: CollisionType) {
        let final_score = self.score.score();
        self.buffer.clear();
        self.set_phase(GamePhase::GameOver(reason));

        if let Some(high_score) = self.score.check_high_score() {
            self.record_high_score(high_score);
        }
        self.events.push(GameEvent::GameOver {
            reason,
            final_score,
        });
        info!("game over ({:?}) with score {}", reason, final_score);
    }

    fn record_high_score(&mut self, high_score: u32) {
        self.events.push(GameEvent::HighScoreUpdated { high_score });
        if let Err(err) = self.store.save_high_score(high_score) {
            warn!("failed to persist high score {}: {:#}", high_score, err);
        }
    }

    fn abort(&mut self, err: anyhow::Error) {
        error!("tick failed, resetting session: {:#}", err);
        self.discard_round();
        self.pending_difficulty = None;
        self.set_phase(GamePhase::Idle);
        self.events.push(GameEvent::Aborted);
    }

    fn discard_round(&mut self) {
        self.round = None;
        self.buffer.clear();
        self.movement.reset();
        self.score.begin_round(self.config.initial_snake_length);
        self.countdown_remaining = Duration::ZERO;
    }

    fn set_phase(&mut self, to: GamePhase) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        debug!("phase {:?} -> {:?}", from, to);
        self.events.push(GameEvent::PhaseChanged { from, to });
    }

    pub fn snapshot(&self) -> Snapshot {
        let round = self.round.as_ref();
        let countdown_secs = match self.phase {
            GamePhase::Countdown => self.countdown_remaining.as_millis().div_ceil(1000) as u64,
            _ => 0,
        };

        Snapshot {
            tick: self.tick,
            phase: self.phase,
            grid: self.grid(),
            snake: round.map(|r| r.snake.body.clone()).unwrap_or_default(),
            direction: round.map(|r| r.snake.direction),
            food: round.and_then(|r| r.food.clone()),
            obstacles: round
                .map(|r| r.obstacles.iter().copied().collect())
                .unwrap_or_default(),
            score: self.score.score(),
            high_score: self.score.high_score(),
            target_length: self.score.target_length(),
            countdown_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::config::FoodType;
    use crate::game::movement::{BoundaryMode, MovementMode};
    use crate::persistence::MemoryStore;

    const TICK: Duration = Duration::from_millis(100);

    fn running_session(config: GameConfig) -> GameSession {
        let config = GameConfig {
            countdown_secs: 0,
            ..config
        };
        let mut session = GameSession::with_seed(config, Box::new(MemoryStore::default()), 42);
        assert!(session.start());
        session.update(Duration::ZERO);
        assert_eq!(session.phase(), GamePhase::Running);
        session
    }

    fn apple(points: u32) -> FoodType {
        FoodType::new("apple", "red", points, 1)
    }

    /// Put food somewhere the snake will not reach during a short test
    fn park_food(session: &mut GameSession) {
        let round = session.round_mut().unwrap();
        round.food = Some(Food::new(Position::new(0, 0), apple(10)));
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = GameSession::new(GameConfig::default(), Box::new(MemoryStore::new(70)));
        assert_eq!(session.phase(), GamePhase::Idle);
        assert_eq!(session.high_score(), 70);

        let snapshot = session.snapshot();
        assert!(snapshot.snake.is_empty());
        assert!(snapshot.food.is_none());
    }

    #[test]
    fn test_countdown_blocks_movement() {
        let config = GameConfig {
            countdown_secs: 3,
            ..GameConfig::default()
        };
        let mut session = GameSession::with_seed(config, Box::new(MemoryStore::default()), 1);
        session.start();
        let head = session.round().unwrap().snake.head();

        assert_eq!(session.snapshot().countdown_secs, 3);
        session.update(Duration::from_millis(1500));
        assert_eq!(session.phase(), GamePhase::Countdown);
        assert_eq!(session.snapshot().countdown_secs, 2);
        assert!(!session.propose(Direction::Up));
        assert_eq!(session.round().unwrap().snake.head(), head);

        session.update(Duration::from_millis(1500));
        assert_eq!(session.phase(), GamePhase::Running);
        assert_eq!(session.round().unwrap().snake.head(), head);
    }

    #[test]
    fn test_oversized_grid_config_still_starts() {
        let config = GameConfig {
            grid_width: 1 << 32,
            boundary: BoundaryMode::Wrap,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        assert_eq!(session.grid(), GridSize::new(20, 20));

        session.update(TICK);
        assert!(session.grid().contains(session.round().unwrap().snake.head()));
    }

    #[test]
    fn test_invalid_transitions_are_no_ops() {
        let mut session = GameSession::new(GameConfig::default(), Box::new(MemoryStore::default()));
        assert!(!session.pause());
        assert!(!session.resume());
        assert!(!session.reset());
        assert!(session.start());
        assert!(!session.start());
    }

    #[test]
    fn test_pause_and_resume_are_idempotent() {
        let mut session = running_session(GameConfig::default());

        assert!(session.pause());
        assert!(!session.pause());
        assert_eq!(session.phase(), GamePhase::Paused);

        assert!(session.resume());
        assert!(!session.resume());
        assert_eq!(session.phase(), GamePhase::Running);
    }

    #[test]
    fn test_paused_session_does_not_move() {
        let mut session = running_session(GameConfig::default());
        park_food(&mut session);
        session.pause();
        let before = session.snapshot();

        session.update(TICK);
        assert_eq!(session.snapshot(), before);
        assert!(!session.propose(Direction::Up));
    }

    #[test]
    fn test_proposal_applies_on_next_tick() {
        let mut session = running_session(GameConfig::default());
        park_food(&mut session);
        let head = session.round().unwrap().snake.head();

        assert!(session.propose(Direction::Down));
        assert!(!session.propose(Direction::Left));
        assert_eq!(session.round().unwrap().snake.direction, Direction::Right);

        session.update(TICK);
        let snake = &session.round().unwrap().snake;
        assert_eq!(snake.direction, Direction::Down);
        assert_eq!(snake.head(), head.moved_by(0, 1));
    }

    #[test]
    fn test_wall_collision_ends_game() {
        let config = GameConfig {
            boundary: BoundaryMode::Wall,
            ..GameConfig::small()
        };
        let mut session = running_session(config);
        park_food(&mut session);

        for _ in 0..10 {
            session.update(TICK);
        }
        assert_eq!(session.phase(), GamePhase::GameOver(CollisionType::Wall));
        let events = session.take_events();
        assert!(events.contains(&GameEvent::GameOver {
            reason: CollisionType::Wall,
            final_score: 0
        }));
    }

    #[test]
    fn test_self_collision_after_tight_loop() {
        let config = GameConfig {
            initial_snake_length: 6,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        park_food(&mut session);

        // Right, Down, Left, then Up runs into the body
        for direction in [Direction::Down, Direction::Left, Direction::Up] {
            session.propose(direction);
            session.update(TICK);
        }
        assert_eq!(
            session.phase(),
            GamePhase::GameOver(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_following_own_tail_is_allowed() {
        let config = GameConfig {
            initial_snake_length: 4,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        park_food(&mut session);

        // A 2x2 loop: the head always enters the cell the tail just left
        for _ in 0..3 {
            for direction in [Direction::Down, Direction::Left, Direction::Up, Direction::Right] {
                session.propose(direction);
                session.update(TICK);
            }
        }
        assert_eq!(session.phase(), GamePhase::Running);
    }

    #[test]
    fn test_food_and_collision_on_same_tick_awards_nothing() {
        let config = GameConfig {
            obstacles_enabled: true,
            initial_obstacles: 0,
            obstacle_probability: 0.0,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        let round = session.round_mut().unwrap();
        let ahead = round.snake.head().moved_in_direction(round.snake.direction);
        round.food = Some(Food::new(ahead, apple(10)));
        round.obstacles.push(ahead, 20);

        session.update(TICK);
        assert_eq!(
            session.phase(),
            GamePhase::GameOver(CollisionType::Obstacle)
        );
        assert_eq!(session.score(), 0);
        assert!(
            !session
                .take_events()
                .iter()
                .any(|event| matches!(event, GameEvent::FoodEaten { .. }))
        );
    }

    #[test]
    fn test_difficulty_change_keeps_snake_and_score() {
        let mut session = running_session(GameConfig::default());
        let round = session.round_mut().unwrap();
        let ahead = round.snake.head().moved_in_direction(round.snake.direction);
        round.food = Some(Food::new(ahead, apple(10)));
        session.update(TICK);
        park_food(&mut session);

        let length = session.round().unwrap().snake.len();
        session.set_difficulty(Difficulty::Hard);
        assert_eq!(session.config().difficulty, Difficulty::Normal);

        session.update(TICK);
        assert_eq!(session.config().difficulty, Difficulty::Hard);
        assert_eq!(session.driver_interval(), Duration::from_millis(80));
        assert_eq!(session.score(), 10);
        assert_eq!(session.round().unwrap().snake.len(), length);
    }

    #[test]
    fn test_difficulty_set_while_paused_replaces_queued_one() {
        let mut session = running_session(GameConfig::default());
        park_food(&mut session);

        session.set_difficulty(Difficulty::Hard);
        session.pause();
        session.set_difficulty(Difficulty::Easy);
        assert_eq!(session.config().difficulty, Difficulty::Easy);
        session.resume();

        session.update(TICK);
        assert_eq!(session.config().difficulty, Difficulty::Easy);
        assert_eq!(session.driver_interval(), Duration::from_millis(160));
    }

    #[test]
    fn test_continuous_wall_run_ends_game() {
        let config = GameConfig {
            movement: MovementMode::Continuous,
            boundary: BoundaryMode::Wall,
            continuous_speed: 10.0,
            ..GameConfig::small()
        };
        let mut session = running_session(config);
        park_food(&mut session);

        // Head starts at x = 5 heading right; 0.5 cells per frame
        for _ in 0..20 {
            session.update(Duration::from_millis(50));
            if session.phase().is_game_over() {
                break;
            }
            let head = session.round().unwrap().snake.head();
            assert!(session.grid().contains(head));
        }
        assert_eq!(session.phase(), GamePhase::GameOver(CollisionType::Wall));
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_continuous_tight_loop_hits_body() {
        let config = GameConfig {
            movement: MovementMode::Continuous,
            boundary: BoundaryMode::Wrap,
            continuous_speed: 10.0,
            initial_snake_length: 6,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        park_food(&mut session);

        // Each turn is proposed, then frames run until the head changes cell
        for direction in [Direction::Down, Direction::Left, Direction::Up] {
            assert!(session.propose(direction));
            let tick = session.tick();
            while session.tick() == tick && session.phase().is_running() {
                session.update(Duration::from_millis(30));
            }
        }
        assert_eq!(
            session.phase(),
            GamePhase::GameOver(CollisionType::SelfCollision)
        );
    }

    #[test]
    fn test_continuous_segments_stay_adjacent() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let config = GameConfig {
            movement: MovementMode::Continuous,
            boundary: BoundaryMode::Wrap,
            continuous_speed: 9.0,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        let grid = session.grid();
        let mut rng = StdRng::seed_from_u64(5);

        // Neighbouring cells, counting the wrap seam
        let adjacent = |a: Position, b: Position| {
            let dx = (a.x - b.x).rem_euclid(grid.width as i32);
            let dy = (a.y - b.y).rem_euclid(grid.height as i32);
            let dx = dx.min(grid.width as i32 - dx);
            let dy = dy.min(grid.height as i32 - dy);
            dx + dy == 1
        };

        for _ in 0..3000 {
            if session.phase().is_game_over() {
                session.reset();
                session.start();
                session.update(Duration::ZERO);
            }
            let before = session.round().unwrap().snake.direction;
            if rng.gen_bool(0.2) {
                session.propose(Direction::ALL[rng.gen_range(0..4)]);
            }
            session.update(Duration::from_millis(16));

            if session.phase().is_running() {
                let snake = &session.round().unwrap().snake;
                assert!(!before.is_opposite(snake.direction));
                for pair in snake.body.windows(2) {
                    assert!(adjacent(pair[0], pair[1]), "gap between {:?}", pair);
                }
            }
        }
    }

    #[test]
    fn test_reset_discards_round_and_pending_turn() {
        let mut session = running_session(GameConfig::default());
        session.propose(Direction::Up);

        assert!(session.reset());
        assert_eq!(session.phase(), GamePhase::Idle);
        assert!(session.round().is_none());
        assert_eq!(session.score(), 0);

        session.start();
        session.update(Duration::ZERO);
        park_food(&mut session);
        session.update(TICK);
        assert_eq!(session.round().unwrap().snake.direction, Direction::Right);
    }

    #[test]
    fn test_internal_failure_resets_to_idle() {
        let mut session = running_session(GameConfig::default());
        session.round_mut().unwrap().snake.body.clear();

        session.update(TICK);
        assert_eq!(session.phase(), GamePhase::Idle);
        assert!(session.round().is_none());
        assert!(session.take_events().contains(&GameEvent::Aborted));
    }

    #[test]
    fn test_missing_food_is_respawned() {
        let mut session = running_session(GameConfig::default());
        session.round_mut().unwrap().food = None;

        session.update(TICK);
        let round = session.round().unwrap();
        let food = round.food.as_ref().expect("maintenance pass spawns food");
        assert!(!round.obstacles.contains(food.position));
    }

    #[test]
    fn test_failed_high_score_write_keeps_session_state() {
        let config = GameConfig {
            countdown_secs: 0,
            ..GameConfig::default()
        };
        let mut session = GameSession::with_seed(config, Box::new(MemoryStore::failing()), 9);
        session.start();
        session.update(Duration::ZERO);
        let round = session.round_mut().unwrap();
        let ahead = round.snake.head().moved_in_direction(round.snake.direction);
        round.food = Some(Food::new(ahead, apple(20)));

        session.update(TICK);
        assert_eq!(session.score(), 20);
        assert_eq!(session.high_score(), 20);
        assert_eq!(session.phase(), GamePhase::Running);
    }

    #[test]
    fn test_continuous_session_eats_on_cell_change() {
        let config = GameConfig {
            movement: MovementMode::Continuous,
            boundary: BoundaryMode::Wrap,
            continuous_speed: 10.0,
            ..GameConfig::default()
        };
        let mut session = running_session(config);
        let round = session.round_mut().unwrap();
        let ahead = round.snake.head().moved_in_direction(round.snake.direction);
        round.food = Some(Food::new(ahead, apple(10)));

        // 0.25 cells per frame: the virtual cell changes on the second frame
        session.update(Duration::from_millis(25));
        assert_eq!(session.score(), 0);
        session.update(Duration::from_millis(25));
        assert_eq!(session.score(), 10);
        assert_eq!(session.tick(), 1);
    }
}
