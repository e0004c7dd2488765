//! End-to-end rounds driven through the public session API

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;
use tempfile::TempDir;

use snake_engine::game::{
    BoundaryMode, CollisionType, Direction, Food, FoodType, GameConfig, GameEvent, GamePhase,
    GameSession, Position,
};
use snake_engine::persistence::{HighScoreStore, JsonFileStore, MemoryStore};

const TICK: Duration = Duration::from_millis(125);

fn start_running(session: &mut GameSession) {
    assert!(session.start());
    session.update(Duration::ZERO);
    assert_eq!(session.phase(), GamePhase::Running);
}

fn running_session(config: GameConfig, store: Box<dyn HighScoreStore>) -> GameSession {
    let config = GameConfig {
        countdown_secs: 0,
        ..config
    };
    let mut session = GameSession::with_seed(config, store, 2024);
    start_running(&mut session);
    session
}

fn food(points: u32) -> FoodType {
    FoodType::new("test", "white", points, 1)
}

fn cell_ahead(session: &GameSession) -> Position {
    let snake = &session.round().unwrap().snake;
    snake.head().moved_in_direction(snake.direction)
}

#[test]
fn wrap_run_stays_in_bounds_without_collision() {
    let config = GameConfig {
        grid_width: 10,
        grid_height: 10,
        initial_snake_length: 5,
        boundary: BoundaryMode::Wrap,
        ..GameConfig::default()
    };
    let mut session = running_session(config, Box::new(MemoryStore::default()));
    let grid = session.grid();
    session.round_mut().unwrap().food = Some(Food::new(Position::new(0, 0), food(10)));

    for _ in 0..100 {
        session.update(TICK);
        assert_eq!(session.phase(), GamePhase::Running);
        let snake = &session.round().unwrap().snake;
        assert!(grid.contains(snake.head()));
        assert_eq!(snake.len(), 5);
    }
    assert_eq!(session.tick(), 100);
    assert_eq!(session.score(), 0);
}

#[test]
fn eating_scores_grows_and_respawns_food() {
    let config = GameConfig {
        obstacles_enabled: true,
        initial_obstacles: 6,
        obstacle_probability: 0.0,
        ..GameConfig::default()
    };
    let mut session = running_session(config, Box::new(MemoryStore::default()));
    let ahead = cell_ahead(&session);
    let length = session.round().unwrap().snake.len();
    session.round_mut().unwrap().food = Some(Food::new(ahead, food(10)));

    session.update(TICK);

    assert_eq!(session.phase(), GamePhase::Running);
    assert_eq!(session.score(), 10);
    let round = session.round().unwrap();
    assert_eq!(round.snake.len(), length + 1);
    assert_eq!(round.snake.head(), ahead);

    let next = round.food.as_ref().expect("food respawned after eating");
    assert!(!round.snake.contains(next.position));
    assert!(!round.obstacles.contains(next.position));
    assert!(session.take_events().contains(&GameEvent::FoodEaten { points: 10 }));
}

#[test]
fn obstacle_ahead_ends_game_without_score() {
    let config = GameConfig {
        obstacles_enabled: true,
        initial_obstacles: 0,
        obstacle_probability: 0.0,
        ..GameConfig::default()
    };
    let mut session = running_session(config, Box::new(MemoryStore::default()));
    let ahead = cell_ahead(&session);
    let round = session.round_mut().unwrap();
    round.food = Some(Food::new(Position::new(0, 0), food(10)));
    round.obstacles.push(ahead, 20);

    session.update(TICK);

    assert_eq!(session.phase(), GamePhase::GameOver(CollisionType::Obstacle));
    assert_eq!(session.score(), 0);

    // Nothing moves after game over
    let frozen = session.snapshot();
    session.update(TICK);
    assert_eq!(session.snapshot(), frozen);
}

#[test]
fn new_high_score_is_announced_once_and_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("save.json");
    let mut session = running_session(
        GameConfig::default(),
        Box::new(JsonFileStore::new(&path)),
    );
    assert_eq!(session.high_score(), 0);

    let ahead = cell_ahead(&session);
    session.round_mut().unwrap().food = Some(Food::new(ahead, food(50)));
    session.update(TICK);
    assert_eq!(session.score(), 50);

    let ahead = cell_ahead(&session);
    let round = session.round_mut().unwrap();
    round.food = Some(Food::new(Position::new(0, 0), food(10)));
    round.obstacles.push(ahead, 20);
    session.update(TICK);
    assert_eq!(session.phase(), GamePhase::GameOver(CollisionType::Obstacle));

    let events = session.take_events();
    let announced: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, GameEvent::HighScoreUpdated { .. }))
        .collect();
    assert_eq!(announced, vec![&GameEvent::HighScoreUpdated { high_score: 50 }]);
    assert!(events.contains(&GameEvent::GameOver {
        reason: CollisionType::Obstacle,
        final_score: 50,
    }));

    assert_eq!(JsonFileStore::new(&path).load_high_score(), 50);
}

#[test]
fn random_play_never_reverses_and_stays_in_bounds() {
    let config = GameConfig {
        grid_width: 10,
        grid_height: 10,
        boundary: BoundaryMode::Wrap,
        ..GameConfig::default()
    };
    let mut session = running_session(config, Box::new(MemoryStore::default()));
    let grid = session.grid();
    let mut rng = StdRng::seed_from_u64(99);

    for _ in 0..2000 {
        if session.phase().is_game_over() {
            assert!(session.reset());
            start_running(&mut session);
        }

        let before = session.round().unwrap().snake.direction;
        for _ in 0..rng.gen_range(0..3) {
            let proposal = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            session.propose(proposal);
        }
        session.update(TICK);

        if session.phase() == GamePhase::Running {
            let snake = &session.round().unwrap().snake;
            assert!(!before.is_opposite(snake.direction));
            assert!(grid.contains(snake.head()));
        }
    }
}

#[test]
fn high_score_survives_into_next_session() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("save.json");

    let mut session = running_session(
        GameConfig::default(),
        Box::new(JsonFileStore::new(&path)),
    );
    let ahead = cell_ahead(&session);
    session.round_mut().unwrap().food = Some(Food::new(ahead, food(30)));
    session.update(TICK);
    assert!(session.reset());

    let next = GameSession::new(GameConfig::default(), Box::new(JsonFileStore::new(&path)));
    assert_eq!(next.high_score(), 30);
    assert_eq!(next.score(), 0);
}
