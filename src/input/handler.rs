use crate::game::{Command, Difficulty, Direction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    GameCommand(Command),
    /// Print the current snapshot
    Status,
    Quit,
    None,
}

/// Maps console words to game commands
pub struct InputHandler;

impl InputHandler {
    pub fn new() -> Self {
        Self
    }

    /// Map every whitespace separated token on a line, skipping unknown ones
    pub fn handle_line(&self, line: &str) -> Vec<InputAction> {
        line.split_whitespace()
            .map(|token| self.handle_token(token))
            .filter(|action| *action != InputAction::None)
            .collect()
    }

    pub fn handle_token(&self, token: &str) -> InputAction {
        match token.to_ascii_lowercase().as_str() {
            // Movement - WASD and words
            "w" | "up" => InputAction::GameCommand(Command::Propose(Direction::Up)),
            "s" | "down" => InputAction::GameCommand(Command::Propose(Direction::Down)),
            "a" | "left" => InputAction::GameCommand(Command::Propose(Direction::Left)),
            "d" | "right" => InputAction::GameCommand(Command::Propose(Direction::Right)),

            // Controls
            "start" | "go" => InputAction::GameCommand(Command::Start),
            "p" | "pause" => InputAction::GameCommand(Command::TogglePause),
            "resume" => InputAction::GameCommand(Command::Resume),
            "r" | "reset" | "restart" => InputAction::GameCommand(Command::Reset),
            "easy" => InputAction::GameCommand(Command::SetDifficulty(Difficulty::Easy)),
            "normal" => InputAction::GameCommand(Command::SetDifficulty(Difficulty::Normal)),
            "hard" => InputAction::GameCommand(Command::SetDifficulty(Difficulty::Hard)),
            "status" | "?" => InputAction::Status,
            "q" | "quit" | "exit" => InputAction::Quit,

            _ => InputAction::None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}
