pub mod console;
pub mod simulate;

pub use console::ConsoleMode;
pub use simulate::{GameResult, SimulateConfig, SimulateMode};
