use crate::board_state::BoardState;
use taskboard_core::TaskboardResult;

pub mod task_commands;

pub use task_commands::*;

/// A state transition of the board.
///
/// Commands carry everything they need, so the same value can be applied
/// optimistically, logged, and kept alongside the snapshot it may be undone to.
pub trait BoardCommand: Send + Sync + std::fmt::Debug {
    /// Apply this command to the board
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}
