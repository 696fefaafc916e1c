//! Point-in-time copy of the board.
//!
//! A snapshot is taken immediately before an optimistic mutation and kept only
//! while the matching request is in flight: dropped on success, restored on
//! failure. It can only be read or restored, never edited.

use crate::board_state::BoardState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardSnapshot {
    state: BoardState,
}

impl BoardSnapshot {
    pub fn capture(board: &BoardState) -> Self {
        Self {
            state: board.clone(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    /// Overwrite `board` with the captured state.
    pub fn restore_into(&self, board: &mut BoardState) {
        *board = self.state.clone();
    }

    pub fn into_state(self) -> BoardState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnId, Task, TaskId};

    #[test]
    fn test_restore_is_exact() {
        let mut board = BoardState::new();
        board.upsert_task(Task::new(TaskId::from("1"), "One"));
        board.upsert_task(Task::new(TaskId::from("2"), "Two"));
        let snapshot = board.snapshot();

        board.move_task(&TaskId::from("1"), ColumnId::ToDo, ColumnId::Done, 0);
        board.cancel_task(&TaskId::from("2"));
        assert_ne!(&board, snapshot.state());

        snapshot.restore_into(&mut board);
        assert_eq!(&board, snapshot.state());
    }
}
