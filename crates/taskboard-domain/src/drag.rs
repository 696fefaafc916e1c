//! Drag gesture state machine.
//!
//! A gesture starts on one task, reflows the board live while the pointer
//! moves, and ends either in a drop (which may emit one [`DragIntent`]) or in a
//! cancellation (which puts the task back where it started). The controller
//! only ever moves the dragged task, so putting that one task back is enough
//! to undo a gesture even if other tasks changed meanwhile.

use crate::board_state::{BoardState, TaskLocation};
use crate::commands::{MoveTask, ReorderTask, RestoreTasks};
use crate::snapshot::BoardSnapshot;
use crate::status::ColumnId;
use crate::task::TaskId;
use taskboard_core::{TaskboardError, TaskboardResult};

/// What the pointer is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Another task; the dragged task takes that task's current index.
    Task(TaskId),
    /// A column's empty area; targets the end of the column.
    Column(ColumnId),
}

/// Terminal decision of a gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragIntent {
    StatusChange {
        task_id: TaskId,
        from: ColumnId,
        to: ColumnId,
    },
    Reorder {
        column: ColumnId,
        old_index: usize,
        new_index: usize,
    },
}

/// A completed gesture: the intent plus the board as it was at gesture start.
#[derive(Debug, Clone)]
pub struct DragOutcome {
    pub task_id: TaskId,
    pub intent: DragIntent,
    pub origin: BoardSnapshot,
}

#[derive(Debug, Clone)]
struct DragSession {
    task_id: TaskId,
    initial_column: ColumnId,
    initial_index: usize,
    origin: BoardSnapshot,
    last_target: Option<DropTarget>,
}

#[derive(Debug, Clone, Default)]
enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active_task(&self) -> Option<&TaskId> {
        match &self.state {
            DragState::Dragging(session) => Some(&session.task_id),
            DragState::Idle => None,
        }
    }

    pub fn initial_column(&self) -> Option<ColumnId> {
        match &self.state {
            DragState::Dragging(session) => Some(session.initial_column),
            DragState::Idle => None,
        }
    }

    pub fn start(&mut self, board: &BoardState, task_id: &TaskId) -> TaskboardResult<()> {
        if self.is_dragging() {
            return Err(TaskboardError::Validation(
                "a drag gesture is already in progress".to_string(),
            ));
        }
        let Some(TaskLocation::Column { column, index }) = board.locate(task_id) else {
            return Err(TaskboardError::NotFound(format!(
                "task {} is not on the board",
                task_id
            )));
        };
        self.state = DragState::Dragging(DragSession {
            task_id: task_id.clone(),
            initial_column: column,
            initial_index: index,
            origin: board.snapshot(),
            last_target: None,
        });
        Ok(())
    }

    /// Preview a drop at `target`. Repeated reports of the same target are
    /// ignored so the preview does not oscillate. Returns whether the board
    /// changed.
    pub fn hover(&mut self, board: &mut BoardState, target: &DropTarget) -> TaskboardResult<bool> {
        let DragState::Dragging(session) = &mut self.state else {
            return Ok(false);
        };
        if session.last_target.as_ref() == Some(target) {
            return Ok(false);
        }
        session.last_target = Some(target.clone());
        let task_id = session.task_id.clone();
        let Some(TaskLocation::Column { column, index }) = board.locate(&task_id) else {
            return Ok(false);
        };

        let (target_column, target_index) = match target {
            DropTarget::Task(over) if over == &task_id => return Ok(false),
            DropTarget::Task(over) => match board.locate(over) {
                Some(TaskLocation::Column {
                    column: over_column,
                    index: over_index,
                }) => (over_column, over_index),
                _ => return Ok(false),
            },
            DropTarget::Column(over_column) => {
                let len = board.column(*over_column).len();
                if *over_column == column {
                    (column, len.saturating_sub(1))
                } else {
                    (*over_column, len)
                }
            }
        };

        if target_column != column {
            board.apply(&MoveTask {
                task_id,
                from: column,
                to: target_column,
                target_index,
            })?;
            Ok(true)
        } else if target_index != index {
            board.apply(&ReorderTask {
                column,
                from_index: index,
                to_index: target_index,
            })?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Keyboard-driven step. Unlike pointer hovers every call is deliberate,
    /// so repeating the previous target applies it again.
    pub fn nudge(&mut self, board: &mut BoardState, target: &DropTarget) -> TaskboardResult<bool> {
        if let DragState::Dragging(session) = &mut self.state {
            session.last_target = None;
        }
        self.hover(board, target)
    }

    /// End the gesture. `None` means the pointer was released outside any
    /// valid target and is handled as a cancellation.
    pub fn release(
        &mut self,
        board: &mut BoardState,
        target: Option<&DropTarget>,
    ) -> TaskboardResult<Option<DragOutcome>> {
        let Some(target) = target else {
            self.cancel(board)?;
            return Ok(None);
        };
        self.hover(board, target)?;

        let DragState::Dragging(session) = std::mem::take(&mut self.state) else {
            return Ok(None);
        };
        let Some(TaskLocation::Column { column, index }) = board.locate(&session.task_id) else {
            return Ok(None);
        };

        let intent = if column != session.initial_column {
            DragIntent::StatusChange {
                task_id: session.task_id.clone(),
                from: session.initial_column,
                to: column,
            }
        } else if index != session.initial_index {
            DragIntent::Reorder {
                column,
                old_index: session.initial_index,
                new_index: index,
            }
        } else {
            return Ok(None);
        };

        Ok(Some(DragOutcome {
            task_id: session.task_id,
            intent,
            origin: session.origin,
        }))
    }

    /// Abort the gesture and put the dragged task back where it started.
    pub fn cancel(&mut self, board: &mut BoardState) -> TaskboardResult<()> {
        if let DragState::Dragging(session) = std::mem::take(&mut self.state) {
            if board.contains(&session.task_id) {
                board.apply(&RestoreTasks {
                    task_ids: vec![session.task_id],
                    snapshot: session.origin,
                })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoardColumns, Task};

    fn board(todo: &[&str], doing: &[&str]) -> BoardState {
        BoardState::from_columns(BoardColumns {
            todo: todo.iter().map(|id| Task::new(TaskId::from(*id), *id)).collect(),
            doing: doing.iter().map(|id| Task::new(TaskId::from(*id), *id)).collect(),
            done: vec![],
        })
    }

    #[test]
    fn test_start_requires_visible_task() {
        let board = board(&["1"], &[]);
        let mut drag = DragController::new();
        assert!(drag.start(&board, &TaskId::from("9")).is_err());
        assert!(!drag.is_dragging());

        drag.start(&board, &TaskId::from("1")).unwrap();
        assert!(drag.start(&board, &TaskId::from("1")).is_err());
        assert_eq!(drag.initial_column(), Some(ColumnId::ToDo));
    }

    #[test]
    fn test_hover_over_self_does_nothing() {
        let mut board = board(&["1", "2"], &[]);
        let mut drag = DragController::new();
        drag.start(&board, &TaskId::from("1")).unwrap();
        let changed = drag
            .hover(&mut board, &DropTarget::Task(TaskId::from("1")))
            .unwrap();
        assert!(!changed);
    }

    #[test]
    fn test_release_without_movement_emits_nothing() {
        let mut board = board(&["1", "2"], &[]);
        let mut drag = DragController::new();
        drag.start(&board, &TaskId::from("2")).unwrap();
        let outcome = drag
            .release(&mut board, Some(&DropTarget::Column(ColumnId::ToDo)))
            .unwrap();
        assert!(outcome.is_none());
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_nudge_repeats_same_target() {
        let mut board = board(&["a", "b", "c"], &[]);
        let mut drag = DragController::new();
        drag.start(&board, &TaskId::from("a")).unwrap();

        let b = DropTarget::Task(TaskId::from("b"));
        assert!(drag.nudge(&mut board, &b).unwrap());
        assert!(!drag.hover(&mut board, &b).unwrap());
        assert!(drag.nudge(&mut board, &b).unwrap());
        let order: Vec<&str> = board
            .column(ColumnId::ToDo)
            .iter()
            .map(|t| t.id.as_str())
            .collect();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_hover_when_idle_is_ignored() {
        let mut board = board(&["1"], &[]);
        let mut drag = DragController::new();
        let changed = drag
            .hover(&mut board, &DropTarget::Column(ColumnId::Done))
            .unwrap();
        assert!(!changed);
        assert_eq!(board.column(ColumnId::ToDo).len(), 1);
    }
}
