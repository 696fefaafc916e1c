use super::BoardCommand;
use crate::board_state::{BoardColumns, BoardState};
use crate::snapshot::BoardSnapshot;
use crate::status::ColumnId;
use crate::task::{Task, TaskId};
use taskboard_core::TaskboardResult;

/// Replace the visible columns with freshly fetched data
#[derive(Debug, Clone)]
pub struct LoadBoard {
    pub columns: BoardColumns,
}

impl BoardCommand for LoadBoard {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.load(self.columns.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Load board with {} tasks", self.columns.task_count())
    }
}

/// Replace the canceled bucket with freshly fetched data
#[derive(Debug, Clone)]
pub struct LoadCanceled {
    pub tasks: Vec<Task>,
}

impl BoardCommand for LoadCanceled {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.load_canceled(self.tasks.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Load {} canceled tasks", self.tasks.len())
    }
}

/// Move a task to another column (or another index of the same column)
#[derive(Debug, Clone)]
pub struct MoveTask {
    pub task_id: TaskId,
    pub from: ColumnId,
    pub to: ColumnId,
    pub target_index: usize,
}

impl BoardCommand for MoveTask {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.move_task(&self.task_id, self.from, self.to, self.target_index);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Move task {} from {} to {} at {}",
            self.task_id, self.from, self.to, self.target_index
        )
    }
}

/// Change a task's index within one column
#[derive(Debug, Clone)]
pub struct ReorderTask {
    pub column: ColumnId,
    pub from_index: usize,
    pub to_index: usize,
}

impl BoardCommand for ReorderTask {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.reorder_task(self.column, self.from_index, self.to_index);
        Ok(())
    }

    fn description(&self) -> String {
        format!(
            "Reorder {} from {} to {}",
            self.column, self.from_index, self.to_index
        )
    }
}

/// Insert a task, or replace it in place when already present
#[derive(Debug, Clone)]
pub struct UpsertTask {
    pub task: Task,
}

impl BoardCommand for UpsertTask {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.upsert_task(self.task.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Upsert task {}: '{}'", self.task.id, self.task.title)
    }
}

/// Remove a task from whichever sequence holds it
#[derive(Debug, Clone)]
pub struct RemoveTask {
    pub task_id: TaskId,
}

impl BoardCommand for RemoveTask {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.remove_task(&self.task_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Remove task {}", self.task_id)
    }
}

/// Hide a task in the canceled bucket
#[derive(Debug, Clone)]
pub struct CancelTask {
    pub task_id: TaskId,
}

impl BoardCommand for CancelTask {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.cancel_task(&self.task_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Cancel task {}", self.task_id)
    }
}

/// Return a canceled task to the end of ToDo
#[derive(Debug, Clone)]
pub struct ResumeTask {
    pub task_id: TaskId,
}

impl BoardCommand for ResumeTask {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.resume_task(&self.task_id);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Resume task {}", self.task_id)
    }
}

/// Swap a temporary id for the one assigned by the store
#[derive(Debug, Clone)]
pub struct ReplaceTaskId {
    pub old_id: TaskId,
    pub task: Task,
}

impl BoardCommand for ReplaceTaskId {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.replace_task_id(&self.old_id, self.task.clone());
        Ok(())
    }

    fn description(&self) -> String {
        format!("Replace task id {} with {}", self.old_id, self.task.id)
    }
}

/// Put the listed tasks back where a snapshot had them
#[derive(Debug, Clone)]
pub struct RestoreTasks {
    pub task_ids: Vec<TaskId>,
    pub snapshot: BoardSnapshot,
}

impl BoardCommand for RestoreTasks {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        for task_id in &self.task_ids {
            board.restore_task_from(task_id, &self.snapshot);
        }
        Ok(())
    }

    fn description(&self) -> String {
        let ids: Vec<String> = self.task_ids.iter().map(|id| id.to_string()).collect();
        format!("Restore tasks [{}] from snapshot", ids.join(", "))
    }
}

/// Put a task back in the column and position a snapshot had it at
#[derive(Debug, Clone)]
pub struct RestorePlacement {
    pub task_id: TaskId,
    pub snapshot: BoardSnapshot,
}

impl BoardCommand for RestorePlacement {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.restore_placement_from(&self.task_id, &self.snapshot);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Restore placement of task {}", self.task_id)
    }
}

/// Put back the title, description and due date a snapshot had for a task
#[derive(Debug, Clone)]
pub struct RestoreContent {
    pub task_id: TaskId,
    pub snapshot: BoardSnapshot,
}

impl BoardCommand for RestoreContent {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        board.restore_content_from(&self.task_id, &self.snapshot);
        Ok(())
    }

    fn description(&self) -> String {
        format!("Restore content of task {}", self.task_id)
    }
}

/// Overwrite the whole board with a snapshot
#[derive(Debug, Clone)]
pub struct RestoreSnapshot {
    pub snapshot: BoardSnapshot,
}

impl BoardCommand for RestoreSnapshot {
    fn execute(&self, board: &mut BoardState) -> TaskboardResult<()> {
        self.snapshot.restore_into(board);
        Ok(())
    }

    fn description(&self) -> String {
        "Restore board snapshot".to_string()
    }
}
