//! In-memory board: tasks grouped by column, plus the hidden canceled bucket.
//!
//! Every task id lives in exactly one sequence (one of the three visible
//! columns or the canceled bucket). The operations here preserve that; callers
//! that want the invariant checked on every step go through
//! [`BoardState::apply`].

use crate::commands::BoardCommand;
use crate::snapshot::BoardSnapshot;
use crate::status::ColumnId;
use crate::task::{Task, TaskId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use taskboard_core::{TaskboardError, TaskboardResult};

/// Tasks of the visible columns, in display order.
///
/// This is also the wire shape of a board fetch: `{"ToDo":[..],"Doing":[..],"Done":[..]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardColumns {
    #[serde(rename = "ToDo", default)]
    pub todo: Vec<Task>,
    #[serde(rename = "Doing", default)]
    pub doing: Vec<Task>,
    #[serde(rename = "Done", default)]
    pub done: Vec<Task>,
}

impl BoardColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: ColumnId) -> &Vec<Task> {
        match column {
            ColumnId::ToDo => &self.todo,
            ColumnId::Doing => &self.doing,
            ColumnId::Done => &self.done,
        }
    }

    pub fn get_mut(&mut self, column: ColumnId) -> &mut Vec<Task> {
        match column {
            ColumnId::ToDo => &mut self.todo,
            ColumnId::Doing => &mut self.doing,
            ColumnId::Done => &mut self.done,
        }
    }

    pub fn push(&mut self, column: ColumnId, task: Task) {
        self.get_mut(column).push(task);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ColumnId, &Vec<Task>)> {
        ColumnId::ALL.into_iter().map(move |c| (c, self.get(c)))
    }

    pub fn task_count(&self) -> usize {
        self.todo.len() + self.doing.len() + self.done.len()
    }
}

/// Where a task currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskLocation {
    Column { column: ColumnId, index: usize },
    Canceled { index: usize },
}

impl TaskLocation {
    pub fn column(self) -> Option<ColumnId> {
        match self {
            TaskLocation::Column { column, .. } => Some(column),
            TaskLocation::Canceled { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardState {
    columns: BoardColumns,
    #[serde(default)]
    canceled: Vec<Task>,
}

impl BoardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_columns(columns: BoardColumns) -> Self {
        Self {
            columns,
            canceled: Vec::new(),
        }
    }

    /// Run a command against the board. All reconciler and controller
    /// mutations come through here.
    pub fn apply(&mut self, command: &dyn BoardCommand) -> TaskboardResult<()> {
        command.execute(self)?;
        debug_assert!(
            self.check_invariants().is_ok(),
            "board invariant broken by: {}",
            command.description()
        );
        Ok(())
    }

    pub fn columns(&self) -> &BoardColumns {
        &self.columns
    }

    pub fn column(&self, column: ColumnId) -> &[Task] {
        self.columns.get(column)
    }

    pub fn canceled(&self) -> &[Task] {
        &self.canceled
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::capture(self)
    }

    /// Replace every visible column. The canceled bucket is left alone.
    pub fn load(&mut self, columns: BoardColumns) {
        self.columns = columns;
        let visible: HashSet<TaskId> = self.visible_ids().cloned().collect();
        self.canceled.retain(|t| !visible.contains(&t.id));
    }

    /// Replace the canceled bucket, e.g. after fetching the canceled view.
    pub fn load_canceled(&mut self, tasks: Vec<Task>) {
        let incoming: HashSet<TaskId> = tasks.iter().map(|t| t.id.clone()).collect();
        for column in ColumnId::ALL {
            self.columns
                .get_mut(column)
                .retain(|t| !incoming.contains(&t.id));
        }
        self.canceled = tasks;
    }

    pub fn locate(&self, task_id: &TaskId) -> Option<TaskLocation> {
        for (column, tasks) in self.columns.iter() {
            if let Some(index) = tasks.iter().position(|t| &t.id == task_id) {
                return Some(TaskLocation::Column { column, index });
            }
        }
        self.canceled
            .iter()
            .position(|t| &t.id == task_id)
            .map(|index| TaskLocation::Canceled { index })
    }

    pub fn find(&self, task_id: &TaskId) -> Option<&Task> {
        match self.locate(task_id)? {
            TaskLocation::Column { column, index } => self.columns.get(column).get(index),
            TaskLocation::Canceled { index } => self.canceled.get(index),
        }
    }

    pub fn contains(&self, task_id: &TaskId) -> bool {
        self.locate(task_id).is_some()
    }

    /// Move a task between columns, inserting at `target_index` clamped to
    /// the destination length. Returns `false` without touching anything
    /// when the task is not in `from`.
    pub fn move_task(
        &mut self,
        task_id: &TaskId,
        from: ColumnId,
        to: ColumnId,
        target_index: usize,
    ) -> bool {
        let source = self.columns.get_mut(from);
        let Some(index) = source.iter().position(|t| &t.id == task_id) else {
            return false;
        };
        let task = source.remove(index);
        let destination = self.columns.get_mut(to);
        let insert_at = target_index.min(destination.len());
        destination.insert(insert_at, task);
        true
    }

    /// Move an element within one column. The moved task ends up at
    /// `to_index` (clamped); tasks in between shift by one.
    pub fn reorder_task(&mut self, column: ColumnId, from_index: usize, to_index: usize) -> bool {
        let tasks = self.columns.get_mut(column);
        if from_index >= tasks.len() {
            return false;
        }
        let task = tasks.remove(from_index);
        let insert_at = to_index.min(tasks.len());
        tasks.insert(insert_at, task);
        true
    }

    /// Replace a task in place (same column, same index), or append it to
    /// `ToDo` when it is not on the board yet.
    pub fn upsert_task(&mut self, task: Task) {
        match self.locate(&task.id) {
            Some(TaskLocation::Column { column, index }) => {
                self.columns.get_mut(column)[index] = task;
            }
            Some(TaskLocation::Canceled { index }) => {
                self.canceled[index] = task;
            }
            None => self.columns.push(ColumnId::ToDo, task),
        }
    }

    pub fn remove_task(&mut self, task_id: &TaskId) -> Option<(Task, TaskLocation)> {
        let location = self.locate(task_id)?;
        let task = match location {
            TaskLocation::Column { column, index } => self.columns.get_mut(column).remove(index),
            TaskLocation::Canceled { index } => self.canceled.remove(index),
        };
        Some((task, location))
    }

    /// Move a visible task into the canceled bucket (newest first).
    pub fn cancel_task(&mut self, task_id: &TaskId) -> bool {
        match self.locate(task_id) {
            Some(TaskLocation::Column { column, index }) => {
                let task = self.columns.get_mut(column).remove(index);
                self.canceled.insert(0, task);
                true
            }
            _ => false,
        }
    }

    /// Move a canceled task back to the end of `ToDo`.
    pub fn resume_task(&mut self, task_id: &TaskId) -> bool {
        match self.locate(task_id) {
            Some(TaskLocation::Canceled { index }) => {
                let task = self.canceled.remove(index);
                self.columns.push(ColumnId::ToDo, task);
                true
            }
            _ => false,
        }
    }

    /// Swap a task for one with a different id, keeping its position. Used
    /// when the store assigns the real id of an optimistically created task.
    pub fn replace_task_id(&mut self, old_id: &TaskId, task: Task) -> bool {
        if &task.id != old_id && self.contains(&task.id) {
            self.remove_task(old_id);
            self.upsert_task(task);
            return true;
        }
        match self.locate(old_id) {
            Some(TaskLocation::Column { column, index }) => {
                self.columns.get_mut(column)[index] = task;
                true
            }
            Some(TaskLocation::Canceled { index }) => {
                self.canceled[index] = task;
                true
            }
            None => false,
        }
    }

    /// Put one task back exactly where `snapshot` had it, leaving every other
    /// task where it is now. A task absent from the snapshot is removed.
    pub fn restore_task_from(&mut self, task_id: &TaskId, snapshot: &BoardSnapshot) {
        self.remove_task(task_id);
        let previous = snapshot.state();
        let Some(location) = previous.locate(task_id) else {
            return;
        };
        let Some(task) = previous.find(task_id).cloned() else {
            return;
        };
        match location {
            TaskLocation::Column { column, index } => {
                let tasks = self.columns.get_mut(column);
                let at = index.min(tasks.len());
                tasks.insert(at, task);
            }
            TaskLocation::Canceled { index } => {
                let at = index.min(self.canceled.len());
                self.canceled.insert(at, task);
            }
        }
    }

    /// Put a task back where `snapshot` had it, keeping its current content.
    pub fn restore_placement_from(&mut self, task_id: &TaskId, snapshot: &BoardSnapshot) {
        let current = self.find(task_id).cloned();
        self.restore_task_from(task_id, snapshot);
        if let Some(current) = current {
            if self.contains(task_id) {
                self.upsert_task(current);
            }
        }
    }

    /// Give a task the content `snapshot` had for it, leaving it where it is.
    pub fn restore_content_from(&mut self, task_id: &TaskId, snapshot: &BoardSnapshot) {
        if !self.contains(task_id) {
            return;
        }
        if let Some(previous) = snapshot.state().find(task_id).cloned() {
            self.upsert_task(previous);
        }
    }

    pub fn visible_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.columns.iter().flat_map(|(_, tasks)| tasks.iter().map(|t| &t.id))
    }

    pub fn task_ids(&self) -> impl Iterator<Item = &TaskId> {
        self.visible_ids().chain(self.canceled.iter().map(|t| &t.id))
    }

    pub fn visible_count(&self) -> usize {
        self.columns.task_count()
    }

    /// Fail if any task id appears in more than one place.
    pub fn check_invariants(&self) -> TaskboardResult<()> {
        let mut seen = HashSet::new();
        for id in self.task_ids() {
            if !seen.insert(id) {
                return Err(TaskboardError::Internal(format!(
                    "task {} appears more than once on the board",
                    id
                )));
            }
        }
        Ok(())
    }
}
