//! What the user asked for, and what gets sent to the store because of it.

use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_domain::{ColumnId, StatusName, Task, TaskDraft, TaskId};

/// A user-level request to change the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Create(TaskDraft),
    Edit {
        task_id: TaskId,
        draft: TaskDraft,
    },
    /// Move a visible task to another column (keyboard or CLI move)
    ChangeStatus {
        task_id: TaskId,
        to: ColumnId,
    },
    /// Local-only: ordering within a column is not stored
    Reorder {
        column: ColumnId,
        old_index: usize,
        new_index: usize,
    },
    Cancel {
        task_id: TaskId,
    },
    Delete {
        task_id: TaskId,
    },
    Resume {
        task_id: TaskId,
    },
    ToggleChecklistItem {
        task_id: TaskId,
        index: usize,
    },
}

/// Correlates a request with its completion. Issued in increasing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The store call backing one optimistic mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOperation {
    Create { temp_id: TaskId, draft: TaskDraft },
    UpdateContent { task_id: TaskId, draft: TaskDraft },
    UpdateStatus { task_id: TaskId, status: StatusName },
    Delete { task_id: TaskId },
}

impl SyncOperation {
    pub fn task_id(&self) -> &TaskId {
        match self {
            SyncOperation::Create { temp_id, .. } => temp_id,
            SyncOperation::UpdateContent { task_id, .. }
            | SyncOperation::UpdateStatus { task_id, .. }
            | SyncOperation::Delete { task_id } => task_id,
        }
    }

    pub fn aspect(&self) -> TaskAspect {
        match self {
            SyncOperation::UpdateContent { .. } => TaskAspect::Content,
            SyncOperation::Create { .. }
            | SyncOperation::UpdateStatus { .. }
            | SyncOperation::Delete { .. } => TaskAspect::Placement,
        }
    }
}

/// The part of a task a request changes. A failed request only reverts its
/// own aspect, and only a newer request on the same aspect supersedes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAspect {
    /// Title, description and due date
    Content,
    /// Column and position, canceled or gone
    Placement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub token: RequestToken,
    pub operation: SyncOperation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncResponse {
    Created(Task),
    Updated(Task),
    Ack,
}

/// How a completion was folded into the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The store accepted the change; the optimistic state stands
    Committed,
    /// The store rejected the change and the board was reverted
    RolledBack { reason: String },
    /// The failure was superseded by a newer request changing the same
    /// aspect of the task
    Discarded { reason: String },
    /// No request with that token is in flight
    Unknown,
}

impl Resolution {
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Resolution::RolledBack { .. })
    }
}
