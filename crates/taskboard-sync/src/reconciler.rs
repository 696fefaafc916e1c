//! Optimistic mutations and their reconciliation with the store.
//!
//! The reconciler owns the [`BoardState`]. Every user intent is applied to the
//! board immediately and, unless it is local-only, turned into a
//! [`SyncRequest`] for the caller to send. The caller reports the outcome with
//! [`Reconciler::complete`]; failures revert the board. No I/O happens here.
//!
//! Every request changes one [`TaskAspect`] of its task: the content or the
//! placement. Rollback rules for a failed request:
//!
//! * nothing else touched the board since the mutation: the whole snapshot is
//!   restored, so the board equals the pre-mutation state exactly;
//! * a newer request changing the same aspect of the task is still in flight:
//!   the failure is stale and dropped, and the newer request inherits the
//!   older snapshot so its own failure would revert both;
//! * otherwise only the failed aspect of the affected tasks goes back to the
//!   snapshot, leaving later mutations of the other aspect alone.

use crate::intent::{
    Intent, RequestToken, Resolution, SyncOperation, SyncRequest, SyncResponse, TaskAspect,
};
use std::collections::BTreeMap;
use std::ops::Bound;
use taskboard_core::{SyncLog, TaskboardError, TaskboardResult};
use taskboard_domain::checklist;
use taskboard_domain::commands::{
    BoardCommand, CancelTask, LoadBoard, LoadCanceled, MoveTask, RemoveTask, ReorderTask,
    ReplaceTaskId, RestoreContent, RestorePlacement, RestoreSnapshot, RestoreTasks, ResumeTask,
    UpsertTask,
};
use taskboard_domain::{
    BoardColumns, BoardSnapshot, BoardState, ColumnId, DragIntent, DragOutcome, StatusName, Task,
    TaskDraft, TaskId, TaskLocation,
};

/// An applied optimistic mutation waiting for the store's answer.
#[derive(Debug)]
pub struct PendingMutation {
    pub forward: Box<dyn BoardCommand>,
    pub snapshot: BoardSnapshot,
    task_ids: Vec<TaskId>,
    temp_id: Option<TaskId>,
    aspect: TaskAspect,
    generation: u64,
}

impl PendingMutation {
    pub fn task_ids(&self) -> &[TaskId] {
        &self.task_ids
    }

    pub fn aspect(&self) -> TaskAspect {
        self.aspect
    }

    /// Undo `aspect` of `task_id` in this mutation's snapshot.
    fn revert_snapshot(&mut self, task_id: &TaskId, aspect: TaskAspect, to: &BoardSnapshot) {
        let mut state = self.snapshot.state().clone();
        match aspect {
            TaskAspect::Placement => state.restore_placement_from(task_id, to),
            TaskAspect::Content => state.restore_content_from(task_id, to),
        }
        self.snapshot = BoardSnapshot::capture(&state);
    }
}

#[derive(Debug)]
pub struct Reconciler {
    board: BoardState,
    authenticated: bool,
    pending: BTreeMap<RequestToken, PendingMutation>,
    next_token: u64,
    /// Bumped on every change to the board
    generation: u64,
    log: SyncLog,
}

impl Reconciler {
    pub fn new(authenticated: bool) -> Self {
        Self {
            board: BoardState::new(),
            authenticated,
            pending: BTreeMap::new(),
            next_token: 0,
            generation: 0,
            log: SyncLog::new(),
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn log(&self) -> &SyncLog {
        &self.log
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self, token: RequestToken) -> Option<&PendingMutation> {
        self.pending.get(&token)
    }

    pub fn has_pending(&self, task_id: &TaskId) -> bool {
        self.pending.values().any(|p| p.task_ids.contains(task_id))
    }

    /// Replace the visible columns with fetched data, then replay the
    /// mutations still in flight so they stay visible. Tasks with a request
    /// in flight that the fetched data does not mention stay in their column.
    pub fn load_board(&mut self, mut columns: BoardColumns) -> TaskboardResult<()> {
        let mut kept = Vec::new();
        for column in ColumnId::ALL {
            for task in self.board.column(column) {
                let listed = columns
                    .iter()
                    .any(|(_, tasks)| tasks.iter().any(|t| t.id == task.id));
                if !listed && self.has_pending(&task.id) {
                    kept.push((column, task.clone()));
                }
            }
        }
        for (column, task) in kept {
            columns.push(column, task);
        }
        self.board.apply(&LoadBoard { columns })?;
        self.replay_pending()
    }

    /// Replace the canceled bucket with fetched data. Tasks canceled by a
    /// request still in flight stay at the front.
    pub fn load_canceled(&mut self, mut tasks: Vec<Task>) -> TaskboardResult<()> {
        let kept: Vec<Task> = self
            .board
            .canceled()
            .iter()
            .filter(|t| self.has_pending(&t.id) && !tasks.iter().any(|x| x.id == t.id))
            .cloned()
            .collect();
        tasks.splice(0..0, kept);
        self.board.apply(&LoadCanceled { tasks })?;
        self.replay_pending()
    }

    fn replay_pending(&mut self) -> TaskboardResult<()> {
        for pending in self.pending.values() {
            self.board.apply(pending.forward.as_ref())?;
        }
        self.generation += 1;
        Ok(())
    }

    /// Give a drag preview mutable access to the board.
    pub fn preview<R>(&mut self, f: impl FnOnce(&mut BoardState) -> R) -> R {
        self.generation += 1;
        f(&mut self.board)
    }

    fn ensure_authenticated(&self) -> TaskboardResult<()> {
        if self.authenticated {
            Ok(())
        } else {
            Err(TaskboardError::Unauthorized)
        }
    }

    /// Look up a task that the store already knows about.
    fn synced_task(&self, task_id: &TaskId) -> TaskboardResult<(Task, TaskLocation)> {
        let location = self
            .board
            .locate(task_id)
            .ok_or_else(|| TaskboardError::NotFound(format!("Task {} not found", task_id)))?;
        if task_id.is_temporary() {
            return Err(TaskboardError::Validation(format!(
                "Task {} is still being saved",
                task_id
            )));
        }
        let task = self
            .board
            .find(task_id)
            .cloned()
            .ok_or_else(|| TaskboardError::NotFound(format!("Task {} not found", task_id)))?;
        Ok((task, location))
    }

    /// Apply an intent optimistically. Returns the request to send, or `None`
    /// when nothing needs to reach the store. Unauthenticated and invalid
    /// intents fail here without touching the board.
    pub fn begin(&mut self, intent: Intent) -> TaskboardResult<Option<SyncRequest>> {
        self.ensure_authenticated()?;

        match intent {
            Intent::Create(draft) => {
                let draft = draft.validate()?;
                let temp_id = TaskId::temporary();
                let task = Task::from_draft(temp_id.clone(), draft.clone());
                self.mutate(
                    Box::new(UpsertTask { task }),
                    SyncOperation::Create { temp_id, draft },
                )
                .map(Some)
            }
            Intent::Edit { task_id, draft } => self.begin_edit(task_id, draft).map(Some),
            Intent::ChangeStatus { task_id, to } => {
                let (_, location) = self.synced_task(&task_id)?;
                let from = location.column().ok_or_else(|| {
                    TaskboardError::Validation(format!(
                        "Task {} is canceled; resume it first",
                        task_id
                    ))
                })?;
                if from == to {
                    return Ok(None);
                }
                let target_index = self.board.column(to).len();
                self.mutate(
                    Box::new(MoveTask {
                        task_id: task_id.clone(),
                        from,
                        to,
                        target_index,
                    }),
                    SyncOperation::UpdateStatus {
                        task_id,
                        status: to.into(),
                    },
                )
                .map(Some)
            }
            Intent::Reorder {
                column,
                old_index,
                new_index,
            } => {
                let len = self.board.column(column).len();
                if old_index >= len || new_index >= len {
                    return Err(TaskboardError::Validation(format!(
                        "{} has no position {}",
                        column,
                        old_index.max(new_index)
                    )));
                }
                self.board.apply(&ReorderTask {
                    column,
                    from_index: old_index,
                    to_index: new_index,
                })?;
                self.generation += 1;
                Ok(None)
            }
            Intent::Cancel { task_id } => {
                let (_, location) = self.synced_task(&task_id)?;
                if location.column().is_none() {
                    return Err(TaskboardError::Validation(format!(
                        "Task {} is already canceled",
                        task_id
                    )));
                }
                self.mutate(
                    Box::new(CancelTask {
                        task_id: task_id.clone(),
                    }),
                    SyncOperation::UpdateStatus {
                        task_id,
                        status: StatusName::Canceled,
                    },
                )
                .map(Some)
            }
            Intent::Delete { task_id } => {
                self.synced_task(&task_id)?;
                self.mutate(
                    Box::new(RemoveTask {
                        task_id: task_id.clone(),
                    }),
                    SyncOperation::Delete { task_id },
                )
                .map(Some)
            }
            Intent::Resume { task_id } => {
                let (_, location) = self.synced_task(&task_id)?;
                if location.column().is_some() {
                    return Err(TaskboardError::Validation(format!(
                        "Task {} is not canceled",
                        task_id
                    )));
                }
                self.mutate(
                    Box::new(ResumeTask {
                        task_id: task_id.clone(),
                    }),
                    SyncOperation::UpdateStatus {
                        task_id,
                        status: StatusName::ToDo,
                    },
                )
                .map(Some)
            }
            Intent::ToggleChecklistItem { task_id, index } => {
                let (task, _) = self.synced_task(&task_id)?;
                let description =
                    checklist::toggle(task.description.as_deref().unwrap_or_default(), index)?;
                let draft = TaskDraft {
                    description: Some(description),
                    ..task.to_draft()
                };
                self.begin_edit(task_id, draft).map(Some)
            }
        }
    }

    fn begin_edit(&mut self, task_id: TaskId, draft: TaskDraft) -> TaskboardResult<SyncRequest> {
        let draft = draft.validate()?;
        let (mut task, _) = self.synced_task(&task_id)?;
        task.apply_draft(draft.clone());
        self.mutate(
            Box::new(UpsertTask { task }),
            SyncOperation::UpdateContent { task_id, draft },
        )
    }

    fn mutate(
        &mut self,
        forward: Box<dyn BoardCommand>,
        operation: SyncOperation,
    ) -> TaskboardResult<SyncRequest> {
        let snapshot = self.board.snapshot();
        self.board.apply(forward.as_ref())?;
        self.generation += 1;
        Ok(self.track(forward, snapshot, operation))
    }

    fn track(
        &mut self,
        forward: Box<dyn BoardCommand>,
        snapshot: BoardSnapshot,
        operation: SyncOperation,
    ) -> SyncRequest {
        self.next_token += 1;
        let token = RequestToken::new(self.next_token);
        let temp_id = match &operation {
            SyncOperation::Create { temp_id, .. } => Some(temp_id.clone()),
            _ => None,
        };
        tracing::debug!(%token, "Began {}", forward.description());
        self.pending.insert(
            token,
            PendingMutation {
                forward,
                snapshot,
                task_ids: vec![operation.task_id().clone()],
                temp_id,
                aspect: operation.aspect(),
                generation: self.generation,
            },
        );
        SyncRequest { token, operation }
    }

    /// Register a finished drag gesture. The preview already moved the task,
    /// so nothing is applied here; the snapshot is the board as it would be
    /// without the gesture.
    pub fn commit_drag(&mut self, outcome: DragOutcome) -> TaskboardResult<Option<SyncRequest>> {
        let DragOutcome {
            task_id,
            intent,
            origin,
        } = outcome;

        let allowed = self.ensure_authenticated().and_then(|_| match &intent {
            DragIntent::StatusChange { .. } if task_id.is_temporary() => Err(
                TaskboardError::Validation(format!("Task {} is still being saved", task_id)),
            ),
            _ => Ok(()),
        });
        if let Err(err) = allowed {
            self.board.apply(&RestoreTasks {
                task_ids: vec![task_id],
                snapshot: origin,
            })?;
            self.generation += 1;
            return Err(err);
        }

        self.generation += 1;
        match intent {
            DragIntent::Reorder { .. } => Ok(None),
            DragIntent::StatusChange { task_id, from, to } => {
                let target_index = match self.board.locate(&task_id) {
                    Some(TaskLocation::Column { index, .. }) => index,
                    _ => self.board.column(to).len(),
                };
                let mut before = self.board.clone();
                before.restore_task_from(&task_id, &origin);
                let forward = MoveTask {
                    task_id: task_id.clone(),
                    from,
                    to,
                    target_index,
                };
                Ok(Some(self.track(
                    Box::new(forward),
                    before.snapshot(),
                    SyncOperation::UpdateStatus {
                        task_id,
                        status: to.into(),
                    },
                )))
            }
        }
    }

    /// Fold the store's answer for `token` into the board.
    pub fn complete(
        &mut self,
        token: RequestToken,
        result: TaskboardResult<SyncResponse>,
    ) -> Resolution {
        let Some(pending) = self.pending.remove(&token) else {
            tracing::debug!(%token, "Ignoring completion for unknown request");
            return Resolution::Unknown;
        };

        match result {
            Ok(response) => {
                self.commit(&pending, response);
                tracing::debug!(%token, "Committed {}", pending.forward.description());
                Resolution::Committed
            }
            Err(err) if !err.triggers_rollback() => {
                let reason = err.to_string();
                self.log.warn(format!(
                    "{} failed without a revert: {}",
                    pending.forward.description(),
                    reason
                ));
                Resolution::Discarded { reason }
            }
            Err(err) => {
                let reason = err.to_string();
                if self.hand_over(token, &pending) {
                    self.log.warn(format!(
                        "Ignored stale failure of {}: {}",
                        pending.forward.description(),
                        reason
                    ));
                    return Resolution::Discarded { reason };
                }
                if let Err(apply_err) = self.roll_back(&pending) {
                    tracing::error!("Rollback failed: {}", apply_err);
                }
                self.log.warn(format!(
                    "Reverted {}: {}",
                    pending.forward.description(),
                    reason
                ));
                Resolution::RolledBack { reason }
            }
        }
    }

    fn commit(&mut self, pending: &PendingMutation, response: SyncResponse) {
        let result = match (response, &pending.temp_id) {
            (SyncResponse::Created(task), Some(temp_id)) => {
                self.generation += 1;
                self.board.apply(&ReplaceTaskId {
                    old_id: temp_id.clone(),
                    task,
                })
            }
            (SyncResponse::Updated(task), _) | (SyncResponse::Created(task), None) => {
                let stale = self.has_pending(&task.id)
                    || !self.board.contains(&task.id)
                    || self.board.find(&task.id) == Some(&task);
                if stale {
                    return;
                }
                self.generation += 1;
                self.board.apply(&UpsertTask { task })
            }
            (SyncResponse::Ack, _) => Ok(()),
        };
        if let Err(err) = result {
            tracing::error!("Failed to apply store response: {}", err);
        }
    }

    /// Pass the failed aspect of each task back to the snapshots of the
    /// newer in-flight requests for it, up to the first one changing the same
    /// aspect. Returns whether such a request exists.
    fn hand_over(&mut self, token: RequestToken, failed: &PendingMutation) -> bool {
        let mut superseded = false;
        for task_id in &failed.task_ids {
            let newer = self
                .pending
                .range_mut((Bound::Excluded(token), Bound::Unbounded))
                .map(|(_, p)| p)
                .filter(|p| p.task_ids.contains(task_id));
            for pending in newer {
                pending.revert_snapshot(task_id, failed.aspect, &failed.snapshot);
                if pending.aspect == failed.aspect {
                    superseded = true;
                    break;
                }
            }
        }
        superseded
    }

    fn roll_back(&mut self, pending: &PendingMutation) -> TaskboardResult<()> {
        if pending.generation == self.generation {
            self.board.apply(&RestoreSnapshot {
                snapshot: pending.snapshot.clone(),
            })?;
        } else {
            for task_id in &pending.task_ids {
                let task_id = task_id.clone();
                let snapshot = pending.snapshot.clone();
                match pending.aspect {
                    TaskAspect::Placement => {
                        self.board.apply(&RestorePlacement { task_id, snapshot })?
                    }
                    TaskAspect::Content => self.board.apply(&RestoreContent { task_id, snapshot })?,
                }
            }
        }
        self.generation += 1;
        Ok(())
    }
}
