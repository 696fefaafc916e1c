use crate::store::numeric_id;
use crate::traits::{Identity, TaskStore, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{BoardColumns, ColumnId, StatusName, Task, TaskDraft, TaskId};

#[derive(Debug, Clone)]
struct StoredTask {
    owner: String,
    status: StatusName,
    task: Task,
    updated_at: DateTime<Utc>,
    /// Tie-breaker for rows touched within the same clock tick
    sequence: u64,
}

#[derive(Debug, Default)]
struct StoreInner {
    users: HashMap<String, UserRecord>,
    tasks: BTreeMap<i64, StoredTask>,
    next_task_id: i64,
    next_user_id: i64,
    sequence: u64,
}

impl StoreInner {
    fn ensure_user(&mut self, owner: &Identity) -> &UserRecord {
        if !self.users.contains_key(&owner.subject) {
            self.next_user_id += 1;
            let record = UserRecord {
                id: self.next_user_id,
                subject: owner.subject.clone(),
                name: owner.display_name().to_string(),
                email: owner.email.clone().unwrap_or_default(),
            };
            tracing::info!(subject = %owner.subject, "Created user record");
            self.users.insert(owner.subject.clone(), record);
        }
        &self.users[&owner.subject]
    }

    fn owned_mut(&mut self, owner: &Identity, task_id: &TaskId) -> TaskboardResult<&mut StoredTask> {
        let id = numeric_id(task_id)?;
        self.tasks
            .get_mut(&id)
            .filter(|stored| stored.owner == owner.subject)
            .ok_or_else(|| TaskboardError::NotFound(format!("Task {} not found", task_id)))
    }

    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }
}

/// Process-local task store, used by tests and `serve` without a database.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<StoreInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user(&self, subject: &str) -> Option<UserRecord> {
        self.inner.read().users.get(subject).cloned()
    }

    pub fn task_count(&self) -> usize {
        self.inner.read().tasks.len()
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn fetch_board(&self, owner: &Identity) -> TaskboardResult<BoardColumns> {
        let inner = self.inner.read();
        let mut columns = BoardColumns::new();
        for stored in inner.tasks.values().filter(|s| s.owner == owner.subject) {
            if let Ok(column) = ColumnId::try_from(stored.status) {
                columns.push(column, stored.task.clone());
            }
        }
        Ok(columns)
    }

    async fn fetch_canceled(&self, owner: &Identity) -> TaskboardResult<Vec<Task>> {
        let inner = self.inner.read();
        let mut canceled: Vec<&StoredTask> = inner
            .tasks
            .values()
            .filter(|s| s.owner == owner.subject && s.status == StatusName::Canceled)
            .collect();
        canceled.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then(b.sequence.cmp(&a.sequence))
        });
        Ok(canceled.into_iter().map(|s| s.task.clone()).collect())
    }

    async fn create_task(&self, owner: &Identity, draft: TaskDraft) -> TaskboardResult<Task> {
        let draft = draft.validate()?;
        let mut inner = self.inner.write();
        inner.ensure_user(owner);
        inner.next_task_id += 1;
        let id = inner.next_task_id;
        let sequence = inner.next_sequence();
        let task = Task::from_draft(TaskId::from(id), draft);
        inner.tasks.insert(
            id,
            StoredTask {
                owner: owner.subject.clone(),
                status: StatusName::ToDo,
                task: task.clone(),
                updated_at: Utc::now(),
                sequence,
            },
        );
        tracing::debug!(task_id = id, "Created task");
        Ok(task)
    }

    async fn update_task(
        &self,
        owner: &Identity,
        task_id: &TaskId,
        draft: TaskDraft,
    ) -> TaskboardResult<Task> {
        let draft = draft.validate()?;
        let mut inner = self.inner.write();
        let sequence = inner.next_sequence();
        let stored = inner.owned_mut(owner, task_id)?;
        stored.task.apply_draft(draft);
        stored.updated_at = Utc::now();
        stored.sequence = sequence;
        Ok(stored.task.clone())
    }

    async fn update_status(
        &self,
        owner: &Identity,
        task_id: &TaskId,
        status: StatusName,
    ) -> TaskboardResult<()> {
        let mut inner = self.inner.write();
        let sequence = inner.next_sequence();
        let stored = inner.owned_mut(owner, task_id)?;
        stored.status = status;
        stored.updated_at = Utc::now();
        stored.sequence = sequence;
        tracing::debug!(task_id = %task_id, status = %status, "Updated task status");
        Ok(())
    }

    async fn delete_task(&self, owner: &Identity, task_id: &TaskId) -> TaskboardResult<()> {
        let mut inner = self.inner.write();
        inner.owned_mut(owner, task_id)?;
        let id = numeric_id(task_id)?;
        inner.tasks.remove(&id);
        Ok(())
    }
}
