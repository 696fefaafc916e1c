use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskboard_core::TaskboardResult;
use taskboard_domain::{BoardColumns, StatusName, Task, TaskDraft, TaskId};

/// The authenticated caller, as forwarded by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Stable subject id issued by the provider
    pub subject: String,
    /// Display name, used when the user row is first created
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            name: None,
            email: None,
        }
    }

    pub fn with_profile(mut self, name: Option<String>, email: Option<String>) -> Self {
        self.name = name;
        self.email = email;
        self
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("New User")
    }
}

/// A row of the users table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub subject: String,
    pub name: String,
    pub email: String,
}

/// Relational task storage scoped by owner.
///
/// Every operation takes the caller's identity and only ever sees that
/// caller's rows: a task that exists but belongs to someone else is reported
/// as `NotFound`, exactly like a task that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Visible tasks grouped by status, canceled tasks excluded
    async fn fetch_board(&self, owner: &Identity) -> TaskboardResult<BoardColumns>;

    /// Canceled tasks, newest first
    async fn fetch_canceled(&self, owner: &Identity) -> TaskboardResult<Vec<Task>>;

    /// Create a task in `ToDo`, creating the owner's user row if needed
    async fn create_task(&self, owner: &Identity, draft: TaskDraft) -> TaskboardResult<Task>;

    /// Replace title, description and due date
    async fn update_task(
        &self,
        owner: &Identity,
        task_id: &TaskId,
        draft: TaskDraft,
    ) -> TaskboardResult<Task>;

    async fn update_status(
        &self,
        owner: &Identity,
        task_id: &TaskId,
        status: StatusName,
    ) -> TaskboardResult<()>;

    /// Remove a task permanently
    async fn delete_task(&self, owner: &Identity, task_id: &TaskId) -> TaskboardResult<()>;

    /// Cheap liveness probe for health checks
    async fn ping(&self) -> TaskboardResult<()> {
        Ok(())
    }
}
