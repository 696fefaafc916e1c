pub mod memory_store;
#[cfg(feature = "sqlite")]
pub mod sqlite_store;

pub use memory_store::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite_store::SqliteStore;

use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::TaskId;

/// Store ids are integers; anything else cannot name a stored task.
pub(crate) fn numeric_id(task_id: &TaskId) -> TaskboardResult<i64> {
    task_id
        .as_str()
        .parse::<i64>()
        .map_err(|_| TaskboardError::NotFound(format!("Task {} not found", task_id)))
}
