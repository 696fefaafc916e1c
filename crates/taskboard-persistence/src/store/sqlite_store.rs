use crate::store::numeric_id;
use crate::traits::{Identity, TaskStore};
use async_trait::async_trait;
use chrono::{NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{BoardColumns, ColumnId, StatusName, Task, TaskDraft, TaskId};

const SCHEMA: &str = include_str!("../schema.sql");
const DATE_FORMAT: &str = "%Y-%m-%d";

const TASK_COLUMNS: &str = "SELECT t.id, t.title, t.description, t.limited_at, s.name AS status
     FROM tasks t
     JOIN task_statuses s ON s.id = t.status_id
     JOIN users u ON u.id = t.user_id";

fn db_error(e: sqlx::Error) -> TaskboardError {
    TaskboardError::Database(e.to_string())
}

fn not_found(task_id: &TaskId) -> TaskboardError {
    TaskboardError::NotFound(format!("Task {} not found", task_id))
}

fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Task store backed by a SQLite file. The pool and schema are created lazily
/// on first use.
pub struct SqliteStore {
    path: PathBuf,
    pool: tokio::sync::OnceCell<Pool<Sqlite>>,
}

impl SqliteStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            pool: tokio::sync::OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn get_pool(&self) -> TaskboardResult<&Pool<Sqlite>> {
        self.pool
            .get_or_try_init(|| async {
                let options =
                    SqliteConnectOptions::from_str(&format!("sqlite://{}", self.path.display()))
                        .map_err(db_error)?
                        .create_if_missing(true)
                        .foreign_keys(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(5)
                    .connect_with(options)
                    .await
                    .map_err(db_error)?;

                sqlx::raw_sql(SCHEMA).execute(&pool).await.map_err(db_error)?;
                tracing::info!(path = %self.path.display(), "Opened task database");

                Ok(pool)
            })
            .await
    }

    fn row_to_task(row: &SqliteRow) -> TaskboardResult<(StatusName, Task)> {
        let id: i64 = row.try_get("id").map_err(db_error)?;
        let status: String = row.try_get("status").map_err(db_error)?;
        let limited_at: Option<String> = row.try_get("limited_at").map_err(db_error)?;
        let due_date = limited_at
            .map(|value| NaiveDate::parse_from_str(&value, DATE_FORMAT))
            .transpose()
            .map_err(|e| TaskboardError::Database(format!("Corrupt due date: {}", e)))?;

        let task = Task {
            id: TaskId::from(id),
            title: row.try_get("title").map_err(db_error)?,
            description: row.try_get("description").map_err(db_error)?,
            due_date,
        };
        Ok((StatusName::from_str(&status)?, task))
    }
}

#[async_trait]
impl TaskStore for SqliteStore {
    async fn fetch_board(&self, owner: &Identity) -> TaskboardResult<BoardColumns> {
        let pool = self.get_pool().await?;
        let rows = sqlx::query(&format!(
            "{} WHERE u.subject = ? AND s.name != 'canceled' ORDER BY t.id",
            TASK_COLUMNS
        ))
        .bind(&owner.subject)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

        let mut columns = BoardColumns::new();
        for row in &rows {
            let (status, task) = Self::row_to_task(row)?;
            if let Ok(column) = ColumnId::try_from(status) {
                columns.push(column, task);
            }
        }
        Ok(columns)
    }

    async fn fetch_canceled(&self, owner: &Identity) -> TaskboardResult<Vec<Task>> {
        let pool = self.get_pool().await?;
        let rows = sqlx::query(&format!(
            "{} WHERE u.subject = ? AND s.name = 'canceled' ORDER BY t.updated_at DESC, t.id DESC",
            TASK_COLUMNS
        ))
        .bind(&owner.subject)
        .fetch_all(pool)
        .await
        .map_err(db_error)?;

        rows.iter()
            .map(|row| Self::row_to_task(row).map(|(_, task)| task))
            .collect()
    }

    async fn create_task(&self, owner: &Identity, draft: TaskDraft) -> TaskboardResult<Task> {
        let draft = draft.validate()?;
        let pool = self.get_pool().await?;
        let mut tx = pool.begin().await.map_err(db_error)?;
        let timestamp = now();

        let inserted = sqlx::query(
            "INSERT INTO users (subject, name, email, created_at) VALUES (?, ?, ?, ?)
             ON CONFLICT(subject) DO NOTHING",
        )
        .bind(&owner.subject)
        .bind(owner.display_name())
        .bind(owner.email.as_deref().unwrap_or_default())
        .bind(&timestamp)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;
        if inserted.rows_affected() > 0 {
            tracing::info!(subject = %owner.subject, "Created user record");
        }

        let user_id: i64 = sqlx::query("SELECT id FROM users WHERE subject = ?")
            .bind(&owner.subject)
            .fetch_one(&mut *tx)
            .await
            .map_err(db_error)?
            .try_get("id")
            .map_err(db_error)?;

        let result = sqlx::query(
            "INSERT INTO tasks (user_id, status_id, title, description, limited_at, created_at, updated_at)
             VALUES (?, (SELECT id FROM task_statuses WHERE name = 'ToDo'), ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.due_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(&timestamp)
        .bind(&timestamp)
        .execute(&mut *tx)
        .await
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        let id = result.last_insert_rowid();
        tracing::debug!(task_id = id, "Created task");
        Ok(Task::from_draft(TaskId::from(id), draft))
    }

    async fn update_task(
        &self,
        owner: &Identity,
        task_id: &TaskId,
        draft: TaskDraft,
    ) -> TaskboardResult<Task> {
        let draft = draft.validate()?;
        let id = numeric_id(task_id)?;
        let pool = self.get_pool().await?;

        let result = sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, limited_at = ?, updated_at = ?
             WHERE id = ? AND user_id = (SELECT id FROM users WHERE subject = ?)",
        )
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.due_date.map(|d| d.format(DATE_FORMAT).to_string()))
        .bind(now())
        .bind(id)
        .bind(&owner.subject)
        .execute(pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(task_id));
        }
        Ok(Task::from_draft(task_id.clone(), draft))
    }

    async fn update_status(
        &self,
        owner: &Identity,
        task_id: &TaskId,
        status: StatusName,
    ) -> TaskboardResult<()> {
        let id = numeric_id(task_id)?;
        let pool = self.get_pool().await?;

        let result = sqlx::query(
            "UPDATE tasks
             SET status_id = (SELECT id FROM task_statuses WHERE name = ?), updated_at = ?
             WHERE id = ? AND user_id = (SELECT id FROM users WHERE subject = ?)",
        )
        .bind(status.as_str())
        .bind(now())
        .bind(id)
        .bind(&owner.subject)
        .execute(pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(task_id));
        }
        tracing::debug!(task_id = %task_id, status = %status, "Updated task status");
        Ok(())
    }

    async fn delete_task(&self, owner: &Identity, task_id: &TaskId) -> TaskboardResult<()> {
        let id = numeric_id(task_id)?;
        let pool = self.get_pool().await?;

        let result = sqlx::query(
            "DELETE FROM tasks WHERE id = ? AND user_id = (SELECT id FROM users WHERE subject = ?)",
        )
        .bind(id)
        .bind(&owner.subject)
        .execute(pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(not_found(task_id));
        }
        Ok(())
    }

    async fn ping(&self) -> TaskboardResult<()> {
        let pool = self.get_pool().await?;
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
