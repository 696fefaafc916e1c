use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::server::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};
use std::str::FromStr;
use taskboard_core::TaskboardError;
use taskboard_domain::api::{MessageBody, StatusPayload};
use taskboard_domain::{BoardColumns, StatusName, Task, TaskDraft, TaskId};

/// Unwrap a JSON body, turning a malformed one into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError(TaskboardError::Validation(rejection.body_text())))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> ApiResult<Json<BoardColumns>> {
    Ok(Json(state.store.fetch_board(&owner).await?))
}

pub async fn list_canceled(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.store.fetch_canceled(&owner).await?))
}

pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let draft = body(payload)?;
    let task = state.store.create_task(&owner, draft).await?;
    tracing::info!(task_id = %task.id, subject = %owner.subject, "Task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(task_id): Path<String>,
    payload: Result<Json<TaskDraft>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let draft = body(payload)?;
    let task = state
        .store
        .update_task(&owner, &TaskId::from(task_id), draft)
        .await?;
    Ok(Json(task))
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(task_id): Path<String>,
    payload: Result<Json<StatusPayload>, JsonRejection>,
) -> ApiResult<Json<MessageBody>> {
    let payload = body(payload)?;
    let status = StatusName::from_str(&payload.new_status_name)?;
    let task_id = TaskId::from(task_id);
    state.store.update_status(&owner, &task_id, status).await?;
    tracing::info!(task_id = %task_id, status = %status, "Task status updated");
    Ok(Json(MessageBody {
        message: "Task status updated".to_string(),
    }))
}

pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(owner): AuthUser,
    Path(task_id): Path<String>,
) -> ApiResult<Json<MessageBody>> {
    let task_id = TaskId::from(task_id);
    state.store.delete_task(&owner, &task_id).await?;
    tracing::info!(task_id = %task_id, "Task deleted");
    Ok(Json(MessageBody {
        message: "Task deleted".to_string(),
    }))
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    state.store.ping().await?;
    Ok(Json(json!({ "status": "ok" })))
}
