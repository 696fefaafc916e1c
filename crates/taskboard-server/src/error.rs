use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use taskboard_core::TaskboardError;
use taskboard_domain::api::ErrorBody;

/// A store or request error on its way out as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub TaskboardError);

impl From<TaskboardError> for ApiError {
    fn from(err: TaskboardError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn message(&self) -> String {
        match &self.0 {
            TaskboardError::Unauthorized => "Unauthorized".to_string(),
            TaskboardError::Validation(message) | TaskboardError::NotFound(message) => {
                message.clone()
            }
            TaskboardError::Remote { message, .. } => message.clone(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = ErrorBody {
            error: self.message(),
        };
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
