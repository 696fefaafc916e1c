use thiserror::Error;

#[derive(Error, Debug)]
pub enum TaskboardError {
    #[error("Unauthorized: sign in to continue")]
    Unauthorized,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server responded with {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskboardError {
    /// Whether a failure reported for an in-flight request should revert the
    /// optimistic mutation that preceded it.
    ///
    /// Validation failures are normally caught before anything is applied, but
    /// a server-side rejection of an already-applied mutation still needs the
    /// revert, so every variant except `Config` qualifies.
    pub fn triggers_rollback(&self) -> bool {
        !matches!(self, TaskboardError::Config(_))
    }

    /// HTTP status code the error maps to at the route boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            TaskboardError::Unauthorized => 401,
            TaskboardError::Validation(_) => 400,
            TaskboardError::NotFound(_) => 404,
            TaskboardError::Remote { status, .. } => *status,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(TaskboardError::Unauthorized.status_code(), 401);
        assert_eq!(
            TaskboardError::Validation("title".to_string()).status_code(),
            400
        );
        assert_eq!(TaskboardError::NotFound("7".to_string()).status_code(), 404);
        assert_eq!(
            TaskboardError::Database("locked".to_string()).status_code(),
            500
        );
        assert_eq!(
            TaskboardError::Remote {
                status: 503,
                message: "busy".to_string()
            }
            .status_code(),
            503
        );
    }

    #[test]
    fn test_config_errors_never_roll_back() {
        assert!(!TaskboardError::Config("bad".to_string()).triggers_rollback());
        assert!(TaskboardError::Transport("reset".to_string()).triggers_rollback());
        assert!(TaskboardError::NotFound("1".to_string()).triggers_rollback());
    }
}
