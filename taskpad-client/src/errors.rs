use thiserror::Error;

/// Everything a client operation can fail with.
///
/// Remote-call failures are converted to these kinds at the component
/// boundary; raw transport errors never reach the caller.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("No active session")]
    Unauthenticated,

    #[error("Network error: {0}")]
    Network(String),

    #[error("Session rejected by server")]
    AuthorizationExpired,

    #[error("No task with id {0} in local cache")]
    NotFound(i64),

    #[error("Failed to create task: {0}")]
    CreateFailed(String),

    #[error("Failed to update task {id}: {reason}")]
    UpdateFailed { id: i64, reason: String },

    #[error("Failed to delete task {id}: {reason}")]
    DeleteFailed { id: i64, reason: String },

    #[error("Server rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
