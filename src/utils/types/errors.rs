use std::io;

/// Errors surfaced by CloudMount operations.
///
/// External command failures carry the captured output text as their
/// message; rclone and friends have no structured error codes.
#[derive(Debug, thiserror::Error)]
pub enum CloudMountError {
    #[error("{program} failed: {message}")]
    CommandFailed { program: String, message: String },

    #[error("required binary not found: {0}")]
    BinaryNotFound(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A background operation reported failure through the event queue
    #[error("{operation} failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl CloudMountError {
    pub fn command_failed(program: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandFailed {
            program: program.into(),
            message: message.into(),
        }
    }

    /// True when the error means a dependency is missing, which the
    /// front-end answers with an install offer instead of an error dialog.
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, Self::BinaryNotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudMountError>;

// Convert to String for display layers
impl From<CloudMountError> for String {
    fn from(e: CloudMountError) -> Self {
        e.to_string()
    }
}
