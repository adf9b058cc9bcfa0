use thiserror::Error;

/// Unified error type for the revos engine.
/// Fallible boundaries (stores, collaborators) return Result<T, RevosError>;
/// pure scoring and scheduling functions never fail.
#[derive(Debug, Error)]
pub enum RevosError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation timed out")]
    Timeout(#[from] tokio::time::error::Elapsed),

    /// A persisted bucket could not be written. Readers degrade to defaults
    /// instead of surfacing this; only writers propagate it.
    #[error("storage error: {0}")]
    Storage(String),

    /// The generation collaborator failed or returned output that could not
    /// be parsed into the expected shape. Retryable from the caller's side.
    #[error("generation failed (model: {model}): {message}")]
    Generation { model: String, message: String },

    #[error("invalid state: {0}")]
    State(String),
}

impl RevosError {
    pub fn storage<S: Into<String>>(message: S) -> Self {
        RevosError::Storage(message.into())
    }

    pub fn generation<M: Into<String>, S: Into<String>>(model: M, message: S) -> Self {
        RevosError::Generation {
            model: model.into(),
            message: message.into(),
        }
    }

    pub fn state<S: Into<String>>(message: S) -> Self {
        RevosError::State(message.into())
    }
}
