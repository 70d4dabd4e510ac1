use thiserror::Error;

use crate::llm_client::LlmError;

/// Application-level error type.
/// Fetch and parse faults never reach this type; they degrade in place.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Storage error at {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),
}

impl AppError {
    pub fn storage(path: impl AsRef<std::path::Path>, source: std::io::Error) -> Self {
        AppError::Storage {
            path: path.as_ref().display().to_string(),
            source,
        }
    }
}
