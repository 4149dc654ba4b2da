use thiserror::Error;

#[derive(Error, Debug)]
pub enum FusionError {
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("Shape mismatch for {field}: expected {expected:?}, got {found:?}")]
    Shape {
        field: String,
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("Invalid half-domain layout: {0}")]
    Layout(String),

    #[error("Mesh regeneration failed: {0}")]
    Regeneration(String),

    #[error("Field not present in solver state: {0}")]
    UnknownField(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type FusionResult<T> = Result<T, FusionError>;
