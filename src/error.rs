// Takeout Reconcile Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("ExifTool error: {0}")]
    ExifTool(String),

    #[error("Copy error: {0}")]
    Copy(String),

    #[error("Too many files with the same base filename: {0}")]
    NameCapacity(String),

    #[error("Missing required field '{field}' in {path}")]
    MissingField { field: &'static str, path: String },

    #[error("Invalid timestamp '{value}' in {path}")]
    InvalidTimestamp { value: String, path: String },
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
