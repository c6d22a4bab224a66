// models/src/errors.rs
use serde::{Deserialize, Serialize};
pub use thiserror::Error;
use uuid::Error as UuidError;
use serde_json::Error as SerdeJsonError;

/// Error taxonomy shared by every backend operation. The HTTP layer maps
/// variants onto status codes: Unauthorized -> 401, Validation -> 400,
/// NotFound -> 404, Storage/Internal -> 500.
#[derive(Debug, Serialize, Deserialize, Error, Clone, PartialEq, Eq)]
pub enum EhrError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("An internal error occurred: {0}")]
    Internal(String),
}

// Implement the From trait for &str
impl From<&str> for EhrError {
    fn from(error: &str) -> Self {
        EhrError::Validation(error.to_string())
    }
}

// Implement From for chrono::ParseError
impl From<chrono::ParseError> for EhrError {
    fn from(err: chrono::ParseError) -> Self {
        EhrError::Validation(format!("invalid datetime: {}", err))
    }
}

// Implement From for UuidError
impl From<UuidError> for EhrError {
    fn from(err: UuidError) -> Self {
        EhrError::Validation(format!("invalid id: {}", err))
    }
}

// Implement From for serde_json::Error
impl From<SerdeJsonError> for EhrError {
    fn from(err: SerdeJsonError) -> Self {
        EhrError::Internal(format!("JSON serialization error: {}", err))
    }
}

/// A type alias for a `Result` that returns an `EhrError` on failure.
pub type EhrResult<T> = Result<T, EhrError>;
