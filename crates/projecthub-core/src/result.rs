//! Convenience result type alias for ProjectHub.

use crate::error::AppError;

/// A specialized `Result` type for ProjectHub operations.
pub type AppResult<T> = Result<T, AppError>;
