use thiserror::Error;

use crate::bc::BcError;

/// Service-layer error type shared by all synchronization and scheduling
/// services.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Bc(#[from] BcError),
}

impl ServiceError {
    /// Helper to convert database errors with consistent logging context.
    pub fn db_error(err: sea_orm::error::DbErr) -> Self {
        ServiceError::DatabaseError(err)
    }

    /// Returns true when the error represents a missing resource rather than
    /// a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_) | ServiceError::Bc(BcError::NotFound(_))
        )
    }
}
