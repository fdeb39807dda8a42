//! Store error type and its mapping onto the domain taxonomy.

use campus_core::AuthError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Pool exhausted, connection lost or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A unique constraint rejected the write. Carries the constraint name.
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("referenced record does not exist: {0}")]
    MissingReference(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Self::MissingReference(db_err.constraint().unwrap_or("foreign key").to_string())
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Query(err.to_string()),
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(detail) => AuthError::Transient(detail),
            StoreError::Conflict(constraint) => AuthError::Conflict(constraint),
            StoreError::MissingReference(detail) => AuthError::MissingReference(detail),
            StoreError::Query(detail) => AuthError::Internal(detail),
        }
    }
}
