use thiserror::Error;

use crate::pagination::PagingError;

/// Errors raised by repositories, the unit of work and persistence contexts.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Caller supplied arguments that violate an operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Stored data could not be turned into a valid domain value.
    #[error("validation error: {0}")]
    ValidationError(String),
    /// The store refused a commit batch; none of it was applied.
    #[error("commit rejected: {0}")]
    CommitRejected(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
}

impl From<PagingError> for RepositoryError {
    fn from(val: PagingError) -> Self {
        RepositoryError::InvalidArgument(val.to_string())
    }
}

/// Convenient alias for repository results.
pub type RepositoryResult<T> = Result<T, RepositoryError>;
