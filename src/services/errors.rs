use thiserror::Error;

use crate::forms::{FieldViolation, describe};

/// Error type returned by every service entry point.
///
/// Mapping to transport status codes is left to the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    /// Requested resource was not found.
    #[error("not found")]
    NotFound,
    /// Arguments violate an operation's contract (identity mismatch,
    /// malformed paging, unknown reference).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Submitted data failed field validation.
    #[error("validation failed: {}", describe(.0))]
    ValidationFailed(Vec<FieldViolation>),
    /// The store refused to commit the staged changes.
    #[error("persistence failure: {0}")]
    PersistenceFailure(String),
    /// The credential validator refused the submitted credentials.
    #[error("credentials rejected: {0}")]
    CredentialRejected(String),
    /// An unexpected internal error occurred.
    #[error("internal error")]
    Internal,
}

/// Convenient alias for results returned from service functions.
pub type ServiceResult<T> = Result<T, ServiceError>;
