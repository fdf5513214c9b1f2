//! Error conversion glue between layers.
//!
//! The domain layer must not depend on repository or service error types,
//! so conversions from domain, paging and form errors live here.

use crate::domain::types::TypeConstraintError;
use crate::repository::RepositoryError;

impl From<TypeConstraintError> for RepositoryError {
    fn from(val: TypeConstraintError) -> Self {
        RepositoryError::ValidationError(val.to_string())
    }
}

#[cfg(feature = "server")]
mod service {
    use crate::domain::auth::CredentialRejection;
    use crate::domain::types::TypeConstraintError;
    use crate::forms::FieldViolation;
    use crate::forms::auth::CredentialsFormError;
    use crate::forms::categories::CategoryFormError;
    use crate::forms::products::ProductFormError;
    use crate::pagination::PagingError;
    use crate::repository::RepositoryError;
    use crate::services::ServiceError;

    impl From<TypeConstraintError> for ServiceError {
        fn from(val: TypeConstraintError) -> Self {
            ServiceError::ValidationFailed(vec![FieldViolation::from(&val)])
        }
    }

    impl From<PagingError> for ServiceError {
        fn from(val: PagingError) -> Self {
            ServiceError::InvalidArgument(val.to_string())
        }
    }

    impl From<CategoryFormError> for ServiceError {
        fn from(val: CategoryFormError) -> Self {
            ServiceError::ValidationFailed(val.violations())
        }
    }

    impl From<ProductFormError> for ServiceError {
        fn from(val: ProductFormError) -> Self {
            ServiceError::ValidationFailed(val.violations())
        }
    }

    impl From<CredentialsFormError> for ServiceError {
        fn from(val: CredentialsFormError) -> Self {
            ServiceError::ValidationFailed(val.0)
        }
    }

    impl From<CredentialRejection> for ServiceError {
        fn from(val: CredentialRejection) -> Self {
            ServiceError::CredentialRejected(val.to_string())
        }
    }

    /// Contract violations pass through; storage faults become opaque.
    impl From<RepositoryError> for ServiceError {
        fn from(val: RepositoryError) -> Self {
            match val {
                RepositoryError::InvalidArgument(msg) => ServiceError::InvalidArgument(msg),
                RepositoryError::CommitRejected(msg) => ServiceError::PersistenceFailure(msg),
                RepositoryError::ValidationError(_)
                | RepositoryError::Database(_)
                | RepositoryError::Pool(_) => ServiceError::Internal,
            }
        }
    }
}
