//! Entry points for the presentation layer.
//!
//! Each function works inside the [`UnitOfWork`] it is given and commits at
//! most once. Unexpected storage failures are logged here and surface as
//! [`ServiceError::Internal`].

use crate::repository::{CommitSummary, PersistenceContext, UnitOfWork};

pub mod auth;
pub mod categories;
pub mod errors;
pub mod products;

pub use errors::{ServiceError, ServiceResult};

fn commit<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    action: &str,
) -> ServiceResult<CommitSummary> {
    uow.commit().map_err(|e| {
        log::error!("Failed to {action}: {e}");
        ServiceError::from(e)
    })
}
