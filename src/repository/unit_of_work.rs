use std::cell::OnceCell;
use std::rc::Rc;

use crate::repository::generic::Scope;
use crate::repository::{
    CategoryRepository, CommitSummary, PersistenceContext, ProductRepository, RepositoryError,
    RepositoryResult,
};

/// Owns one persistence context for the duration of a single operation.
///
/// Repositories are created on first access and reused afterwards. Writes
/// made through them accumulate in one ordered batch that [`commit`]
/// applies atomically. Dropping the unit without committing discards the
/// batch. The type is neither `Send` nor `Sync`; create one per request.
///
/// [`commit`]: UnitOfWork::commit
pub struct UnitOfWork<C> {
    scope: Rc<Scope<C>>,
    categories: OnceCell<CategoryRepository<C>>,
    products: OnceCell<ProductRepository<C>>,
}

impl<C: PersistenceContext> UnitOfWork<C> {
    pub fn new(context: C) -> Self {
        Self {
            scope: Rc::new(Scope::new(context)),
            categories: OnceCell::new(),
            products: OnceCell::new(),
        }
    }

    pub fn categories(&self) -> &CategoryRepository<C> {
        self.categories
            .get_or_init(|| CategoryRepository::new(Rc::clone(&self.scope)))
    }

    pub fn products(&self) -> &ProductRepository<C> {
        self.products
            .get_or_init(|| ProductRepository::new(Rc::clone(&self.scope)))
    }

    /// Number of staged, uncommitted changes.
    pub fn pending_changes(&self) -> usize {
        self.scope.changes.borrow().len()
    }

    /// Flush every staged change as one atomic batch.
    ///
    /// The batch is consumed whether or not the store accepts it. Any
    /// failure is reported as [`RepositoryError::CommitRejected`] and leaves
    /// the store untouched.
    pub fn commit(&self) -> RepositoryResult<CommitSummary> {
        let changes = self.scope.changes.take();
        if changes.is_empty() {
            return Ok(CommitSummary::default());
        }

        log::debug!("Committing {} staged change(s)", changes.len());
        match self.scope.context.apply(&changes) {
            Ok(summary) => Ok(summary),
            Err(RepositoryError::CommitRejected(reason)) => {
                Err(RepositoryError::CommitRejected(reason))
            }
            Err(e) => Err(RepositoryError::CommitRejected(e.to_string())),
        }
    }

    /// The context this unit of work owns.
    pub fn context(&self) -> &C {
        &self.scope.context
    }
}
