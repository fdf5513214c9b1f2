//! Storage-independent data access.
//!
//! Entities are read through [`EntityStore`] implementations and written
//! through a [`UnitOfWork`], which stages every change and hands the whole
//! batch to its [`PersistenceContext`] on commit. Two contexts ship with the
//! crate: [`DieselContext`] over SQLite and [`MemoryContext`].

use std::cell::RefCell;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use diesel::prelude::*;

use crate::db::{DbConnection, DbPool};
use crate::domain::category::{Category, CategoryWithProducts};
use crate::domain::product::Product;
use crate::domain::types::{CategoryId, ProductId};

pub mod category;
pub mod errors;
pub mod generic;
pub mod memory;
pub mod product;
pub mod unit_of_work;

pub use category::{CategoryOrder, CategoryRepository};
pub use errors::{RepositoryError, RepositoryResult};
pub use generic::{Query, Repository};
pub use memory::MemoryContext;
pub use product::{ProductOrder, ProductRepository};
pub use unit_of_work::UnitOfWork;

/// A record type with a unique identity that repositories can manage.
pub trait Entity: Clone + Debug + PartialEq {
    /// Identity assigned by the store.
    type Id: Copy + Debug + Display + Eq + Ord + Hash;
    /// Data needed to insert a record before it has an identity.
    type New: Clone + Debug + PartialEq;
    /// Orderings a store can apply when fetching.
    type Order: Copy + Debug + Default + PartialEq;

    /// Human readable name used in log and error messages.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;

    /// Wrap a change to this entity type into the unit of work's batch type.
    fn stage(change: Change<Self>) -> StagedChange;
}

/// A single pending write.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T: Entity> {
    Add(T::New),
    Update(T),
    Delete(T::Id),
}

/// A pending write to any entity type, in the order it was staged.
#[derive(Debug, Clone, PartialEq)]
pub enum StagedChange {
    Category(Change<Category>),
    Product(Change<Product>),
}

/// Identity of a row touched by a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    Category(CategoryId),
    Product(ProductId),
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitSummary {
    /// Keys assigned to inserted rows, in staging order.
    pub inserted: Vec<EntityKey>,
    pub updated: usize,
    pub deleted: usize,
}

impl CommitSummary {
    pub fn inserted_categories(&self) -> impl Iterator<Item = CategoryId> + '_ {
        self.inserted.iter().filter_map(|key| match key {
            EntityKey::Category(id) => Some(*id),
            EntityKey::Product(_) => None,
        })
    }

    pub fn inserted_products(&self) -> impl Iterator<Item = ProductId> + '_ {
        self.inserted.iter().filter_map(|key| match key {
            EntityKey::Product(id) => Some(*id),
            EntityKey::Category(_) => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated == 0 && self.deleted == 0
    }
}

/// Ordering and window a store applies to a fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchSpec<O> {
    pub order: O,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl<O> FetchSpec<O> {
    /// Offset and limit as SQL integers. `None` means the window starts
    /// beyond any row SQLite can address, so nothing can match.
    pub(crate) fn sql_window(&self) -> Option<(i64, Option<i64>)> {
        let offset = i64::try_from(self.offset).ok()?;
        let limit = self
            .limit
            .map(|limit| i64::try_from(limit).unwrap_or(i64::MAX));
        Some((offset, limit))
    }
}

/// Read access to the records of one entity type.
pub trait EntityStore<T: Entity> {
    /// Number of live records.
    fn count(&self) -> RepositoryResult<usize>;
    /// Records ordered and windowed according to `spec`.
    fn fetch(&self, spec: &FetchSpec<T::Order>) -> RepositoryResult<Vec<T>>;
    /// Record with the given identity, if any.
    fn find_by_id(&self, id: T::Id) -> RepositoryResult<Option<T>>;
}

/// A storage session a [`UnitOfWork`] owns for its whole lifetime.
///
/// Implementations are not expected to be usable from several threads.
pub trait PersistenceContext: EntityStore<Category> + EntityStore<Product> {
    /// Every category with its products, identity ascending, without
    /// issuing one query per category.
    fn categories_with_products(&self) -> RepositoryResult<Vec<CategoryWithProducts>>;

    /// Apply `changes` in order as a single atomic batch.
    ///
    /// Either every change becomes visible or none does. An update or
    /// delete addressing a missing row rejects the batch.
    fn apply(&self, changes: &[StagedChange]) -> RepositoryResult<CommitSummary>;
}

/// Persistence context over one pooled SQLite connection.
pub struct DieselContext {
    conn: RefCell<DbConnection>,
}

impl DieselContext {
    pub fn new(conn: DbConnection) -> Self {
        Self {
            conn: RefCell::new(conn),
        }
    }

    /// Check a connection out of `pool` for the lifetime of the context.
    pub fn from_pool(pool: &DbPool) -> RepositoryResult<Self> {
        Ok(Self::new(pool.get()?))
    }

    fn with_conn<R>(
        &self,
        f: impl FnOnce(&mut SqliteConnection) -> QueryResult<R>,
    ) -> RepositoryResult<R> {
        let mut conn = self.conn.borrow_mut();
        Ok(f(&mut **conn)?)
    }
}

impl PersistenceContext for DieselContext {
    fn categories_with_products(&self) -> RepositoryResult<Vec<CategoryWithProducts>> {
        let (categories, products) = self.with_conn(category::load_with_products)?;

        let grouped = products.grouped_by(&categories);
        categories
            .into_iter()
            .zip(grouped)
            .map(|(category, products)| -> RepositoryResult<CategoryWithProducts> {
                Ok(CategoryWithProducts {
                    category: category.try_into()?,
                    products: products
                        .into_iter()
                        .map(TryInto::try_into)
                        .collect::<Result<Vec<Product>, _>>()?,
                })
            })
            .collect()
    }

    fn apply(&self, changes: &[StagedChange]) -> RepositoryResult<CommitSummary> {
        let mut guard = self.conn.borrow_mut();
        let conn: &mut SqliteConnection = &mut guard;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut summary = CommitSummary::default();
            for change in changes {
                match change {
                    StagedChange::Category(change) => {
                        category::apply_change(conn, change, &mut summary)?
                    }
                    StagedChange::Product(change) => {
                        product::apply_change(conn, change, &mut summary)?
                    }
                }
            }
            Ok(summary)
        })
    }
}

/// Reject a batch when an update or delete addressed no row.
pub(crate) fn require_affected<T: Entity>(
    affected: usize,
    action: &str,
    id: T::Id,
) -> RepositoryResult<()> {
    if affected == 0 {
        Err(RepositoryError::CommitRejected(format!(
            "cannot {action} {} {id}: no such record",
            T::NAME
        )))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_window_refuses_offsets_sqlite_would_wrap() {
        let spec = FetchSpec {
            order: ProductOrder::IdAsc,
            offset: usize::MAX - 3,
            limit: Some(2),
        };
        assert_eq!(spec.sql_window(), None);
    }

    #[test]
    fn sql_window_clamps_oversized_limits() {
        let spec = FetchSpec {
            order: CategoryOrder::IdAsc,
            offset: 4,
            limit: Some(usize::MAX),
        };
        assert_eq!(spec.sql_window(), Some((4, Some(i64::MAX))));
    }
}
