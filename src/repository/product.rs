use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use diesel::prelude::*;

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::ProductId;
use crate::models::product::{NewProduct as DbNewProduct, Product as DbProduct};
use crate::pagination::{PagedSlice, PagingRequest};
use crate::repository::generic::Scope;
use crate::repository::{
    Change, CommitSummary, DieselContext, Entity, EntityKey, EntityStore, FetchSpec,
    PersistenceContext, Repository, RepositoryResult, StagedChange, require_affected,
};

/// Orderings available when fetching products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ProductOrder {
    #[default]
    IdAsc,
    PriceAsc,
}

impl ProductOrder {
    /// Total order used by in-memory stores; ties fall back to identity.
    pub fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::IdAsc => a.id.cmp(&b.id),
            Self::PriceAsc => a
                .price
                .get()
                .total_cmp(&b.price.get())
                .then(a.id.cmp(&b.id)),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;
    type New = NewProduct;
    type Order = ProductOrder;

    const NAME: &'static str = "product";

    fn id(&self) -> ProductId {
        self.id
    }

    fn stage(change: Change<Self>) -> StagedChange {
        StagedChange::Product(change)
    }
}

/// Product data access: the generic surface plus catalog queries.
pub struct ProductRepository<C> {
    base: Repository<Product, C>,
}

impl<C> ProductRepository<C> {
    pub(crate) fn new(scope: Rc<Scope<C>>) -> Self {
        Self {
            base: Repository::new(scope),
        }
    }
}

impl<C> Deref for ProductRepository<C> {
    type Target = Repository<Product, C>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<C: PersistenceContext> ProductRepository<C> {
    /// One page of products in identity order.
    pub fn get_products(&self, paging: PagingRequest) -> RepositoryResult<PagedSlice<Product>> {
        self.get().order_by(ProductOrder::IdAsc).paginate(paging)
    }

    /// Every product, cheapest first.
    pub fn get_products_by_price(&self) -> RepositoryResult<Vec<Product>> {
        self.get().order_by(ProductOrder::PriceAsc).load()
    }
}

impl EntityStore<Product> for DieselContext {
    fn count(&self) -> RepositoryResult<usize> {
        use crate::schema::produtos;

        let total = self.with_conn(|conn| produtos::table.count().get_result::<i64>(conn))?;
        Ok(total as usize)
    }

    fn fetch(&self, spec: &FetchSpec<ProductOrder>) -> RepositoryResult<Vec<Product>> {
        use crate::schema::produtos;

        let Some((offset, limit)) = spec.sql_window() else {
            return Ok(Vec::new());
        };

        let rows = self.with_conn(|conn| {
            let mut items = produtos::table.into_boxed::<diesel::sqlite::Sqlite>();

            items = match spec.order {
                ProductOrder::IdAsc => items.order(produtos::produto_id.asc()),
                ProductOrder::PriceAsc => {
                    items.order((produtos::preco.asc(), produtos::produto_id.asc()))
                }
            };

            if let Some(limit) = limit {
                items = items.limit(limit);
            }
            if offset > 0 {
                items = items.offset(offset);
            }

            items.load::<DbProduct>(conn)
        })?;

        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Product>, _>>()?;
        Ok(items)
    }

    fn find_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::produtos;

        let product = self.with_conn(|conn| {
            produtos::table
                .find(id.get())
                .first::<DbProduct>(conn)
                .optional()
        })?;

        let product = product.map(TryInto::try_into).transpose()?;
        Ok(product)
    }
}

pub(super) fn apply_change(
    conn: &mut SqliteConnection,
    change: &Change<Product>,
    summary: &mut CommitSummary,
) -> RepositoryResult<()> {
    use crate::schema::produtos;

    match change {
        Change::Add(product) => {
            let id = diesel::insert_into(produtos::table)
                .values(DbNewProduct::from(product.clone()))
                .returning(produtos::produto_id)
                .get_result::<i32>(conn)?;
            summary
                .inserted
                .push(EntityKey::Product(ProductId::new(id)?));
        }
        Change::Update(product) => {
            let changeset = DbNewProduct::from(product.clone());
            let affected = diesel::update(produtos::table.find(product.id.get()))
                .set(&changeset)
                .execute(conn)?;
            require_affected::<Product>(affected, "update", product.id)?;
            summary.updated += affected;
        }
        Change::Delete(id) => {
            let affected = diesel::delete(produtos::table.find(id.get())).execute(conn)?;
            require_affected::<Product>(affected, "delete", *id)?;
            summary.deleted += affected;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::UnitOfWork;
    use crate::repository::test::seeded_context;

    #[test]
    fn orders_by_price_not_identity() {
        let uow = UnitOfWork::new(seeded_context());

        let products = uow.products().get_products_by_price().unwrap();

        let ids: Vec<i32> = products.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![4, 1, 3, 2]);
        assert!(products.windows(2).all(|w| w[0].price.get() <= w[1].price.get()));
    }

    #[test]
    fn pages_products_in_identity_order() {
        let uow = UnitOfWork::new(seeded_context());

        let page = uow
            .products()
            .get_products(PagingRequest::new(2, 3).unwrap())
            .unwrap();

        let ids: Vec<i32> = page.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![4]);
        assert_eq!(page.metadata().total_count, 4);
        assert_eq!(page.metadata().total_pages, 2);
        assert!(!page.metadata().has_next);
        assert!(page.metadata().has_previous);
    }

    #[test]
    fn get_by_id_is_repeatable() {
        let uow = UnitOfWork::new(seeded_context());
        let id = ProductId::new(3).unwrap();

        let first = uow.products().get_by_id(id).unwrap();
        let second = uow.products().get_by_id(id).unwrap();

        assert!(first.is_some());
        assert_eq!(first, second);
    }

    #[test]
    fn missing_product_is_none() {
        let uow = UnitOfWork::new(seeded_context());

        let found = uow.products().get_by_id(ProductId::new(99).unwrap()).unwrap();

        assert!(found.is_none());
    }

    #[test]
    fn find_returns_first_match_in_identity_order() {
        let uow = UnitOfWork::new(seeded_context());

        let found = uow
            .products()
            .find(|p| p.category_id.get() == 1)
            .unwrap()
            .unwrap();

        assert_eq!(found.id.get(), 1);
    }
}
