use std::cmp::Ordering;
use std::ops::Deref;
use std::rc::Rc;

use diesel::prelude::*;

use crate::domain::category::{Category, CategoryWithProducts, NewCategory};
use crate::domain::types::CategoryId;
use crate::models::category::{Category as DbCategory, NewCategory as DbNewCategory};
use crate::models::product::Product as DbProduct;
use crate::pagination::{PagedSlice, PagingRequest};
use crate::repository::generic::Scope;
use crate::repository::{
    Change, CommitSummary, DieselContext, Entity, EntityKey, EntityStore, FetchSpec,
    PersistenceContext, Repository, RepositoryResult, StagedChange, require_affected,
};

/// Orderings available when fetching categories.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CategoryOrder {
    #[default]
    IdAsc,
}

impl CategoryOrder {
    /// Total order used by in-memory stores.
    pub fn compare(self, a: &Category, b: &Category) -> Ordering {
        match self {
            Self::IdAsc => a.id.cmp(&b.id),
        }
    }
}

impl Entity for Category {
    type Id = CategoryId;
    type New = NewCategory;
    type Order = CategoryOrder;

    const NAME: &'static str = "category";

    fn id(&self) -> CategoryId {
        self.id
    }

    fn stage(change: Change<Self>) -> StagedChange {
        StagedChange::Category(change)
    }
}

/// Category data access: the generic surface plus catalog queries.
pub struct CategoryRepository<C> {
    base: Repository<Category, C>,
}

impl<C> CategoryRepository<C> {
    pub(crate) fn new(scope: Rc<Scope<C>>) -> Self {
        Self {
            base: Repository::new(scope),
        }
    }
}

impl<C> Deref for CategoryRepository<C> {
    type Target = Repository<Category, C>;

    fn deref(&self) -> &Self::Target {
        &self.base
    }
}

impl<C: PersistenceContext> CategoryRepository<C> {
    /// One page of categories in identity order.
    pub fn get_categories(&self, paging: PagingRequest) -> RepositoryResult<PagedSlice<Category>> {
        self.get().order_by(CategoryOrder::IdAsc).paginate(paging)
    }

    /// Every category with its products attached.
    pub fn get_categories_with_products(&self) -> RepositoryResult<Vec<CategoryWithProducts>> {
        self.base.context().categories_with_products()
    }
}

impl EntityStore<Category> for DieselContext {
    fn count(&self) -> RepositoryResult<usize> {
        use crate::schema::categorias;

        let total = self.with_conn(|conn| categorias::table.count().get_result::<i64>(conn))?;
        Ok(total as usize)
    }

    fn fetch(&self, spec: &FetchSpec<CategoryOrder>) -> RepositoryResult<Vec<Category>> {
        use crate::schema::categorias;

        let Some((offset, limit)) = spec.sql_window() else {
            return Ok(Vec::new());
        };

        let rows = self.with_conn(|conn| {
            let mut items = categorias::table.into_boxed::<diesel::sqlite::Sqlite>();

            items = match spec.order {
                CategoryOrder::IdAsc => items.order(categorias::categoria_id.asc()),
            };

            if let Some(limit) = limit {
                items = items.limit(limit);
            }
            if offset > 0 {
                items = items.offset(offset);
            }

            items.load::<DbCategory>(conn)
        })?;

        let items = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<Category>, _>>()?;
        Ok(items)
    }

    fn find_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        use crate::schema::categorias;

        let category = self.with_conn(|conn| {
            categorias::table
                .find(id.get())
                .first::<DbCategory>(conn)
                .optional()
        })?;

        let category = category.map(TryInto::try_into).transpose()?;
        Ok(category)
    }
}

/// Categories and all their products, one query per table.
pub(super) fn load_with_products(
    conn: &mut SqliteConnection,
) -> QueryResult<(Vec<DbCategory>, Vec<DbProduct>)> {
    use crate::schema::{categorias, produtos};

    let categories = categorias::table
        .order(categorias::categoria_id.asc())
        .load::<DbCategory>(conn)?;
    let products = DbProduct::belonging_to(&categories)
        .order(produtos::produto_id.asc())
        .load::<DbProduct>(conn)?;

    Ok((categories, products))
}

pub(super) fn apply_change(
    conn: &mut SqliteConnection,
    change: &Change<Category>,
    summary: &mut CommitSummary,
) -> RepositoryResult<()> {
    use crate::schema::categorias;

    match change {
        Change::Add(category) => {
            let id = diesel::insert_into(categorias::table)
                .values(DbNewCategory::from(category.clone()))
                .returning(categorias::categoria_id)
                .get_result::<i32>(conn)?;
            summary
                .inserted
                .push(EntityKey::Category(CategoryId::new(id)?));
        }
        Change::Update(category) => {
            let changeset = DbNewCategory::from(category.clone());
            let affected = diesel::update(categorias::table.find(category.id.get()))
                .set(&changeset)
                .execute(conn)?;
            require_affected::<Category>(affected, "update", category.id)?;
            summary.updated += affected;
        }
        Change::Delete(id) => {
            let affected = diesel::delete(categorias::table.find(id.get())).execute(conn)?;
            require_affected::<Category>(affected, "delete", *id)?;
            summary.deleted += affected;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::UnitOfWork;
    use crate::repository::test::{category, product, seeded_context};

    #[test]
    fn pages_categories_in_identity_order() {
        let uow = UnitOfWork::new(seeded_context());

        let page = uow
            .categories()
            .get_categories(PagingRequest::new(1, 2).unwrap())
            .unwrap();

        let ids: Vec<i32> = page.iter().map(|c| c.id.get()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(page.metadata().total_count, 3);
        assert_eq!(page.metadata().total_pages, 2);
        assert!(page.metadata().has_next);
        assert!(!page.metadata().has_previous);
    }

    #[test]
    fn page_beyond_last_is_empty() {
        let uow = UnitOfWork::new(seeded_context());

        let page = uow
            .categories()
            .get_categories(PagingRequest::new(9, 2).unwrap())
            .unwrap();

        assert!(page.is_empty());
        assert_eq!(page.metadata().total_count, 3);
        assert_eq!(page.metadata().total_pages, 2);
    }

    #[test]
    fn attaches_products_to_their_categories() {
        let uow = UnitOfWork::new(seeded_context());

        let categories = uow.categories().get_categories_with_products().unwrap();

        assert_eq!(categories.len(), 3);
        let drinks = &categories[0];
        assert_eq!(drinks.category, category(1, "Bebidas"));
        let product_ids: Vec<i32> = drinks.products.iter().map(|p| p.id.get()).collect();
        assert_eq!(product_ids, vec![1, 4]);
        assert_eq!(categories[2].products, vec![product(3, "Pudim", 6.75, 3)]);
    }
}
