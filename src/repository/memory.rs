use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::domain::category::{Category, CategoryWithProducts};
use crate::domain::product::Product;
use crate::domain::types::{CategoryId, ProductId};
use crate::repository::{
    CategoryOrder, Change, CommitSummary, EntityKey, EntityStore, FetchSpec,
    PersistenceContext, ProductOrder, RepositoryError, RepositoryResult, StagedChange,
    require_affected,
};

#[derive(Debug, Clone)]
struct Tables {
    categories: BTreeMap<CategoryId, Category>,
    products: BTreeMap<ProductId, Product>,
    next_category: i32,
    next_product: i32,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            categories: BTreeMap::new(),
            products: BTreeMap::new(),
            next_category: 1,
            next_product: 1,
        }
    }
}

impl Tables {
    fn apply(
        &mut self,
        change: &StagedChange,
        summary: &mut CommitSummary,
    ) -> RepositoryResult<()> {
        match change {
            StagedChange::Category(change) => self.apply_category(change, summary),
            StagedChange::Product(change) => self.apply_product(change, summary),
        }
    }

    fn apply_category(
        &mut self,
        change: &Change<Category>,
        summary: &mut CommitSummary,
    ) -> RepositoryResult<()> {
        match change {
            Change::Add(new) => {
                let id = CategoryId::new(self.next_category)?;
                self.next_category += 1;
                self.categories.insert(id, new.clone().with_id(id));
                summary.inserted.push(EntityKey::Category(id));
            }
            Change::Update(category) => {
                match self.categories.get_mut(&category.id) {
                    Some(slot) => *slot = category.clone(),
                    None => require_affected::<Category>(0, "update", category.id)?,
                }
                summary.updated += 1;
            }
            Change::Delete(id) => {
                let removed = self.categories.remove(id);
                require_affected::<Category>(usize::from(removed.is_some()), "delete", *id)?;
                // Mirrors ON DELETE CASCADE on the products table.
                self.products.retain(|_, product| product.category_id != *id);
                summary.deleted += 1;
            }
        }
        Ok(())
    }

    fn apply_product(
        &mut self,
        change: &Change<Product>,
        summary: &mut CommitSummary,
    ) -> RepositoryResult<()> {
        match change {
            Change::Add(new) => {
                self.require_category(new.category_id)?;
                let id = ProductId::new(self.next_product)?;
                self.next_product += 1;
                self.products.insert(id, new.clone().with_id(id));
                summary.inserted.push(EntityKey::Product(id));
            }
            Change::Update(product) => {
                self.require_category(product.category_id)?;
                match self.products.get_mut(&product.id) {
                    Some(slot) => *slot = product.clone(),
                    None => require_affected::<Product>(0, "update", product.id)?,
                }
                summary.updated += 1;
            }
            Change::Delete(id) => {
                let removed = self.products.remove(id);
                require_affected::<Product>(usize::from(removed.is_some()), "delete", *id)?;
                summary.deleted += 1;
            }
        }
        Ok(())
    }

    fn require_category(&self, id: CategoryId) -> RepositoryResult<()> {
        if self.categories.contains_key(&id) {
            Ok(())
        } else {
            Err(RepositoryError::CommitRejected(format!(
                "product references missing category {id}"
            )))
        }
    }
}

/// Persistence context backed by in-process maps.
///
/// Clones share the same tables, the way two connections share one
/// database file. Commits are applied to a copy of the tables which
/// replaces the live set only when every change succeeded.
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    tables: Rc<RefCell<Tables>>,
    rejection: Option<String>,
}

impl MemoryContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing records. Identities keep counting from the
    /// highest one supplied.
    pub fn with_data(
        categories: impl IntoIterator<Item = Category>,
        products: impl IntoIterator<Item = Product>,
    ) -> RepositoryResult<Self> {
        let mut tables = Tables {
            categories: categories.into_iter().map(|c| (c.id, c)).collect(),
            products: products.into_iter().map(|p| (p.id, p)).collect(),
            ..Tables::default()
        };

        if let Some(orphan) = tables
            .products
            .values()
            .find(|p| !tables.categories.contains_key(&p.category_id))
        {
            return Err(RepositoryError::InvalidArgument(format!(
                "product {} references missing category {}",
                orphan.id, orphan.category_id
            )));
        }

        tables.next_category = tables.categories.keys().last().map_or(1, |id| id.get() + 1);
        tables.next_product = tables.products.keys().last().map_or(1, |id| id.get() + 1);

        Ok(Self {
            tables: Rc::new(RefCell::new(tables)),
            rejection: None,
        })
    }

    /// Make every non-empty commit through this handle fail with `reason`.
    pub fn reject_commits(mut self, reason: impl Into<String>) -> Self {
        self.rejection = Some(reason.into());
        self
    }
}

fn window<T, O>(items: Vec<T>, spec: &FetchSpec<O>) -> Vec<T> {
    items
        .into_iter()
        .skip(spec.offset)
        .take(spec.limit.unwrap_or(usize::MAX))
        .collect()
}

impl EntityStore<Category> for MemoryContext {
    fn count(&self) -> RepositoryResult<usize> {
        Ok(self.tables.borrow().categories.len())
    }

    fn fetch(&self, spec: &FetchSpec<CategoryOrder>) -> RepositoryResult<Vec<Category>> {
        let mut items: Vec<Category> = self.tables.borrow().categories.values().cloned().collect();
        items.sort_by(|a, b| spec.order.compare(a, b));
        Ok(window(items, spec))
    }

    fn find_by_id(&self, id: CategoryId) -> RepositoryResult<Option<Category>> {
        Ok(self.tables.borrow().categories.get(&id).cloned())
    }
}

impl EntityStore<Product> for MemoryContext {
    fn count(&self) -> RepositoryResult<usize> {
        Ok(self.tables.borrow().products.len())
    }

    fn fetch(&self, spec: &FetchSpec<ProductOrder>) -> RepositoryResult<Vec<Product>> {
        let mut items: Vec<Product> = self.tables.borrow().products.values().cloned().collect();
        items.sort_by(|a, b| spec.order.compare(a, b));
        Ok(window(items, spec))
    }

    fn find_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        Ok(self.tables.borrow().products.get(&id).cloned())
    }
}

impl PersistenceContext for MemoryContext {
    fn categories_with_products(&self) -> RepositoryResult<Vec<CategoryWithProducts>> {
        let tables = self.tables.borrow();
        let mut grouped: BTreeMap<CategoryId, Vec<Product>> = BTreeMap::new();
        for product in tables.products.values() {
            grouped
                .entry(product.category_id)
                .or_default()
                .push(product.clone());
        }

        Ok(tables
            .categories
            .values()
            .map(|category| CategoryWithProducts {
                category: category.clone(),
                products: grouped.remove(&category.id).unwrap_or_default(),
            })
            .collect())
    }

    fn apply(&self, changes: &[StagedChange]) -> RepositoryResult<CommitSummary> {
        if let Some(reason) = &self.rejection {
            return Err(RepositoryError::CommitRejected(reason.clone()));
        }

        let mut working = self.tables.borrow().clone();
        let mut summary = CommitSummary::default();
        for change in changes {
            working.apply(change, &mut summary)?;
        }

        *self.tables.borrow_mut() = working;
        log::debug!("In-memory commit applied {} change(s)", changes.len());
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::{category, new_product, product, seeded_context};

    #[test]
    fn deleting_category_cascades_to_products() {
        let context = seeded_context();

        context
            .apply(&[StagedChange::Category(Change::Delete(
                CategoryId::new(1).unwrap(),
            ))])
            .unwrap();

        let remaining =
            EntityStore::<Product>::fetch(&context, &FetchSpec::default()).unwrap();
        let ids: Vec<i32> = remaining.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn failed_batch_keeps_identity_counters() {
        let context = seeded_context();

        let err = context
            .apply(&[
                StagedChange::Product(Change::Add(new_product("Esfiha", 3.0, 2))),
                StagedChange::Product(Change::Add(new_product("Orfa", 1.0, 42))),
            ])
            .unwrap_err();
        assert!(matches!(err, RepositoryError::CommitRejected(_)));

        let summary = context
            .apply(&[StagedChange::Product(Change::Add(new_product(
                "Esfiha", 3.0, 2,
            )))])
            .unwrap();
        assert_eq!(summary.inserted_products().next().unwrap().get(), 5);
    }

    #[test]
    fn rejects_seed_products_without_category() {
        let err = MemoryContext::with_data(
            vec![category(1, "Bebidas")],
            vec![product(1, "Suco", 4.0, 2)],
        )
        .unwrap_err();
        assert!(matches!(err, RepositoryError::InvalidArgument(_)));
    }

    #[test]
    fn windows_after_ordering() {
        let context = seeded_context();
        let spec = FetchSpec {
            order: ProductOrder::PriceAsc,
            offset: 1,
            limit: Some(2),
        };

        let items = EntityStore::<Product>::fetch(&context, &spec).unwrap();

        let ids: Vec<i32> = items.iter().map(|p| p.id.get()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn categories_without_products_get_empty_lists() {
        let context =
            MemoryContext::with_data(vec![category(1, "Bebidas")], Vec::new()).unwrap();

        let grouped = context.categories_with_products().unwrap();

        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].products.is_empty());
    }
}
