use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::pagination::{PagedSlice, PagingRequest};
use crate::repository::{
    Change, Entity, EntityStore, FetchSpec, RepositoryError, RepositoryResult, StagedChange,
};

/// State shared by a unit of work and every repository it hands out.
pub(crate) struct Scope<C> {
    pub(crate) context: C,
    pub(crate) changes: RefCell<Vec<StagedChange>>,
}

impl<C> Scope<C> {
    pub(crate) fn new(context: C) -> Self {
        Self {
            context,
            changes: RefCell::new(Vec::new()),
        }
    }

    fn stage(&self, change: StagedChange) {
        self.changes.borrow_mut().push(change);
    }
}

/// CRUD surface for one entity type.
///
/// Reads go straight to the context. Writes are only staged; they reach the
/// store when the owning [`UnitOfWork`](crate::repository::UnitOfWork)
/// commits.
pub struct Repository<T, C> {
    scope: Rc<Scope<C>>,
    _entity: PhantomData<fn() -> T>,
}

impl<T, C> Repository<T, C> {
    pub(crate) fn new(scope: Rc<Scope<C>>) -> Self {
        Self {
            scope,
            _entity: PhantomData,
        }
    }

    pub(crate) fn context(&self) -> &C {
        &self.scope.context
    }
}

impl<T, C> Repository<T, C>
where
    T: Entity,
    C: EntityStore<T>,
{
    /// Lazy view over every record; nothing is read until it is enumerated.
    pub fn get(&self) -> Query<'_, T, C> {
        Query::new(&self.scope.context)
    }

    /// Record with the given identity, or `None`.
    pub fn get_by_id(&self, id: T::Id) -> RepositoryResult<Option<T>> {
        self.scope.context.find_by_id(id)
    }

    /// First record, in identity order, matching `predicate`.
    pub fn find<P>(&self, predicate: P) -> RepositoryResult<Option<T>>
    where
        P: Fn(&T) -> bool,
    {
        Ok(self.get().load()?.into_iter().find(|entity| predicate(entity)))
    }

    /// Stage an insert.
    pub fn add(&self, entity: T::New) {
        self.scope.stage(T::stage(Change::Add(entity)));
    }

    /// Stage a full replace of the record addressed by `id`.
    ///
    /// Fails without staging anything when `entity` carries a different
    /// identity than the one addressed.
    pub fn update(&self, id: T::Id, entity: T) -> RepositoryResult<()> {
        if entity.id() != id {
            return Err(RepositoryError::InvalidArgument(format!(
                "{} id {} does not match the addressed id {id}",
                T::NAME,
                entity.id()
            )));
        }
        self.scope.stage(T::stage(Change::Update(entity)));
        Ok(())
    }

    /// Stage removal of `entity`.
    pub fn delete(&self, entity: &T) {
        self.scope.stage(T::stage(Change::Delete(entity.id())));
    }
}

/// Deferred read over one entity type.
pub struct Query<'r, T: Entity, C> {
    store: &'r C,
    spec: FetchSpec<T::Order>,
    _entity: PhantomData<fn() -> T>,
}

impl<'r, T, C> Query<'r, T, C>
where
    T: Entity,
    C: EntityStore<T>,
{
    fn new(store: &'r C) -> Self {
        Self {
            store,
            spec: FetchSpec::default(),
            _entity: PhantomData,
        }
    }

    pub fn order_by(mut self, order: T::Order) -> Self {
        self.spec.order = order;
        self
    }

    pub fn skip(mut self, offset: usize) -> Self {
        self.spec.offset = offset;
        self
    }

    pub fn take(mut self, limit: usize) -> Self {
        self.spec.limit = Some(limit);
        self
    }

    /// Size of the whole source, ignoring any window.
    pub fn count(&self) -> RepositoryResult<usize> {
        self.store.count()
    }

    pub fn load(self) -> RepositoryResult<Vec<T>> {
        self.store.fetch(&self.spec)
    }

    /// Count the source, then load only the requested page.
    pub fn paginate(self, request: PagingRequest) -> RepositoryResult<PagedSlice<T>> {
        let total = self.count()?;
        let items = self
            .skip(request.offset())
            .take(request.page_size())
            .load()?;
        Ok(PagedSlice::new(items, total, request))
    }
}
