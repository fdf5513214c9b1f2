use crate::domain::category::{Category, NewCategory};
use crate::domain::types::CategoryId;
use crate::dto::categories::CategoryDto;
use crate::forms::categories::{AddCategoryForm, UpdateCategoryForm};
use crate::pagination::{PagedSlice, PagingParams, PagingRequest};
use crate::repository::{PersistenceContext, UnitOfWork};

use super::{ServiceError, ServiceResult, commit};

fn find_category<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: CategoryId,
) -> ServiceResult<Category> {
    match uow.categories().get_by_id(id) {
        Ok(Some(category)) => Ok(category),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get category {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// One page of categories in identity order.
pub fn list_categories<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    params: PagingParams,
) -> ServiceResult<PagedSlice<CategoryDto>> {
    let paging = PagingRequest::try_from(params)?;

    match uow.categories().get_categories(paging) {
        Ok(page) => Ok(page.map(CategoryDto::from)),
        Err(e) => {
            log::error!("Failed to list categories: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_category<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: CategoryId,
) -> ServiceResult<CategoryDto> {
    find_category(uow, id).map(CategoryDto::from)
}

/// Every category with its products nested.
pub fn list_categories_with_products<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
) -> ServiceResult<Vec<CategoryDto>> {
    match uow.categories().get_categories_with_products() {
        Ok(categories) => Ok(categories.into_iter().map(CategoryDto::from).collect()),
        Err(e) => {
            log::error!("Failed to load categories with products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Insert a category and return it with its assigned identity.
pub fn create_category<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    form: AddCategoryForm,
) -> ServiceResult<CategoryDto> {
    let category = NewCategory::try_from(form)?;

    uow.categories().add(category.clone());
    let summary = commit(uow, "create category")?;

    let Some(id) = summary.inserted_categories().next() else {
        log::error!("Commit did not report the inserted category");
        return Err(ServiceError::Internal);
    };
    Ok(category.with_id(id).into())
}

/// Replace the category addressed by `id`.
pub fn update_category<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: CategoryId,
    form: UpdateCategoryForm,
) -> ServiceResult<CategoryDto> {
    if form.category_id != id.get() {
        return Err(ServiceError::InvalidArgument(format!(
            "category id {} does not match the addressed id {id}",
            form.category_id
        )));
    }
    let category = Category::try_from(form)?;
    find_category(uow, id)?;

    uow.categories().update(id, category.clone())?;
    commit(uow, "update category")?;

    Ok(category.into())
}

/// Remove a category and, through the foreign key, its products.
pub fn delete_category<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: CategoryId,
) -> ServiceResult<CategoryDto> {
    let category = find_category(uow, id)?;

    uow.categories().delete(&category);
    commit(uow, "delete category")?;

    Ok(category.into())
}
