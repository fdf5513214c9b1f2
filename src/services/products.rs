use chrono::Utc;

use crate::domain::product::Product;
use crate::domain::types::{CategoryId, ProductId};
use crate::dto::products::ProductDto;
use crate::forms::products::{ProductForm, ProductPayload};
use crate::pagination::{PagedSlice, PagingParams, PagingRequest};
use crate::repository::{PersistenceContext, UnitOfWork};

use super::{ServiceError, ServiceResult, commit};

fn find_product<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: ProductId,
) -> ServiceResult<Product> {
    match uow.products().get_by_id(id) {
        Ok(Some(product)) => Ok(product),
        Ok(None) => Err(ServiceError::NotFound),
        Err(e) => {
            log::error!("Failed to get product {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Products may only point at existing categories.
fn require_category<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: CategoryId,
) -> ServiceResult<()> {
    match uow.categories().get_by_id(id) {
        Ok(Some(_)) => Ok(()),
        Ok(None) => Err(ServiceError::InvalidArgument(format!(
            "category {id} does not exist"
        ))),
        Err(e) => {
            log::error!("Failed to get category {id}: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// One page of products in identity order.
pub fn list_products<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    params: PagingParams,
) -> ServiceResult<PagedSlice<ProductDto>> {
    let paging = PagingRequest::try_from(params)?;

    match uow.products().get_products(paging) {
        Ok(page) => Ok(page.map(ProductDto::from)),
        Err(e) => {
            log::error!("Failed to list products: {e}");
            Err(ServiceError::Internal)
        }
    }
}

pub fn get_product<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: ProductId,
) -> ServiceResult<ProductDto> {
    find_product(uow, id).map(ProductDto::from)
}

/// Every product, cheapest first.
pub fn list_products_by_price<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
) -> ServiceResult<Vec<ProductDto>> {
    match uow.products().get_products_by_price() {
        Ok(products) => Ok(products.into_iter().map(ProductDto::from).collect()),
        Err(e) => {
            log::error!("Failed to list products by price: {e}");
            Err(ServiceError::Internal)
        }
    }
}

/// Insert a product stamped with the current time.
pub fn create_product<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    form: ProductForm,
) -> ServiceResult<ProductDto> {
    let payload = ProductPayload::try_from(form)?;
    require_category(uow, payload.category_id)?;

    let product = payload.into_new_product(Utc::now().naive_utc());
    uow.products().add(product.clone());
    let summary = commit(uow, "create product")?;

    let Some(id) = summary.inserted_products().next() else {
        log::error!("Commit did not report the inserted product");
        return Err(ServiceError::Internal);
    };
    Ok(product.with_id(id).into())
}

/// Replace the product addressed by `id`; its creation time is kept.
pub fn update_product<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: ProductId,
    form: ProductForm,
) -> ServiceResult<ProductDto> {
    if form.product_id != Some(id.get()) {
        return Err(ServiceError::InvalidArgument(format!(
            "product id {} does not match the addressed id {id}",
            form.product_id
                .map_or_else(|| "<missing>".to_string(), |v| v.to_string())
        )));
    }
    let payload = ProductPayload::try_from(form)?;
    let existing = find_product(uow, id)?;
    require_category(uow, payload.category_id)?;

    let product = payload.into_product(id, existing.created_at);
    uow.products().update(id, product.clone())?;
    commit(uow, "update product")?;

    Ok(product.into())
}

pub fn delete_product<C: PersistenceContext>(
    uow: &UnitOfWork<C>,
    id: ProductId,
) -> ServiceResult<ProductDto> {
    let product = find_product(uow, id)?;

    uow.products().delete(&product);
    commit(uow, "delete product")?;

    Ok(product.into())
}
