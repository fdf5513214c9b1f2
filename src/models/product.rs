use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::product::{NewProduct as DomainNewProduct, Product as DomainProduct};
use crate::domain::types::{
    ImageUrl, ProductDescription, ProductName, ProductPrice, StockQuantity, TypeConstraintError,
};
use crate::models::category::Category;

/// Diesel model representing the `produtos` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(
    table_name = crate::schema::produtos,
    primary_key(produto_id),
    belongs_to(Category, foreign_key = categoria_id)
)]
pub struct Product {
    pub produto_id: i32,
    pub name: String,
    pub descricao: String,
    pub preco: f64,
    pub image_url: String,
    pub estoque: f64,
    pub data_cadastro: NaiveDateTime,
    pub categoria_id: i32,
}

/// Insertable/patchable form of [`Product`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::produtos)]
pub struct NewProduct {
    pub name: String,
    pub descricao: String,
    pub preco: f64,
    pub image_url: String,
    pub estoque: f64,
    pub data_cadastro: NaiveDateTime,
    pub categoria_id: i32,
}

impl TryFrom<Product> for DomainProduct {
    type Error = TypeConstraintError;

    fn try_from(product: Product) -> Result<Self, Self::Error> {
        Ok(Self {
            id: product.produto_id.try_into()?,
            name: ProductName::new(product.name)?,
            description: ProductDescription::new(product.descricao)?,
            price: ProductPrice::new(product.preco)?,
            image_url: ImageUrl::new(product.image_url)?,
            stock: StockQuantity::new(product.estoque)?,
            created_at: product.data_cadastro,
            category_id: product.categoria_id.try_into()?,
        })
    }
}

impl From<DomainNewProduct> for NewProduct {
    fn from(product: DomainNewProduct) -> Self {
        Self {
            name: product.name.into_inner(),
            descricao: product.description.into_inner(),
            preco: product.price.get(),
            image_url: product.image_url.into_inner(),
            estoque: product.stock.get(),
            data_cadastro: product.created_at,
            categoria_id: product.category_id.get(),
        }
    }
}

impl From<DomainProduct> for NewProduct {
    fn from(product: DomainProduct) -> Self {
        Self {
            name: product.name.into_inner(),
            descricao: product.description.into_inner(),
            preco: product.price.get(),
            image_url: product.image_url.into_inner(),
            estoque: product.stock.get(),
            data_cadastro: product.created_at,
            categoria_id: product.category_id.get(),
        }
    }
}
