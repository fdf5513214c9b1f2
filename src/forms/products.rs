use chrono::NaiveDateTime;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::product::{NewProduct, Product};
use crate::domain::types::{
    CategoryId, ImageUrl, ProductDescription, ProductId, ProductName, ProductPrice, StockQuantity,
    TypeConstraintError,
};
use crate::forms::{FieldViolation, describe, violations};

/// Body of a create- or update-product request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductForm {
    /// Identity being replaced; absent on create.
    #[serde(default)]
    pub product_id: Option<i32>,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 300))]
    pub description: String,
    #[validate(range(min = 0.0, max = 99_999_999.99))]
    pub price: f64,
    #[validate(length(min = 1, max = 300))]
    pub image_url: String,
    #[serde(default)]
    #[validate(range(min = 0.0))]
    pub stock: f64,
    #[validate(range(min = 1))]
    pub category_id: i32,
}

/// Product fields that the caller controls.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPayload {
    pub product_id: Option<ProductId>,
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub image_url: ImageUrl,
    pub stock: StockQuantity,
    pub category_id: CategoryId,
}

impl ProductPayload {
    pub fn into_new_product(self, created_at: NaiveDateTime) -> NewProduct {
        NewProduct {
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            stock: self.stock,
            created_at,
            category_id: self.category_id,
        }
    }

    /// Full replacement record for `id`, keeping the original creation time.
    pub fn into_product(self, id: ProductId, created_at: NaiveDateTime) -> Product {
        self.into_new_product(created_at).with_id(id)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProductFormError {
    #[error("product form validation failed: {}", describe(.0))]
    Validation(Vec<FieldViolation>),
    #[error("product form contains invalid data: {0}")]
    TypeConstraint(#[from] TypeConstraintError),
}

impl ProductFormError {
    pub fn violations(&self) -> Vec<FieldViolation> {
        match self {
            Self::Validation(found) => found.clone(),
            Self::TypeConstraint(err) => vec![FieldViolation::from(err)],
        }
    }
}

impl From<ValidationErrors> for ProductFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(violations(&value))
    }
}

impl TryFrom<ProductForm> for ProductPayload {
    type Error = ProductFormError;

    fn try_from(value: ProductForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            product_id: value.product_id.map(ProductId::new).transpose()?,
            name: ProductName::new(value.name)?,
            description: ProductDescription::new(value.description)?,
            price: ProductPrice::new(value.price)?,
            image_url: ImageUrl::new(value.image_url)?,
            stock: StockQuantity::new(value.stock)?,
            category_id: CategoryId::new(value.category_id)?,
        })
    }
}
