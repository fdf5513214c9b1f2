use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{
    CategoryId, ImageUrl, ProductDescription, ProductId, ProductName, ProductPrice, StockQuantity,
};

/// A product listed in the catalog.
///
/// `category_id` is a non-owning back reference; the storage layer keeps it
/// consistent with the categories table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub image_url: ImageUrl,
    pub stock: StockQuantity,
    pub created_at: NaiveDateTime,
    pub category_id: CategoryId,
}

/// Information required to create a new [`Product`].
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct NewProduct {
    pub name: ProductName,
    pub description: ProductDescription,
    pub price: ProductPrice,
    pub image_url: ImageUrl,
    pub stock: StockQuantity,
    pub created_at: NaiveDateTime,
    pub category_id: CategoryId,
}

impl NewProduct {
    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            description: self.description,
            price: self.price,
            image_url: self.image_url,
            stock: self.stock,
            created_at: self.created_at,
            category_id: self.category_id,
        }
    }
}
