use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::product::Product;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub product_id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub image_url: String,
    pub stock: f64,
    pub created_at: NaiveDateTime,
    pub category_id: i32,
}

impl From<Product> for ProductDto {
    fn from(value: Product) -> Self {
        Self {
            product_id: value.id.get(),
            name: value.name.into_inner(),
            description: value.description.into_inner(),
            price: value.price.get(),
            image_url: value.image_url.into_inner(),
            stock: value.stock.get(),
            created_at: value.created_at,
            category_id: value.category_id.get(),
        }
    }
}
