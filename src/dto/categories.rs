use serde::Serialize;

use crate::domain::category::{Category, CategoryWithProducts};
use crate::dto::products::ProductDto;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub category_id: i32,
    pub name: String,
    pub image_url: String,
    /// Present only when products were eagerly loaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<ProductDto>>,
}

impl From<Category> for CategoryDto {
    fn from(value: Category) -> Self {
        Self {
            category_id: value.id.get(),
            name: value.name.into_inner(),
            image_url: value.image_url.into_inner(),
            products: None,
        }
    }
}

impl From<CategoryWithProducts> for CategoryDto {
    fn from(value: CategoryWithProducts) -> Self {
        Self {
            products: Some(value.products.into_iter().map(ProductDto::from).collect()),
            ..Self::from(value.category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test::{category, product};

    #[test]
    fn plain_category_omits_products_key() {
        let json = serde_json::to_value(CategoryDto::from(category(1, "Bebidas"))).unwrap();

        assert_eq!(json["categoryId"], 1);
        assert_eq!(json["imageUrl"], "bebidas.jpg");
        assert!(json.get("products").is_none());
    }

    #[test]
    fn eager_loaded_category_nests_products() {
        let dto = CategoryDto::from(CategoryWithProducts {
            category: category(3, "Sobremesas"),
            products: vec![product(3, "Pudim", 6.75, 3)],
        });

        let products = dto.products.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].product_id, 3);
        assert_eq!(products[0].category_id, 3);
    }
}
