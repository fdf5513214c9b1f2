use serde::{Deserialize, Serialize};

use crate::domain::product::Product;
use crate::domain::types::{CategoryId, CategoryName, ImageUrl};

/// Catalog category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: CategoryName,
    pub image_url: ImageUrl,
}

/// Data required to insert a new [`Category`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewCategory {
    pub name: CategoryName,
    pub image_url: ImageUrl,
}

/// A category with its products attached, produced by eager loading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryWithProducts {
    pub category: Category,
    pub products: Vec<Product>,
}

impl NewCategory {
    /// Attach a store-assigned identifier.
    pub fn with_id(self, id: CategoryId) -> Category {
        Category {
            id,
            name: self.name,
            image_url: self.image_url,
        }
    }
}
