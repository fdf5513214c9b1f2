use diesel::prelude::*;

use crate::domain::category::{Category as DomainCategory, NewCategory as DomainNewCategory};
use crate::domain::types::{CategoryName, ImageUrl, TypeConstraintError};

/// Diesel model representing the `categorias` table.
#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::categorias, primary_key(categoria_id))]
pub struct Category {
    pub categoria_id: i32,
    pub name: String,
    pub image_url: String,
}

/// Insertable/patchable form of [`Category`].
#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::categorias)]
pub struct NewCategory {
    pub name: String,
    pub image_url: String,
}

impl TryFrom<Category> for DomainCategory {
    type Error = TypeConstraintError;

    fn try_from(category: Category) -> Result<Self, Self::Error> {
        Ok(Self {
            id: category.categoria_id.try_into()?,
            name: CategoryName::new(category.name)?,
            image_url: ImageUrl::new(category.image_url)?,
        })
    }
}

impl From<DomainNewCategory> for NewCategory {
    fn from(category: DomainNewCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            image_url: category.image_url.into_inner(),
        }
    }
}

impl From<DomainCategory> for NewCategory {
    fn from(category: DomainCategory) -> Self {
        Self {
            name: category.name.into_inner(),
            image_url: category.image_url.into_inner(),
        }
    }
}
