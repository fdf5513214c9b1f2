use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::category::{Category, NewCategory};
use crate::domain::types::{CategoryId, CategoryName, ImageUrl, TypeConstraintError};
use crate::forms::{FieldViolation, describe, violations};

/// Body of a create-category request.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddCategoryForm {
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 300))]
    pub image_url: String,
}

/// Body of an update-category request; carries the identity it replaces.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryForm {
    #[validate(range(min = 1))]
    pub category_id: i32,
    #[validate(length(min = 1, max = 80))]
    pub name: String,
    #[validate(length(min = 1, max = 300))]
    pub image_url: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CategoryFormError {
    #[error("category form validation failed: {}", describe(.0))]
    Validation(Vec<FieldViolation>),
    #[error("category form contains invalid data: {0}")]
    TypeConstraint(#[from] TypeConstraintError),
}

impl CategoryFormError {
    /// Every failing field.
    pub fn violations(&self) -> Vec<FieldViolation> {
        match self {
            Self::Validation(found) => found.clone(),
            Self::TypeConstraint(err) => vec![FieldViolation::from(err)],
        }
    }
}

impl From<ValidationErrors> for CategoryFormError {
    fn from(value: ValidationErrors) -> Self {
        Self::Validation(violations(&value))
    }
}

impl TryFrom<AddCategoryForm> for NewCategory {
    type Error = CategoryFormError;

    fn try_from(value: AddCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            name: CategoryName::new(value.name)?,
            image_url: ImageUrl::new(value.image_url)?,
        })
    }
}

impl TryFrom<UpdateCategoryForm> for Category {
    type Error = CategoryFormError;

    fn try_from(value: UpdateCategoryForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            id: CategoryId::new(value.category_id)?,
            name: CategoryName::new(value.name)?,
            image_url: ImageUrl::new(value.image_url)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_form_trims_values() {
        let form = AddCategoryForm {
            name: "  Massas ".to_string(),
            image_url: "massas.jpg".to_string(),
        };

        let category: NewCategory = form.try_into().unwrap();

        assert_eq!(category.name.as_str(), "Massas");
    }

    #[test]
    fn reports_every_failing_field() {
        let form = AddCategoryForm {
            name: "A".repeat(81),
            image_url: String::new(),
        };

        let err = NewCategory::try_from(form).unwrap_err();

        let fields: Vec<String> = err.violations().into_iter().map(|v| v.field).collect();
        assert_eq!(fields, vec!["image_url", "name"]);
    }

    #[test]
    fn whitespace_name_is_rejected_by_domain_type() {
        let form = UpdateCategoryForm {
            category_id: 1,
            name: "   ".to_string(),
            image_url: "x.jpg".to_string(),
        };

        let err = Category::try_from(form).unwrap_err();

        assert_eq!(
            err,
            CategoryFormError::TypeConstraint(TypeConstraintError::EmptyString("name"))
        );
    }

    #[test]
    fn deserializes_camel_case_body() {
        let form: UpdateCategoryForm = serde_json::from_str(
            r#"{"categoryId": 2, "name": "Lanches", "imageUrl": "lanches.jpg"}"#,
        )
        .unwrap();

        let category = Category::try_from(form).unwrap();

        assert_eq!(category.id.get(), 2);
    }
}
