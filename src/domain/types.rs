//! Strongly-typed value objects used by domain entities.
//!
//! Domain structs carry these wrappers instead of raw primitives so that
//! identifiers, text lengths and numeric ranges are enforced at the
//! boundary. Limits mirror the column sizes of the catalog tables.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Errors produced when attempting to construct constrained domain types.
///
/// Every variant names the offending field so callers can report it back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeConstraintError {
    /// An identifier was zero or negative.
    #[error("{0} must be greater than zero")]
    NonPositiveId(&'static str),
    /// A numeric value required to be non-negative was negative or not finite.
    #[error("{0} must be zero or greater")]
    NegativeNumber(&'static str),
    /// A numeric value exceeded the range the storage column can hold.
    #[error("{0} is out of range")]
    OutOfRange(&'static str),
    /// A string was empty or whitespace-only after trimming.
    #[error("{0} cannot be empty")]
    EmptyString(&'static str),
    /// A string exceeded its maximum length in characters.
    #[error("{0} must be at most {1} characters long")]
    TooLong(&'static str, usize),
    /// The first letter of a name was lowercase.
    #[error("{0} must start with an uppercase letter")]
    NotCapitalized(&'static str),
}

impl TypeConstraintError {
    /// Name of the field that failed the constraint.
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NonPositiveId(field)
            | Self::NegativeNumber(field)
            | Self::OutOfRange(field)
            | Self::EmptyString(field)
            | Self::TooLong(field, _)
            | Self::NotCapitalized(field) => field,
        }
    }
}

fn trim_and_require_non_empty<S: Into<String>>(
    value: S,
    field: &'static str,
) -> Result<String, TypeConstraintError> {
    let trimmed = value.into().trim().to_string();
    if trimmed.is_empty() {
        Err(TypeConstraintError::EmptyString(field))
    } else {
        Ok(trimmed)
    }
}

fn require_max_chars(
    value: String,
    field: &'static str,
    max: usize,
) -> Result<String, TypeConstraintError> {
    if value.chars().count() > max {
        Err(TypeConstraintError::TooLong(field, max))
    } else {
        Ok(value)
    }
}

fn require_capitalized(value: &str, field: &'static str) -> Result<(), TypeConstraintError> {
    match value.chars().next() {
        Some(first) if first.is_lowercase() => Err(TypeConstraintError::NotCapitalized(field)),
        _ => Ok(()),
    }
}

/// Macro to generate lightweight newtypes for positive identifiers.
macro_rules! id_newtype {
    ($name:ident, $doc:expr, $field:expr) => {
        #[doc = $doc]
        #[derive(
            Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
        )]
        #[serde(transparent)]
        pub struct $name(i32);

        impl $name {
            /// Creates a new identifier ensuring it is greater than zero.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId($field))
                }
            }

            /// Returns the raw `i32` backing this identifier.
            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<i32> for $name {
            fn eq(&self, other: &i32) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for i32 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

/// Trimmed, non-empty strings bounded by a column length, with an optional
/// extra check run on the trimmed value.
macro_rules! bounded_string_newtype {
    ($name:ident, $doc:expr, $field:expr, $max:expr) => {
        bounded_string_newtype!($name, $doc, $field, $max, |_: &str, _: &'static str| Ok(()));
    };
    ($name:ident, $doc:expr, $field:expr, $max:expr, $check:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LEN: usize = $max;

            /// Constructs a trimmed, non-empty value within the length limit.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let trimmed = trim_and_require_non_empty(value, $field)?;
                let bounded = require_max_chars(trimmed, $field, $max)?;
                let check: fn(&str, &'static str) -> Result<(), TypeConstraintError> = $check;
                check(&bounded, $field)?;
                Ok(Self(bounded))
            }

            /// Borrow the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the wrapper and return the owned string.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                self.as_str()
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.as_str() == *other
            }
        }

        impl PartialEq<$name> for &str {
            fn eq(&self, other: &$name) -> bool {
                *self == other.as_str()
            }
        }
    };
}

macro_rules! non_negative_f64_newtype {
    ($name:ident, $doc:expr, $field:expr, $upper:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, PartialOrd)]
        #[serde(try_from = "f64", into = "f64")]
        pub struct $name(f64);

        impl $name {
            /// Constructs a finite numeric value that is zero or greater and
            /// strictly below the storage limit.
            pub fn new(value: f64) -> Result<Self, TypeConstraintError> {
                if !value.is_finite() || value < 0.0 {
                    Err(TypeConstraintError::NegativeNumber($field))
                } else if value >= $upper {
                    Err(TypeConstraintError::OutOfRange($field))
                } else {
                    Ok(Self(value))
                }
            }

            /// Returns the raw `f64` value.
            pub const fn get(self) -> f64 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<f64> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: f64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for f64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl PartialEq<f64> for $name {
            fn eq(&self, other: &f64) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<$name> for f64 {
            fn eq(&self, other: &$name) -> bool {
                *self == other.0
            }
        }
    };
}

id_newtype!(
    CategoryId,
    "Unique identifier for a category.",
    "category_id"
);
id_newtype!(ProductId, "Unique identifier for a product.", "product_id");

bounded_string_newtype!(
    CategoryName,
    "Category display name, at most 80 characters.",
    "name",
    80
);
bounded_string_newtype!(
    ProductName,
    "Product name, at most 80 characters and starting with an uppercase letter.",
    "name",
    80,
    require_capitalized
);
bounded_string_newtype!(
    ProductDescription,
    "Product description, at most 300 characters.",
    "description",
    300
);
bounded_string_newtype!(
    ImageUrl,
    "Image location (file name or URL), at most 300 characters.",
    "image_url",
    300
);

// decimal(10,2) holds at most eight integer digits.
non_negative_f64_newtype!(
    ProductPrice,
    "Non-negative price value in standard currency units.",
    "price",
    100_000_000.0
);
non_negative_f64_newtype!(
    StockQuantity,
    "Quantity of a product held in stock.",
    "stock",
    f64::MAX
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_bounded_strings() {
        let value = CategoryName::new("  Bebidas  ").unwrap();
        assert_eq!(value.as_str(), "Bebidas");
    }

    #[test]
    fn rejects_non_positive_ids() {
        let err = ProductId::new(0).unwrap_err();
        assert_eq!(err, TypeConstraintError::NonPositiveId("product_id"));
        assert_eq!(err.field(), "product_id");
    }

    #[test]
    fn rejects_names_longer_than_column() {
        let long = "A".repeat(81);
        assert_eq!(
            CategoryName::new(long).unwrap_err(),
            TypeConstraintError::TooLong("name", 80)
        );
        assert!(CategoryName::new("A".repeat(80)).is_ok());
    }

    #[test]
    fn counts_characters_not_bytes() {
        let accented = "Á".repeat(80);
        assert!(CategoryName::new(accented).is_ok());
    }

    #[test]
    fn product_names_must_be_capitalized() {
        assert!(ProductName::new("Pudim 100 g").is_ok());
        assert!(ProductName::new("7 Up").is_ok());
        assert_eq!(
            ProductName::new("pudim").unwrap_err(),
            TypeConstraintError::NotCapitalized("name")
        );
    }

    #[test]
    fn product_price_allows_zero() {
        assert_eq!(ProductPrice::new(0.0).unwrap().get(), 0.0);
    }

    #[test]
    fn product_price_rejects_negative_and_oversized_numbers() {
        assert_eq!(
            ProductPrice::new(-0.01).unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
        assert_eq!(
            ProductPrice::new(100_000_000.0).unwrap_err(),
            TypeConstraintError::OutOfRange("price")
        );
        assert_eq!(
            ProductPrice::new(f64::NAN).unwrap_err(),
            TypeConstraintError::NegativeNumber("price")
        );
    }

    #[test]
    fn deserialization_runs_constraints() {
        let name: Result<CategoryName, _> = serde_json::from_str("\"   \"");
        assert!(name.is_err());
        let price: Result<ProductPrice, _> = serde_json::from_str("-1.0");
        assert!(price.is_err());
    }
}
