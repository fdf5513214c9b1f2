use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::auth::Credentials;
use crate::forms::{FieldViolation, describe, violations};

/// Login or registration body.
#[derive(Clone, Deserialize, Validate)]
pub struct CredentialsForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("credentials form validation failed: {}", describe(.0))]
pub struct CredentialsFormError(pub Vec<FieldViolation>);

impl From<ValidationErrors> for CredentialsFormError {
    fn from(value: ValidationErrors) -> Self {
        Self(violations(&value))
    }
}

impl TryFrom<CredentialsForm> for Credentials {
    type Error = CredentialsFormError;

    fn try_from(value: CredentialsForm) -> Result<Self, Self::Error> {
        value.validate()?;
        Ok(Self {
            email: value.email.trim().to_string(),
            password: value.password,
        })
    }
}
