use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// User name and password submitted for login or registration.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Identity confirmed by a [`CredentialValidator`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifiedUser {
    /// Stable unique identifier of the subject.
    pub id: String,
    /// Login name, usually the e-mail address.
    pub user_name: String,
    /// Optional human-readable name embedded as the `name` claim.
    pub display_name: Option<String>,
}

/// Result of a successful authentication.
///
/// The token is self-contained: validity is decided by its signature and
/// expiration at verification time, nothing is tracked server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessToken {
    pub authenticated: bool,
    pub token: String,
    pub expiration: DateTime<Utc>,
    pub message: String,
}

/// Why a [`CredentialValidator`] refused the submitted credentials.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialRejection {
    #[error("invalid login attempt")]
    InvalidLogin,
    #[error("user {0} already exists")]
    DuplicateUser(String),
    #[error("registration refused: {}", .0.join("; "))]
    Refused(Vec<String>),
}

/// Verifies or registers user credentials.
///
/// Implemented outside this crate by whatever identity store the deployment
/// uses; token issuance is only reached after one of these calls succeeds.
pub trait CredentialValidator {
    /// Create a new account and return its identity.
    fn register(&self, credentials: &Credentials) -> Result<VerifiedUser, CredentialRejection>;
    /// Check a password against an existing account.
    fn verify(&self, credentials: &Credentials) -> Result<VerifiedUser, CredentialRejection>;
}
